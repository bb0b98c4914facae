/// PNG 块校验使用的 CRC-32 多项式（反射形式）
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// 256 项查表，编译期生成
static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut value = n as u32;
        let mut k = 0;
        while k < 8 {
            value = if value & 1 != 0 {
                POLYNOMIAL ^ (value >> 1)
            } else {
                value >> 1
            };
            k += 1;
        }
        table[n] = value;
        n += 1;
    }
    table
}

/// 流式 CRC-32 计算器。
///
/// 块的校验值覆盖类型标识和数据两段，分段更新可以避免先拼接再计算。
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    acc: u32,
}

impl Crc32 {
    pub fn new() -> Crc32 {
        Crc32 { acc: 0xFFFF_FFFF }
    }

    pub fn update(mut self, bytes: &[u8]) -> Crc32 {
        for &b in bytes {
            self.acc = TABLE[((self.acc ^ b as u32) & 0xFF) as usize] ^ (self.acc >> 8);
        }
        self
    }

    pub fn finish(self) -> u32 {
        !self.acc
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// 计算 `bytes` 的 CRC-32
pub fn crc32(bytes: &[u8]) -> u32 {
    Crc32::new().update(bytes).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn iend_chunk_crc() {
        assert_eq!(crc32(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn table_entries() {
        assert_eq!(TABLE[0], 0);
        assert_eq!(TABLE[1], 0x7707_3096);
        assert_eq!(TABLE[255], 0x2D02_EF8D);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let whole = crc32(b"fcTL\x00\x00\x00\x01");
        let split = Crc32::new().update(b"fcTL").update(&[0, 0, 0, 1]).finish();
        assert_eq!(whole, split);
    }
}
