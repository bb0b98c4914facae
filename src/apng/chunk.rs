use super::crc::Crc32;

/// PNG 文件签名
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub const IHDR: [u8; 4] = *b"IHDR";
pub const ACTL: [u8; 4] = *b"acTL";
pub const FCTL: [u8; 4] = *b"fcTL";
pub const IDAT: [u8; 4] = *b"IDAT";
pub const FDAT: [u8; 4] = *b"fdAT";
pub const IEND: [u8; 4] = *b"IEND";

/// 长度、类型、校验值三个字段共 12 字节
pub const CHUNK_OVERHEAD: usize = 12;

/// 将一个块追加写入 `out`：长度、类型、数据、`crc32(type ++ data)`，大端序。
///
/// # Panics
///
/// `data` 超过 `u32::MAX` 字节时会 panic，PNG 块长度字段无法表示。
pub fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) {
    let length = u32::try_from(data.len()).expect("chunk payload exceeds u32::MAX bytes");
    out.reserve(data.len() + CHUNK_OVERHEAD);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    let crc = Crc32::new().update(tag).update(data).finish();
    out.extend_from_slice(&crc.to_be_bytes());
}

/// 生成一个独立的块，长度总是 `data.len() + 12`
pub fn make_chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(data.len() + CHUNK_OVERHEAD);
    write_chunk(&mut chunk, tag, data);
    chunk
}

/// 从 PNG 字节流中借用出来的一个块
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    pub tag: [u8; 4],
    pub data: &'a [u8],
    /// 文件中存储的校验值
    pub crc: u32,
    /// 块在文件中的起始偏移（长度字段处）
    pub offset: usize,
    /// 完整的块字节，包括长度和校验值
    pub raw: &'a [u8],
}

impl RawChunk<'_> {
    /// 重新计算校验值并与存储值比较
    pub fn crc_matches(&self) -> bool {
        Crc32::new().update(&self.tag).update(self.data).finish() == self.crc
    }

    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }
}

/// 逐块遍历 PNG 字节流，从签名之后开始。
///
/// 每个块前进 `12 + length` 字节。末尾不完整的块会结束遍历而不是越界读取，
/// 通过 [`Chunks::truncated`] 可以得知是否发生了截断。
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    bytes: &'a [u8],
    pos: usize,
    truncated: bool,
}

impl<'a> Chunks<'a> {
    /// `bytes` 是包含签名的完整文件，签名本身不做校验
    pub fn new(bytes: &'a [u8]) -> Chunks<'a> {
        Chunks {
            bytes,
            pos: SIGNATURE.len(),
            truncated: false,
        }
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = RawChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.truncated || self.pos >= self.bytes.len() {
            return None;
        }
        let rest = &self.bytes[self.pos..];
        if rest.len() < CHUNK_OVERHEAD {
            self.truncated = true;
            return None;
        }
        let length = read_u32(rest, 0) as usize;
        let total = match length.checked_add(CHUNK_OVERHEAD) {
            Some(total) if total <= rest.len() => total,
            _ => {
                self.truncated = true;
                return None;
            }
        };
        let chunk = RawChunk {
            tag: [rest[4], rest[5], rest[6], rest[7]],
            data: &rest[8..8 + length],
            crc: read_u32(rest, 8 + length),
            offset: self.pos,
            raw: &rest[..total],
        };
        self.pos += total;
        Some(chunk)
    }
}

/// 调用方保证 `offset + 4 <= bytes.len()`
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}
