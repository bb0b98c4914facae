use super::chunk::{read_u32, Chunks, IDAT, IHDR, SIGNATURE};
use crate::error::Error;

/// IHDR 数据段固定 13 字节
pub const IHDR_DATA_LEN: u32 = 13;

/// 每帧的显示参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    /// 显示时长，毫秒。写入 fcTL 的延迟分子，分母固定为 1000
    pub delay_ms: u16,
}

impl FrameOptions {
    pub fn new(delay_ms: u16) -> FrameOptions {
        FrameOptions { delay_ms }
    }
}

impl Default for FrameOptions {
    fn default() -> Self {
        FrameOptions { delay_ms: 100 }
    }
}

/// 一帧已编码的静态 PNG
#[derive(Debug)]
pub struct Frame {
    /// 完整的单图 PNG：签名、IHDR、若干 IDAT、IEND
    pub data: Vec<u8>,
    pub delay_ms: u16,
}

impl Frame {
    pub fn new(data: Vec<u8>, delay_ms: u16) -> Frame {
        Frame { data, delay_ms }
    }

    /// 按原始顺序返回所有 IDAT 块的数据
    pub fn image_data(&self) -> impl Iterator<Item = &[u8]> {
        Chunks::new(&self.data)
            .filter(|chunk| chunk.tag == IDAT)
            .map(|chunk| chunk.data)
    }

    /// 帧自身的 IHDR 块，包括长度和校验值
    pub fn header_chunk(&self) -> &[u8] {
        let length = read_u32(&self.data, SIGNATURE.len()) as usize;
        &self.data[SIGNATURE.len()..SIGNATURE.len() + length + 12]
    }
}

/// 从 IHDR 中解析出的固定布局字段。
///
/// 在文件中的偏移：宽度位于 16..20，高度位于 20..24，
/// 即 IHDR 数据段的前 8 个字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub compression: u8,
    pub filter: u8,
    pub interlace: u8,
}

impl ImageHeader {
    /// 解析单图 PNG 的头部。
    ///
    /// 检查签名，要求第一个块是 IHDR 且声明长度为 13，之后才读取固定偏移处的字段。
    pub fn parse(png: &[u8]) -> Result<ImageHeader, Error> {
        if !png.starts_with(&SIGNATURE) {
            return Err(Error::InvalidFrame("missing PNG signature"));
        }
        let chunk = Chunks::new(png)
            .next()
            .ok_or(Error::InvalidFrame("truncated header chunk"))?;
        if chunk.tag != IHDR {
            return Err(Error::InvalidFrame("first chunk is not IHDR"));
        }
        if chunk.data.len() != IHDR_DATA_LEN as usize {
            return Err(Error::InvalidFrame("IHDR length is not 13"));
        }
        Ok(ImageHeader::from_data(chunk.data))
    }

    /// `data` 是 13 字节的 IHDR 数据段
    pub(crate) fn from_data(data: &[u8]) -> ImageHeader {
        ImageHeader {
            width: read_u32(data, 0),
            height: read_u32(data, 4),
            bit_depth: data[8],
            color_type: data[9],
            compression: data[10],
            filter: data[11],
            interlace: data[12],
        }
    }
}
