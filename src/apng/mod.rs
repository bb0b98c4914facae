//! APNG 编码与解析。
//!
//! - [`ApngEncoder`]：把独立编码的静态 PNG 按顺序组装成动画 PNG。
//! - [`parse`]：把动画 PNG 拆回每一帧的静态 PNG。
//! - [`make_chunk`] / [`crc32`]：块组装和校验值计算。

mod chunk;
mod crc;
mod encoder;
mod frame;
mod parser;
mod source;

pub use chunk::{make_chunk, write_chunk, Chunks, RawChunk, SIGNATURE};
pub use crc::{crc32, Crc32};
pub use encoder::ApngEncoder;
pub use frame::{Frame, FrameOptions, ImageHeader};
pub use parser::{parse, Animation, ParsedFrame};
pub use source::{EncodedPng, FrameSource, RgbaFrame};
