//! APNG 组装器：把一组独立编码的静态 PNG 拼接成一个动画 PNG。

use super::chunk::{write_chunk, ACTL, FCTL, FDAT, IDAT, IEND, SIGNATURE};
use super::frame::{Frame, FrameOptions, ImageHeader};
use super::source::FrameSource;
use crate::error::Error;

/// fcTL 中延迟分母，分子即毫秒数
const DELAY_DEN: u16 = 1000;
/// dispose_op: APNG_DISPOSE_OP_NONE
const DISPOSE_NONE: u8 = 0;
/// blend_op: APNG_BLEND_OP_SOURCE
const BLEND_SOURCE: u8 = 0;

/// 按显示顺序收集帧，`finish` 时一次性输出完整的 APNG。
///
/// 每次编码使用一个新的实例，`finish` 会消耗它。
#[derive(Debug, Default)]
pub struct ApngEncoder {
    frames: Vec<Frame>,
    /// 第一帧的头部，后续帧必须与之一致
    header: Option<ImageHeader>,
    /// 循环次数，0 表示无限循环
    num_plays: u32,
}

impl ApngEncoder {
    pub fn new() -> ApngEncoder {
        ApngEncoder::default()
    }

    /// 设置 acTL 中的循环次数
    pub fn with_plays(mut self, num_plays: u32) -> ApngEncoder {
        self.num_plays = num_plays;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// 从帧来源获取编码后的 PNG 并追加。来源失败时原样返回错误，不会添加帧。
    pub fn add_frame<S: FrameSource + ?Sized>(
        &mut self,
        source: &S,
        options: FrameOptions,
    ) -> Result<(), Error> {
        let png = source.encode_png()?;
        self.add_encoded(png, options)
    }

    /// 追加一张已编码的静态 PNG。
    ///
    /// 没有 IDAT 的帧会被拒绝；第一帧之后的帧，IHDR 必须与第一帧完全一致。
    pub fn add_encoded(&mut self, png: Vec<u8>, options: FrameOptions) -> Result<(), Error> {
        let index = self.frames.len();
        let header = ImageHeader::parse(&png)?;
        let frame = Frame::new(png, options.delay_ms);

        if frame.image_data().next().is_none() {
            log::warn!("rejecting frame {}: no IDAT chunk", index);
            return Err(Error::MissingImageData { index });
        }
        match self.header {
            Some(first) if first != header => {
                log::warn!(
                    "rejecting frame {}: header {}x{} does not match {}x{}",
                    index,
                    header.width,
                    header.height,
                    first.width,
                    first.height
                );
                return Err(Error::HeaderMismatch { index });
            }
            Some(_) => {}
            None => self.header = Some(header),
        }

        log::debug!("added frame {} ({} bytes, {} ms)", index, frame.data.len(), frame.delay_ms);
        self.frames.push(frame);
        Ok(())
    }

    /// 生成最终的 APNG 字节流。没有任何帧时返回空数组。
    pub fn finish(self) -> Vec<u8> {
        let header = match (self.frames.first(), self.header) {
            (Some(_), Some(header)) => header,
            _ => return Vec::new(),
        };

        let total: usize = self.frames.iter().map(|frame| frame.data.len() + 64).sum();
        let mut writer = ContainerWriter::with_capacity(total);
        writer.out.extend_from_slice(&SIGNATURE);
        // 复用第一帧的 IHDR
        writer.out.extend_from_slice(self.frames[0].header_chunk());
        writer.animation_control(frame_count(self.frames.len()), self.num_plays);

        for (index, frame) in self.frames.iter().enumerate() {
            writer.frame_control(&header, frame.delay_ms);
            for data in frame.image_data() {
                if index == 0 {
                    writer.chunk(&IDAT, data);
                } else {
                    writer.frame_data(data);
                }
            }
        }
        writer.chunk(&IEND, &[]);

        log::debug!(
            "assembled {} frames into {} bytes, {} sequence numbers",
            self.frames.len(),
            writer.out.len(),
            writer.sequence
        );
        writer.out
    }
}

/// acTL 的帧数字段只有 4 字节。
///
/// # Panics
///
/// 帧数超过 `u32::MAX` 时会 panic，与 [`write_chunk`] 的长度限制一致。
fn frame_count(frames: usize) -> u32 {
    u32::try_from(frames).expect("frame count exceeds u32::MAX")
}

/// 一次编码过程中的输出缓冲区和共享序号。
///
/// fcTL 与 fdAT 共用同一个序号，从 0 开始，每使用一次加 1。
struct ContainerWriter {
    out: Vec<u8>,
    sequence: u32,
}

impl ContainerWriter {
    fn with_capacity(capacity: usize) -> ContainerWriter {
        ContainerWriter {
            out: Vec::with_capacity(capacity),
            sequence: 0,
        }
    }

    fn next_sequence(&mut self) -> u32 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    fn chunk(&mut self, tag: &[u8; 4], data: &[u8]) {
        log::trace!(
            "{} chunk, {} bytes",
            String::from_utf8_lossy(tag),
            data.len()
        );
        write_chunk(&mut self.out, tag, data);
    }

    fn animation_control(&mut self, num_frames: u32, num_plays: u32) {
        let mut data = [0u8; 8];
        data[0..4].copy_from_slice(&num_frames.to_be_bytes());
        data[4..8].copy_from_slice(&num_plays.to_be_bytes());
        self.chunk(&ACTL, &data);
    }

    fn frame_control(&mut self, header: &ImageHeader, delay_ms: u16) {
        let sequence = self.next_sequence();
        let mut data = [0u8; 26];
        data[0..4].copy_from_slice(&sequence.to_be_bytes());
        data[4..8].copy_from_slice(&header.width.to_be_bytes());
        data[8..12].copy_from_slice(&header.height.to_be_bytes());
        // x_offset 与 y_offset 均为 0
        data[20..22].copy_from_slice(&delay_ms.to_be_bytes());
        data[22..24].copy_from_slice(&DELAY_DEN.to_be_bytes());
        data[24] = DISPOSE_NONE;
        data[25] = BLEND_SOURCE;
        self.chunk(&FCTL, &data);
    }

    fn frame_data(&mut self, data: &[u8]) {
        let sequence = self.next_sequence();
        let mut payload = Vec::with_capacity(data.len() + 4);
        payload.extend_from_slice(&sequence.to_be_bytes());
        payload.extend_from_slice(data);
        self.chunk(&FDAT, &payload);
    }
}
