//! 解析 APNG，把每一帧还原成可以独立显示的静态 PNG。

use super::chunk::{
    read_u16, read_u32, write_chunk, Chunks, ACTL, FCTL, FDAT, IDAT, IEND, IHDR, SIGNATURE,
};
use crate::error::Error;

/// dispose_op: APNG_DISPOSE_OP_BACKGROUND
const DISPOSE_BACKGROUND: u8 = 1;
/// dispose_op: APNG_DISPOSE_OP_PREVIOUS
const DISPOSE_PREVIOUS: u8 = 2;

/// 解析得到的动画
#[derive(Debug, Clone, Default)]
pub struct Animation {
    /// 画布尺寸
    pub width: u32,
    pub height: u32,
    /// 0 表示无限循环
    pub num_plays: u32,
    /// 所有帧显示时长之和，毫秒。单帧最长约 65535 秒，累加使用 u64
    pub play_time_ms: u64,
    pub frames: Vec<ParsedFrame>,
    /// fcTL 与 fdAT 的序号，按出现顺序
    sequence_numbers: Vec<u32>,
    /// IHDR 数据段
    header: Vec<u8>,
    /// 除 IHDR、动画控制块、图像数据和 IEND 之外的块，原样保留
    extra_chunks: Vec<Vec<u8>>,
}

impl Animation {
    pub fn sequence_numbers(&self) -> &[u32] {
        &self.sequence_numbers
    }
}

/// 动画中的一帧
#[derive(Debug, Clone, Default)]
pub struct ParsedFrame {
    pub x_offset: u32,
    pub y_offset: u32,
    pub width: u32,
    pub height: u32,
    pub delay_num: u16,
    pub delay_den: u16,
    pub dispose_op: u8,
    pub blend_op: u8,
    /// 按顺序排列的图像数据（已去掉 fdAT 的序号）
    pub data: Vec<Vec<u8>>,
}

impl ParsedFrame {
    /// 显示时长，毫秒。
    ///
    /// 分母为 0 时按 100 处理；不超过 10ms 的延迟按 100ms 播放，与浏览器一致。
    pub fn delay_ms(&self) -> u32 {
        let den = if self.delay_den == 0 {
            100
        } else {
            self.delay_den as u32
        };
        let delay = 1000 * self.delay_num as u32 / den;
        if delay <= 10 {
            100
        } else {
            delay
        }
    }

    /// 重新组装为独立的静态 PNG：IHDR 中的宽高替换为帧尺寸
    pub fn to_png(&self, animation: &Animation) -> Vec<u8> {
        let mut header = animation.header.clone();
        header[0..4].copy_from_slice(&self.width.to_be_bytes());
        header[4..8].copy_from_slice(&self.height.to_be_bytes());

        let mut png = SIGNATURE.to_vec();
        write_chunk(&mut png, &IHDR, &header);
        for chunk in &animation.extra_chunks {
            png.extend_from_slice(chunk);
        }
        for part in &self.data {
            write_chunk(&mut png, &IDAT, part);
        }
        write_chunk(&mut png, &IEND, &[]);
        png
    }
}

/// 解析 APNG 字节流
pub fn parse(bytes: &[u8]) -> Result<Animation, Error> {
    if !bytes.starts_with(&SIGNATURE) {
        return Err(Error::NotPng);
    }
    if !Chunks::new(bytes)
        .take_while(|chunk| chunk.tag != IEND)
        .any(|chunk| chunk.tag == ACTL)
    {
        return Err(Error::NotAnimated);
    }

    let mut animation = Animation::default();
    let mut frame: Option<ParsedFrame> = None;
    let mut chunks = Chunks::new(bytes);

    for chunk in chunks.by_ref() {
        if !chunk.crc_matches() {
            return Err(Error::ChecksumMismatch {
                tag: chunk.tag_str(),
                offset: chunk.offset,
            });
        }
        match chunk.tag {
            IHDR => {
                if chunk.data.len() != 13 {
                    return Err(Error::InvalidFrame("IHDR length is not 13"));
                }
                animation.width = read_u32(chunk.data, 0);
                animation.height = read_u32(chunk.data, 4);
                animation.header = chunk.data.to_vec();
            }
            ACTL => {
                if chunk.data.len() < 8 {
                    return Err(Error::InvalidFrame("acTL too short"));
                }
                animation.num_plays = read_u32(chunk.data, 4);
            }
            FCTL => {
                let data = chunk.data;
                if data.len() < 26 {
                    return Err(Error::InvalidFrame("fcTL too short"));
                }
                animation.sequence_numbers.push(read_u32(data, 0));
                if let Some(previous) = frame.take() {
                    animation.frames.push(previous);
                }
                let mut next = ParsedFrame {
                    width: read_u32(data, 4),
                    height: read_u32(data, 8),
                    x_offset: read_u32(data, 12),
                    y_offset: read_u32(data, 16),
                    delay_num: read_u16(data, 20),
                    delay_den: read_u16(data, 22),
                    dispose_op: data[24],
                    blend_op: data[25],
                    data: Vec::new(),
                };
                if animation.frames.is_empty() && next.dispose_op == DISPOSE_PREVIOUS {
                    next.dispose_op = DISPOSE_BACKGROUND;
                }
                animation.play_time_ms += u64::from(next.delay_ms());
                frame = Some(next);
            }
            FDAT => {
                if chunk.data.len() < 4 {
                    return Err(Error::InvalidFrame("fdAT too short"));
                }
                animation.sequence_numbers.push(read_u32(chunk.data, 0));
                if let Some(frame) = frame.as_mut() {
                    frame.data.push(chunk.data[4..].to_vec());
                }
            }
            IDAT => {
                // 没有 fcTL 的 IDAT 是默认图像，不属于动画
                if let Some(frame) = frame.as_mut() {
                    frame.data.push(chunk.data.to_vec());
                }
            }
            IEND => break,
            _ => animation.extra_chunks.push(chunk.raw.to_vec()),
        }
    }
    if chunks.truncated() {
        return Err(Error::InvalidFrame("truncated chunk"));
    }
    if let Some(frame) = frame {
        animation.frames.push(frame);
    }
    if animation.frames.is_empty() || animation.header.is_empty() {
        return Err(Error::NotAnimated);
    }

    log::debug!(
        "parsed {}x{} animation with {} frames, {} ms",
        animation.width,
        animation.height,
        animation.frames.len(),
        animation.play_time_ms
    );
    Ok(animation)
}
