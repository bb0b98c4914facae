use png::{BitDepth, ColorType, Compression, Decoder, Encoder, Transformations};
use rgb::{ComponentBytes, FromSlice, RGBA8};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::Error;

/// 能够把自身编码为单张静态 PNG 的帧来源
pub trait FrameSource {
    fn encode_png(&self) -> Result<Vec<u8>, Error>;
}

impl<T: FrameSource + ?Sized> FrameSource for &T {
    fn encode_png(&self) -> Result<Vec<u8>, Error> {
        (**self).encode_png()
    }
}

/// 已经编码好的 PNG，原样交给组装器
#[derive(Debug, Clone)]
pub struct EncodedPng(pub Vec<u8>);

impl FrameSource for EncodedPng {
    fn encode_png(&self) -> Result<Vec<u8>, Error> {
        Ok(self.0.clone())
    }
}

/// 8 位 RGBA 位图
#[derive(Debug, Clone)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<RGBA8>,
    /// png编码压缩等级
    compression: Compression,
}

impl RgbaFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<RGBA8>) -> Result<RgbaFrame, Error> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(RgbaFrame {
            width,
            height,
            pixels,
            compression: Compression::Default,
        })
    }

    pub fn with_compression(mut self, compression: Compression) -> RgbaFrame {
        self.compression = compression;
        self
    }

    /// 读取并解码一个 PNG 文件
    pub fn open(path: &Path) -> Result<RgbaFrame, Error> {
        RgbaFrame::read(BufReader::new(File::open(path)?))
    }

    pub fn decode(bytes: &[u8]) -> Result<RgbaFrame, Error> {
        RgbaFrame::read(bytes)
    }

    /// 解码任意静态 PNG，统一转换为 8 位 RGBA。
    ///
    /// 调色板、低位深和 tRNS 由解码器展开，16 位深度截为 8 位。
    fn read<R: Read>(reader: R) -> Result<RgbaFrame, Error> {
        let mut decoder = Decoder::new(reader);
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let bytes = &buf[..info.buffer_size()];

        let pixels: Vec<RGBA8> = match info.color_type {
            ColorType::Rgba => bytes.as_rgba().to_vec(),
            ColorType::Rgb => bytes
                .as_rgb()
                .iter()
                .map(|p| RGBA8::new(p.r, p.g, p.b, 255))
                .collect(),
            ColorType::GrayscaleAlpha => bytes
                .chunks_exact(2)
                .map(|ga| RGBA8::new(ga[0], ga[0], ga[0], ga[1]))
                .collect(),
            ColorType::Grayscale => bytes.iter().map(|&g| RGBA8::new(g, g, g, 255)).collect(),
            ColorType::Indexed => {
                return Err(Error::InvalidFrame("indexed color was not expanded"));
            }
        };

        log::trace!(
            "decoded {}x{} {:?} still into {} RGBA pixels",
            info.width,
            info.height,
            info.color_type,
            pixels.len()
        );
        RgbaFrame::new(info.width, info.height, pixels)
    }
}

impl FrameSource for RgbaFrame {
    fn encode_png(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            encoder.set_compression(self.compression);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.pixels.as_bytes())?;
            writer.finish()?;
        }
        Ok(out)
    }
}
