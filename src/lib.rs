//! 将一组静态 PNG 帧组装为 APNG 动画，以及反向解析。

pub mod apng;
mod error;

pub use apng::{ApngEncoder, FrameOptions, FrameSource, RgbaFrame};
pub use error::Error;
