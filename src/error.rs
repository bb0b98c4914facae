use thiserror::Error;

/// Errors produced while acquiring, assembling or parsing APNG data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The frame source failed to produce a PNG encoding
    #[error("failed to encode frame: {0}")]
    Encoding(#[from] png::EncodingError),

    /// An input still could not be decoded
    #[error("failed to decode frame: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The still is not a usable single-image PNG container.
    #[error("invalid frame container: {0}")]
    InvalidFrame(&'static str),

    /// Congratulations, the external codec produced a PNG without pixels
    #[error("frame {index} contains no IDAT chunk")]
    MissingImageData { index: usize },

    /// A later frame declares a different header than frame 0.
    #[error("frame {index} header does not match the first frame")]
    HeaderMismatch { index: usize },

    #[error("expected {expected} pixels, got {actual}")]
    PixelCount { expected: usize, actual: usize },

    #[error("not a PNG")]
    NotPng,

    #[error("not an animated PNG")]
    NotAnimated,

    /// Stored checksum of a chunk differs from the computed one.
    #[error("checksum mismatch in {tag} chunk at offset {offset}")]
    ChecksumMismatch { tag: String, offset: usize },
}
