use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SmartCropError {
    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("pixel buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),
}
