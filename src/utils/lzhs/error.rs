use thiserror::Error;

/// Failures of the boot image codec. Offsets are byte positions in the stream
/// being decoded when the problem was noticed.
#[derive(Debug, Error)]
pub enum LzhsError {
    #[error("stream ends in the middle of a token at offset {offset}")]
    TruncatedStream { offset: usize },

    #[error("no codebook entry matches the bits at offset {offset}")]
    InvalidCode { offset: usize },

    #[error("token at offset {offset} cannot be represented: {reason}")]
    InvalidToken { offset: usize, reason: &'static str },

    #[error("decoded {actual} bytes, header declares {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("checksum mismatch, header: 0x{expected:02x}, calculated: 0x{actual:02x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("invalid boot image header: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for LzhsError {
    fn from(e: binrw::Error) -> Self {
        LzhsError::InvalidHeader(e.to_string())
    }
}
