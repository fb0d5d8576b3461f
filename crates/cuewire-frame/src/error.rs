/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An ESC byte was followed by something other than ESC_END or ESC_ESC.
    #[error("invalid escape sequence at offset {offset} (0xDB followed by {byte:#04x})")]
    InvalidEscape { offset: usize, byte: u8 },

    /// The frame ended directly after an ESC byte.
    #[error("frame ends in the middle of an escape sequence")]
    TruncatedEscape,

    /// Nothing was left once the boundary markers were stripped.
    #[error("empty frame")]
    Empty,

    /// The delivery exceeds the configured maximum size.
    #[error("delivery too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream failed after part of a frame was already written.
    #[error("frame write failed after {written} of {total} bytes: {source}")]
    PartialWrite {
        written: usize,
        total: usize,
        source: std::io::Error,
    },

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
