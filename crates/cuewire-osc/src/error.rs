use bytes::Bytes;
use cuewire_frame::FrameError;

/// Errors raised while building an outbound message.
///
/// These are caller bugs: nothing is written to the wire when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The address has no segments.
    #[error("address must contain at least one segment")]
    EmptyAddress,

    /// An address segment is empty or contains a reserved byte.
    #[error("invalid address segment {segment:?}: {reason}")]
    InvalidSegment {
        segment: String,
        reason: &'static str,
    },

    /// A string argument contains a NUL byte and cannot be OSC-encoded.
    #[error("string argument contains a NUL byte: {0:?}")]
    InvalidString(String),

    /// A value has no OSC argument representation.
    #[error("unsupported argument type: {0}")]
    UnsupportedArgument(String),
}

/// Errors raised while decoding a received buffer.
///
/// Variants that concern the payload carry the raw bytes for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The buffer could not be unframed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The reply is not valid UTF-8.
    #[error("reply is not valid UTF-8 ({} bytes)", .raw.len())]
    InvalidUtf8 { raw: Bytes },

    /// The reply has no `{` starting a structured payload.
    #[error("reply has no structured payload ({} bytes)", .raw.len())]
    MissingPayload { raw: Bytes },

    /// The structured payload is not well-formed JSON.
    #[error("malformed reply payload: {source}")]
    MalformedPayload {
        raw: Bytes,
        source: serde_json::Error,
    },

    /// The address section could not be recovered.
    #[error("invalid address in binary reply: {0}")]
    InvalidAddress(String),

    /// A binary argument block uses a type tag with no known width.
    #[error("unsupported argument type tag {tag:?}")]
    UnsupportedTag { tag: char },

    /// A binary argument block does not match its type tags.
    #[error("argument block is {actual} bytes, tags {tags:?} need {expected}")]
    ArgumentLength {
        tags: String,
        expected: usize,
        actual: usize,
    },
}

impl DecodeError {
    /// The raw bytes that failed to decode, when the error kept them.
    pub fn raw(&self) -> Option<&Bytes> {
        match self {
            Self::InvalidUtf8 { raw }
            | Self::MissingPayload { raw }
            | Self::MalformedPayload { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
