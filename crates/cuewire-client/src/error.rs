/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (connect, bind, socket I/O).
    #[error("transport error: {0}")]
    Transport(#[from] cuewire_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] cuewire_frame::FrameError),

    /// The command could not be encoded; nothing was sent.
    #[error("encode error: {0}")]
    Encode(#[from] cuewire_osc::EncodeError),

    /// A received delivery could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] cuewire_osc::DecodeError),

    /// No reply arrived in time.
    #[error("no reply within {0:?}")]
    Timeout(std::time::Duration),

    /// The device closed the connection or the reader stopped.
    #[error("device disconnected: {0}")]
    Disconnected(String),

    /// The client was shut down.
    #[error("client shut down")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ClientError>;
