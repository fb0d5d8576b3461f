use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use cuewire_transport::CueStream;
use tracing::trace;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
///
/// The whole frame is encoded into an owned buffer before the first byte is
/// written, so an encoding failure never leaves a partial frame on the wire.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Frame and send a payload (blocking).
    ///
    /// A failure after some bytes reached the stream is reported as
    /// [`FrameError::PartialWrite`]; the peer's framing is out of sync from
    /// then on and the stream should be closed.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_delivery_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_delivery_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf);

        let total = self.buf.len();
        let mut offset = 0usize;
        while offset < total {
            let err = match self.inner.write(&self.buf[offset..]) {
                Ok(0) => std::io::Error::from(ErrorKind::WriteZero),
                Ok(n) => {
                    offset += n;
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => err,
            };
            return Err(match offset {
                0 if err.kind() == ErrorKind::WriteZero => FrameError::ConnectionClosed,
                0 => FrameError::Io(err),
                written => FrameError::PartialWrite {
                    written,
                    total,
                    source: err,
                },
            });
        }
        trace!(bytes = self.buf.len(), "wrote frame");

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<CueStream> {
    /// Create a frame writer for `CueStream` and apply write timeout from config.
    pub fn with_config_tcp(inner: CueStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
