use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use cuewire_transport::CueStream;
use tracing::trace;

use crate::codec::{split_frames, FrameConfig, END};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Reads deliveries of whole frames from any `Read` stream.
///
/// A delivery is whatever the peer had written by the time a frame closed:
/// usually one frame, sometimes several batched back to back. Reads continue
/// until the buffer ends on a closing END, so a frame split across segments
/// is still returned whole.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete delivery (blocking), still framed.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; any
    /// partial frame read before EOF is discarded.
    pub fn read_delivery(&mut self) -> Result<Bytes> {
        loop {
            if delivery_complete(&self.buf) {
                let delivery = self.buf.split().freeze();
                trace!(bytes = delivery.len(), "read delivery");
                return Ok(delivery);
            }

            if self.buf.len() >= self.config.max_delivery_size {
                let size = self.buf.len();
                self.buf.clear();
                return Err(FrameError::PayloadTooLarge {
                    size,
                    max: self.config.max_delivery_size,
                });
            }

            let want = READ_CHUNK_SIZE.min(self.config.max_delivery_size - self.buf.len());
            let mut chunk = vec![0u8; want];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.buf.clear();
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read the next delivery and split it into decoded frame payloads.
    pub fn read_frames(&mut self) -> Result<Vec<Bytes>> {
        let delivery = self.read_delivery()?;
        split_frames(&delivery)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<CueStream> {
    /// Create a frame reader for `CueStream` and apply read timeout from config.
    pub fn with_config_tcp(inner: CueStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

/// True once the buffer holds frame content and ends on a closing END.
fn delivery_complete(buf: &[u8]) -> bool {
    buf.last() == Some(&END) && buf.iter().any(|&b| b != END)
}

pub(crate) fn transport_to_frame_error(err: cuewire_transport::TransportError) -> FrameError {
    match err {
        cuewire_transport::TransportError::Io(io) => FrameError::Io(io),
        cuewire_transport::TransportError::Bind { source, .. }
        | cuewire_transport::TransportError::Connect { source, .. }
        | cuewire_transport::TransportError::Resolve { source, .. } => FrameError::Io(source),
    }
}
