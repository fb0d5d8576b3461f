//! Streaming frame codec for `tokio_util::codec`.
//!
//! Unlike [`crate::FrameReader`], which hands back whole deliveries, this
//! codec yields one decoded payload per frame and keeps any partial frame
//! buffered until the rest arrives.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, DEFAULT_MAX_DELIVERY, END};
use crate::error::FrameError;

/// SLIP frame codec for framed async streams.
#[derive(Debug, Clone)]
pub struct SlipCodec {
    max_frame_size: usize,
}

impl SlipCodec {
    /// Create a codec with the default 16 MiB frame limit.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_DELIVERY)
    }

    /// Create a codec with an explicit frame limit.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Maximum encoded frame size accepted by the decoder.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for SlipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for SlipCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let idle = src.iter().take_while(|&&b| b == END).count();
        src.advance(idle);
        if src.is_empty() {
            return Ok(None);
        }

        match src.iter().position(|&b| b == END) {
            Some(close) => {
                let frame = src.split_to(close + 1);
                decode_frame(&frame).map(Some)
            }
            None if src.len() > self.max_frame_size => Err(FrameError::PayloadTooLarge {
                size: src.len(),
                max: self.max_frame_size,
            }),
            None => Ok(None),
        }
    }
}

impl Encoder<&[u8]> for SlipCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(item, dst);
        Ok(())
    }
}

impl Encoder<Bytes> for SlipCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst);
        Ok(())
    }
}
