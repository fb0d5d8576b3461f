use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame boundary marker.
pub const END: u8 = 0xC0;

/// Escape introducer.
pub const ESC: u8 = 0xDB;

/// Second byte of an escaped END.
pub const ESC_END: u8 = 0xDC;

/// Second byte of an escaped ESC.
pub const ESC_ESC: u8 = 0xDD;

/// Padding byte inserted before the closing END.
pub const PAD: u8 = 0x00;

/// Default maximum size of one stream delivery: 16 MiB.
pub const DEFAULT_MAX_DELIVERY: usize = 16 * 1024 * 1024;

/// Number of NUL bytes placed between the escaped payload and the closing END.
///
/// The device's own frame reader expects exactly this shape, so it is not a
/// word-alignment pad: a 5-byte escaped payload gets 4 NULs, an 8-byte one gets 3.
pub fn pad_len(escaped_len: usize) -> usize {
    (escaped_len % 4) + 3
}

/// Encode a payload into the wire format, appending to `dst`.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────────────┬──────────────────────┬──────┐
/// │ 0xC0 │ payload, 0xC0 → DB DC    │ NUL × ((n % 4) + 3)  │ 0xC0 │
/// │      │          0xDB → DB DD    │ n = escaped length   │      │
/// └──────┴──────────────────────────┴──────────────────────┴──────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(payload.len() + payload.len() / 8 + 8);
    dst.put_u8(END);

    let mut escaped_len = 0usize;
    for &byte in payload {
        match byte {
            END => {
                dst.put_slice(&[ESC, ESC_END]);
                escaped_len += 2;
            }
            ESC => {
                dst.put_slice(&[ESC, ESC_ESC]);
                escaped_len += 2;
            }
            other => {
                dst.put_u8(other);
                escaped_len += 1;
            }
        }
    }

    dst.put_bytes(PAD, pad_len(escaped_len));
    dst.put_u8(END);
}

/// Encode a payload into a freshly allocated frame.
pub fn encode(payload: &[u8]) -> Bytes {
    let mut dst = BytesMut::new();
    encode_frame(payload, &mut dst);
    dst.freeze()
}

/// Decode one frame back into its payload.
///
/// Strips a single leading and a single trailing END if present, reverses
/// the escaping in one left-to-right pass, then trims the trailing run of
/// NUL padding. NULs before that final run are payload and are kept.
///
/// Padding and trailing payload NULs are indistinguishable on the wire, so
/// a payload that ends in NUL does not survive a round trip: its trailing
/// NULs are trimmed along with the padding.
pub fn decode_frame(frame: &[u8]) -> Result<Bytes> {
    let mut body = frame;
    if let [END, rest @ ..] = body {
        body = rest;
    }
    if let [rest @ .., END] = body {
        body = rest;
    }
    if body.is_empty() {
        return Err(FrameError::Empty);
    }

    let mut out = BytesMut::with_capacity(body.len());
    let mut bytes = body.iter().copied().enumerate();
    while let Some((offset, byte)) = bytes.next() {
        if byte != ESC {
            out.put_u8(byte);
            continue;
        }
        match bytes.next() {
            Some((_, ESC_END)) => out.put_u8(END),
            Some((_, ESC_ESC)) => out.put_u8(ESC),
            Some((_, other)) => {
                return Err(FrameError::InvalidEscape {
                    offset,
                    byte: other,
                })
            }
            None => return Err(FrameError::TruncatedEscape),
        }
    }

    let keep = out.iter().rposition(|&b| b != PAD).map_or(0, |last| last + 1);
    out.truncate(keep);
    Ok(out.freeze())
}

/// Split a received buffer into decoded frame payloads.
///
/// Frames written back to back meet as a doubled END (`0xC0 0xC0`). When the
/// buffer contains one, it is split there and each piece decoded on its own;
/// otherwise the whole buffer is a single frame. Pieces made only of END
/// bytes (idle markers) are skipped.
pub fn split_frames(buffer: &[u8]) -> Result<Vec<Bytes>> {
    if !has_doubled_end(buffer) {
        return Ok(vec![decode_frame(buffer)?]);
    }

    split_on_doubled_end(buffer)
        .into_iter()
        .filter(|piece| piece.iter().any(|&b| b != END))
        .map(decode_frame)
        .collect()
}

fn has_doubled_end(buffer: &[u8]) -> bool {
    buffer.windows(2).any(|pair| pair == [END, END])
}

fn split_on_doubled_end(buffer: &[u8]) -> Vec<&[u8]> {
    let mut pieces = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i + 1 < buffer.len() {
        if buffer[i] == END && buffer[i + 1] == END {
            pieces.push(&buffer[start..i]);
            i += 2;
            start = i;
        } else {
            i += 1;
        }
    }
    pieces.push(&buffer[start..]);
    pieces
}

/// Configuration for framed stream I/O.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum bytes accepted for one delivery (frame or batch). Default: 16 MiB.
    pub max_delivery_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_delivery_size: DEFAULT_MAX_DELIVERY,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
