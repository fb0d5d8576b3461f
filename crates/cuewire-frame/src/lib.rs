//! SLIP-style framing for OSC messages on a byte stream.
//!
//! Every message travels as one frame:
//! - a leading END byte (`0xC0`)
//! - the payload with END and ESC (`0xDB`) byte-stuffed as two-byte sequences
//! - a NUL pad of `(escaped_len % 4) + 3` bytes the device's reader expects
//! - a trailing END byte
//!
//! Frames sent back to back produce a doubled END, which is how several
//! replies batched into one read are told apart.

pub mod codec;
pub mod error;
pub mod reader;
#[cfg(feature = "async")]
pub mod slip;
pub mod writer;

pub use codec::{
    decode_frame, encode, encode_frame, pad_len, split_frames, FrameConfig,
    DEFAULT_MAX_DELIVERY, END, ESC, ESC_END, ESC_ESC, PAD,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
#[cfg(feature = "async")]
pub use slip::SlipCodec;
pub use writer::FrameWriter;
