//! OSC command encoding and reply decoding.
//!
//! Requests and replies are deliberately asymmetric:
//! - requests are binary OSC 1.0 messages (address, type tags, big-endian
//!   arguments) wrapped in a SLIP frame
//! - replies carry an address label followed directly by a JSON document
//!
//! [`legacy_decode_binary`] covers the older binary reply shape that carried
//! numeric arguments instead of JSON.

pub mod address;
pub mod argument;
pub mod error;
pub mod legacy;
pub mod message;
pub mod reply;

pub use address::Address;
pub use argument::Argument;
pub use error::{DecodeError, EncodeError};
pub use legacy::{legacy_decode_binary, LegacyCommand, Number};
pub use message::{build, OscMessage};
pub use reply::{decode_datagram, decode_reply, parse_reply_payload, DecodedReply, ReplyEnvelope};
