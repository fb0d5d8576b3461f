//! Socket ownership for cuewire.
//!
//! Provides the two sockets the protocol uses:
//! - a connection-oriented TCP stream carrying framed requests and replies
//! - a connectionless UDP socket the device pushes unsolicited notifications to
//!
//! This is the lowest layer of cuewire. Everything else builds on top of
//! the [`CueStream`] type provided here.

pub mod error;
pub mod stream;
pub mod tcp;
pub mod udp;

pub use error::{Result, TransportError};
pub use stream::CueStream;
pub use tcp::TcpTransport;
pub use udp::DatagramSocket;
