//! SLIP-framed OSC transport for show-control devices.
//!
//! cuewire talks to a cue-based playback device over TCP: commands go out
//! as binary OSC messages wrapped in SLIP-style frames, replies come back
//! as an address label followed by a JSON document.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP stream and UDP notification sockets
//! - [`frame`]: byte-stuffed framing, stream reader and writer
//! - [`osc`]: command encoding and reply decoding
//! - [`client`]: request/response client and notification listener (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use cuewire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use cuewire_frame::*;
}

/// Re-export message types.
pub mod osc {
    pub use cuewire_osc::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use cuewire_client::*;
}

#[cfg(feature = "client")]
pub use cuewire_client::{connect, Client};
