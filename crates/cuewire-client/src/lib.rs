//! Connection management for a show-control device.
//!
//! This is the "just works" layer. Connect to the device, send commands,
//! and wait for their JSON replies; or listen for the notifications it
//! pushes over UDP.

pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod server;

pub use client::Client;
pub use config::ClientConfig;
pub use connector::{connect, connect_with_config};
pub use cuewire_osc::{Address, Argument, DecodedReply, OscMessage};
pub use error::{ClientError, Result};
pub use server::Server;
