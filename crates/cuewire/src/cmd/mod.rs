use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod listen;
pub mod send;
pub mod version;

/// Port the device listens on for OSC over TCP.
pub const DEFAULT_PORT: u16 = 53000;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one command to the device.
    Send(SendArgs),
    /// Print notifications the device pushes over UDP.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Device host name or address.
    #[arg(long, env = "CUEWIRE_HOST", default_value = "localhost")]
    pub host: String,
    /// Device TCP port.
    #[arg(long, env = "CUEWIRE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// OSC address, e.g. /cue/5/start.
    pub address: String,
    /// Arguments in order. Prefix with i:, f: or s: to force a type;
    /// otherwise integer, then float, then string is tried.
    #[arg(allow_negative_numbers = true, conflicts_with = "json_args")]
    pub args: Vec<String>,
    /// Arguments as a JSON array, e.g. '[1, 0.5, "name"]'.
    #[arg(long, value_name = "JSON")]
    pub json_args: Option<String>,
    /// Wait for the reply and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Local address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,
    /// UDP port to receive notifications on.
    #[arg(long, default_value_t = DEFAULT_PORT + 1)]
    pub port: u16,
    /// Exit after printing N notifications.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
