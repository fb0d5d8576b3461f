use cuewire_transport::TcpTransport;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;

/// Connect to a device with the default configuration.
pub fn connect(host: &str, port: u16) -> Result<Client> {
    connect_with_config(host, port, ClientConfig::default())
}

/// Connect with explicit configuration.
pub fn connect_with_config(host: &str, port: u16, config: ClientConfig) -> Result<Client> {
    let stream = TcpTransport::connect_with_timeout(host, port, config.connect_timeout)?;
    Client::from_stream(stream, config)
}
