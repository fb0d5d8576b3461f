use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::tcp::resolve;

/// Largest datagram the notification socket accepts.
pub const MAX_DATAGRAM_SIZE: usize = 64 * 1024;

/// Connectionless socket the device sends unsolicited notifications to.
///
/// Datagrams are self-delimiting, so unlike the stream side there is no
/// reassembly here: one `recv` is one message.
pub struct DatagramSocket {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl DatagramSocket {
    /// Bind to `host:port`. Port 0 picks an ephemeral port.
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        let label = format!("{host}:{port}");
        let addrs = resolve(host, port)?;

        let socket = UdpSocket::bind(&addrs[..]).map_err(|source| TransportError::Bind {
            addr: label.clone(),
            source,
        })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| TransportError::Bind {
                addr: label,
                source,
            })?;

        info!(%local_addr, "listening for device notifications");

        Ok(Self { socket, local_addr })
    }

    /// Receive one datagram (blocking, subject to the read timeout).
    pub fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let (n, from) = self.socket.recv_from(buf)?;
        debug!(%from, bytes = n, "received datagram");
        Ok((n, from))
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout).map_err(Into::into)
    }

    /// The address this socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl std::fmt::Debug for DatagramSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatagramSocket")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}
