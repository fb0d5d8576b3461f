use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::CueStream;

/// Connection-oriented transport to the device.
///
/// There is no retry here: a failed connect is reported once and the caller
/// decides whether to try again.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to `host:port` (blocking).
    pub fn connect(host: &str, port: u16) -> Result<CueStream> {
        Self::connect_with_timeout(host, port, None)
    }

    /// Connect to `host:port`, bounding each address attempt by `timeout`.
    ///
    /// Every resolved address is tried in order; the last failure is returned.
    pub fn connect_with_timeout(
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<CueStream> {
        let label = format!("{host}:{port}");
        let addrs = resolve(host, port)?;

        let mut last_err = None;
        for addr in &addrs {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    debug!(%addr, "connected to device");
                    return Ok(CueStream::from_tcp(stream));
                }
                Err(err) => {
                    debug!(%addr, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            addr: label,
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses to try")
            }),
        })
    }
}

pub(crate) fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    let label = format!("{host}:{port}");
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            addr: label.clone(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(TransportError::Resolve {
            addr: label,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "host resolved to no addresses",
            ),
        });
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn connect_and_exchange_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            conn.read_exact(&mut buf).unwrap();
            conn.write_all(&buf).unwrap();
        });

        let mut stream = TcpTransport::connect("127.0.0.1", port).unwrap();
        stream.write_all(b"hello").unwrap();
        let mut echoed = [0u8; 5];
        stream.read_exact(&mut echoed).unwrap();
        assert_eq!(&echoed, b"hello");
        assert_eq!(stream.peer_addr().unwrap().port(), port);

        handle.join().unwrap();
    }

    #[test]
    fn connect_refused_is_connect_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = TcpTransport::connect("127.0.0.1", port);
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn connect_with_timeout_succeeds_on_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream =
            TcpTransport::connect_with_timeout("127.0.0.1", port, Some(Duration::from_secs(1)))
                .unwrap();
        let _accepted = listener.accept().unwrap();
        assert!(stream.local_addr().is_ok());
    }

    #[test]
    fn shutdown_wakes_blocked_reader() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = TcpTransport::connect("127.0.0.1", port).unwrap();
        let _accepted = listener.accept().unwrap();
        let mut reader = stream.try_clone().unwrap();

        let blocked = std::thread::spawn(move || {
            let mut buf = [0u8; 8];
            reader.read(&mut buf)
        });

        std::thread::sleep(Duration::from_millis(20));
        stream.shutdown().unwrap();
        let read = blocked.join().unwrap().unwrap();
        assert_eq!(read, 0);
    }

    #[test]
    fn debug_names_transport_type() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let stream = TcpTransport::connect("127.0.0.1", port).unwrap();
        assert!(format!("{stream:?}").contains("tcp"));
    }
}
