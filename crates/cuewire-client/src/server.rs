use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::mpsc::Sender;
use std::time::Duration;

use cuewire_osc::{decode_datagram, DecodedReply};
use cuewire_transport::udp::MAX_DATAGRAM_SIZE;
use cuewire_transport::{DatagramSocket, TransportError};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Receives the notifications a device pushes over UDP.
///
/// Each datagram is one unframed message; it is decoded the same way as a
/// stream reply but without SLIP unescaping.
#[derive(Debug)]
pub struct Server {
    socket: DatagramSocket,
    read_timeout: Option<Duration>,
}

impl Server {
    /// Bind to `host:port` and block indefinitely on receive.
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        Self::bind_with_timeout(host, port, None)
    }

    /// Bind to `host:port`; receives give up after `read_timeout`.
    pub fn bind_with_timeout(host: &str, port: u16, read_timeout: Option<Duration>) -> Result<Self> {
        let socket = DatagramSocket::bind(host, port)?;
        socket.set_read_timeout(read_timeout)?;
        Ok(Self {
            socket,
            read_timeout,
        })
    }

    /// Wait for the next notification and decode it.
    pub fn receive(&self) -> Result<DecodedReply> {
        self.receive_from().map(|(reply, _)| reply)
    }

    /// Like [`Server::receive`], also returning the sender's address.
    pub fn receive_from(&self) -> Result<(DecodedReply, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let (n, from) = match self.socket.recv(&mut buf) {
            Ok(received) => received,
            Err(TransportError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                return Err(ClientError::Timeout(self.read_timeout.unwrap_or_default()));
            }
            Err(err) => return Err(err.into()),
        };

        let reply = decode_datagram(&buf[..n]).map_err(|err| {
            warn!(%from, error = %err, "undecodable notification");
            ClientError::Decode(err)
        })?;
        debug!(%from, bytes = n, "notification decoded");
        Ok((reply, from))
    }

    /// Move the next notification onto a caller-owned queue.
    pub fn receive_to(&self, queue: &Sender<DecodedReply>) -> Result<()> {
        let reply = self.receive()?;
        queue
            .send(reply)
            .map_err(|_| ClientError::Disconnected("queue receiver dropped".to_string()))
    }

    /// The address the socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.socket.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::net::UdpSocket;
    use std::sync::mpsc;

    use serde_json::json;

    use super::*;

    fn bound() -> Server {
        Server::bind_with_timeout("127.0.0.1", 0, Some(Duration::from_secs(2)))
            .expect("server should bind")
    }

    fn push(server: &Server, datagram: &[u8]) {
        let device = UdpSocket::bind("127.0.0.1:0").expect("device should bind");
        device
            .send_to(datagram, server.local_addr())
            .expect("device should send");
    }

    #[test]
    fn receives_and_decodes_notification() {
        let server = bound();
        push(&server, b"/update/cue_id/C1\0\0\0,\0\0\0{\"data\":\"C1\"}\0\0");

        let reply = server.receive().expect("receive should succeed");
        assert_eq!(reply.data(), Some(&json!("C1")));
    }

    #[test]
    fn reports_sender_address() {
        let server = bound();
        let device = UdpSocket::bind("127.0.0.1:0").expect("device should bind");
        device
            .send_to(br#"/update{"status":"ok"}"#, server.local_addr())
            .expect("device should send");

        let (reply, from) = server.receive_from().expect("receive should succeed");
        assert_eq!(reply.status(), Some("ok"));
        assert_eq!(from, device.local_addr().expect("device addr"));
    }

    #[test]
    fn escape_bytes_are_not_unescaped() {
        let server = bound();
        let mut datagram = b"/update{\"data\":\"".to_vec();
        datagram.extend_from_slice(&[0xDB, 0xDC]);
        datagram.extend_from_slice(b"\"}");
        push(&server, &datagram);

        // Raw 0xDB 0xDC is not valid UTF-8, so the payload is reported as-is.
        let err = server.receive().unwrap_err();
        match err {
            ClientError::Decode(decode) => {
                assert_eq!(decode.raw().expect("raw bytes").as_ref(), datagram.as_slice());
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_datagram_is_decode_error() {
        let server = bound();
        push(&server, b"/update/plain\0\0\0");

        assert!(matches!(server.receive(), Err(ClientError::Decode(_))));
    }

    #[test]
    fn idle_socket_times_out() {
        let server = Server::bind_with_timeout("127.0.0.1", 0, Some(Duration::from_millis(100)))
            .expect("server should bind");

        assert!(matches!(server.receive(), Err(ClientError::Timeout(_))));
    }

    #[test]
    fn receive_to_moves_notification_onto_queue() {
        let server = bound();
        push(&server, br#"/update/workspace/W{"data":[1,2]}"#);

        let (tx, rx) = mpsc::channel();
        server.receive_to(&tx).expect("receive_to should succeed");
        assert_eq!(
            rx.try_recv().expect("queue should hold it").data(),
            Some(&json!([1, 2]))
        );
    }
}
