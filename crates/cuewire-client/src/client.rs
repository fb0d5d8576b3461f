use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{
    self, Receiver, RecvTimeoutError, Sender, SyncSender, TryRecvError, TrySendError,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use cuewire_frame::{FrameConfig, FrameError, FrameReader, FrameWriter};
use cuewire_osc::{decode_reply, Address, Argument, DecodedReply, OscMessage};
use cuewire_transport::{CueStream, TransportError};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

type Inbox = Receiver<Result<DecodedReply>>;

/// A connected session with the device.
///
/// One reader thread owns the socket's read side and forwards every decoded
/// delivery over a bounded channel; deliveries arriving while it is full are
/// dropped with a warning. The inbox lock guards only that channel, so
/// `call`, `receive` and `receive_to` never hold a lock across a socket
/// read. Holding the inbox for the whole of `call` keeps request and reply
/// paired: the protocol has no request ids, only program order.
pub struct Client {
    writer: Mutex<FrameWriter<CueStream>>,
    inbox: Mutex<Inbox>,
    control: CueStream,
    cancelled: Arc<AtomicBool>,
    severed: AtomicBool,
    reader_thread: Option<JoinHandle<()>>,
    peer_addr: SocketAddr,
    config: ClientConfig,
}

impl Client {
    /// Take ownership of a connected stream and start its reader thread.
    pub fn from_stream(stream: CueStream, config: ClientConfig) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        let reader_stream = stream.try_clone()?;
        let control = stream.try_clone()?;

        let frame_config = FrameConfig {
            max_delivery_size: config.max_delivery_size,
            read_timeout: None,
            write_timeout: config.write_timeout,
        };
        let reader = FrameReader::with_config_tcp(reader_stream, frame_config.clone())?;
        let writer = FrameWriter::with_config_tcp(stream, frame_config)?;

        let (tx, rx) = mpsc::sync_channel(config.inbox_capacity.max(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let reader_thread = std::thread::Builder::new()
            .name(format!("cuewire-reader-{peer_addr}"))
            .spawn({
                let cancelled = Arc::clone(&cancelled);
                move || reader_loop(reader, tx, cancelled)
            })
            .map_err(TransportError::Io)?;

        info!(%peer_addr, "client connected");

        Ok(Self {
            writer: Mutex::new(writer),
            inbox: Mutex::new(rx),
            control,
            cancelled,
            severed: AtomicBool::new(false),
            reader_thread: Some(reader_thread),
            peer_addr,
            config,
        })
    }

    /// Send a command without waiting for its reply.
    pub fn send(&self, address: &Address, args: &[Argument]) -> Result<()> {
        let message = OscMessage::new(address.clone()).with_args(args.iter().cloned());
        self.send_message(&message)
    }

    /// Send a prepared message without waiting for its reply.
    ///
    /// The message is fully encoded before the writer is touched, so an
    /// encode failure never puts a partial frame on the wire. A write that
    /// fails midway closes the connection; later sends fail with
    /// [`ClientError::Disconnected`].
    pub fn send_message(&self, message: &OscMessage) -> Result<()> {
        if self.is_shut_down() {
            return Err(ClientError::Cancelled);
        }
        if self.severed.load(Ordering::SeqCst) {
            return Err(ClientError::Disconnected(
                "connection closed after a partial write".to_string(),
            ));
        }
        let payload = message.encode_payload()?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ClientError::Disconnected("writer lock poisoned".to_string()))?;
        if let Err(err) = writer.send(&payload) {
            if let FrameError::PartialWrite { written, total, .. } = &err {
                warn!(
                    written,
                    total,
                    peer_addr = %self.peer_addr,
                    "partial frame written, closing connection"
                );
                self.severed.store(true, Ordering::SeqCst);
                if let Err(shutdown_err) = self.control.shutdown() {
                    debug!(error = %shutdown_err, "socket shutdown after partial write failed");
                }
            }
            return Err(err.into());
        }
        debug!(address = %message.address(), args = message.args().len(), "sent command");
        Ok(())
    }

    /// Wait for the next delivery, up to the configured reply timeout.
    pub fn receive(&self) -> Result<DecodedReply> {
        let inbox = self.lock_inbox()?;
        self.wait(&inbox)
    }

    /// Take the next delivery if one is already waiting.
    pub fn try_receive(&self) -> Result<Option<DecodedReply>> {
        let inbox = self.lock_inbox()?;
        match inbox.try_recv() {
            Ok(item) => item.map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(self.reader_gone()),
        }
    }

    /// Send a command and wait for its reply.
    ///
    /// Deliveries still queued from earlier fire-and-forget sends are
    /// dropped first; without request ids they cannot answer this call.
    pub fn call(&self, address: &Address, args: &[Argument]) -> Result<DecodedReply> {
        let message = OscMessage::new(address.clone()).with_args(args.iter().cloned());
        self.call_message(&message)
    }

    /// Send a prepared message and wait for its reply.
    pub fn call_message(&self, message: &OscMessage) -> Result<DecodedReply> {
        let inbox = self.lock_inbox()?;

        let mut stale = 0usize;
        while let Ok(_item) = inbox.try_recv() {
            stale += 1;
        }
        if stale > 0 {
            debug!(stale, "dropped unclaimed deliveries before call");
        }

        self.send_message(message)?;
        self.wait(&inbox)
    }

    /// Move the next delivery onto a caller-owned queue.
    ///
    /// For consumers that want out-of-band messages without issuing a call.
    /// The delivery is not correlated with any request.
    pub fn receive_to(&self, queue: &Sender<DecodedReply>) -> Result<()> {
        let reply = self.receive()?;
        queue
            .send(reply)
            .map_err(|_| ClientError::Disconnected("queue receiver dropped".to_string()))
    }

    /// Cancel the session: close the socket and stop the reader thread.
    ///
    /// Waiting receives fail with [`ClientError::Cancelled`]. Idempotent.
    pub fn shutdown(&self) -> Result<()> {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.control.shutdown()?;
        info!(peer_addr = %self.peer_addr, "client shut down");
        Ok(())
    }

    /// Whether [`Client::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Address of the device.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn lock_inbox(&self) -> Result<MutexGuard<'_, Inbox>> {
        self.inbox
            .lock()
            .map_err(|_| ClientError::Disconnected("inbox lock poisoned".to_string()))
    }

    fn wait(&self, inbox: &Inbox) -> Result<DecodedReply> {
        if self.is_shut_down() {
            return Err(ClientError::Cancelled);
        }
        match inbox.recv_timeout(self.config.reply_timeout) {
            Ok(item) => item,
            Err(RecvTimeoutError::Timeout) => Err(ClientError::Timeout(self.config.reply_timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(self.reader_gone()),
        }
    }

    fn reader_gone(&self) -> ClientError {
        if self.is_shut_down() {
            ClientError::Cancelled
        } else {
            ClientError::Disconnected("reader stopped".to_string())
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            debug!(error = %err, "socket shutdown on drop failed");
        }
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("peer_addr", &self.peer_addr)
            .field("shut_down", &self.is_shut_down())
            .field("config", &self.config)
            .finish()
    }
}

/// Read deliveries until the stream ends, forwarding each decode result.
///
/// Undecodable deliveries are forwarded as errors and reading continues;
/// stream failures end the loop. Nothing is reported after cancellation.
/// A delivery that finds the inbox full is dropped.
fn reader_loop<R: Read>(
    mut reader: FrameReader<R>,
    tx: SyncSender<Result<DecodedReply>>,
    cancelled: Arc<AtomicBool>,
) {
    loop {
        let delivery = match reader.read_delivery() {
            Ok(delivery) => delivery,
            Err(err) => {
                if cancelled.load(Ordering::SeqCst) {
                    debug!("reader stopped after shutdown");
                    return;
                }
                let err = match err {
                    FrameError::ConnectionClosed => {
                        ClientError::Disconnected("device closed the connection".to_string())
                    }
                    other => ClientError::Frame(other),
                };
                warn!(error = %err, "reader stopped");
                let _ = tx.try_send(Err(err));
                return;
            }
        };

        let item = decode_reply(&delivery).map_err(|err| {
            warn!(error = %err, bytes = delivery.len(), "undecodable delivery");
            ClientError::Decode(err)
        });
        match tx.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(bytes = delivery.len(), "inbox full, dropping delivery");
            }
            Err(TrySendError::Disconnected(_)) => return,
        }
    }
}
