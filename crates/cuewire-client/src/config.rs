use std::time::Duration;

use cuewire_frame::DEFAULT_MAX_DELIVERY;

/// Deliveries queued per client before the reader starts dropping them.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Client behavior configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long `receive` and `call` wait for a reply.
    pub reply_timeout: Duration,
    /// Bound on each TCP connect attempt. `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Bound on writing one frame. `None` blocks until written.
    pub write_timeout: Option<Duration>,
    /// Maximum bytes accepted for one delivery.
    pub max_delivery_size: usize,
    /// Deliveries held for `receive`/`call` before new ones are dropped.
    pub inbox_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(5),
            connect_timeout: Some(Duration::from_secs(5)),
            write_timeout: Some(Duration::from_secs(5)),
            max_delivery_size: DEFAULT_MAX_DELIVERY,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}
