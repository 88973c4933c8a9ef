//! Wire-level traffic events.
//!
//! Every packet a controller writes and every reply it reads is reported to
//! a [`WireSink`] as a [`WireEvent`]. The default sink forwards events to
//! `tracing`; [`BroadcastSink`] publishes them on a
//! [`tokio::sync::broadcast`] channel so UIs and tests can subscribe.

use std::fmt;
use std::time::SystemTime;

use tokio::sync::broadcast;

/// Direction of a packet relative to this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Written to the device.
    Sent,
    /// Read from the device.
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => write!(f, "TX"),
            Direction::Received => write!(f, "RX"),
        }
    }
}

/// A single send or receive on a device link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEvent {
    /// Wall-clock time the bytes were handed to (or taken from) the socket.
    pub timestamp: SystemTime,
    pub direction: Direction,
    /// Remote address label, e.g. `"10.0.0.5:5577"`.
    pub peer: String,
    /// Raw bytes exactly as they crossed the wire.
    pub bytes: Vec<u8>,
}

impl WireEvent {
    /// Create an event stamped with the current time.
    pub fn now(direction: Direction, peer: impl Into<String>, bytes: &[u8]) -> Self {
        WireEvent {
            timestamp: SystemTime::now(),
            direction,
            peer: peer.into(),
            bytes: bytes.to_vec(),
        }
    }
}

/// Receiver of wire events.
///
/// Implementations must not block: `record` is called inline on the
/// controller's send/receive path.
pub trait WireSink: Send + Sync {
    fn record(&self, event: &WireEvent);
}

/// Forwards wire events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WireSink for TracingSink {
    fn record(&self, event: &WireEvent) {
        tracing::debug!(
            direction = %event.direction,
            peer = %event.peer,
            bytes = event.bytes.len(),
            data = ?event.bytes,
            "Wire traffic"
        );
    }
}

/// Publishes wire events on a broadcast channel.
///
/// Events are delivered on a best-effort basis; slow subscribers may lag
/// and miss events. Sending with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<WireEvent>,
}

impl BroadcastSink {
    /// Create a sink whose channel buffers up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        BroadcastSink { tx }
    }

    /// Subscribe to all events recorded after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<WireEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl WireSink for BroadcastSink {
    fn record(&self, event: &WireEvent) {
        let _ = self.tx.send(event.clone());
    }
}
