//! Transport trait for device communication.
//!
//! The [`Transport`] trait abstracts over the stream link to an LED
//! controller. The production implementation is the TCP transport in
//! `ledwifi-transport`; `MockTransport` from `ledwifi-test-harness` replays
//! scripted exchanges so the controller can be tested without hardware.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a device.
///
/// Implementations handle buffering and error mapping at the socket layer.
/// Packet construction and reply interpretation live in the protocol crate
/// that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the device.
    ///
    /// Completes once all bytes have been handed to the underlying socket.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the device into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Will wait up to `timeout`
    /// for data to arrive; returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if nothing is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;

    /// A human-readable label for the remote end, used in wire events.
    fn peer(&self) -> String {
        String::from("unknown")
    }
}
