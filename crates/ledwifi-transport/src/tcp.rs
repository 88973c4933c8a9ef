//! Control link to a single LED controller.
//!
//! Controllers accept checksummed command packets on TCP port 5577 and
//! answer status queries on the same stream. [`TcpTransport`] wraps that
//! stream behind the [`Transport`] trait so drivers can be tested against a
//! mock instead of a device.
//!
//! # Example
//!
//! ```no_run
//! use ledwifi_transport::TcpTransport;
//! use ledwifi_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> ledwifi_core::Result<()> {
//! let mut link = TcpTransport::connect("192.168.1.42:5577").await?;
//! link.send(&[0x71, 0x23, 0x0F, 0xB3]).await?;
//!
//! let mut reply = [0u8; 64];
//! let n = link.receive(&mut reply, Duration::from_secs(2)).await?;
//! println!("{:02X?}", &reply[..n]);
//! # Ok(())
//! # }
//! ```

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use ledwifi_core::error::{Error, Result};
use ledwifi_core::transport::Transport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Bound on establishing a control link when none is given.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// An open TCP session with one controller.
///
/// A transport is connected from the moment it exists until
/// [`close`](Transport::close) is called. Callers that connect lazily keep
/// an `Option<TcpTransport>` (or a boxed [`Transport`]) and create one on
/// demand.
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    peer: String,
}

impl TcpTransport {
    /// Open a link to `addr` (`host:port`) within [`DEFAULT_CONNECT_TIMEOUT`].
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_timeout(addr, DEFAULT_CONNECT_TIMEOUT).await
    }

    /// Open a link to `addr` (`host:port`), giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Refusal, resolution failure and the timeout elapsing are all reported
    /// as [`Error::Connection`].
    pub async fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        tracing::debug!(peer = %addr, timeout_ms = timeout.as_millis(), "Opening control link");

        let stream = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::warn!(peer = %addr, error = %e, "Control link refused");
                return Err(connect_error(addr, e));
            }
            Err(_) => {
                tracing::warn!(peer = %addr, "Control link timed out");
                return Err(Error::Connection(format!(
                    "timed out connecting to {addr} after {} ms",
                    timeout.as_millis()
                )));
            }
        };

        // Packets are at most nine bytes; Nagle would hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(peer = %addr, error = %e, "TCP_NODELAY not available");
        }

        tracing::info!(peer = %addr, "Control link open");
        Ok(Self::from_stream(stream, addr.to_string()))
    }

    /// Adopt a stream that is already connected. `peer` labels the link in
    /// logs and wire events.
    pub fn from_stream(stream: TcpStream, peer: String) -> Self {
        Self {
            stream: Some(stream),
            peer,
        }
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let peer = self.peer.clone();
        let stream = self.stream()?;
        tracing::trace!(peer = %peer, packet = ?data, "Writing packet");

        let written = match stream.write_all(data).await {
            Ok(()) => stream.flush().await,
            Err(e) => Err(e),
        };
        written.map_err(|e| {
            tracing::warn!(peer = %peer, error = %e, "Packet write failed");
            data_error(e)
        })
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let peer = self.peer.clone();
        let stream = self.stream()?;

        let n = tokio::time::timeout(timeout, stream.read(buf))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| {
                tracing::warn!(peer = %peer, error = %e, "Read failed");
                data_error(e)
            })?;

        if n == 0 {
            tracing::warn!(peer = %peer, "Controller closed the link");
            return Err(Error::ConnectionLost);
        }
        tracing::trace!(peer = %peer, reply = ?&buf[..n], "Read reply");
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        // The controller does not care about an orderly shutdown.
        let _ = stream.shutdown().await;
        tracing::info!(peer = %self.peer, "Control link closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.stream.is_some() {
            tracing::debug!(peer = %self.peer, "Dropping open control link");
        }
    }
}

fn connect_error(addr: &str, e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::ConnectionRefused {
        Error::Connection(format!("connection refused: {addr}"))
    } else {
        Error::Connection(format!("{addr}: {e}"))
    }
}

/// A reset or half-closed peer means the link is gone; anything else is
/// passed through.
fn data_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::NotConnected => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}
