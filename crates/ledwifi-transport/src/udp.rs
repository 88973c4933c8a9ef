//! Datagram socket for LAN discovery.
//!
//! Discovery is one broadcast probe followed by a window of replies, so
//! [`UdpTransport`] exposes exactly that: bind, enable broadcast, send, and
//! receive until a deadline. It does not implement
//! [`Transport`](ledwifi_core::Transport); there is no session to keep.
//!
//! # Example
//!
//! ```no_run
//! use ledwifi_transport::UdpTransport;
//! use std::time::Duration;
//! use tokio::time::Instant;
//!
//! # async fn example() -> ledwifi_core::Result<()> {
//! let socket = UdpTransport::bind("0.0.0.0:48899".parse().unwrap()).await?;
//! socket.set_broadcast(true)?;
//! socket
//!     .send_to(b"HF-A11ASSISTHREAD", "255.255.255.255:48899".parse().unwrap())
//!     .await?;
//!
//! let deadline = Instant::now() + Duration::from_secs(1);
//! let mut buf = [0u8; 512];
//! while let Ok((n, src)) = socket.recv_before(&mut buf, deadline).await {
//!     println!("{src}: {}", String::from_utf8_lossy(&buf[..n]));
//! }
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;

use ledwifi_core::error::{Error, Result};
use tokio::net::UdpSocket;
use tokio::time::Instant;

/// A bound UDP socket.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpTransport {
    /// Bind to `addr`. Port 0 picks any free port.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the address is in use or not local.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(|e| {
            tracing::warn!(addr = %addr, error = %e, "UDP bind failed");
            Error::Io(e)
        })?;
        let local_addr = socket.local_addr()?;
        tracing::debug!(local = %local_addr, "UDP socket bound");

        Ok(Self { socket, local_addr })
    }

    /// The address actually bound, with the OS-assigned port if 0 was asked
    /// for.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Allow sending to broadcast addresses such as `255.255.255.255`.
    pub fn set_broadcast(&self, enable: bool) -> Result<()> {
        self.socket.set_broadcast(enable).map_err(|e| {
            tracing::warn!(local = %self.local_addr, error = %e, "SO_BROADCAST rejected");
            Error::Io(e)
        })
    }

    /// Send one datagram to `target`.
    pub async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        tracing::trace!(local = %self.local_addr, target = %target, datagram = ?data, "Sending datagram");
        self.socket.send_to(data, target).await?;
        Ok(())
    }

    /// Wait for the next datagram, but not past `deadline`.
    ///
    /// Datagrams longer than `buf` are truncated.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] once the deadline has passed without a datagram,
    /// including when it had already passed on entry.
    pub async fn recv_before(
        &self,
        buf: &mut [u8],
        deadline: Instant,
    ) -> Result<(usize, SocketAddr)> {
        if Instant::now() >= deadline {
            return Err(Error::Timeout);
        }
        let (n, src) = tokio::time::timeout_at(deadline, self.socket.recv_from(buf))
            .await
            .map_err(|_| Error::Timeout)??;
        tracing::trace!(local = %self.local_addr, src = %src, bytes = n, "Received datagram");
        Ok((n, src))
    }
}
