//! Transport implementations for ledwifi.
//!
//! This crate provides the socket layer used by the device driver:
//!
//! - [`TcpTransport`]: the per-device control link, implementing the
//!   [`Transport`](ledwifi_core::Transport) trait from `ledwifi-core`
//! - [`UdpTransport`]: the broadcast-capable datagram socket used for
//!   discovery
//!
//! # Example
//!
//! ```no_run
//! use ledwifi_transport::TcpTransport;
//! use ledwifi_core::transport::Transport;
//!
//! # async fn example() -> ledwifi_core::Result<()> {
//! let mut transport = TcpTransport::connect("192.168.1.42:5577").await?;
//! transport.send(&[0x71, 0x24, 0x0F, 0xB4]).await?;
//! # Ok(())
//! # }
//! ```

pub mod tcp;
pub mod udp;

pub use tcp::{DEFAULT_CONNECT_TIMEOUT, TcpTransport};
pub use udp::UdpTransport;
