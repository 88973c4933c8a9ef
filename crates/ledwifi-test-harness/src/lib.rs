//! ledwifi-test-harness: Test utilities and mock peers for ledwifi.
//!
//! - [`MockTransport`] -- scripted in-memory [`Transport`](ledwifi_core::Transport)
//!   for unit testing the controller without sockets
//! - [`MockTcpServer`] -- scripted loopback TCP peer standing in for a
//!   device's control port
//! - [`MockDiscoveryResponder`] -- loopback UDP peer answering discovery
//!   probes

pub mod mock_tcp;
pub mod mock_transport;
pub mod mock_udp;

pub use mock_tcp::MockTcpServer;
pub use mock_transport::MockTransport;
pub use mock_udp::MockDiscoveryResponder;
