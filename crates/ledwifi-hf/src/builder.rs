//! ControllerBuilder -- fluent builder for constructing [`Controller`] instances.
//!
//! Separates configuration from construction so that callers can set the
//! control port, timeouts, and wire-event sink before the controller is
//! created. Building never touches the network; the first command opens
//! the connection.
//!
//! # Example
//!
//! ```no_run
//! use ledwifi_hf::builder::ControllerBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> ledwifi_core::Result<()> {
//! let mut controller = ControllerBuilder::new("192.168.1.42")
//!     .connect_timeout(Duration::from_secs(2))
//!     .build();
//! controller.on().await?;
//! # Ok(())
//! # }
//! ```

use std::net::Ipv6Addr;
use std::sync::Arc;
use std::time::Duration;

use ledwifi_core::events::{TracingSink, WireSink};
use ledwifi_core::transport::Transport;
use ledwifi_core::types::DeviceDescriptor;
pub use ledwifi_transport::DEFAULT_CONNECT_TIMEOUT;

use crate::controller::Controller;

/// Well-known TCP control port.
pub const CONTROL_PORT: u16 = 5577;

/// Default bound on a single packet write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default bound on waiting for a status reply.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(2);

/// Fluent builder for [`Controller`].
pub struct ControllerBuilder {
    host: String,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
    status_timeout: Duration,
    sink: Arc<dyn WireSink>,
}

impl ControllerBuilder {
    /// Create a builder for the device at `host` (IP address or hostname).
    pub fn new(host: &str) -> Self {
        ControllerBuilder {
            host: host.to_string(),
            port: CONTROL_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the target host.
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Target a device found by discovery.
    pub fn device(mut self, device: &DeviceDescriptor) -> Self {
        self.host = device.ip_address.clone();
        self
    }

    /// Override the control port (default: 5577).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Bound on establishing the TCP session (default: 5 s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound on writing one packet (default: 500 ms).
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Bound on waiting for a status reply (default: 2 s).
    pub fn status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    /// Where to report wire traffic (default: [`TracingSink`]).
    pub fn sink(mut self, sink: Arc<dyn WireSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The `host:port` string the controller will connect to.
    pub fn addr(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Build a controller that connects over TCP on its first command.
    pub fn build(self) -> Controller {
        let addr = self.addr();
        tracing::debug!(addr = %addr, "Building controller");
        Controller::new(
            addr,
            None,
            true,
            self.connect_timeout,
            self.write_timeout,
            self.status_timeout,
            self.sink,
        )
    }

    /// Build a controller over an already-open transport.
    ///
    /// The controller never replaces this transport: once it is closed or
    /// dropped after a failure, commands fail with
    /// [`Error::NotConnected`](ledwifi_core::Error::NotConnected).
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Controller {
        Controller::new(
            self.addr(),
            Some(transport),
            false,
            self.connect_timeout,
            self.write_timeout,
            self.status_timeout,
            self.sink,
        )
    }
}

impl Controller {
    /// A lazily connecting controller for a discovered device, with default
    /// settings.
    pub fn for_device(device: &DeviceDescriptor) -> Controller {
        ControllerBuilder::new(&device.ip_address).build()
    }
}
