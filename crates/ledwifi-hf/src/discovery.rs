//! LAN discovery via UDP broadcast.
//!
//! HF-A11 / HF-LPB100 Wi-Fi modules answer the ASCII probe
//! `HF-A11ASSISTHREAD` sent to UDP port 48899 with a reply of the form
//! `<ip>,<mac>,<model>`. This module broadcasts the probe, collects replies
//! until a deadline, and returns one [`DeviceDescriptor`] per reply.
//!
//! # Usage
//!
//! ```no_run
//! use ledwifi_hf::discovery;
//! use std::time::Duration;
//!
//! # async fn example() -> ledwifi_core::Result<()> {
//! let devices = discovery::discover(Duration::from_secs(1)).await?;
//! for device in &devices {
//!     println!("{} ({}) at {}", device.model, device.hardware_address, device.ip_address);
//! }
//! # Ok(())
//! # }
//! ```

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use ledwifi_core::error::{Error, Result};
use ledwifi_core::types::DeviceDescriptor;
use ledwifi_transport::UdpTransport;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Well-known discovery port.
pub const DISCOVERY_PORT: u16 = 48899;

/// Probe string the modules recognize.
pub const DISCOVERY_PROBE: &str = "HF-A11ASSISTHREAD";

/// Outcome of one discovery run: the devices found, or a setup failure.
pub type DiscoveryResult = Result<Vec<DeviceDescriptor>>;

/// Broadcast the probe on the default port and collect replies for `timeout`.
///
/// Duplicate replies are kept.
pub async fn discover(timeout: Duration) -> DiscoveryResult {
    Discoverer::new(timeout).discover().await
}

/// Interpret one received datagram.
///
/// Returns `Ok(None)` for an echo of our own probe, `Ok(Some(_))` for a
/// device reply.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the datagram is not UTF-8 or has fewer than
/// three comma-separated fields.
pub fn parse_reply(data: &[u8]) -> Result<Option<DeviceDescriptor>> {
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::Decode("discovery reply is not valid UTF-8".into()))?;

    if text == DISCOVERY_PROBE {
        return Ok(None);
    }

    DeviceDescriptor::from_reply(text).map(Some)
}

/// A configured discovery run.
///
/// Each call to [`discover`](Discoverer::discover) or
/// [`discover_with`](Discoverer::discover_with) binds its own socket, fixes
/// its deadline at call time, and delivers exactly one [`DiscoveryResult`]
/// no earlier than that deadline. Setup failures are delivered immediately.
#[derive(Debug, Clone)]
pub struct Discoverer {
    timeout: Duration,
    bind_addr: SocketAddr,
    target: SocketAddr,
    dedupe: bool,
}

impl Discoverer {
    /// Discovery on the default port, broadcasting to `255.255.255.255`.
    pub fn new(timeout: Duration) -> Self {
        Discoverer {
            timeout,
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DISCOVERY_PORT)),
            target: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, DISCOVERY_PORT)),
            dedupe: false,
        }
    }

    /// Local address to bind the discovery socket to.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Where to send the probe (a broadcast address, or a single host).
    pub fn target(mut self, addr: SocketAddr) -> Self {
        self.target = addr;
        self
    }

    /// Keep only the first reply per hardware address (default: off).
    pub fn dedupe(mut self, enabled: bool) -> Self {
        self.dedupe = enabled;
        self
    }

    /// The collection window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run discovery and return what was found once the window closes.
    pub async fn discover(&self) -> DiscoveryResult {
        let deadline = Instant::now() + self.timeout;
        self.run(deadline).await
    }

    /// Run discovery on the tokio runtime and hand the result to
    /// `completion` once, when the window closes.
    ///
    /// The deadline is fixed before this method returns. Aborting the
    /// returned handle cancels the run without invoking `completion`.
    pub fn discover_with<F>(&self, completion: F) -> JoinHandle<()>
    where
        F: FnOnce(DiscoveryResult) + Send + 'static,
    {
        let deadline = Instant::now() + self.timeout;
        let discoverer = self.clone();
        tokio::spawn(async move {
            let result = discoverer.run(deadline).await;
            completion(result);
        })
    }

    async fn run(&self, deadline: Instant) -> DiscoveryResult {
        let socket = UdpTransport::bind(self.bind_addr)
            .await
            .map_err(|e| setup_error("bind", e))?;
        socket
            .set_broadcast(true)
            .map_err(|e| setup_error("enable broadcast", e))?;
        socket
            .send_to(DISCOVERY_PROBE.as_bytes(), self.target)
            .await
            .map_err(|e| setup_error("send probe", e))?;

        tracing::debug!(
            local = %socket.local_addr(),
            target = %self.target,
            timeout_ms = self.timeout.as_millis(),
            "Discovery probe sent"
        );

        let mut devices: Vec<DeviceDescriptor> = Vec::new();
        let mut buf = [0u8; 1024];

        loop {
            match socket.recv_before(&mut buf, deadline).await {
                Ok((n, src)) => match parse_reply(&buf[..n]) {
                    Ok(Some(device)) => {
                        if self.dedupe
                            && devices
                                .iter()
                                .any(|d| d.hardware_address == device.hardware_address)
                        {
                            tracing::trace!(mac = %device.hardware_address, "Duplicate reply dropped");
                            continue;
                        }
                        tracing::debug!(
                            ip = %device.ip_address,
                            mac = %device.hardware_address,
                            model = %device.model,
                            src = %src,
                            "Discovered device"
                        );
                        devices.push(device);
                    }
                    Ok(None) => {
                        tracing::trace!(src = %src, "Ignoring probe echo");
                    }
                    Err(e) => {
                        tracing::trace!(src = %src, error = %e, "Ignoring undecodable reply");
                    }
                },
                Err(Error::Timeout) => break,
                Err(e) => {
                    tracing::trace!(error = %e, "Discovery recv error");
                }
            }
        }

        // recv timers may fire a hair early on coarse clocks.
        tokio::time::sleep_until(deadline).await;

        tracing::debug!(count = devices.len(), "Discovery complete");
        Ok(devices)
    }
}

fn setup_error(step: &str, e: Error) -> Error {
    tracing::warn!(step = step, error = %e, "Discovery setup failed");
    Error::DiscoverySetup(format!("{}: {}", step, e))
}
