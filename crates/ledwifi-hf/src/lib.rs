//! Driver for Wi-Fi RGB LED controllers built on HF-A11 / HF-LPB100 modules.
//!
//! This crate provides:
//!
//! - **Discovery** ([`discovery`]) -- broadcast the `HF-A11ASSISTHREAD`
//!   probe on UDP port 48899 and collect `<ip>,<mac>,<model>` replies.
//! - **Commands** ([`commands`]) -- pure builders for the checksummed
//!   binary command packets (power, color, status query).
//! - **Controller** ([`controller`]) -- a per-device handle that lazily
//!   opens the TCP control link (port 5577) and writes packets.
//! - **ControllerBuilder** ([`builder`]) -- fluent configuration of ports,
//!   timeouts, and the wire-event sink.
//!
//! # Example
//!
//! ```no_run
//! use ledwifi_hf::{Controller, Discoverer};
//! use ledwifi_core::Rgb;
//! use std::time::Duration;
//!
//! # async fn example() -> ledwifi_core::Result<()> {
//! let devices = Discoverer::new(Duration::from_secs(1)).discover().await?;
//! for device in &devices {
//!     let mut controller = Controller::for_device(device);
//!     controller.on().await?;
//!     controller.set_color(Rgb::BLUE, true).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod commands;
pub mod controller;
pub mod discovery;

pub use builder::{CONTROL_PORT, ControllerBuilder};
pub use commands::Command;
pub use controller::Controller;
pub use discovery::{DISCOVERY_PORT, DISCOVERY_PROBE, Discoverer, DiscoveryResult};
