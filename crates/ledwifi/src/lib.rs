//! # ledwifi -- Control Wi-Fi RGB LED controllers
//!
//! `ledwifi` is an asynchronous Rust library for finding inexpensive Wi-Fi
//! RGB LED controllers (the HF-A11 / HF-LPB100 "Magic Home" family) on the
//! local network and driving them over their binary TCP protocol.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ledwifi::Rgb;
//! use ledwifi::hf::{Controller, Discoverer};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let devices = Discoverer::new(Duration::from_secs(1)).discover().await?;
//!     for device in &devices {
//!         println!("{device}");
//!         let mut controller = Controller::for_device(device);
//!         controller.on().await?;
//!         controller.set_color(Rgb::new(1.0, 0.5, 0.0), true).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate                  | Purpose                                              |
//! |------------------------|------------------------------------------------------|
//! | `ledwifi-core`         | [`Transport`] trait, data types, [`WireSink`], errors |
//! | `ledwifi-transport`    | TCP control link and UDP discovery socket            |
//! | `ledwifi-hf`           | Discovery, packet encoding, per-device controller    |
//! | **`ledwifi`**          | This facade crate -- re-exports everything           |
//!
//! ## Feature Flags
//!
//! | Feature | Enables                               | Default |
//! |---------|---------------------------------------|---------|
//! | `hf`    | [`hf`] module (HF-A11 / HF-LPB100)    | yes     |
//!
//! ## Observing Traffic
//!
//! Every packet a controller writes or reads is reported to its
//! [`WireSink`]. The default sink logs through `tracing`; install a
//! [`BroadcastSink`] to subscribe to [`WireEvent`]s directly.

pub use ledwifi_core::*;

/// Socket transports used by the drivers.
pub mod transport {
    pub use ledwifi_core::transport::Transport;
    pub use ledwifi_transport::*;
}

/// HF-A11 / HF-LPB100 controller backend.
///
/// Provides [`Discoverer`](hf::Discoverer), [`Controller`](hf::Controller),
/// and [`ControllerBuilder`](hf::ControllerBuilder), plus the pure packet
/// builders in [`commands`](hf::commands).
#[cfg(feature = "hf")]
pub mod hf {
    pub use ledwifi_hf::*;
}
