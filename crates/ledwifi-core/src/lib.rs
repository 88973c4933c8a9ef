//! ledwifi-core: Core types, traits, and error definitions for ledwifi.
//!
//! This crate defines the protocol-agnostic pieces shared by every ledwifi
//! crate. Applications can depend on these types without pulling in the
//! socket implementations.
//!
//! # Key types
//!
//! - [`DeviceDescriptor`] -- a device found by discovery
//! - [`Transport`] -- byte-level communication channel
//! - [`WireSink`] / [`WireEvent`] -- observation hook for raw traffic
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use events::{BroadcastSink, Direction, TracingSink, WireEvent, WireSink};
pub use transport::Transport;
pub use types::{DeviceDescriptor, DeviceStatus, Rgb, StatusReply};
