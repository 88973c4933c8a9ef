//! Error types for ledwifi.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Discovery, connection, write, and
//! decode failures are all captured here.

/// The error type for all ledwifi operations.
///
/// Variants cover the failure modes encountered when finding and driving
/// LED controllers: discovery socket setup, TCP session establishment,
/// packet writes, and interpretation of device replies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The TCP control session could not be established.
    ///
    /// Covers refused connections, unreachable hosts, and connect timeouts.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A command packet could not be written to the device.
    #[error("send failed: {0}")]
    Send(String),

    /// The discovery socket could not be bound, switched to broadcast mode,
    /// or could not transmit the probe.
    #[error("discovery setup failed: {0}")]
    DiscoverySetup(String),

    /// A reply from a device could not be interpreted (not UTF-8, or
    /// missing required comma-separated fields).
    #[error("decode error: {0}")]
    Decode(String),

    /// Timed out waiting for a reply from the device.
    #[error("timeout waiting for response")]
    Timeout,

    /// No connection to the device has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the device was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
