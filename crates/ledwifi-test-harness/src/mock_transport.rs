//! Mock transport for deterministic testing of the device controller.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! exchanges. Fire-and-forget commands are scripted with
//! [`expect_write`](MockTransport::expect_write); commands that draw a reply
//! use [`expect`](MockTransport::expect).
//!
//! # Example
//!
//! ```
//! use ledwifi_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Power on: no reply.
//! mock.expect_write(&[0x71, 0x23, 0x0F, 0xB3]);
//! // Status query: device answers.
//! mock.expect(&[0x71, 0x24, 0x0F, 0xB4], b"+ok");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use ledwifi_core::error::{Error, Result};
use ledwifi_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to return on the next `receive()`; empty for writes that
    /// draw no reply.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing without hardware.
///
/// Expectations are consumed in order. Every `send()` is recorded and
/// matched against the next expectation; a mismatch or an exhausted queue
/// fails the send with [`Error::Send`]. `receive()` returns the pending
/// response, or [`Error::Timeout`] when there is none.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    pending_response: Option<Vec<u8>>,
    connected: bool,
    peer: String,
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            connected: true,
            peer: String::from("mock:5577"),
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request whose reply is `response`.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Add an expected request that draws no reply.
    pub fn expect_write(&mut self, request: &[u8]) {
        self.expect(request, &[]);
    }

    /// Override the peer label reported in wire events.
    pub fn with_peer(mut self, peer: &str) -> Self {
        self.peer = peer.to_string();
        self
    }

    /// All data that has been sent through this transport, one element per
    /// `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Number of expectations not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state.
    ///
    /// When `false`, `send()` and `receive()` return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        let expectation = self
            .expectations
            .pop_front()
            .ok_or_else(|| Error::Send("no more expectations in mock transport".into()))?;

        if data != expectation.request.as_slice() {
            return Err(Error::Send(format!(
                "unexpected send data: expected {:02X?}, got {:02X?}",
                expectation.request, data
            )));
        }

        self.pending_response = if expectation.response.is_empty() {
            None
        } else {
            Some(expectation.response)
        };
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let response = self.pending_response.take().ok_or(Error::Timeout)?;
        let n = response.len().min(buf.len());
        buf[..n].copy_from_slice(&response[..n]);
        if n < response.len() {
            self.pending_response = Some(response[n..].to_vec());
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }
}
