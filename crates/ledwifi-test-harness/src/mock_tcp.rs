//! Mock TCP device for controller-level testing.
//!
//! [`MockTcpServer`] stands in for an LED controller's control port. It
//! listens on a random loopback port, accepts a single connection, and
//! plays back scripted exchanges: for each expected packet it reads exactly
//! that many bytes, checks them, and writes the scripted reply (if any).
//!
//! # Example
//!
//! ```
//! use ledwifi_test_harness::MockTcpServer;
//!
//! # async fn example() -> ledwifi_core::Result<()> {
//! let mut server = MockTcpServer::new().await?;
//! server.expect_write(&[0x71, 0x23, 0x0F, 0xB3]);
//! server.start();
//!
//! // ... point a controller at server.addr() ...
//!
//! server.wait().await.expect("all packets matched");
//! # Ok(())
//! # }
//! ```

use ledwifi_core::error::{Error, Result};
use std::collections::VecDeque;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A pre-loaded request/response pair for the mock server.
#[derive(Debug, Clone)]
struct TcpExpectation {
    request: Vec<u8>,
    /// Empty when the device sends nothing back.
    response: Vec<u8>,
}

/// A scripted loopback TCP peer.
///
/// If the client sends data that does not match the next expectation, the
/// server task ends with an error describing the mismatch; retrieve it with
/// [`wait`](MockTcpServer::wait).
pub struct MockTcpServer {
    addr: String,
    listener: Option<TcpListener>,
    expectations: VecDeque<TcpExpectation>,
    server_handle: Option<JoinHandle<std::result::Result<(), String>>>,
}

impl MockTcpServer {
    /// Bind a new mock server on a random loopback port.
    ///
    /// The listener is bound immediately, so clients may connect before
    /// [`start`](MockTcpServer::start); the connection waits in the backlog.
    pub async fn new() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| Error::Connection(format!("failed to bind mock TCP server: {}", e)))?;
        let addr = listener.local_addr().map_err(Error::Io)?.to_string();

        Ok(Self {
            addr,
            listener: Some(listener),
            expectations: VecDeque::new(),
            server_handle: None,
        })
    }

    /// Add an expected packet and the reply to send back.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(TcpExpectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Add an expected packet that draws no reply.
    pub fn expect_write(&mut self, request: &[u8]) {
        self.expect(request, &[]);
    }

    /// The `host:port` the server is listening on.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0)
    }

    /// Start serving: accept one client and process all expectations.
    ///
    /// Calling `start` more than once has no effect.
    pub fn start(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        let expectations: Vec<TcpExpectation> = self.expectations.drain(..).collect();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener
                .accept()
                .await
                .map_err(|e| format!("failed to accept connection: {}", e))?;

            for (i, expectation) in expectations.iter().enumerate() {
                serve_one(&mut stream, i, expectation).await?;
            }

            Ok(())
        });

        self.server_handle = Some(handle);
    }

    /// Wait for the server task to finish and report any mismatch.
    pub async fn wait(self) -> std::result::Result<(), String> {
        match self.server_handle {
            Some(handle) => handle
                .await
                .map_err(|e| format!("server task panicked: {}", e))?,
            None => Ok(()),
        }
    }
}

async fn serve_one(
    stream: &mut TcpStream,
    i: usize,
    expectation: &TcpExpectation,
) -> std::result::Result<(), String> {
    let mut buf = vec![0u8; expectation.request.len()];
    let mut total_read = 0;

    while total_read < expectation.request.len() {
        let n = stream
            .read(&mut buf[total_read..])
            .await
            .map_err(|e| format!("expectation {}: read error: {}", i, e))?;
        if n == 0 {
            return Err(format!(
                "expectation {}: client disconnected after {} bytes (expected {})",
                i,
                total_read,
                expectation.request.len()
            ));
        }
        total_read += n;
    }

    if buf != expectation.request {
        return Err(format!(
            "expectation {}: request mismatch: expected {:02X?}, got {:02X?}",
            i, expectation.request, buf
        ));
    }

    if !expectation.response.is_empty() {
        stream
            .write_all(&expectation.response)
            .await
            .map_err(|e| format!("expectation {}: write error: {}", i, e))?;
        stream
            .flush()
            .await
            .map_err(|e| format!("expectation {}: flush error: {}", i, e))?;
    }

    Ok(())
}
