//! Mock discovery responder.
//!
//! [`MockDiscoveryResponder`] plays the part of one or more devices on the
//! discovery port. It listens on a random loopback UDP port and, every time
//! it receives the probe, answers the sender with each scripted datagram in
//! order. Point a discoverer's broadcast target at
//! [`addr`](MockDiscoveryResponder::addr) to exercise discovery end to end
//! without a real broadcast domain.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ledwifi_core::error::{Error, Result};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// A scripted loopback UDP peer that answers discovery probes.
pub struct MockDiscoveryResponder {
    socket: Option<UdpSocket>,
    addr: SocketAddr,
    probe: Vec<u8>,
    replies: Vec<Vec<u8>>,
    probes_seen: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl MockDiscoveryResponder {
    /// Bind a responder that answers datagrams equal to `probe`.
    pub async fn new(probe: &[u8]) -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await.map_err(|e| {
            Error::DiscoverySetup(format!("failed to bind mock responder: {}", e))
        })?;
        let addr = socket.local_addr().map_err(Error::Io)?;

        Ok(Self {
            socket: Some(socket),
            addr,
            probe: probe.to_vec(),
            replies: Vec::new(),
            probes_seen: Arc::new(AtomicUsize::new(0)),
            handle: None,
        })
    }

    /// Queue a datagram to send back for each probe received.
    pub fn reply(&mut self, datagram: &[u8]) {
        self.replies.push(datagram.to_vec());
    }

    /// The loopback address the responder listens on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of probes received so far.
    pub fn probes_seen(&self) -> usize {
        self.probes_seen.load(Ordering::SeqCst)
    }

    /// Start answering probes in a background task.
    ///
    /// Datagrams other than the probe are ignored. Calling `start` more than
    /// once has no effect.
    pub fn start(&mut self) {
        let Some(socket) = self.socket.take() else {
            return;
        };
        let probe = self.probe.clone();
        let replies = self.replies.clone();
        let probes_seen = Arc::clone(&self.probes_seen);

        self.handle = Some(tokio::spawn(async move {
            let mut buf = [0u8; 512];
            loop {
                let Ok((n, src)) = socket.recv_from(&mut buf).await else {
                    continue;
                };
                if buf[..n] != probe[..] {
                    continue;
                }
                probes_seen.fetch_add(1, Ordering::SeqCst);
                for reply in &replies {
                    if socket.send_to(reply, src).await.is_err() {
                        break;
                    }
                }
            }
        }));
    }
}

impl Drop for MockDiscoveryResponder {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
