//! Controller -- drives one LED controller over its TCP control port.
//!
//! A [`Controller`] is bound to a single device address when it is built.
//! The TCP session is opened lazily by the first command, reused by every
//! later command, and reopened on demand after a failure.

use std::sync::Arc;
use std::time::Duration;

use ledwifi_core::error::{Error, Result};
use ledwifi_core::events::{Direction, WireEvent, WireSink};
use ledwifi_core::transport::Transport;
use ledwifi_core::types::{Rgb, StatusReply};
use ledwifi_transport::TcpTransport;

use crate::commands::{self, Command};

/// Size of the read buffer for status replies.
const STATUS_BUF_LEN: usize = 256;

/// A controller for one device.
///
/// Constructed via [`ControllerBuilder`](crate::builder::ControllerBuilder)
/// or [`Controller::for_device`]. Methods take `&mut self`,
/// so commands on one controller are written in call order.
pub struct Controller {
    addr: String,
    transport: Option<Box<dyn Transport>>,
    /// Whether a missing or dropped link may be replaced by a fresh TCP
    /// connection to `addr`.
    lazy_connect: bool,
    connect_timeout: Duration,
    write_timeout: Duration,
    status_timeout: Duration,
    sink: Arc<dyn WireSink>,
}

impl Controller {
    pub(crate) fn new(
        addr: String,
        transport: Option<Box<dyn Transport>>,
        lazy_connect: bool,
        connect_timeout: Duration,
        write_timeout: Duration,
        status_timeout: Duration,
        sink: Arc<dyn WireSink>,
    ) -> Self {
        Controller {
            addr,
            transport,
            lazy_connect,
            connect_timeout,
            write_timeout,
            status_timeout,
            sink,
        }
    }

    /// The `host:port` this controller is bound to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether a link to the device is currently open.
    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_connected())
    }

    /// Switch the device on.
    pub async fn on(&mut self) -> Result<()> {
        self.send(Command::PowerOn).await
    }

    /// Switch the device off.
    pub async fn off(&mut self) -> Result<()> {
        self.send(Command::PowerOff).await
    }

    /// Set the RGB color, optionally persisting it across power cycles.
    pub async fn set_color(&mut self, color: Rgb, persist: bool) -> Result<()> {
        self.send(Command::SetColor { color, persist }).await
    }

    /// Encode `command` and write it to the device.
    ///
    /// Connects first if no link is open; the write is only attempted once
    /// the connection is established. For a command the device answers
    /// (see [`Command::expects_reply`]) the reply is read off the link and
    /// reported to the sink, so it cannot be mistaken for the answer to a
    /// later query.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the link cannot be established
    /// - [`Error::Send`] if the write fails or exceeds the write timeout
    /// - [`Error::Timeout`] if an expected reply does not arrive
    pub async fn send(&mut self, command: Command) -> Result<()> {
        tracing::debug!(addr = %self.addr, command = ?command, "Sending command");
        let packet = command.encode();
        if command.expects_reply() {
            let reply = self.exchange(&packet).await?;
            tracing::debug!(addr = %self.addr, bytes = reply.len(), "Reply discarded");
            return Ok(());
        }
        self.write_packet(&packet).await
    }

    /// Query the device and return its raw reply.
    ///
    /// The query packet is byte-identical to power-off.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`send`](Controller::send):
    /// - [`Error::Timeout`] if no reply arrives within the status timeout
    /// - [`Error::Decode`] if the reply is not valid UTF-8
    pub async fn status(&mut self) -> Result<StatusReply> {
        let raw = self.exchange(&commands::cmd_query_status()).await?;
        let reply = StatusReply::from_raw(raw)?;
        tracing::debug!(addr = %self.addr, status = %reply.text, "Status reply");
        Ok(reply)
    }

    /// Query the device and hand the outcome to `completion`.
    pub async fn status_with<F>(&mut self, completion: F)
    where
        F: FnOnce(Result<StatusReply>),
    {
        completion(self.status().await);
    }

    /// Close the link, if open. The next command reconnects.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }

    /// Write `packet` and read the one reply it draws, bounded by the
    /// status timeout.
    async fn exchange(&mut self, packet: &[u8]) -> Result<Vec<u8>> {
        self.write_packet(packet).await?;

        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        let peer = transport.peer();
        let mut buf = [0u8; STATUS_BUF_LEN];
        let n = match transport.receive(&mut buf, self.status_timeout).await {
            Ok(n) => n,
            Err(e) => {
                if matches!(e, Error::ConnectionLost | Error::NotConnected) {
                    self.transport = None;
                }
                return Err(e);
            }
        };

        self.sink
            .record(&WireEvent::now(Direction::Received, peer, &buf[..n]));
        Ok(buf[..n].to_vec())
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        if !self.lazy_connect {
            return Err(Error::NotConnected);
        }

        let transport = TcpTransport::connect_with_timeout(&self.addr, self.connect_timeout).await?;
        self.transport = Some(Box::new(transport));
        Ok(())
    }

    async fn write_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.ensure_connected().await?;

        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        let peer = transport.peer();

        let outcome = match tokio::time::timeout(self.write_timeout, transport.send(packet)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e @ Error::Send(_))) => Err(e),
            Ok(Err(e)) => Err(Error::Send(e.to_string())),
            Err(_) => Err(Error::Send(format!(
                "write timed out after {} ms",
                self.write_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(()) => {
                self.sink
                    .record(&WireEvent::now(Direction::Sent, peer, packet));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(addr = %self.addr, error = %e, "Write failed, dropping link");
                self.transport = None;
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("addr", &self.addr)
            .field("connected", &self.is_connected())
            .field("lazy_connect", &self.lazy_connect)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ControllerBuilder;
    use ledwifi_core::events::BroadcastSink;
    use ledwifi_test_harness::{MockTcpServer, MockTransport};

    fn make_controller(mock: MockTransport) -> Controller {
        ControllerBuilder::new("10.0.0.5").build_with_transport(Box::new(mock))
    }

    // -----------------------------------------------------------------
    // Commands over a mock transport
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn on_writes_power_on_packet() {
        let mut mock = MockTransport::new();
        mock.expect_write(&[0x71, 0x23, 0x0F, 0xB3]);

        let mut controller = make_controller(mock);
        controller.on().await.unwrap();
    }

    #[tokio::test]
    async fn commands_are_written_in_call_order() {
        let mut mock = MockTransport::new();
        mock.expect_write(&commands::cmd_power_on());
        mock.expect_write(&commands::cmd_set_color(Rgb::RED, false));
        mock.expect_write(&commands::cmd_power_off());

        let mut controller = make_controller(mock);
        controller.on().await.unwrap();
        controller.set_color(Rgb::RED, false).await.unwrap();
        controller.off().await.unwrap();
    }

    #[tokio::test]
    async fn status_returns_utf8_reply() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x71, 0x24, 0x0F, 0xB4], b"+ok=on");

        let mut controller = make_controller(mock);
        let reply = controller.status().await.unwrap();
        assert_eq!(reply.text, "+ok=on");
    }

    #[tokio::test]
    async fn status_binary_reply_is_decode_error() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x71, 0x24, 0x0F, 0xB4], &[0x81, 0x25, 0x23, 0x61]);

        let mut controller = make_controller(mock);
        let result = controller.status().await;
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn status_without_reply_times_out() {
        let mut mock = MockTransport::new();
        mock.expect_write(&[0x71, 0x24, 0x0F, 0xB4]);

        let mut controller = make_controller(mock);
        let result = controller.status().await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn status_with_invokes_completion() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x71, 0x24, 0x0F, 0xB4], b"+ok");

        let mut controller = make_controller(mock);
        let mut seen = None;
        controller
            .status_with(|result| seen = Some(result.unwrap().text))
            .await;
        assert_eq!(seen.as_deref(), Some("+ok"));
    }

    #[tokio::test]
    async fn write_failure_is_send_error() {
        let mut mock = MockTransport::new();
        mock.expect_write(&[0x00]);

        let mut controller = make_controller(mock);
        let result = controller.on().await;
        assert!(matches!(result, Err(Error::Send(_))));
        assert!(!controller.is_connected());
    }

    #[tokio::test]
    async fn injected_transport_does_not_reconnect() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let mut controller = make_controller(mock);
        let result = controller.on().await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn wire_events_are_recorded() {
        let sink = Arc::new(BroadcastSink::new(8));
        let mut events = sink.subscribe();

        let mut mock = MockTransport::new().with_peer("10.0.0.5:5577");
        mock.expect(&[0x71, 0x24, 0x0F, 0xB4], b"+ok");

        let mut controller = ControllerBuilder::new("10.0.0.5")
            .sink(sink)
            .build_with_transport(Box::new(mock));
        controller.status().await.unwrap();

        let sent = events.recv().await.unwrap();
        assert_eq!(sent.direction, Direction::Sent);
        assert_eq!(sent.peer, "10.0.0.5:5577");
        assert_eq!(sent.bytes, vec![0x71, 0x24, 0x0F, 0xB4]);

        let received = events.recv().await.unwrap();
        assert_eq!(received.direction, Direction::Received);
        assert_eq!(received.bytes, b"+ok".to_vec());
    }

    #[tokio::test]
    async fn disconnect_closes_transport() {
        let mut controller = make_controller(MockTransport::new());
        assert!(controller.is_connected());
        controller.disconnect().await.unwrap();
        assert!(!controller.is_connected());
    }

    // -----------------------------------------------------------------
    // Lazy TCP connection
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn connects_lazily_and_reuses_connection() {
        let mut server = MockTcpServer::new().await.unwrap();
        server.expect_write(&commands::cmd_power_on());
        server.expect_write(&commands::cmd_set_color(Rgb::GREEN, true));
        server.expect(&commands::cmd_query_status(), b"+ok");
        server.start();

        let mut controller = ControllerBuilder::new("127.0.0.1")
            .port(server.port())
            .build();
        assert!(!controller.is_connected());

        controller.on().await.unwrap();
        assert!(controller.is_connected());
        controller.set_color(Rgb::GREEN, true).await.unwrap();
        let reply = controller.status().await.unwrap();
        assert_eq!(reply.text, "+ok");

        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn sent_query_consumes_its_reply() {
        let mut server = MockTcpServer::new().await.unwrap();
        server.expect(&commands::cmd_query_status(), b"+old");
        server.expect(&commands::cmd_query_status(), b"+new");
        server.start();

        let mut controller = ControllerBuilder::new("127.0.0.1")
            .port(server.port())
            .build();
        controller.send(Command::QueryStatus).await.unwrap();
        let reply = controller.status().await.unwrap();
        assert_eq!(reply.text, "+new");

        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn sent_query_reply_reaches_sink() {
        let sink = Arc::new(BroadcastSink::new(8));
        let mut events = sink.subscribe();

        let mut mock = MockTransport::new();
        mock.expect(&[0x71, 0x24, 0x0F, 0xB4], &[0x81, 0x25, 0x23]);

        let mut controller = ControllerBuilder::new("10.0.0.5")
            .sink(sink)
            .build_with_transport(Box::new(mock));
        controller.send(Command::QueryStatus).await.unwrap();

        assert_eq!(events.recv().await.unwrap().direction, Direction::Sent);
        let received = events.recv().await.unwrap();
        assert_eq!(received.direction, Direction::Received);
        assert_eq!(received.bytes, vec![0x81, 0x25, 0x23]);
    }

    /// Accept `count` connections in turn and return the first packet read
    /// on each.
    async fn accept_packets(count: usize) -> (u16, tokio::task::JoinHandle<Vec<Vec<u8>>>) {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let mut packets = Vec::new();
            for _ in 0..count {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut packet = vec![0u8; 4];
                stream.read_exact(&mut packet).await.unwrap();
                packets.push(packet);
            }
            packets
        });
        (port, handle)
    }

    #[tokio::test]
    async fn reconnects_after_disconnect() {
        let (port, device) = accept_packets(2).await;

        let mut controller = ControllerBuilder::new("127.0.0.1").port(port).build();
        controller.on().await.unwrap();
        controller.disconnect().await.unwrap();
        assert!(!controller.is_connected());

        controller.off().await.unwrap();
        assert!(controller.is_connected());

        let packets = device.await.unwrap();
        assert_eq!(packets, vec![commands::cmd_power_on(), commands::cmd_power_off()]);
    }

    #[tokio::test]
    async fn reconnects_after_peer_closes_link() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let device = tokio::spawn(async move {
            let (first, _) = listener.accept().await.unwrap();
            drop(first);
            let (mut second, _) = listener.accept().await.unwrap();
            let mut packet = [0u8; 4];
            second.read_exact(&mut packet).await.unwrap();
            packet
        });

        let mut controller = ControllerBuilder::new("127.0.0.1").port(port).build();

        // Writes into a closed socket succeed until the peer's reset lands.
        let mut failed = false;
        for _ in 0..100 {
            match controller.off().await {
                Ok(()) => tokio::time::sleep(Duration::from_millis(20)).await,
                Err(e) => {
                    assert!(matches!(e, Error::Send(_)), "got: {:?}", e);
                    failed = true;
                    break;
                }
            }
        }
        assert!(failed, "writes to a closed link never failed");
        assert!(!controller.is_connected());

        controller.on().await.unwrap();
        assert_eq!(device.await.unwrap(), [0x71, 0x23, 0x0F, 0xB3]);
    }

    #[tokio::test]
    async fn connection_refused_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut controller = ControllerBuilder::new("127.0.0.1").port(port).build();
        let result = controller.on().await;
        assert!(
            matches!(result, Err(Error::Connection(_))),
            "expected Connection, got: {:?}",
            result
        );
        assert!(!controller.is_connected());
    }
}
