//! Discovery feeding controllers, end to end over loopback.
//!
//! A mock responder answers the probe with a device whose address points at
//! a mock control port; the controller built from the discovered descriptor
//! must then deliver the expected packets to that port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ledwifi::hf::{self, ControllerBuilder, Discoverer, DISCOVERY_PROBE};
use ledwifi::{BroadcastSink, Direction, Error, Rgb};
use ledwifi_test_harness::{MockDiscoveryResponder, MockTcpServer};

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

async fn responder(replies: &[&[u8]]) -> MockDiscoveryResponder {
    let mut responder = MockDiscoveryResponder::new(DISCOVERY_PROBE.as_bytes())
        .await
        .unwrap();
    for reply in replies {
        responder.reply(reply);
    }
    responder.start();
    responder
}

#[tokio::test]
async fn discovered_device_can_be_switched_on() {
    let responder = responder(&[b"127.0.0.1,ACCF23000001,HF-LPB100-ZJ200\r\n"]).await;

    let devices = Discoverer::new(Duration::from_millis(300))
        .bind_addr(loopback())
        .target(responder.addr())
        .discover()
        .await
        .unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].ip_address, "127.0.0.1");
    assert_eq!(devices[0].hardware_address, "ACCF23000001");
    assert_eq!(devices[0].model, "HF-LPB100-ZJ200");

    let mut server = MockTcpServer::new().await.unwrap();
    server.expect_write(&[0x71, 0x23, 0x0F, 0xB3]);
    server.expect_write(&[0x31, 0xFF, 0x80, 0x00, 0x00, 0x00, 0xF0, 0x0F, 0xAF]);
    server.expect(&[0x71, 0x24, 0x0F, 0xB4], b"+ok");
    server.expect_write(&[0x71, 0x24, 0x0F, 0xB4]);
    server.start();

    let mut controller = ControllerBuilder::new("unused")
        .device(&devices[0])
        .port(server.port())
        .build();

    controller.on().await.unwrap();
    controller
        .set_color(Rgb::new(1.0, 0.5, 0.0), true)
        .await
        .unwrap();
    let reply = controller.status().await.unwrap();
    assert_eq!(reply.text, "+ok");
    controller.off().await.unwrap();

    server.wait().await.unwrap();
    assert_eq!(responder.probes_seen(), 1);
}

#[tokio::test]
async fn every_discovered_device_gets_its_own_controller() {
    let responder = responder(&[
        b"127.0.0.1,ACCF23000001,LEDStrip1",
        b"127.0.0.1,ACCF23000002,LEDStrip2",
    ])
    .await;

    let devices = Discoverer::new(Duration::from_millis(300))
        .bind_addr(loopback())
        .target(responder.addr())
        .discover()
        .await
        .unwrap();
    assert_eq!(devices.len(), 2);

    for device in &devices {
        let mut server = MockTcpServer::new().await.unwrap();
        server.expect_write(&hf::commands::cmd_power_on());
        server.start();

        let mut controller = ControllerBuilder::new("unused")
            .device(device)
            .port(server.port())
            .build();
        controller.on().await.unwrap();

        server.wait().await.unwrap();
    }
}

#[tokio::test]
async fn wire_events_follow_the_session() {
    let sink = Arc::new(BroadcastSink::new(16));
    let mut events = sink.subscribe();

    let mut server = MockTcpServer::new().await.unwrap();
    server.expect_write(&hf::commands::cmd_power_on());
    server.expect_write(&hf::commands::cmd_set_color(Rgb::WHITE, false));
    server.start();

    let mut controller = ControllerBuilder::new("127.0.0.1")
        .port(server.port())
        .sink(sink)
        .build();
    controller.on().await.unwrap();
    controller.set_color(Rgb::WHITE, false).await.unwrap();
    server.wait().await.unwrap();

    let first = events.recv().await.unwrap();
    assert_eq!(first.direction, Direction::Sent);
    assert_eq!(first.bytes, hf::commands::cmd_power_on());

    let second = events.recv().await.unwrap();
    assert_eq!(second.bytes[0], 0x41);
    assert!(hf::commands::verify_checksum(&second.bytes));
}

#[tokio::test]
async fn unreachable_device_reports_connection_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut controller = ControllerBuilder::new("127.0.0.1")
        .port(port)
        .connect_timeout(Duration::from_secs(1))
        .build();

    let result = controller.set_color(Rgb::RED, true).await;
    assert!(matches!(result, Err(Error::Connection(_))), "got: {:?}", result);
}
