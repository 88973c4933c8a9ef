//! Print every packet exchanged with a controller.
//!
//! Installs a [`BroadcastSink`] and prints the wire events it publishes
//! while the controller is switched on, queried, and switched off.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p ledwifi --example watch_traffic -- 192.168.1.42
//! ```

use std::sync::Arc;

use ledwifi::BroadcastSink;
use ledwifi::hf::ControllerBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let host = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: watch_traffic <host>"))?;

    let sink = Arc::new(BroadcastSink::new(32));
    let mut events = sink.subscribe();

    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("{} {} {:02X?}", event.direction, event.peer, event.bytes);
        }
    });

    let mut controller = ControllerBuilder::new(&host).sink(sink).build();
    controller.on().await?;
    match controller.status().await {
        Ok(reply) => println!("status: {reply}"),
        Err(e) => println!("status failed: {e}"),
    }
    controller.off().await?;

    // Dropping the controller drops the last sender, which ends the printer.
    drop(controller);
    printer.await?;
    Ok(())
}
