//! Discover every controller on the LAN and switch each one on.
//!
//! Broadcasts the discovery probe, waits one second for replies, then
//! builds a controller per device and sends power-on.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p ledwifi --example discover_and_power_on
//! ```

use std::time::Duration;

use ledwifi::hf::{Controller, Discoverer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Searching for LED controllers for 1 s...");
    let devices = Discoverer::new(Duration::from_secs(1)).discover().await?;

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(());
    }

    for device in &devices {
        println!("{device}");
        let mut controller = Controller::for_device(device);
        match controller.on().await {
            Ok(()) => println!("  -> on"),
            Err(e) => println!("  -> failed: {e}"),
        }
        println!();
    }

    Ok(())
}
