//! Fade one controller from red to blue.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p ledwifi --example color_fade -- 192.168.1.42
//! ```

use std::time::Duration;

use ledwifi::Rgb;
use ledwifi::hf::ControllerBuilder;

const STEPS: u32 = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let host = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: color_fade <host>"))?;

    let mut controller = ControllerBuilder::new(&host)
        .connect_timeout(Duration::from_secs(2))
        .build();

    controller.on().await?;
    for step in 0..=STEPS {
        let t = f64::from(step) / f64::from(STEPS);
        let color = Rgb::new(1.0 - t, 0.0, t);
        println!("{color}");
        // Temporary colors are not written to the device's flash.
        controller.set_color(color, false).await?;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    controller.set_color(Rgb::BLUE, true).await?;
    controller.disconnect().await?;

    Ok(())
}
