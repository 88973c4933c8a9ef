// ledwifi test application -- CLI tool for finding Wi-Fi LED controllers
// on the LAN and sending them commands.
//
// Usage:
//   ledwifi-test-app discover
//   ledwifi-test-app --timeout 3 discover --dedupe
//   ledwifi-test-app --host 192.168.1.42 on
//   ledwifi-test-app --host 192.168.1.42 color 1.0 0.5 0.0
//   ledwifi-test-app --host 192.168.1.42 color 0 0 1 --temporary
//   ledwifi-test-app --host 192.168.1.42 status
//   ledwifi-test-app all-on
//
// Set RUST_LOG=trace to see every packet on the wire.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledwifi::Rgb;
use ledwifi::hf::{CONTROL_PORT, Controller, ControllerBuilder, Discoverer};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// ledwifi test application -- discovers and drives LED controllers.
#[derive(Parser, Debug)]
#[command(name = "ledwifi-test-app", version, about)]
struct Cli {
    /// Discovery window in seconds.
    #[arg(long, default_value_t = 1.0, value_parser = parse_seconds)]
    timeout: f64,

    /// Controller IP address or hostname.
    /// Required for `on`, `off`, `color` and `status`.
    #[arg(long)]
    host: Option<String>,

    /// Control port on the device.
    #[arg(long, default_value_t = CONTROL_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Broadcast a discovery probe and list the devices that answer.
    Discover {
        /// Keep only the first reply from each hardware address.
        #[arg(long)]
        dedupe: bool,
    },

    /// Switch the device on.
    On,

    /// Switch the device off.
    Off,

    /// Set the RGB color. Channels range from 0.0 to 1.0.
    Color {
        #[arg(value_parser = parse_channel)]
        r: f64,
        #[arg(value_parser = parse_channel)]
        g: f64,
        #[arg(value_parser = parse_channel)]
        b: f64,

        /// Do not store the color in the device's memory.
        #[arg(long)]
        temporary: bool,
    },

    /// Query the device and print its reply.
    Status,

    /// Discover every device and switch each one on.
    AllOn,
}

/// Parse a color channel, rejecting values outside `[0.0, 1.0]`.
fn parse_channel(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("invalid number: {e}"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{value} is outside 0.0..=1.0"));
    }
    Ok(value)
}

/// Parse a non-negative number of seconds.
fn parse_seconds(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("invalid number: {e}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{value} is not a valid duration"));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn discovery_window(cli: &Cli) -> Duration {
    Duration::from_secs_f64(cli.timeout)
}

/// Build a controller for `--host`, failing if it was not given.
fn controller(cli: &Cli) -> Result<Controller> {
    let Some(host) = cli.host.as_deref() else {
        bail!("--host is required for this command");
    };
    Ok(ControllerBuilder::new(host).port(cli.port).build())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_discover(cli: &Cli, dedupe: bool) -> Result<()> {
    let window = discovery_window(cli);
    println!("Discovering LED controllers on the LAN ({:.1} s)...", window.as_secs_f64());
    println!();

    let devices = Discoverer::new(window)
        .dedupe(dedupe)
        .discover()
        .await
        .context("discovery failed")?;

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(());
    }

    println!("{:<16}  {:<14}  Model", "IP Address", "MAC");
    println!("{:<16}  {:<14}  {}", "-".repeat(16), "-".repeat(14), "-".repeat(16));
    for device in &devices {
        println!(
            "{:<16}  {:<14}  {}",
            device.ip_address, device.hardware_address, device.model
        );
    }

    println!();
    println!("{} device(s) found.", devices.len());
    Ok(())
}

async fn cmd_power(cli: &Cli, on: bool) -> Result<()> {
    let mut controller = controller(cli)?;
    let result = if on {
        controller.on().await
    } else {
        controller.off().await
    };
    result.with_context(|| format!("failed to switch {}", controller.addr()))?;

    println!("{}: {}", controller.addr(), if on { "on" } else { "off" });
    controller.disconnect().await.ok();
    Ok(())
}

async fn cmd_color(cli: &Cli, color: Rgb, persist: bool) -> Result<()> {
    let mut controller = controller(cli)?;
    controller
        .set_color(color, persist)
        .await
        .with_context(|| format!("failed to set color on {}", controller.addr()))?;

    println!("{}: {color}", controller.addr());
    controller.disconnect().await.ok();
    Ok(())
}

async fn cmd_status(cli: &Cli) -> Result<()> {
    let mut controller = controller(cli)?;
    let reply = controller
        .status()
        .await
        .with_context(|| format!("status query to {} failed", controller.addr()))?;

    println!("{}: {reply}", controller.addr());
    println!("raw: {:02X?}", reply.raw);
    controller.disconnect().await.ok();
    Ok(())
}

async fn cmd_all_on(cli: &Cli) -> Result<()> {
    let devices = Discoverer::new(discovery_window(cli))
        .discover()
        .await
        .context("discovery failed")?;

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(());
    }

    let mut failures = 0;
    for device in &devices {
        println!("{device}");
        let mut controller = ControllerBuilder::new("")
            .device(device)
            .port(cli.port)
            .build();
        match controller.on().await {
            Ok(()) => println!("  -> on"),
            Err(e) => {
                failures += 1;
                println!("  -> failed: {e}");
            }
        }
        println!();
    }

    if failures > 0 {
        bail!("{failures} of {} device(s) could not be switched on", devices.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Discover { dedupe } => cmd_discover(&cli, *dedupe).await,
        Command::On => cmd_power(&cli, true).await,
        Command::Off => cmd_power(&cli, false).await,
        Command::Color { r, g, b, temporary } => {
            cmd_color(&cli, Rgb::new(*r, *g, *b), !*temporary).await
        }
        Command::Status => cmd_status(&cli).await,
        Command::AllOn => cmd_all_on(&cli).await,
    }
}
