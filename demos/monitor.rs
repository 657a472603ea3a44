// SPDX-License-Identifier: MPL-2.0

//! Device monitor example.
//!
//! Lists the online devices of an account, bridges one of them into an
//! in-memory hub and prints every flow trigger and capability change.
//!
//! The access token is read from `PARTICLE_ACCESS_TOKEN`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example monitor -- [device_id] [--heater]
//! ```
//!
//! # Example
//!
//! ```bash
//! PARTICLE_ACCESS_TOKEN=abc123 cargo run --example monitor
//! PARTICLE_ACCESS_TOKEN=abc123 RUST_LOG=particle_bridge=debug \
//!     cargo run --example monitor -- e00fce68 --heater
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use particle_bridge::cloud::CloudConfig;
use particle_bridge::device::DeviceConfig;
use particle_bridge::hub::MemoryHub;
use particle_bridge::DeviceManager;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("particle_bridge=info")),
        )
        .init();

    let Ok(token) = env::var("PARTICLE_ACCESS_TOKEN") else {
        eprintln!("PARTICLE_ACCESS_TOKEN is not set");
        std::process::exit(1);
    };
    let args: Vec<String> = env::args().skip(1).collect();
    let heater = args.iter().any(|a| a == "--heater");
    let device_id = args.iter().find(|a| !a.starts_with("--")).cloned();

    let hub = Arc::new(MemoryHub::new());
    let client = CloudConfig::new(token).into_client()?;
    let manager = DeviceManager::new(Arc::new(client), Arc::clone(&hub));

    println!("=== Online Devices ===");
    let devices = manager.pairable_devices().await?;
    for device in &devices {
        println!("  {:<24} {}", device.display_name(), device.id);
    }
    println!();

    let Some(device_id) = device_id.or_else(|| devices.first().map(|d| d.id.clone())) else {
        println!("No device to monitor");
        return Ok(());
    };

    let config = if heater {
        DeviceConfig::heater(&device_id)
    } else {
        DeviceConfig::cloud_device(&device_id).with_device_events(true)
    }
    .with_refresh_interval(30);

    let mut triggers = hub.subscribe();
    let device = manager.add_device(config).await;
    println!("Monitoring {device_id} (Ctrl+C to stop)");

    let mut report = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            trigger = triggers.recv() => match trigger {
                Ok(trigger) => println!("[trigger] {} {:?}", trigger.card(), trigger.tokens()),
                Err(e) => eprintln!("trigger stream: {e}"),
            },
            _ = report.tick() => {
                let snapshot = device.snapshot().await?;
                println!("[state] online={}", snapshot.is_online());
                for (key, value) in &snapshot.capabilities {
                    println!("  {key:<36} {value}");
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    manager.shutdown().await;
    Ok(())
}
