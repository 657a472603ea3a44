// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Particle Bridge - mirrors Particle cloud devices into a smart-home hub.
//!
//! Each bridged device runs as its own task that polls the device cloud,
//! listens to the device's event stream and keeps the hub's capabilities,
//! settings and flow triggers in sync with what the cloud reports.
//!
//! # Supported Devices
//!
//! - **Cloud devices**: generic Particle devices exposing functions and
//!   variables, with optional event pass-through to flows
//! - **Heaters**: heat pumps publishing telemetry on [`telemetry::HEATER_EVENT`],
//!   with 24-hour start counts and average run times per signal
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use particle_bridge::cloud::CloudConfig;
//! use particle_bridge::device::DeviceConfig;
//! use particle_bridge::hub::MemoryHub;
//! use particle_bridge::DeviceManager;
//!
//! #[tokio::main]
//! async fn main() -> particle_bridge::Result<()> {
//!     let client = CloudConfig::new("my-access-token").into_client()?;
//!     let hub = Arc::new(MemoryHub::new());
//!     let mut triggers = hub.subscribe();
//!
//!     let manager = DeviceManager::new(Arc::new(client), Arc::clone(&hub));
//!     let device = manager
//!         .add_device(DeviceConfig::cloud_device("0123456789abcdef").with_device_events(true))
//!         .await;
//!
//!     let response = device.call_function("led", "on").await?;
//!     println!("led returned {:?}", response.return_value);
//!
//!     while let Ok(trigger) = triggers.recv().await {
//!         println!("{} {:?}", trigger.card(), trigger.tokens());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`cloud`]: the [`CloudClient`](cloud::CloudClient) seam and the REST/SSE client
//! - [`device`]: per-device runtime, timers, event listener and reconciler
//! - [`hub`]: the hub-facing traits and an in-memory hub
//! - [`flow`]: flow condition and action handlers
//! - [`counter`]: sliding-window duty-cycle counter
//! - [`telemetry`]: heat-pump payload decoding

pub mod cloud;
pub mod counter;
pub mod device;
pub mod error;
pub mod event;
pub mod flow;
pub mod hub;
pub mod manager;
pub mod telemetry;
pub mod types;

pub use counter::DutyCycleCounter;
pub use device::{DeviceConfig, DeviceHandle, DeviceKind, DeviceSettings, DeviceSnapshot};
pub use error::{CloudError, DecodeError, Error, FlowError, HubError, Result};
pub use event::{EventBus, FlowTrigger, TriggerCard};
pub use hub::{Hub, MemoryHub};
pub use manager::DeviceManager;
pub use types::{CapabilityValue, SignalState};
