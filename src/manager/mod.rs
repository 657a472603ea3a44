// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordination of all bridged devices.
//!
//! [`DeviceManager`] owns the shared cloud client and hub, spawns one
//! device actor per added device and keeps their handles. It also covers
//! the account-wide operations: the pairing list and publishing events.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use particle_bridge::cloud::CloudConfig;
//! use particle_bridge::device::DeviceConfig;
//! use particle_bridge::hub::MemoryHub;
//! use particle_bridge::manager::DeviceManager;
//!
//! # async fn example() -> particle_bridge::Result<()> {
//! let client = CloudConfig::new("my-access-token").into_client()?;
//! let manager = DeviceManager::new(Arc::new(client), Arc::new(MemoryHub::new()));
//!
//! for device in manager.pairable_devices().await? {
//!     println!("{} ({})", device.display_name(), device.id);
//! }
//!
//! let heater = manager.add_device(DeviceConfig::heater("e00fce68")).await;
//! heater.refresh().await?;
//! # Ok(())
//! # }
//! ```

mod device_manager;

pub use device_manager::DeviceManager;
