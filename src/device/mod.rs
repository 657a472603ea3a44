// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device runtime.
//!
//! A bridged device is one actor (see [`DeviceHandle`]) built from four
//! parts:
//!
//! - [`DeviceStateReconciler`] turns polls and stream events into
//!   capability writes and flow triggers, and owns the duty-cycle counters
//!   of heat pumps.
//! - [`EventListener`] keeps the device event stream open and feeds it to
//!   the actor.
//! - [`PollingScheduler`] sends the periodic refresh and maintenance ticks.
//! - [`DeviceConfig`] / [`DeviceSettings`] describe the device and the
//!   user's settings.
//!
//! # Lifecycle
//!
//! | Step | Heater | Cloud device |
//! |------|--------|--------------|
//! | init | poll, timers, listener | resync, poll, timers, listener if `generate_device_events` |
//! | refresh tick | poll | poll (resync when it comes back online) |
//! | maintenance tick (hourly) | prune counters | - |
//! | settings change | new interval resets timers | also restarts the listener |
//! | delete | clear timers, stop listener | same |

mod capability_state;
mod config;
mod listener;
mod reconciler;
mod runtime;
mod scheduler;

pub use config::{DeviceConfig, DeviceKind, DeviceSettings, ReconnectionPolicy};
pub use listener::{EventListener, passthrough_tokens};
pub use reconciler::{CONNECTED, DeviceStateReconciler};
pub use runtime::{DeviceHandle, DeviceSnapshot};
pub use scheduler::{PollingScheduler, Tick};

pub(crate) use runtime::DeviceRuntime;
