// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the bridge.
//!
//! # Types
//!
//! - [`SignalState`] - On/Off state of a monitored binary signal
//! - [`CapabilityValue`] - Loosely typed value held by a hub capability
//! - [`format_run_time`] - Compact duration text for run-time capabilities

mod capability;
mod run_time;
mod signal;

pub use capability::CapabilityValue;
pub use run_time::format_run_time;
pub use signal::SignalState;
