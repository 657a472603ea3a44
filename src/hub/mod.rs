// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator traits for the home-automation hub.
//!
//! The runtime never owns hub state. It writes capability values and
//! device settings, and fires flow triggers, through the traits below.
//! A hub adapter implements all three; [`Hub`] is the bundle the runtime
//! is generic over.
//!
//! [`MemoryHub`] keeps everything in memory and publishes triggers on an
//! [`EventBus`](crate::event::EventBus). It backs the tests and the demo.

mod memory;

pub use memory::MemoryHub;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::cloud::DeviceInfo;
use crate::error::HubError;
use crate::event::{Tokens, TriggerCard};
use crate::types::CapabilityValue;

/// Stores capability values per device.
pub trait CapabilityStore: Send + Sync + 'static {
    /// Writes one capability value.
    fn set_capability(
        &self,
        device_id: &str,
        key: &str,
        value: CapabilityValue,
    ) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// Persists the read-only device settings shown to the user.
pub trait SettingsStore: Send + Sync + 'static {
    /// Writes the metadata gathered from the last poll.
    fn set_settings(
        &self,
        device_id: &str,
        metadata: &DeviceMetadata,
    ) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// Fires flow triggers. Delivery is fire-and-forget.
pub trait TriggerBus: Send + Sync + 'static {
    /// Fires a trigger card bound to one device.
    fn trigger_device(&self, device_id: &str, card: TriggerCard, tokens: Tokens);

    /// Fires an app-wide trigger card.
    fn trigger_global(&self, card: TriggerCard, tokens: Tokens);
}

/// Everything the runtime needs from the hub.
pub trait Hub: CapabilityStore + SettingsStore + TriggerBus {}

impl<T> Hub for T where T: CapabilityStore + SettingsStore + TriggerBus {}

/// Device settings refreshed on every successful poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetadata {
    /// Hardware serial number.
    pub serial_number: Option<String>,
    /// Device OS version.
    pub firmware_version: Option<String>,
    /// Last public IP address.
    pub last_ip_address: Option<String>,
    /// Human readable time the cloud last heard from the device.
    pub last_heard: String,
}

impl DeviceMetadata {
    /// Builds the metadata from a device status.
    ///
    /// # Examples
    ///
    /// ```
    /// use particle_bridge::cloud::DeviceInfo;
    /// use particle_bridge::hub::DeviceMetadata;
    ///
    /// let info = DeviceInfo {
    ///     id: "abc".to_string(),
    ///     last_heard: "2026-10-18T15:04:05Z".parse().ok(),
    ///     ..DeviceInfo::default()
    /// };
    /// let metadata = DeviceMetadata::from_info(&info);
    /// assert_eq!(metadata.last_heard, "Oct 18, 2026, 3:04:05 PM");
    /// ```
    #[must_use]
    pub fn from_info(info: &DeviceInfo) -> Self {
        Self {
            serial_number: info.serial_number.clone(),
            firmware_version: info.system_firmware_version.clone(),
            last_ip_address: info.last_ip_address.clone(),
            last_heard: format_last_heard(info.last_heard),
        }
    }
}

fn format_last_heard(last_heard: Option<DateTime<Utc>>) -> String {
    last_heard.map_or_else(
        || "Never".to_string(),
        |at| at.format("%b %-d, %Y, %-I:%M:%S %p").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_copies_info_fields() {
        let info = DeviceInfo {
            id: "abc".to_string(),
            serial_number: Some("PH-1".to_string()),
            system_firmware_version: Some("5.5.0".to_string()),
            last_ip_address: Some("10.0.0.7".to_string()),
            ..DeviceInfo::default()
        };
        let metadata = DeviceMetadata::from_info(&info);

        assert_eq!(metadata.serial_number.as_deref(), Some("PH-1"));
        assert_eq!(metadata.firmware_version.as_deref(), Some("5.5.0"));
        assert_eq!(metadata.last_ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(metadata.last_heard, "Never");
    }

    #[test]
    fn last_heard_morning_format() {
        let at = "2026-01-05T09:07:03Z".parse().ok();
        assert_eq!(format_last_heard(at), "Jan 5, 2026, 9:07:03 AM");
    }
}
