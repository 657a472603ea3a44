// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data returned by the Particle cloud.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full status of a cloud device, as returned by `GET /v1/devices/{id}`.
///
/// # Examples
///
/// ```
/// use particle_bridge::cloud::DeviceInfo;
///
/// let json = r#"{"id":"e00fce68","name":"heatpump","connected":true,
///     "last_heard":"2026-10-18T12:00:00Z","functions":["led"],
///     "variables":{"temp":"double"}}"#;
/// let info: DeviceInfo = serde_json::from_str(json).unwrap();
///
/// assert!(info.connected);
/// assert_eq!(info.function_names(), ["led"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable device identifier.
    pub id: String,
    /// Name given to the device in the cloud console.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the device is currently online.
    #[serde(default)]
    pub connected: bool,
    /// Last time the cloud heard from the device.
    #[serde(default)]
    pub last_heard: Option<DateTime<Utc>>,
    /// Last public IP address of the device.
    #[serde(default)]
    pub last_ip_address: Option<String>,
    /// Hardware serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Device OS version.
    #[serde(default)]
    pub system_firmware_version: Option<String>,
    /// Exposed variables, name to type (`int`, `double`, `string`, `bool`).
    #[serde(default)]
    pub variables: Option<BTreeMap<String, String>>,
    /// Exposed function names.
    #[serde(default)]
    pub functions: Option<Vec<String>>,
}

impl DeviceInfo {
    /// Returns the exposed function names (empty when the device reports none).
    #[must_use]
    pub fn function_names(&self) -> &[String] {
        self.functions.as_deref().unwrap_or_default()
    }

    /// Iterates over exposed variables as `(name, type)` pairs.
    pub fn variable_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .flatten()
            .map(|(name, kind)| (name.as_str(), kind.as_str()))
    }
}

/// Device entry returned by `GET /v1/devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Stable device identifier.
    pub id: String,
    /// Device name, if one was assigned.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the device is currently online.
    #[serde(default)]
    pub connected: bool,
}

impl DeviceSummary {
    /// Name to show in listings, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Result of invoking a cloud function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionResponse {
    /// HTTP-style status: 200 on success, 400 when the device is offline.
    pub status_code: u16,
    /// Integer returned by the device function.
    pub return_value: Option<i64>,
}

impl FunctionResponse {
    /// Local sentinel for calls attempted while the device is offline.
    pub const OFFLINE: Self = Self::failed(400);

    /// A failed call with the given status and no return value.
    #[must_use]
    pub const fn failed(status_code: u16) -> Self {
        Self {
            status_code,
            return_value: None,
        }
    }

    /// Returns true for status 200.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// One event received on a device event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    /// Event name, e.g. `house/ivt/data`.
    pub name: Option<String>,
    /// Opaque event payload.
    pub data: Option<String>,
    /// When the device published the event.
    pub published_at: Option<DateTime<Utc>>,
    /// Id of the publishing device.
    pub core_id: Option<String>,
}

impl RawEvent {
    /// Creates an event with a name and payload.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            data: Some(data.into()),
            ..Self::default()
        }
    }
}

/// A function listed for the function-call action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFunction {
    /// Owning device.
    pub device_id: String,
    /// Function name.
    pub name: String,
    /// Display name of the owning device.
    pub device_name: String,
}

/// A variable listed for the variable condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudVariable {
    /// Owning device.
    pub device_id: String,
    /// Variable name.
    pub name: String,
    /// Declared type (`int`, `double`, `string`, `bool`).
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_info_tolerates_nulls() {
        let json = r#"{"id":"abc","connected":false,"functions":null,"variables":null,"last_heard":null}"#;
        let info: DeviceInfo = serde_json::from_str(json).unwrap();
        assert!(info.function_names().is_empty());
        assert_eq!(info.variable_types().count(), 0);
        assert!(info.last_heard.is_none());
    }

    #[test]
    fn device_info_parses_timestamps() {
        let json = r#"{"id":"abc","last_heard":"2026-10-18T15:04:05.123Z"}"#;
        let info: DeviceInfo = serde_json::from_str(json).unwrap();
        let heard = info.last_heard.unwrap();
        assert_eq!(heard.format("%H:%M:%S").to_string(), "15:04:05");
    }

    #[test]
    fn summary_display_name_falls_back_to_id() {
        let summary: DeviceSummary =
            serde_json::from_str(r#"{"id":"abc","name":null,"connected":true}"#).unwrap();
        assert_eq!(summary.display_name(), "abc");
    }

    #[test]
    fn offline_sentinel() {
        assert_eq!(FunctionResponse::OFFLINE.status_code, 400);
        assert!(!FunctionResponse::OFFLINE.is_success());
        assert!(FunctionResponse {
            status_code: 200,
            return_value: Some(1)
        }
        .is_success());
    }
}
