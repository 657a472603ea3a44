// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The two kinds of device the bridge knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Generic cloud device: connection state, functions, variables and
    /// optional event passthrough.
    CloudDevice,
    /// Heat pump publishing `house/ivt/data` telemetry.
    Heater,
}

impl DeviceKind {
    /// Returns true for the heat pump variant.
    #[must_use]
    pub const fn is_heater(self) -> bool {
        matches!(self, Self::Heater)
    }
}

/// Configuration for one bridged device.
///
/// # Examples
///
/// ```
/// use particle_bridge::device::{DeviceConfig, DeviceKind};
///
/// let config = DeviceConfig::cloud_device("e00fce68")
///     .with_name("Garage door")
///     .with_refresh_interval(30)
///     .with_device_events(true);
///
/// assert_eq!(config.kind, DeviceKind::CloudDevice);
/// assert_eq!(config.display_name(), "Garage door");
/// assert!(config.settings.generate_device_events);
/// ```
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Cloud device id.
    pub id: String,
    /// Display name used in logs and trigger tokens.
    pub name: Option<String>,
    /// Device variant.
    pub kind: DeviceKind,
    /// User settings.
    pub settings: DeviceSettings,
    /// Event stream reconnection policy.
    pub reconnection: ReconnectionPolicy,
}

impl DeviceConfig {
    /// Configuration for a generic cloud device.
    #[must_use]
    pub fn cloud_device(id: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::CloudDevice)
    }

    /// Configuration for a heat pump.
    #[must_use]
    pub fn heater(id: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::Heater)
    }

    fn new(id: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            settings: DeviceSettings::default(),
            reconnection: ReconnectionPolicy::default(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces all user settings.
    #[must_use]
    pub fn with_settings(mut self, settings: DeviceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the refresh interval in seconds.
    #[must_use]
    pub fn with_refresh_interval(mut self, seconds: u64) -> Self {
        self.settings.refresh_interval = seconds;
        self
    }

    /// Enables or disables device event passthrough.
    #[must_use]
    pub fn with_device_events(mut self, enabled: bool) -> Self {
        self.settings.generate_device_events = enabled;
        self
    }

    /// Sets the event stream reconnection policy.
    #[must_use]
    pub fn with_reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.reconnection = policy;
        self
    }

    /// Name to show for the device, falling back to its id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// User-editable device settings, as stored by the hub.
///
/// # Examples
///
/// ```
/// use particle_bridge::device::DeviceSettings;
///
/// let settings: DeviceSettings =
///     serde_json::from_str(r#"{"refresh_interval":120,"generate_device_events":"yes"}"#).unwrap();
/// assert_eq!(settings.refresh_interval, 120);
/// assert!(settings.generate_device_events);
///
/// let defaults: DeviceSettings = serde_json::from_str("{}").unwrap();
/// assert_eq!(defaults.refresh_interval, 60);
/// assert!(!defaults.generate_device_events);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Status poll interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Forward device events to the `device_event` trigger (`"yes"`/`"no"`).
    #[serde(default, with = "yes_no")]
    pub generate_device_events: bool,
}

impl DeviceSettings {
    /// Default poll interval in seconds.
    pub const DEFAULT_REFRESH_INTERVAL: u64 = 60;

    /// Longest accepted poll interval in seconds (one week).
    pub const MAX_REFRESH_INTERVAL: u64 = 7 * 24 * 60 * 60;

    /// Poll period, clamped to `1..=MAX_REFRESH_INTERVAL` seconds.
    #[must_use]
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(
            self.refresh_interval
                .clamp(1, Self::MAX_REFRESH_INTERVAL),
        )
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Self::DEFAULT_REFRESH_INTERVAL,
            generate_device_events: false,
        }
    }
}

fn default_refresh_interval() -> u64 {
    DeviceSettings::DEFAULT_REFRESH_INTERVAL
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(super) fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(value == "yes")
    }
}

/// Automatic re-subscription of a device event stream.
///
/// Disabled by default: a stream that ends or fails stays down until the
/// listener is restarted by a settings change.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use particle_bridge::device::ReconnectionPolicy;
///
/// let policy = ReconnectionPolicy::default();
/// assert!(!policy.should_retry(0));
///
/// let policy = ReconnectionPolicy::enabled()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(30));
/// assert!(policy.should_retry(4));
/// assert!(!policy.should_retry(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectionPolicy {
    /// Whether the stream is reopened automatically.
    pub enabled: bool,
    /// Maximum consecutive attempts (None = unlimited).
    pub max_retries: Option<u32>,
    /// Delay before the first attempt.
    pub initial_delay: Duration,
    /// Upper bound for the backoff delay.
    pub max_delay: Duration,
    /// Multiplier applied per attempt.
    pub backoff_multiplier: f32,
}

impl ReconnectionPolicy {
    /// An enabled policy with the default backoff.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Sets the maximum number of consecutive attempts.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Retries forever.
    #[must_use]
    pub fn with_infinite_retries(mut self) -> Self {
        self.max_retries = None;
        self
    }

    /// Sets the delay before the first attempt.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the backoff ceiling.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Delay before attempt number `attempt` (zero based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let factor = self
            .backoff_multiplier
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));

        #[allow(clippy::cast_precision_loss)]
        let millis = self.initial_delay.as_millis() as f32 * factor;

        // Saturating: a huge factor becomes u64::MAX and is capped below.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(millis as u64);

        delay.min(self.max_delay)
    }

    /// Returns true if attempt number `attempt` may run.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.enabled && self.max_retries.is_none_or(|max| attempt < max)
    }
}

impl Default for ReconnectionPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: Some(10),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heater_config_defaults() {
        let config = DeviceConfig::heater("abc");
        assert!(config.kind.is_heater());
        assert_eq!(config.display_name(), "abc");
        assert_eq!(config.settings.refresh_period(), Duration::from_secs(60));
        assert!(!config.reconnection.enabled);
    }

    #[test]
    fn zero_refresh_interval_is_clamped() {
        let config = DeviceConfig::cloud_device("abc").with_refresh_interval(0);
        assert_eq!(config.settings.refresh_period(), Duration::from_secs(1));
    }

    #[test]
    fn huge_refresh_interval_is_capped() {
        let config = DeviceConfig::cloud_device("abc").with_refresh_interval(u64::MAX);
        assert_eq!(
            config.settings.refresh_period(),
            Duration::from_secs(DeviceSettings::MAX_REFRESH_INTERVAL)
        );
    }

    #[test]
    fn settings_serialize_as_yes_no() {
        let settings = DeviceSettings {
            refresh_interval: 10,
            generate_device_events: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"refresh_interval":10,"generate_device_events":"yes"}"#);
    }

    #[test]
    fn anything_but_yes_disables_events() {
        let settings: DeviceSettings =
            serde_json::from_str(r#"{"generate_device_events":"YES"}"#).unwrap();
        assert!(!settings.generate_device_events);
    }

    #[test]
    fn backoff_grows_and_is_capped() {
        let policy = ReconnectionPolicy::enabled()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(1));

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(1));
    }

    #[test]
    fn infinite_retries() {
        let policy = ReconnectionPolicy::enabled().with_infinite_retries();
        assert!(policy.should_retry(u32::MAX - 1));
    }
}
