// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heat-pump telemetry decoding.
//!
//! Heater devices publish a snapshot of their sensors as a JSON payload on
//! the [`HEATER_EVENT`] event:
//!
//! ```json
//! {
//!   "compressor_on": 1, "fan_on": 1, "immersion_heater_on": 0,
//!   "floor_water_temp": 31.456, "outdoor_temp": -3.2, "indoor_temp": 21.0,
//!   "heater_state": 1
//! }
//! ```
//!
//! # Examples
//!
//! ```
//! use particle_bridge::telemetry::{HeaterMode, HeaterReading};
//! use particle_bridge::types::SignalState;
//!
//! let payload = r#"{"compressor_on":1,"fan_on":0,"immersion_heater_on":0,
//!     "floor_water_temp":31.456,"outdoor_temp":-3.2,"indoor_temp":21,
//!     "heater_state":1}"#;
//!
//! let reading = HeaterReading::from_json(payload).unwrap();
//! assert_eq!(reading.compressor, SignalState::On);
//! assert_eq!(reading.floor_water_temp, 31.46);
//! assert_eq!(reading.mode, HeaterMode::Heating);
//! ```

mod heater_mode;

pub use heater_mode::HeaterMode;

use serde::Deserialize;

use crate::error::DecodeError;
use crate::types::SignalState;

/// Name of the event carrying heat-pump telemetry.
pub const HEATER_EVENT: &str = "house/ivt/data";

/// Raw payload as published by the device.
///
/// All fields are optional at the serde level so that a missing field is
/// reported by name instead of as a generic JSON error.
#[derive(Debug, Clone, Default, Deserialize)]
struct HeaterPayload {
    #[serde(default)]
    compressor_on: Option<f64>,
    #[serde(default)]
    fan_on: Option<f64>,
    #[serde(default)]
    immersion_heater_on: Option<f64>,
    #[serde(default)]
    floor_water_temp: Option<f64>,
    #[serde(default)]
    outdoor_temp: Option<f64>,
    #[serde(default)]
    indoor_temp: Option<f64>,
    #[serde(default)]
    heater_state: Option<f64>,
}

/// The monitored binary signals of a heat pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaterSignal {
    /// Compressor.
    Compressor,
    /// Circulation fan.
    Fan,
    /// Electric immersion heater.
    ImmersionHeater,
}

impl HeaterSignal {
    /// Every signal, in capability order.
    pub const ALL: [Self; 3] = [Self::Compressor, Self::Fan, Self::ImmersionHeater];

    /// Suffix used in capability keys (`status.<key>`, `starts.<key>`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Compressor => "compressor",
            Self::Fan => "fan",
            Self::ImmersionHeater => "immersion_heater",
        }
    }
}

/// Normalized heat-pump telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterReading {
    /// Compressor power state.
    pub compressor: SignalState,
    /// Circulation fan power state.
    pub fan: SignalState,
    /// Immersion heater power state.
    pub immersion_heater: SignalState,
    /// Floor water temperature, rounded to 2 decimals.
    pub floor_water_temp: f64,
    /// Outdoor temperature, rounded to 2 decimals.
    pub outdoor_temp: f64,
    /// Indoor temperature, rounded to 2 decimals.
    pub indoor_temp: f64,
    /// Operating mode.
    pub mode: HeaterMode,
}

impl HeaterReading {
    /// Decodes the JSON payload of a [`HEATER_EVENT`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Json`] for malformed JSON or mistyped fields and
    /// [`DecodeError::MissingField`] when a field is absent or `null`.
    pub fn from_json(data: &str) -> Result<Self, DecodeError> {
        let payload: HeaterPayload = serde_json::from_str(data)?;

        Ok(Self {
            compressor: signal_state(required(payload.compressor_on, "compressor_on")?),
            fan: signal_state(required(payload.fan_on, "fan_on")?),
            immersion_heater: signal_state(required(
                payload.immersion_heater_on,
                "immersion_heater_on",
            )?),
            floor_water_temp: round2(required(payload.floor_water_temp, "floor_water_temp")?),
            outdoor_temp: round2(required(payload.outdoor_temp, "outdoor_temp")?),
            indoor_temp: round2(required(payload.indoor_temp, "indoor_temp")?),
            mode: integer_code(required(payload.heater_state, "heater_state")?)
                .map_or(HeaterMode::Unknown, HeaterMode::from_code),
        })
    }

    /// Returns the state of one monitored signal.
    #[must_use]
    pub fn signal(&self, signal: HeaterSignal) -> SignalState {
        match signal {
            HeaterSignal::Compressor => self.compressor,
            HeaterSignal::Fan => self.fan,
            HeaterSignal::ImmersionHeater => self.immersion_heater,
        }
    }
}

/// Decodes a named event, accepting only [`HEATER_EVENT`].
///
/// # Errors
///
/// Returns [`DecodeError::UnexpectedEvent`] for any other event name, or a
/// payload error from [`HeaterReading::from_json`].
pub fn decode_heater_event(name: &str, data: &str) -> Result<HeaterReading, DecodeError> {
    if name != HEATER_EVENT {
        return Err(DecodeError::UnexpectedEvent(name.to_string()));
    }
    HeaterReading::from_json(data)
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, DecodeError> {
    value.ok_or(DecodeError::MissingField(field))
}

fn signal_state(value: f64) -> SignalState {
    integer_code(value).map_or(SignalState::Off, SignalState::from_code)
}

/// Codes arrive as JSON numbers, so `1` and `1.0` are the same code.
/// Fractional or out-of-range values have no code.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn integer_code(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (value.fract() == 0.0 && value.abs() <= LIMIT).then(|| value as i64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
