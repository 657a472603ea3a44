// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heat-pump operating mode.

use std::fmt;

/// Operating mode reported in the `heater_state` field.
///
/// # Examples
///
/// ```
/// use particle_bridge::telemetry::HeaterMode;
///
/// assert_eq!(HeaterMode::from_code(2), HeaterMode::ForcedHeating);
/// assert_eq!(HeaterMode::from_code(2).description(), "Forced heating");
/// assert_eq!(HeaterMode::from_code(42), HeaterMode::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaterMode {
    /// Heater is switched off (`-1`).
    Disabled,
    /// Normal operation (`0`).
    Standard,
    /// Actively heating (`1`).
    Heating,
    /// Heating forced on (`2`).
    ForcedHeating,
    /// Any other code.
    Unknown,
}

impl HeaterMode {
    /// Maps the raw mode code.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            -1 => Self::Disabled,
            0 => Self::Standard,
            1 => Self::Heating,
            2 => Self::ForcedHeating,
            _ => Self::Unknown,
        }
    }

    /// Human-readable description shown in the `heater_state` capability.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Standard => "Standard",
            Self::Heating => "Heating",
            Self::ForcedHeating => "Forced heating",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HeaterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(HeaterMode::from_code(-1), HeaterMode::Disabled);
        assert_eq!(HeaterMode::from_code(0), HeaterMode::Standard);
        assert_eq!(HeaterMode::from_code(1), HeaterMode::Heating);
        assert_eq!(HeaterMode::from_code(2), HeaterMode::ForcedHeating);
    }

    #[test]
    fn other_codes_are_unknown() {
        for code in [-2, 3, 100, i64::MIN] {
            assert_eq!(HeaterMode::from_code(code), HeaterMode::Unknown);
        }
    }

    #[test]
    fn descriptions_are_distinct() {
        let all = [
            HeaterMode::Disabled,
            HeaterMode::Standard,
            HeaterMode::Heating,
            HeaterMode::ForcedHeating,
            HeaterMode::Unknown,
        ];
        let mut texts: Vec<&str> = all.iter().map(HeaterMode::description).collect();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), 5);
    }
}
