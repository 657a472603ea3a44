// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary on/off signal state.

use std::fmt;

/// State of a monitored binary signal (compressor, fan, immersion heater).
///
/// Telemetry encodes these as integers where exactly `1` means on and any
/// other value means off.
///
/// # Examples
///
/// ```
/// use particle_bridge::types::SignalState;
///
/// assert_eq!(SignalState::from_code(1), SignalState::On);
/// assert_eq!(SignalState::from_code(0), SignalState::Off);
/// assert_eq!(SignalState::from_code(7), SignalState::Off);
/// assert_eq!(SignalState::On.as_str(), "On");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalState {
    /// Signal is off.
    #[default]
    Off,
    /// Signal is on.
    On,
}

impl SignalState {
    /// Decodes the `1` / not-`1` telemetry convention.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        if code == 1 { Self::On } else { Self::Off }
    }

    /// Returns the capability text for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::On => "On",
        }
    }

    /// Returns true if the signal is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for SignalState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_means_on() {
        assert!(SignalState::from_code(1).is_on());
        assert!(!SignalState::from_code(0).is_on());
        assert!(!SignalState::from_code(-1).is_on());
        assert!(!SignalState::from_code(2).is_on());
    }

    #[test]
    fn display_matches_capability_text() {
        assert_eq!(SignalState::On.to_string(), "On");
        assert_eq!(SignalState::Off.to_string(), "Off");
    }

    #[test]
    fn from_bool() {
        assert_eq!(SignalState::from(true), SignalState::On);
        assert_eq!(SignalState::from(false), SignalState::Off);
    }
}
