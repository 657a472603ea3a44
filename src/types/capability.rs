// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability values stored on the hub side.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SignalState;

/// A value held by a hub capability.
///
/// Hubs store capabilities as loosely typed values, so comparisons between
/// an old and a new value use [`loosely_eq`](Self::loosely_eq) rather than
/// strict equality: `true` equals `1`, and `"21.5"` equals `21.5`.
///
/// # Examples
///
/// ```
/// use particle_bridge::types::CapabilityValue;
///
/// let a = CapabilityValue::Bool(true);
/// let b = CapabilityValue::Number(1.0);
/// assert!(a.loosely_eq(&b));
///
/// let t = CapabilityValue::from("21.50");
/// assert!(t.loosely_eq(&CapabilityValue::Number(21.5)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    /// Boolean capability (e.g. `connected`).
    Bool(bool),
    /// Numeric capability (temperatures, counts).
    Number(f64),
    /// Text capability (states, formatted durations).
    Text(String),
}

impl CapabilityValue {
    /// Compares two values the way the hub does when detecting changes.
    #[must_use]
    pub fn loosely_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
                _ => false,
            },
        }
    }

    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Returns the boolean value, if this is a boolean capability.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text value, if this is a text capability.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CapabilityValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for CapabilityValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for CapabilityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CapabilityValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<SignalState> for CapabilityValue {
    fn from(value: SignalState) -> Self {
        Self::Text(value.as_str().to_string())
    }
}
