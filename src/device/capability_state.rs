// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known capability values, for transition detection.

use std::collections::{BTreeMap, HashMap};

use crate::types::CapabilityValue;

/// Remembers the last value written to each capability of one device.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapabilityState {
    values: HashMap<String, CapabilityValue>,
}

impl CapabilityState {
    /// Returns the last recorded value.
    pub(crate) fn get(&self, key: &str) -> Option<&CapabilityValue> {
        self.values.get(key)
    }

    /// True when a previous value exists and differs loosely from `value`.
    ///
    /// The first value ever seen for a key is never a change.
    pub(crate) fn is_changed(&self, key: &str, value: &CapabilityValue) -> bool {
        self.values
            .get(key)
            .is_some_and(|old| !old.loosely_eq(value))
    }

    /// Records a value and returns the previous one.
    pub(crate) fn record(&mut self, key: &str, value: CapabilityValue) -> Option<CapabilityValue> {
        self.values.insert(key.to_string(), value)
    }

    /// Sorted copy of every recorded value.
    pub(crate) fn snapshot(&self) -> BTreeMap<String, CapabilityValue> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
