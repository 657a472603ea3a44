// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory hub.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::{CapabilityStore, DeviceMetadata, SettingsStore, TriggerBus};
use crate::error::HubError;
use crate::event::{EventBus, FlowTrigger, Tokens, TriggerCard};
use crate::types::CapabilityValue;

/// Hub that keeps capabilities and settings in memory.
///
/// Triggers go out on an [`EventBus`]. Writes can be made to fail, which
/// is how tests check that a broken hub never stops a refresh.
///
/// # Examples
///
/// ```
/// use particle_bridge::hub::{CapabilityStore, MemoryHub};
/// use particle_bridge::types::CapabilityValue;
///
/// # tokio_test_block_on(async {
/// let hub = MemoryHub::new();
/// hub.set_capability("abc", "connected", CapabilityValue::Bool(true)).await.unwrap();
/// assert_eq!(hub.capability("abc", "connected"), Some(CapabilityValue::Bool(true)));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryHub {
    capabilities: RwLock<HashMap<String, BTreeMap<String, CapabilityValue>>>,
    settings: RwLock<HashMap<String, DeviceMetadata>>,
    bus: EventBus,
    capability_writes: AtomicUsize,
    fail_capabilities: AtomicBool,
    fail_settings: AtomicBool,
}

impl MemoryHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trigger bus.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribes to fired triggers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FlowTrigger> {
        self.bus.subscribe()
    }

    /// Returns the last value written to a capability.
    #[must_use]
    pub fn capability(&self, device_id: &str, key: &str) -> Option<CapabilityValue> {
        self.capabilities
            .read()
            .get(device_id)
            .and_then(|caps| caps.get(key))
            .cloned()
    }

    /// Returns every capability of a device.
    #[must_use]
    pub fn capabilities(&self, device_id: &str) -> BTreeMap<String, CapabilityValue> {
        self.capabilities
            .read()
            .get(device_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the last settings written for a device.
    #[must_use]
    pub fn settings(&self, device_id: &str) -> Option<DeviceMetadata> {
        self.settings.read().get(device_id).cloned()
    }

    /// Number of successful capability writes so far.
    #[must_use]
    pub fn capability_writes(&self) -> usize {
        self.capability_writes.load(Ordering::Relaxed)
    }

    /// Makes capability writes fail (or succeed again).
    pub fn fail_capability_writes(&self, fail: bool) {
        self.fail_capabilities.store(fail, Ordering::Relaxed);
    }

    /// Makes settings writes fail (or succeed again).
    pub fn fail_settings_writes(&self, fail: bool) {
        self.fail_settings.store(fail, Ordering::Relaxed);
    }
}

impl CapabilityStore for MemoryHub {
    async fn set_capability(
        &self,
        device_id: &str,
        key: &str,
        value: CapabilityValue,
    ) -> Result<(), HubError> {
        if self.fail_capabilities.load(Ordering::Relaxed) {
            return Err(HubError::Write {
                key: key.to_string(),
                message: "capability store unavailable".to_string(),
            });
        }

        self.capabilities
            .write()
            .entry(device_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.capability_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl SettingsStore for MemoryHub {
    async fn set_settings(&self, device_id: &str, metadata: &DeviceMetadata) -> Result<(), HubError> {
        if self.fail_settings.load(Ordering::Relaxed) {
            return Err(HubError::Write {
                key: "settings".to_string(),
                message: "settings store unavailable".to_string(),
            });
        }

        self.settings
            .write()
            .insert(device_id.to_string(), metadata.clone());
        Ok(())
    }
}

impl TriggerBus for MemoryHub {
    fn trigger_device(&self, device_id: &str, card: TriggerCard, tokens: Tokens) {
        self.bus.trigger_device(device_id, card, tokens);
    }

    fn trigger_global(&self, card: TriggerCard, tokens: Tokens) {
        self.bus.trigger_global(card, tokens);
    }
}
