// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager for coordinating multiple bridged devices.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cloud::{CloudClient, CloudFunction, CloudVariable, DeviceSummary};
use crate::device::{DeviceConfig, DeviceHandle, DeviceRuntime};
use crate::error::{Error, Result};
use crate::hub::Hub;

/// Manager for all bridged devices of one account.
///
/// Devices run independently of each other; the manager only keeps their
/// handles. Cloning the client and hub into each device is cheap because
/// both are shared through [`Arc`].
#[derive(Debug)]
pub struct DeviceManager<C, H> {
    client: Arc<C>,
    hub: Arc<H>,
    devices: Arc<RwLock<HashMap<String, DeviceHandle>>>,
}

impl<C: CloudClient, H: Hub> DeviceManager<C, H> {
    /// Creates a manager with no devices.
    #[must_use]
    pub fn new(client: Arc<C>, hub: Arc<H>) -> Self {
        Self {
            client,
            hub,
            devices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the shared cloud client.
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Returns the shared hub.
    #[must_use]
    pub fn hub(&self) -> &Arc<H> {
        &self.hub
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Starts a device and returns its handle.
    ///
    /// A device already running under the same id is deleted first.
    pub async fn add_device(&self, config: DeviceConfig) -> DeviceHandle {
        let device_id = config.id.clone();
        let mut devices = self.devices.write().await;

        // The old actor must be gone before the new one starts writing.
        if let Some(previous) = devices.remove(&device_id) {
            tracing::info!(%device_id, "Replacing existing device");
            let _ = previous.delete().await;
        }

        let handle = DeviceRuntime::spawn(Arc::clone(&self.client), Arc::clone(&self.hub), config);
        devices.insert(device_id.clone(), handle.clone());
        drop(devices);

        tracing::info!(%device_id, kind = ?handle.kind(), "Device added");
        handle
    }

    /// Deletes a device.
    ///
    /// Returns `true` if the device was found.
    pub async fn remove_device(&self, device_id: &str) -> bool {
        let removed = self.devices.write().await.remove(device_id);
        match removed {
            Some(handle) => {
                // Already stopped is fine, it is gone either way.
                let _ = handle.delete().await;
                tracing::info!(%device_id, "Device removed");
                true
            }
            None => false,
        }
    }

    /// Returns the handle of a device.
    pub async fn device(&self, device_id: &str) -> Option<DeviceHandle> {
        self.devices.read().await.get(device_id).cloned()
    }

    /// Returns the ids of all devices, sorted.
    pub async fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.devices.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Deletes every device.
    pub async fn shutdown(&self) {
        let handles: Vec<DeviceHandle> = self.devices.write().await.drain().map(|(_, h)| h).collect();
        for handle in handles {
            let _ = handle.delete().await;
        }
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Lists the devices that can be added: online ones only, sorted by
    /// name without regard to case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDevicesFound`] if the cloud could not be asked,
    /// which in practice means the access token is wrong.
    pub async fn pairable_devices(&self) -> Result<Vec<DeviceSummary>> {
        let devices = self.client.list_devices().await.map_err(|e| {
            tracing::warn!(error = %e, "List devices call failed");
            Error::NoDevicesFound
        })?;

        let mut pairable: Vec<DeviceSummary> = devices.into_iter().filter(|d| d.connected).collect();
        pairable.sort_by_cached_key(|d| d.display_name().to_lowercase());
        Ok(pairable)
    }

    /// Publishes an event on behalf of the account.
    ///
    /// Returns `true` when the cloud acknowledged it; failures are logged
    /// and reported as `false`.
    pub async fn publish_event(&self, name: &str, data: &str, private: bool) -> bool {
        match self.client.publish_event(name, data, private).await {
            Ok(ok) => {
                tracing::debug!(event = name, ok, "Event published");
                ok
            }
            Err(e) => {
                tracing::warn!(event = name, error = %e, "Failed to publish event");
                false
            }
        }
    }

    /// Every function of every running device, for flow action lists.
    pub async fn functions(&self) -> Vec<CloudFunction> {
        let mut functions = Vec::new();
        for handle in self.handles().await {
            if let Ok(snapshot) = handle.snapshot().await {
                functions.extend(snapshot.functions);
            }
        }
        functions
    }

    /// Every variable of every running device, for flow condition lists.
    pub async fn variables(&self) -> Vec<CloudVariable> {
        let mut variables = Vec::new();
        for handle in self.handles().await {
            if let Ok(snapshot) = handle.snapshot().await {
                variables.extend(snapshot.variables);
            }
        }
        variables
    }

    async fn handles(&self) -> Vec<DeviceHandle> {
        let devices = self.devices.read().await;
        let mut handles: Vec<DeviceHandle> = devices.values().cloned().collect();
        handles.sort_by(|a, b| a.id().cmp(b.id()));
        handles
    }
}
