// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scriptable in-memory cloud used by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::{StreamExt, stream};
use parking_lot::Mutex;

use super::{
    CloudClient, DeviceInfo, DeviceSummary, EventStream, FunctionResponse, RawEvent,
    VariableValue,
};
use crate::error::CloudError;

#[derive(Debug, Default)]
pub(crate) struct MockCloud {
    device: Mutex<Option<DeviceInfo>>,
    variables: Mutex<HashMap<String, VariableValue>>,
    function_status: Mutex<Option<u16>>,
    events: Mutex<Vec<RawEvent>>,
    stream_fails: AtomicBool,
    end_streams: AtomicBool,
    devices: Mutex<Option<Vec<DeviceSummary>>>,
    publish_ok: AtomicBool,
    published: Mutex<Vec<(String, String, bool)>>,
    pub get_device_calls: AtomicUsize,
    pub get_variable_calls: AtomicUsize,
    pub call_function_calls: AtomicUsize,
    pub stream_opens: AtomicUsize,
}

impl MockCloud {
    /// A cloud knowing one device with a `led` function and a `temp` variable.
    pub(crate) fn with_device(id: &str, connected: bool) -> Self {
        let info = DeviceInfo {
            id: id.to_string(),
            name: Some("photon".to_string()),
            connected,
            last_heard: "2026-10-18T15:04:05Z".parse().ok(),
            last_ip_address: Some("10.0.0.7".to_string()),
            serial_number: Some("PH-1234".to_string()),
            system_firmware_version: Some("5.5.0".to_string()),
            variables: Some(BTreeMap::from([("temp".to_string(), "double".to_string())])),
            functions: Some(vec!["led".to_string()]),
        };
        let mock = Self::default();
        *mock.device.lock() = Some(info);
        mock.publish_ok.store(true, Ordering::SeqCst);
        mock
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        if let Some(info) = self.device.lock().as_mut() {
            info.connected = connected;
        }
    }

    pub(crate) fn set_functions(&self, functions: &[&str]) {
        if let Some(info) = self.device.lock().as_mut() {
            info.functions = Some(functions.iter().map(ToString::to_string).collect());
        }
    }

    /// Makes `get_device` fail until a device is set again.
    pub(crate) fn fail_get_device(&self) {
        *self.device.lock() = None;
    }

    pub(crate) fn set_variable(&self, name: &str, value: VariableValue) {
        self.variables.lock().insert(name.to_string(), value);
    }

    /// Makes `call_function` fail with the given HTTP status.
    pub(crate) fn fail_functions_with(&self, status: u16) {
        *self.function_status.lock() = Some(status);
    }

    pub(crate) fn push_event(&self, event: RawEvent) {
        self.events.lock().push(event);
    }

    pub(crate) fn fail_streams(&self) {
        self.stream_fails.store(true, Ordering::SeqCst);
    }

    /// Streams end after delivering the queued events instead of idling.
    pub(crate) fn end_streams(&self) {
        self.end_streams.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_devices(&self, devices: Vec<DeviceSummary>) {
        *self.devices.lock() = Some(devices);
    }

    pub(crate) fn set_publish_ok(&self, ok: bool) {
        self.publish_ok.store(ok, Ordering::SeqCst);
    }

    pub(crate) fn published(&self) -> Vec<(String, String, bool)> {
        self.published.lock().clone()
    }
}

impl CloudClient for MockCloud {
    async fn get_device(&self, device_id: &str) -> Result<DeviceInfo, CloudError> {
        self.get_device_calls.fetch_add(1, Ordering::SeqCst);
        self.device
            .lock()
            .clone()
            .filter(|info| info.id == device_id)
            .ok_or_else(|| CloudError::Status {
                code: 404,
                message: "device not found".to_string(),
            })
    }

    async fn get_variable(
        &self,
        _device_id: &str,
        name: &str,
    ) -> Result<Option<VariableValue>, CloudError> {
        self.get_variable_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.variables.lock().get(name).cloned())
    }

    async fn call_function(
        &self,
        _device_id: &str,
        _name: &str,
        argument: &str,
    ) -> Result<FunctionResponse, CloudError> {
        self.call_function_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = *self.function_status.lock() {
            return Err(CloudError::Status {
                code,
                message: "function failed".to_string(),
            });
        }
        Ok(FunctionResponse {
            status_code: 200,
            return_value: argument.parse().ok(),
        })
    }

    async fn get_event_stream(&self, _device_id: &str) -> Result<EventStream, CloudError> {
        self.stream_opens.fetch_add(1, Ordering::SeqCst);
        if self.stream_fails.load(Ordering::SeqCst) {
            return Err(CloudError::Stream("refused".to_string()));
        }

        let events: Vec<Result<RawEvent, CloudError>> =
            self.events.lock().drain(..).map(Ok).collect();
        if self.end_streams.load(Ordering::SeqCst) {
            Ok(Box::pin(stream::iter(events)))
        } else {
            Ok(Box::pin(stream::iter(events).chain(stream::pending())))
        }
    }

    async fn publish_event(&self, name: &str, data: &str, private: bool) -> Result<bool, CloudError> {
        self.published
            .lock()
            .push((name.to_string(), data.to_string(), private));
        Ok(self.publish_ok.load(Ordering::SeqCst))
    }

    async fn list_devices(&self) -> Result<Vec<DeviceSummary>, CloudError> {
        self.devices
            .lock()
            .clone()
            .ok_or(CloudError::AuthenticationFailed)
    }
}
