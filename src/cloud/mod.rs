// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to the Particle device cloud.
//!
//! The runtime only talks to the cloud through the [`CloudClient`] trait,
//! so tests and alternative transports can stand in for the real API.
//! [`ParticleClient`] (feature `http`) is the implementation backed by the
//! public REST API and its server-sent event stream.
//!
//! # Operations
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`get_device`](CloudClient::get_device) | `GET /v1/devices/{id}` |
//! | [`get_variable`](CloudClient::get_variable) | `GET /v1/devices/{id}/{name}` |
//! | [`call_function`](CloudClient::call_function) | `POST /v1/devices/{id}/{name}` |
//! | [`get_event_stream`](CloudClient::get_event_stream) | `GET /v1/devices/{id}/events` |
//! | [`publish_event`](CloudClient::publish_event) | `POST /v1/devices/events` |
//! | [`list_devices`](CloudClient::list_devices) | `GET /v1/devices` |

#[cfg(feature = "http")]
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod sse;
mod types;

#[cfg(feature = "http")]
pub use http::{CloudConfig, ParticleClient};
pub use types::{
    CloudFunction, CloudVariable, DeviceInfo, DeviceSummary, FunctionResponse, RawEvent,
};

use std::future::Future;
use std::pin::Pin;

use futures::Stream;

use crate::error::CloudError;

/// Value of a cloud variable (number, string or boolean).
pub type VariableValue = serde_json::Value;

/// Live stream of events published by one device.
///
/// Dropping the stream closes the subscription.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<RawEvent, CloudError>> + Send>>;

/// Operations the runtime needs from the device cloud.
///
/// Implementations carry their own credential, timeout and retry policy;
/// the runtime treats every call as a single attempt.
pub trait CloudClient: Send + Sync + 'static {
    /// Fetches the full status of a device.
    fn get_device(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<DeviceInfo, CloudError>> + Send;

    /// Reads a device variable. `Ok(None)` means the cloud returned no value.
    fn get_variable(
        &self,
        device_id: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<VariableValue>, CloudError>> + Send;

    /// Invokes a device function with a string argument.
    fn call_function(
        &self,
        device_id: &str,
        name: &str,
        argument: &str,
    ) -> impl Future<Output = Result<FunctionResponse, CloudError>> + Send;

    /// Opens the event stream of a device.
    fn get_event_stream(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<EventStream, CloudError>> + Send;

    /// Publishes an event on behalf of the account. Returns the cloud's `ok`.
    fn publish_event(
        &self,
        name: &str,
        data: &str,
        private: bool,
    ) -> impl Future<Output = Result<bool, CloudError>> + Send;

    /// Lists every device on the account.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<DeviceSummary>, CloudError>> + Send;
}
