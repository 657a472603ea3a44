// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! The hierarchy mirrors the boundaries of the runtime: talking to the
//! cloud, decoding telemetry, writing to the hub and running flow cards.
//! Background work (polls, event streams) converts these into log lines;
//! user-facing flow cards surface them as rejection messages.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to the cloud.
    #[error("cloud error: {0}")]
    Cloud(#[from] CloudError),

    /// Error occurred while decoding a telemetry payload.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error occurred while writing to the hub.
    #[error("hub error: {0}")]
    Hub(#[from] HubError),

    /// A flow card rejected its arguments or failed.
    #[error("flow error: {0}")]
    Flow(#[from] FlowError),

    /// Device was not found in the manager (or has been deleted).
    #[error("device not found")]
    DeviceNotFound,

    /// The cloud returned no devices that can be added.
    #[error("No cloud devices were found, please check your api token")]
    NoDevicesFound,
}

/// Errors related to cloud communication.
#[derive(Debug, Error)]
pub enum CloudError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The cloud answered with a non-success status.
    #[error("cloud returned HTTP {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body or canonical reason.
        message: String,
    },

    /// The access token was rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Invalid base URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The event stream broke or could not be read.
    #[error("event stream error: {0}")]
    Stream(String),
}

impl CloudError {
    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::AuthenticationFailed => Some(401),
            #[cfg(feature = "http")]
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors related to decoding telemetry payloads.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(&'static str),

    /// The event is not one this decoder understands.
    #[error("unexpected event: {0}")]
    UnexpectedEvent(String),
}

/// Errors related to writing hub state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// A capability or setting could not be written.
    #[error("failed to write {key}: {message}")]
    Write {
        /// The capability or setting key.
        key: String,
        /// Description of the failure.
        message: String,
    },
}

/// Errors raised by flow cards (conditions and actions).
#[derive(Debug, Error)]
pub enum FlowError {
    /// A boolean condition was given something other than `true`/`false`.
    #[error("'{0}' is not a boolean value, use true or false")]
    InvalidBoolean(String),

    /// A numeric condition was given a non-numeric value.
    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    /// The condition type id is not known.
    #[error("unknown condition type: {0}")]
    UnknownCondition(String),

    /// The device function returned a non-200 status.
    #[error("failed to call function, response status {status}")]
    FunctionFailed {
        /// Status returned by the cloud (or the local sentinel).
        status: u16,
    },

    /// The cloud did not acknowledge the published event.
    #[error("failed to publish event")]
    PublishFailed,

    /// The device behind the card is gone.
    #[error("device unavailable: {0}")]
    Device(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
