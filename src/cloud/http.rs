// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of [`CloudClient`] for the Particle REST API.

use std::time::Duration;

use futures::{StreamExt, stream};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::sse::SseDecoder;
use super::{
    CloudClient, DeviceInfo, DeviceSummary, EventStream, FunctionResponse, VariableValue,
};
use crate::error::CloudError;

// ============================================================================
// CloudConfig
// ============================================================================

/// Configuration for the cloud client.
///
/// The access token is the only credential; it is read by every call and
/// never changed by the runtime.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use particle_bridge::cloud::CloudConfig;
///
/// let config = CloudConfig::new("my-access-token")
///     .with_base_url("http://127.0.0.1:8080")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "http://127.0.0.1:8080");
/// ```
#[derive(Clone)]
pub struct CloudConfig {
    access_token: String,
    base_url: String,
    timeout: Duration,
}

impl CloudConfig {
    /// Public cloud endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.particle.io";
    /// Default timeout for request/response calls (not for event streams).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with the given access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates a [`ParticleClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not HTTP(S) or the HTTP client cannot
    /// be created.
    pub fn into_client(self) -> Result<ParticleClient, CloudError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CloudError::InvalidAddress(self.base_url));
        }

        // No client-wide timeout: it would also cut off event streams.
        let client = Client::builder().build().map_err(CloudError::Http)?;

        Ok(ParticleClient {
            base_url: self.base_url,
            access_token: self.access_token,
            timeout: self.timeout,
            client,
        })
    }
}

impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ParticleClient
// ============================================================================

/// Client for the Particle cloud REST API.
///
/// # Examples
///
/// ```no_run
/// use particle_bridge::cloud::{CloudClient, CloudConfig};
///
/// # async fn example() -> particle_bridge::Result<()> {
/// let client = CloudConfig::new("my-access-token").into_client()?;
/// let info = client.get_device("e00fce68").await?;
/// println!("online: {}", info.connected);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ParticleClient {
    base_url: String,
    access_token: String,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct VariableBody {
    #[serde(default)]
    result: Option<VariableValue>,
}

#[derive(Debug, Deserialize)]
struct FunctionBody {
    #[serde(default)]
    return_value: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PublishBody {
    #[serde(default)]
    ok: Option<bool>,
}

impl ParticleClient {
    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn device_url(&self, device_id: &str) -> String {
        format!(
            "{}/v1/devices/{}",
            self.base_url,
            urlencoding::encode(device_id)
        )
    }

    fn member_url(&self, device_id: &str, member: &str) -> String {
        format!(
            "{}/{}",
            self.device_url(device_id),
            urlencoding::encode(member)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CloudError> {
        let response = self
            .authorized(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(CloudError::Http)?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, CloudError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(CloudError::AuthenticationFailed);
    }
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown").to_string()
    } else {
        body
    };
    Err(CloudError::Status {
        code: status.as_u16(),
        message,
    })
}

impl CloudClient for ParticleClient {
    async fn get_device(&self, device_id: &str) -> Result<DeviceInfo, CloudError> {
        let url = self.device_url(device_id);
        tracing::debug!(url = %url, "Fetching device status");

        let response = self.send(self.client.get(&url)).await?;
        response.json().await.map_err(CloudError::Http)
    }

    async fn get_variable(
        &self,
        device_id: &str,
        name: &str,
    ) -> Result<Option<VariableValue>, CloudError> {
        let url = self.member_url(device_id, name);
        tracing::debug!(url = %url, "Reading device variable");

        let response = self.send(self.client.get(&url)).await?;
        let body: VariableBody = response.json().await.map_err(CloudError::Http)?;
        Ok(body.result.filter(|value| !value.is_null()))
    }

    async fn call_function(
        &self,
        device_id: &str,
        name: &str,
        argument: &str,
    ) -> Result<FunctionResponse, CloudError> {
        let url = self.member_url(device_id, name);
        tracing::debug!(url = %url, argument = %argument, "Calling device function");

        let response = self
            .send(self.client.post(&url).form(&[("arg", argument)]))
            .await?;
        let status_code = response.status().as_u16();
        let body: FunctionBody = response.json().await.map_err(CloudError::Http)?;

        Ok(FunctionResponse {
            status_code,
            return_value: body.return_value,
        })
    }

    async fn get_event_stream(&self, device_id: &str) -> Result<EventStream, CloudError> {
        let url = format!("{}/events", self.device_url(device_id));
        tracing::debug!(url = %url, "Opening event stream");

        let response = self
            .authorized(self.client.get(&url))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(CloudError::Http)?;
        let response = check_status(response).await?;

        let mut decoder = SseDecoder::default();
        let events = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map_err(CloudError::Http)
                    .and_then(|bytes| decoder.push(&bytes))
            })
            .flat_map(|decoded| {
                let items: Vec<Result<_, CloudError>> = match decoded {
                    Ok(events) => events.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            });

        Ok(Box::pin(events))
    }

    async fn publish_event(
        &self,
        name: &str,
        data: &str,
        private: bool,
    ) -> Result<bool, CloudError> {
        let url = format!("{}/v1/devices/events", self.base_url);
        tracing::debug!(url = %url, event = %name, private, "Publishing event");

        let private = if private { "true" } else { "false" };
        let response = self
            .send(
                self.client
                    .post(&url)
                    .form(&[("name", name), ("data", data), ("private", private)]),
            )
            .await?;
        let body: PublishBody = response.json().await.map_err(CloudError::Http)?;
        Ok(body.ok.unwrap_or(false))
    }

    async fn list_devices(&self) -> Result<Vec<DeviceSummary>, CloudError> {
        let url = format!("{}/v1/devices", self.base_url);
        tracing::debug!(url = %url, "Listing devices");

        let response = self.send(self.client.get(&url)).await?;
        response.json().await.map_err(CloudError::Http)
    }
}

impl std::fmt::Debug for ParticleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
