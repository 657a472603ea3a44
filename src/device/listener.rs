// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device event stream subscription.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ReconnectionPolicy;
use crate::cloud::{CloudClient, RawEvent};
use crate::event::Tokens;

const UNKNOWN: &str = "unknown";

/// Long-lived subscription to one device's event stream.
///
/// Events are forwarded, in arrival order, into the owner's mailbox. The
/// listener holds only a weak sender, so it never keeps the mailbox open
/// on its own and stops once the mailbox is gone.
///
/// When the stream cannot be opened the failure is logged and the device
/// carries on with polling alone. Whether a broken stream is reopened is
/// up to the [`ReconnectionPolicy`].
#[derive(Debug)]
pub struct EventListener<C> {
    client: Arc<C>,
    device_id: String,
    policy: ReconnectionPolicy,
    task: Option<JoinHandle<()>>,
}

impl<C: CloudClient> EventListener<C> {
    /// Creates a stopped listener for a device.
    #[must_use]
    pub fn new(client: Arc<C>, device_id: impl Into<String>, policy: ReconnectionPolicy) -> Self {
        Self {
            client,
            device_id: device_id.into(),
            policy,
            task: None,
        }
    }

    /// Starts listening when `should_listen` is true, replacing any running
    /// subscription.
    pub fn start<M>(&mut self, should_listen: bool, mailbox: mpsc::WeakSender<M>)
    where
        M: From<RawEvent> + Send + 'static,
    {
        if !should_listen {
            return;
        }
        self.stop();

        tracing::info!(device_id = %self.device_id, "Starting device event listener");
        let task = tokio::spawn(listen(
            Arc::clone(&self.client),
            self.device_id.clone(),
            self.policy.clone(),
            mailbox,
        ));
        self.task = Some(task);
    }

    /// Aborts the subscription, if any.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            tracing::info!(device_id = %self.device_id, "Stopping device event listener");
            task.abort();
        }
    }

    /// Stops, then starts again when `should_listen` is true.
    pub fn restart<M>(&mut self, should_listen: bool, mailbox: mpsc::WeakSender<M>)
    where
        M: From<RawEvent> + Send + 'static,
    {
        self.stop();
        self.start(should_listen, mailbox);
    }

    /// True while the subscription task is running.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl<C> Drop for EventListener<C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn listen<C, M>(
    client: Arc<C>,
    device_id: String,
    policy: ReconnectionPolicy,
    mailbox: mpsc::WeakSender<M>,
) where
    C: CloudClient,
    M: From<RawEvent> + Send + 'static,
{
    let mut attempt: u32 = 0;
    loop {
        match client.get_event_stream(&device_id).await {
            Ok(mut stream) => {
                tracing::debug!(%device_id, "Event stream opened");
                attempt = 0;

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(event) => {
                            let Some(sender) = mailbox.upgrade() else {
                                return;
                            };
                            if sender.send(M::from(event)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(%device_id, error = %e, "Event stream failed");
                            break;
                        }
                    }
                }
                tracing::warn!(%device_id, "Event stream closed");
            }
            Err(e) => {
                tracing::warn!(
                    %device_id,
                    error = %e,
                    "Failed to open event stream, continuing with polling only"
                );
            }
        }

        if !policy.should_retry(attempt) || mailbox.strong_count() == 0 {
            return;
        }
        let delay = policy.delay_for_attempt(attempt);
        attempt += 1;
        tracing::debug!(%device_id, attempt, ?delay, "Reopening event stream");
        tokio::time::sleep(delay).await;
    }
}

/// Trigger tokens for the `device_event` card.
///
/// Absent or empty names and payloads become `"unknown"`.
#[must_use]
pub fn passthrough_tokens(event: &RawEvent) -> Tokens {
    let or_unknown = |value: Option<&String>| {
        value
            .filter(|v| !v.is_empty())
            .map_or_else(|| UNKNOWN.to_string(), Clone::clone)
    };

    Tokens::from([
        ("event_name".to_string(), or_unknown(event.name.as_ref())),
        ("event_value".to_string(), or_unknown(event.data.as_ref())),
    ])
}
