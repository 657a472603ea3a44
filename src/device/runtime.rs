// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-device actor and its handle.
//!
//! Every device runs as one tokio task that owns its reconciler, event
//! listener and timers, and consumes a mailbox. Timer ticks, stream events
//! and handle requests are processed one at a time in arrival order, so no
//! device state is ever shared or locked.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::listener::EventListener;
use super::reconciler::DeviceStateReconciler;
use super::scheduler::{PollingScheduler, Tick};
use super::{DeviceConfig, DeviceKind, DeviceSettings};
use crate::cloud::{
    CloudClient, CloudFunction, CloudVariable, DeviceInfo, FunctionResponse, RawEvent,
    VariableValue,
};
use crate::error::{CloudError, Error, Result};
use crate::hub::Hub;
use crate::types::CapabilityValue;

const MAILBOX_CAPACITY: usize = 64;

/// Point-in-time view of a running device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    /// Cloud device id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Device variant.
    pub kind: DeviceKind,
    /// Last successful status poll.
    pub info: Option<DeviceInfo>,
    /// Last value written to each capability.
    pub capabilities: BTreeMap<String, CapabilityValue>,
    /// Functions offered to flow actions.
    pub functions: Vec<CloudFunction>,
    /// Variables offered to flow conditions.
    pub variables: Vec<CloudVariable>,
    /// Current user settings.
    pub settings: DeviceSettings,
    /// Whether the event stream subscription is running.
    pub listening: bool,
}

impl DeviceSnapshot {
    /// True when the last poll reported the device online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.connected)
    }
}

#[derive(Debug)]
pub(crate) enum DeviceMessage {
    Tick(Tick),
    Event(RawEvent),
    Refresh(oneshot::Sender<std::result::Result<(), CloudError>>),
    CallFunction {
        name: String,
        argument: String,
        reply: oneshot::Sender<FunctionResponse>,
    },
    ReadVariable {
        name: String,
        reply: oneshot::Sender<Option<VariableValue>>,
    },
    Snapshot(oneshot::Sender<DeviceSnapshot>),
    UpdateSettings(DeviceSettings, oneshot::Sender<()>),
    Rename(String, oneshot::Sender<()>),
    Delete(oneshot::Sender<()>),
}

impl From<Tick> for DeviceMessage {
    fn from(tick: Tick) -> Self {
        Self::Tick(tick)
    }
}

impl From<RawEvent> for DeviceMessage {
    fn from(event: RawEvent) -> Self {
        Self::Event(event)
    }
}

/// The actor owning one device.
pub(crate) struct DeviceRuntime<C, H> {
    reconciler: DeviceStateReconciler<C, H>,
    listener: EventListener<C>,
    scheduler: PollingScheduler,
    settings: DeviceSettings,
    mailbox: mpsc::WeakSender<DeviceMessage>,
}

impl<C: CloudClient, H: Hub> DeviceRuntime<C, H> {
    /// Spawns the actor and returns its handle.
    ///
    /// The actor stops on [`DeviceHandle::delete`] or once every handle is
    /// dropped.
    pub(crate) fn spawn(client: Arc<C>, hub: Arc<H>, config: DeviceConfig) -> DeviceHandle {
        let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);

        let runtime = Self {
            reconciler: DeviceStateReconciler::new(Arc::clone(&client), hub, &config),
            listener: EventListener::new(client, config.id.clone(), config.reconnection.clone()),
            scheduler: PollingScheduler::new(config.id.clone(), config.kind.is_heater()),
            settings: config.settings.clone(),
            mailbox: sender.downgrade(),
        };
        tokio::spawn(runtime.run(receiver));

        DeviceHandle {
            id: config.id,
            kind: config.kind,
            sender,
        }
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<DeviceMessage>) {
        self.start().await;

        while let Some(message) = receiver.recv().await {
            if let DeviceMessage::Delete(reply) = message {
                tracing::info!(device_id = %self.reconciler.device_id(), "Deleting device");
                receiver.close();
                self.shutdown();
                let _ = reply.send(());
                return;
            }
            self.handle(message).await;
        }

        tracing::debug!(device_id = %self.reconciler.device_id(), "All handles dropped, stopping device");
        self.shutdown();
    }

    async fn start(&mut self) {
        tracing::info!(
            device_id = %self.reconciler.device_id(),
            name = %self.reconciler.name(),
            kind = ?self.reconciler.kind(),
            "Device initiated"
        );

        let should_listen = match self.reconciler.kind() {
            DeviceKind::Heater => true,
            DeviceKind::CloudDevice => {
                let _ = self.reconciler.resync_functions_and_variables().await;
                self.settings.generate_device_events
            }
        };
        let _ = self.reconciler.refresh_status().await;

        self.scheduler
            .initialize(self.settings.refresh_period(), &self.mailbox);
        self.listener.start(should_listen, self.mailbox.clone());
    }

    fn shutdown(&mut self) {
        self.scheduler.teardown();
        self.listener.stop();
    }

    async fn handle(&mut self, message: DeviceMessage) {
        match message {
            DeviceMessage::Tick(Tick::Refresh) => {
                let _ = self.reconciler.refresh_status().await;
            }
            DeviceMessage::Tick(Tick::Maintenance) => {
                let removed = self.reconciler.counter_maintenance();
                tracing::debug!(device_id = %self.reconciler.device_id(), removed, "Counter maintenance done");
            }
            DeviceMessage::Event(event) => {
                // Decode failures are logged by the reconciler.
                let _ = self.reconciler.on_event(event).await;
            }
            DeviceMessage::Refresh(reply) => {
                let result = self.reconciler.refresh_status().await;
                let _ = reply.send(result);
            }
            DeviceMessage::CallFunction {
                name,
                argument,
                reply,
            } => {
                let response = self.reconciler.call_function(&name, &argument).await;
                let _ = reply.send(response);
            }
            DeviceMessage::ReadVariable { name, reply } => {
                let value = self.reconciler.read_variable(&name).await;
                let _ = reply.send(value);
            }
            DeviceMessage::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            DeviceMessage::UpdateSettings(settings, reply) => {
                self.apply_settings(settings);
                let _ = reply.send(());
            }
            DeviceMessage::Rename(name, reply) => {
                self.reconciler.rename(name);
                let _ = reply.send(());
            }
            DeviceMessage::Delete(reply) => {
                let _ = reply.send(());
            }
        }
    }

    fn apply_settings(&mut self, settings: DeviceSettings) {
        let device_id = self.reconciler.device_id().to_string();

        if settings.refresh_interval != self.settings.refresh_interval {
            tracing::info!(%device_id, refresh_interval = settings.refresh_interval, "Refresh interval changed");
            self.scheduler
                .reinitialize(settings.refresh_period(), &self.mailbox);
        }

        if self.reconciler.kind() == DeviceKind::CloudDevice
            && settings.generate_device_events != self.settings.generate_device_events
        {
            tracing::info!(
                %device_id,
                generate_device_events = settings.generate_device_events,
                "Generate device events changed"
            );
            self.listener
                .restart(settings.generate_device_events, self.mailbox.clone());
        }

        self.settings = settings;
    }

    fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            id: self.reconciler.device_id().to_string(),
            name: self.reconciler.name().to_string(),
            kind: self.reconciler.kind(),
            info: self.reconciler.info().cloned(),
            capabilities: self.reconciler.capabilities(),
            functions: self.reconciler.functions().to_vec(),
            variables: self.reconciler.variables().to_vec(),
            settings: self.settings.clone(),
            listening: self.listener.is_listening(),
        }
    }
}

/// Cloneable front end of a running device.
///
/// Every call is a message to the device actor and waits for its turn.
/// Once the device is deleted, calls fail with [`Error::DeviceNotFound`].
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    id: String,
    kind: DeviceKind,
    sender: mpsc::Sender<DeviceMessage>,
}

impl DeviceHandle {
    /// Cloud device id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Device variant.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// True until the device actor has stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Polls the device status now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cloud`] if the poll failed, or
    /// [`Error::DeviceNotFound`] if the device is gone.
    pub async fn refresh(&self) -> Result<()> {
        self.request(DeviceMessage::Refresh).await?.map_err(Error::from)
    }

    /// Invokes a device function. See
    /// [`DeviceStateReconciler::call_function`](super::DeviceStateReconciler::call_function)
    /// for the status conventions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is gone.
    pub async fn call_function(
        &self,
        name: impl Into<String>,
        argument: impl Into<String>,
    ) -> Result<FunctionResponse> {
        let (name, argument) = (name.into(), argument.into());
        self.request(|reply| DeviceMessage::CallFunction {
            name,
            argument,
            reply,
        })
        .await
    }

    /// Reads a device variable; `None` when offline, null or failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is gone.
    pub async fn variable_value(&self, name: impl Into<String>) -> Result<Option<VariableValue>> {
        let name = name.into();
        self.request(|reply| DeviceMessage::ReadVariable { name, reply })
            .await
    }

    /// Returns the current device state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is gone.
    pub async fn snapshot(&self) -> Result<DeviceSnapshot> {
        self.request(DeviceMessage::Snapshot).await
    }

    /// Applies new user settings.
    ///
    /// A new refresh interval resets the timers; toggling
    /// `generate_device_events` restarts the event listener of a cloud
    /// device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is gone.
    pub async fn update_settings(&self, settings: DeviceSettings) -> Result<()> {
        self.request(|reply| DeviceMessage::UpdateSettings(settings, reply))
            .await
    }

    /// Changes the display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device is gone.
    pub async fn rename(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.request(|reply| DeviceMessage::Rename(name, reply))
            .await
    }

    /// Stops timers and listener and ends the actor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device was already deleted.
    pub async fn delete(&self) -> Result<()> {
        self.request(DeviceMessage::Delete).await
    }

    async fn request<T>(&self, message: impl FnOnce(oneshot::Sender<T>) -> DeviceMessage) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(message(reply))
            .await
            .map_err(|_| Error::DeviceNotFound)?;
        response.await.map_err(|_| Error::DeviceNotFound)
    }
}
