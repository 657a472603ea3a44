// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for fired flow triggers.

use tokio::sync::broadcast;

use super::{FlowTrigger, Tokens, TriggerCard};
use crate::hub::TriggerBus;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts fired triggers to any number of subscribers.
///
/// Slow subscribers lose the oldest triggers once the channel capacity
/// (default 256) is exceeded and see `RecvError::Lagged`.
///
/// # Examples
///
/// ```
/// use particle_bridge::event::{EventBus, Tokens, TriggerCard};
/// use particle_bridge::hub::TriggerBus;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.trigger_device("e00fce68", TriggerCard::DeviceConnected, Tokens::new());
///
/// let trigger = rx.try_recv().unwrap();
/// assert_eq!(trigger.card(), TriggerCard::DeviceConnected);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FlowTrigger>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` triggers per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to triggers published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FlowTrigger> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes a trigger. Discarded when nobody listens.
    pub fn publish(&self, trigger: FlowTrigger) {
        if self.sender.send(trigger).is_err() {
            tracing::trace!("Trigger dropped, no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerBus for EventBus {
    fn trigger_device(&self, device_id: &str, card: TriggerCard, tokens: Tokens) {
        self.publish(FlowTrigger::Device {
            device_id: device_id.to_string(),
            card,
            tokens,
        });
    }

    fn trigger_global(&self, card: TriggerCard, tokens: Tokens) {
        self.publish(FlowTrigger::Global { card, tokens });
    }
}
