// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flow trigger types.

use std::collections::BTreeMap;
use std::fmt;

/// Named values handed to a flow when a trigger fires.
pub type Tokens = BTreeMap<String, String>;

/// Trigger cards a device runtime can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerCard {
    /// This device came online.
    DeviceConnected,
    /// This device went offline.
    DeviceDisconnected,
    /// This device published an event.
    DeviceEvent,
    /// Any cloud device came online.
    ADeviceConnected,
    /// Any cloud device went offline.
    ADeviceDisconnected,
}

impl TriggerCard {
    /// Identifier the hub registers the card under.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::DeviceConnected => "device_connected",
            Self::DeviceDisconnected => "device_disconnected",
            Self::DeviceEvent => "device_event",
            Self::ADeviceConnected => "a_device_connected",
            Self::ADeviceDisconnected => "a_device_disconnected",
        }
    }

    /// Returns true for cards scoped to one device.
    #[must_use]
    pub const fn is_device_scoped(self) -> bool {
        matches!(
            self,
            Self::DeviceConnected | Self::DeviceDisconnected | Self::DeviceEvent
        )
    }

    /// Device-scoped card for a connection transition.
    #[must_use]
    pub const fn for_connection(connected: bool) -> Self {
        if connected {
            Self::DeviceConnected
        } else {
            Self::DeviceDisconnected
        }
    }

    /// Global card for a connection transition.
    #[must_use]
    pub const fn global_for_connection(connected: bool) -> Self {
        if connected {
            Self::ADeviceConnected
        } else {
            Self::ADeviceDisconnected
        }
    }
}

impl fmt::Display for TriggerCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A trigger that fired, as delivered to subscribers of the
/// [`EventBus`](super::EventBus).
///
/// # Examples
///
/// ```
/// use particle_bridge::event::{FlowTrigger, Tokens, TriggerCard};
///
/// let trigger = FlowTrigger::Device {
///     device_id: "e00fce68".to_string(),
///     card: TriggerCard::DeviceConnected,
///     tokens: Tokens::new(),
/// };
/// assert_eq!(trigger.device_id(), Some("e00fce68"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowTrigger {
    /// Fired on one device's own trigger card.
    Device {
        /// Device that fired the trigger.
        device_id: String,
        /// Card fired.
        card: TriggerCard,
        /// Card tokens.
        tokens: Tokens,
    },
    /// Fired on an app-wide trigger card.
    Global {
        /// Card fired.
        card: TriggerCard,
        /// Card tokens.
        tokens: Tokens,
    },
}

impl FlowTrigger {
    /// Returns the card that fired.
    #[must_use]
    pub fn card(&self) -> TriggerCard {
        match self {
            Self::Device { card, .. } | Self::Global { card, .. } => *card,
        }
    }

    /// Returns the device id for device-scoped triggers.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Device { device_id, .. } => Some(device_id),
            Self::Global { .. } => None,
        }
    }

    /// Returns the trigger tokens.
    #[must_use]
    pub fn tokens(&self) -> &Tokens {
        match self {
            Self::Device { tokens, .. } | Self::Global { tokens, .. } => tokens,
        }
    }

    /// Returns one token value.
    #[must_use]
    pub fn token(&self, name: &str) -> Option<&str> {
        self.tokens().get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_ids() {
        assert_eq!(TriggerCard::DeviceEvent.id(), "device_event");
        assert_eq!(
            TriggerCard::global_for_connection(false).to_string(),
            "a_device_disconnected"
        );
        assert_eq!(
            TriggerCard::for_connection(true),
            TriggerCard::DeviceConnected
        );
    }

    #[test]
    fn device_scope() {
        assert!(TriggerCard::DeviceDisconnected.is_device_scoped());
        assert!(!TriggerCard::ADeviceConnected.is_device_scoped());
    }

    #[test]
    fn global_trigger_accessors() {
        let trigger = FlowTrigger::Global {
            card: TriggerCard::ADeviceConnected,
            tokens: Tokens::from([("serial".to_string(), "PH-1".to_string())]),
        };
        assert_eq!(trigger.card(), TriggerCard::ADeviceConnected);
        assert!(trigger.device_id().is_none());
        assert_eq!(trigger.token("serial"), Some("PH-1"));
        assert_eq!(trigger.token("name"), None);
    }
}
