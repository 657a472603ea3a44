// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns polls and stream events into capability writes and triggers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::capability_state::CapabilityState;
use super::listener::passthrough_tokens;
use super::{DeviceConfig, DeviceKind};
use crate::cloud::{
    CloudClient, CloudFunction, CloudVariable, DeviceInfo, FunctionResponse, RawEvent,
    VariableValue,
};
use crate::counter::DutyCycleCounter;
use crate::error::{CloudError, DecodeError};
use crate::event::{Tokens, TriggerCard};
use crate::hub::{DeviceMetadata, Hub};
use crate::telemetry::{HEATER_EVENT, HeaterReading, HeaterSignal};
use crate::types::CapabilityValue;

/// Capability holding the cloud connection state.
pub const CONNECTED: &str = "connected";

/// Per-device state reconciliation.
///
/// Owns everything the device runtime knows about one device: the last
/// status snapshot, the last value written to each capability, the
/// duty-cycle counters (heaters) and the function/variable lists used by
/// flow cards (cloud devices).
///
/// Writes to the hub always go through; a changed value (by loose
/// comparison against the previous one) is logged, and a changed
/// `connected` value fires the connection triggers. The first value seen
/// for a capability never counts as a change.
#[derive(Debug)]
pub struct DeviceStateReconciler<C, H> {
    client: Arc<C>,
    hub: Arc<H>,
    device_id: String,
    name: String,
    kind: DeviceKind,
    info: Option<DeviceInfo>,
    capabilities: CapabilityState,
    counters: HashMap<HeaterSignal, DutyCycleCounter>,
    functions: Vec<CloudFunction>,
    variables: Vec<CloudVariable>,
}

impl<C: CloudClient, H: Hub> DeviceStateReconciler<C, H> {
    /// Creates the reconciler for a configured device. Heaters get one
    /// counter per monitored signal with a 24 hour window.
    #[must_use]
    pub fn new(client: Arc<C>, hub: Arc<H>, config: &DeviceConfig) -> Self {
        let counters = if config.kind.is_heater() {
            HeaterSignal::ALL
                .into_iter()
                .map(|signal| (signal, DutyCycleCounter::new(DutyCycleCounter::DAY)))
                .collect()
        } else {
            HashMap::new()
        };

        Self {
            client,
            hub,
            device_id: config.id.clone(),
            name: config.display_name().to_string(),
            kind: config.kind,
            info: None,
            capabilities: CapabilityState::default(),
            counters,
            functions: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Cloud device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device variant.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Last successful status snapshot.
    #[must_use]
    pub fn info(&self) -> Option<&DeviceInfo> {
        self.info.as_ref()
    }

    /// True when the last snapshot says the device is online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.connected)
    }

    /// Functions offered to the function-call action.
    #[must_use]
    pub fn functions(&self) -> &[CloudFunction] {
        &self.functions
    }

    /// Variables offered to the variable condition.
    #[must_use]
    pub fn variables(&self) -> &[CloudVariable] {
        &self.variables
    }

    /// Counter of one heater signal.
    #[must_use]
    pub fn counter(&self, signal: HeaterSignal) -> Option<&DutyCycleCounter> {
        self.counters.get(&signal)
    }

    /// Last value written to a capability.
    #[must_use]
    pub fn capability(&self, key: &str) -> Option<&CapabilityValue> {
        self.capabilities.get(key)
    }

    /// Every capability written so far.
    #[must_use]
    pub fn capabilities(&self) -> BTreeMap<String, CapabilityValue> {
        self.capabilities.snapshot()
    }

    /// Changes the display name used in logs and tokens.
    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::info!(device_id = %self.device_id, from = %self.name, to = %name, "Renaming device");
        self.name = name;
    }

    /// True when `key` held a different value before. Never true for the
    /// first value of a key.
    #[must_use]
    pub fn is_changed(&self, key: &str, value: &CapabilityValue) -> bool {
        self.capabilities.is_changed(key, value)
    }

    /// Writes a capability and fires connection triggers on a change.
    ///
    /// A failed hub write is logged and otherwise ignored.
    pub async fn update_property(&mut self, key: &str, value: CapabilityValue) {
        let changed = self.is_changed(key, &value);
        if changed {
            tracing::info!(
                device_id = %self.device_id,
                device = %self.name,
                key,
                from = ?self.capabilities.get(key),
                to = %value,
                "Updating capability"
            );
        }

        if let Err(e) = self
            .hub
            .set_capability(&self.device_id, key, value.clone())
            .await
        {
            tracing::warn!(device_id = %self.device_id, key, error = %e, "Failed to write capability");
        }
        self.capabilities.record(key, value.clone());

        if changed
            && key == CONNECTED
            && let Some(connected) = value.as_bool()
        {
            self.fire_connection_triggers(connected);
        }
    }

    fn fire_connection_triggers(&self, connected: bool) {
        self.hub.trigger_device(
            &self.device_id,
            TriggerCard::for_connection(connected),
            Tokens::new(),
        );

        if self.kind == DeviceKind::CloudDevice {
            let info = self.info.as_ref();
            let field = |value: Option<&String>| value.cloned().unwrap_or_default();
            let tokens = Tokens::from([
                (
                    "serial".to_string(),
                    field(info.and_then(|i| i.serial_number.as_ref())),
                ),
                ("name".to_string(), self.name.clone()),
                (
                    "ip_address".to_string(),
                    field(info.and_then(|i| i.last_ip_address.as_ref())),
                ),
            ]);
            self.hub
                .trigger_global(TriggerCard::global_for_connection(connected), tokens);
        }
    }

    /// Polls the device status and mirrors it into the hub.
    ///
    /// On failure nothing changes; the error is logged and returned.
    ///
    /// # Errors
    ///
    /// Returns the cloud error of the failed poll.
    pub async fn refresh_status(&mut self) -> Result<(), CloudError> {
        let info = match self.client.get_device(&self.device_id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(device_id = %self.device_id, error = %e, "Failed to refresh device status");
                return Err(e);
            }
        };
        tracing::debug!(device_id = %self.device_id, connected = info.connected, "Device status refreshed");

        let connected = CapabilityValue::Bool(info.connected);
        if self.kind == DeviceKind::CloudDevice
            && info.connected
            && self.is_changed(CONNECTED, &connected)
        {
            tracing::info!(device_id = %self.device_id, "Device came online, refreshing functions and variables");
            // A failed resync is logged; the next reconnect tries again.
            let _ = self.resync_functions_and_variables().await;
        }

        let metadata = DeviceMetadata::from_info(&info);
        self.info = Some(info);
        self.update_property(CONNECTED, connected).await;

        if let Err(e) = self.hub.set_settings(&self.device_id, &metadata).await {
            tracing::warn!(device_id = %self.device_id, error = %e, "Failed to update settings");
        }
        Ok(())
    }

    /// Rebuilds the function and variable lists from a fresh status.
    ///
    /// # Errors
    ///
    /// Returns the cloud error if the status could not be fetched; the
    /// previous lists are kept.
    pub async fn resync_functions_and_variables(&mut self) -> Result<(), CloudError> {
        tracing::debug!(device_id = %self.device_id, "Refreshing device functions and variables");
        let info = match self.client.get_device(&self.device_id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(
                    device_id = %self.device_id,
                    error = %e,
                    "Failed to refresh device functions and variables"
                );
                return Err(e);
            }
        };

        self.functions = info
            .function_names()
            .iter()
            .map(|name| CloudFunction {
                device_id: self.device_id.clone(),
                name: name.clone(),
                device_name: self.name.clone(),
            })
            .collect();
        self.variables = info
            .variable_types()
            .map(|(name, kind)| CloudVariable {
                device_id: self.device_id.clone(),
                name: name.to_string(),
                kind: kind.to_string(),
            })
            .collect();
        Ok(())
    }

    /// Handles one event from the device stream.
    ///
    /// Heaters decode [`HEATER_EVENT`] telemetry and ignore other events.
    /// Cloud devices pass every event to the `device_event` trigger.
    ///
    /// # Errors
    ///
    /// Returns the decode error of a malformed heater payload.
    pub async fn on_event(&mut self, event: RawEvent) -> Result<(), DecodeError> {
        match self.kind {
            DeviceKind::CloudDevice => {
                tracing::debug!(device_id = %self.device_id, event = ?event.name, "Device event received");
                self.hub.trigger_device(
                    &self.device_id,
                    TriggerCard::DeviceEvent,
                    passthrough_tokens(&event),
                );
                Ok(())
            }
            DeviceKind::Heater => {
                if event.name.as_deref() != Some(HEATER_EVENT) {
                    tracing::debug!(device_id = %self.device_id, event = ?event.name, "Ignoring event");
                    return Ok(());
                }
                let data = event.data.as_deref().unwrap_or_default();
                let result = self.on_telemetry(data).await;
                if let Err(e) = &result {
                    tracing::warn!(device_id = %self.device_id, error = %e, "Invalid heater telemetry");
                }
                result
            }
        }
    }

    /// Applies a heater telemetry payload.
    ///
    /// The counters follow the reported signal levels, then every heater
    /// capability is written.
    ///
    /// # Errors
    ///
    /// Returns the decode error; nothing is written in that case.
    pub async fn on_telemetry(&mut self, data: &str) -> Result<(), DecodeError> {
        let reading = HeaterReading::from_json(data)?;

        for signal in HeaterSignal::ALL {
            let state = reading.signal(signal);
            if let Some(counter) = self.counters.get_mut(&signal)
                && counter.record(state.is_on())
            {
                tracing::info!(device_id = %self.device_id, signal = signal.key(), %state, "Signal switched");
            }
            self.update_property(&format!("status.{}", signal.key()), state.into())
                .await;
        }

        self.update_property("measure_temperature.floor_water", reading.floor_water_temp.into())
            .await;
        self.update_property("measure_temperature.outdoor", reading.outdoor_temp.into())
            .await;
        self.update_property("measure_temperature.indoor", reading.indoor_temp.into())
            .await;
        self.update_property("heater_state", reading.mode.description().into())
            .await;

        for signal in HeaterSignal::ALL {
            let Some((starts, runtime)) = self.counters.get(&signal).map(|counter| {
                (
                    counter.number_of_events(),
                    counter.average_run_time_pretty(),
                )
            }) else {
                continue;
            };
            self.update_property(&format!("starts.{}", signal.key()), starts.into())
                .await;
            self.update_property(&format!("runtime.{}", signal.key()), runtime.into())
                .await;
        }
        Ok(())
    }

    /// Prunes intervals older than the window from every counter.
    ///
    /// Returns the number of intervals removed.
    pub fn counter_maintenance(&mut self) -> usize {
        tracing::debug!(device_id = %self.device_id, "Running counter maintenance");
        self.counters
            .values_mut()
            .map(DutyCycleCounter::clean_old_events)
            .sum()
    }

    /// Invokes a device function.
    ///
    /// Offline devices (or devices never polled) answer
    /// [`FunctionResponse::OFFLINE`] without touching the network. A cloud
    /// status error maps to that status, any other failure to 500.
    pub async fn call_function(&self, name: &str, argument: &str) -> FunctionResponse {
        if !self.is_online() {
            tracing::debug!(device_id = %self.device_id, function = name, "Device offline, not calling function");
            return FunctionResponse::OFFLINE;
        }

        match self
            .client
            .call_function(&self.device_id, name, argument)
            .await
        {
            Ok(response) => response,
            Err(CloudError::Status { code: 400, message }) => {
                tracing::info!(device_id = %self.device_id, function = name, %message, "Device most likely offline");
                FunctionResponse::failed(400)
            }
            Err(CloudError::Status { code, message }) => {
                tracing::warn!(device_id = %self.device_id, function = name, code, %message, "Function call failed");
                FunctionResponse::failed(code)
            }
            Err(e) => {
                tracing::warn!(device_id = %self.device_id, function = name, error = %e, "Function call failed");
                FunctionResponse::failed(500)
            }
        }
    }

    /// Reads a device variable. `None` when offline, null or failed.
    pub async fn read_variable(&self, name: &str) -> Option<VariableValue> {
        if !self.is_online() {
            return None;
        }

        match self.client.get_variable(&self.device_id, name).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(device_id = %self.device_id, variable = name, error = %e, "Variable read failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use tokio::sync::broadcast;

    use super::*;
    use crate::cloud::mock::MockCloud;
    use crate::event::FlowTrigger;
    use crate::hub::MemoryHub;

    type Reconciler = DeviceStateReconciler<MockCloud, MemoryHub>;

    fn setup(
        config: &DeviceConfig,
        connected: bool,
    ) -> (Reconciler, Arc<MockCloud>, Arc<MemoryHub>) {
        let cloud = Arc::new(MockCloud::with_device(&config.id, connected));
        let hub = Arc::new(MemoryHub::new());
        let reconciler = DeviceStateReconciler::new(Arc::clone(&cloud), Arc::clone(&hub), config);
        (reconciler, cloud, hub)
    }

    fn drain(rx: &mut broadcast::Receiver<FlowTrigger>) -> Vec<FlowTrigger> {
        let mut triggers = Vec::new();
        while let Ok(trigger) = rx.try_recv() {
            triggers.push(trigger);
        }
        triggers
    }

    fn telemetry(compressor: i64, fan: i64, heater: i64) -> String {
        format!(
            r#"{{"compressor_on":{compressor},"fan_on":{fan},"immersion_heater_on":{heater},
            "floor_water_temp":31.456,"outdoor_temp":-3.2,"indoor_temp":21.0,"heater_state":1}}"#
        )
    }

    #[tokio::test]
    async fn first_poll_writes_without_triggering() {
        let config = DeviceConfig::cloud_device("abc").with_name("Garage");
        let (mut reconciler, _cloud, hub) = setup(&config, true);
        let mut rx = hub.subscribe();

        reconciler.refresh_status().await.unwrap();

        assert_eq!(hub.capability("abc", CONNECTED), Some(true.into()));
        assert!(reconciler.is_online());
        assert!(drain(&mut rx).is_empty());

        let settings = hub.settings("abc").unwrap();
        assert_eq!(settings.serial_number.as_deref(), Some("PH-1234"));
        assert_eq!(settings.last_heard, "Oct 18, 2026, 3:04:05 PM");
    }

    #[tokio::test]
    async fn disconnect_fires_device_and_global_triggers() {
        let config = DeviceConfig::cloud_device("abc").with_name("Garage");
        let (mut reconciler, cloud, hub) = setup(&config, true);
        let mut rx = hub.subscribe();
        reconciler.refresh_status().await.unwrap();

        cloud.set_connected(false);
        reconciler.refresh_status().await.unwrap();

        let triggers = drain(&mut rx);
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers[0].card(), TriggerCard::DeviceDisconnected);
        assert_eq!(triggers[0].device_id(), Some("abc"));
        assert_eq!(triggers[1].card(), TriggerCard::ADeviceDisconnected);
        assert_eq!(triggers[1].token("serial"), Some("PH-1234"));
        assert_eq!(triggers[1].token("name"), Some("Garage"));
        assert_eq!(triggers[1].token("ip_address"), Some("10.0.0.7"));
    }

    #[tokio::test]
    async fn unchanged_value_is_still_written() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, _cloud, hub) = setup(&config, true);
        let mut rx = hub.subscribe();

        reconciler.refresh_status().await.unwrap();
        reconciler.refresh_status().await.unwrap();

        assert_eq!(hub.capability_writes(), 2);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn reconnect_resyncs_exactly_once() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, cloud, hub) = setup(&config, false);
        let mut rx = hub.subscribe();

        reconciler.refresh_status().await.unwrap();
        assert_eq!(cloud.get_device_calls.load(Ordering::SeqCst), 1);
        assert!(reconciler.functions().is_empty());

        cloud.set_connected(true);
        cloud.set_functions(&["led", "open"]);
        reconciler.refresh_status().await.unwrap();
        assert_eq!(cloud.get_device_calls.load(Ordering::SeqCst), 3);
        assert_eq!(reconciler.functions().len(), 2);
        assert_eq!(reconciler.variables()[0].kind, "double");

        reconciler.refresh_status().await.unwrap();
        assert_eq!(cloud.get_device_calls.load(Ordering::SeqCst), 4);

        let cards: Vec<_> = drain(&mut rx).iter().map(FlowTrigger::card).collect();
        assert_eq!(
            cards,
            [TriggerCard::DeviceConnected, TriggerCard::ADeviceConnected]
        );
    }

    #[tokio::test]
    async fn failed_poll_changes_nothing() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, cloud, hub) = setup(&config, true);
        cloud.fail_get_device();

        assert!(reconciler.refresh_status().await.is_err());
        assert!(reconciler.info().is_none());
        assert_eq!(hub.capability_writes(), 0);
        assert!(hub.settings("abc").is_none());
    }

    #[tokio::test]
    async fn hub_write_failures_do_not_abort_refresh() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, _cloud, hub) = setup(&config, true);
        hub.fail_capability_writes(true);

        reconciler.refresh_status().await.unwrap();

        assert!(hub.capability("abc", CONNECTED).is_none());
        assert!(hub.settings("abc").is_some());
        assert_eq!(reconciler.capability(CONNECTED), Some(&true.into()));
    }

    #[tokio::test]
    async fn heater_connection_has_no_global_trigger() {
        let config = DeviceConfig::heater("abc");
        let (mut reconciler, cloud, hub) = setup(&config, true);
        let mut rx = hub.subscribe();

        reconciler.refresh_status().await.unwrap();
        cloud.set_connected(false);
        reconciler.refresh_status().await.unwrap();

        let cards: Vec<_> = drain(&mut rx).iter().map(FlowTrigger::card).collect();
        assert_eq!(cards, [TriggerCard::DeviceDisconnected]);
        // Heaters never resync.
        assert_eq!(cloud.get_device_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn telemetry_updates_every_heater_capability() {
        let config = DeviceConfig::heater("abc");
        let (mut reconciler, _cloud, hub) = setup(&config, true);

        reconciler.on_telemetry(&telemetry(1, 0, 0)).await.unwrap();

        let caps = hub.capabilities("abc");
        assert_eq!(caps["status.compressor"], "On".into());
        assert_eq!(caps["status.fan"], "Off".into());
        assert_eq!(caps["status.immersion_heater"], "Off".into());
        assert_eq!(caps["measure_temperature.floor_water"], CapabilityValue::Number(31.46));
        assert_eq!(caps["measure_temperature.outdoor"], CapabilityValue::Number(-3.2));
        assert_eq!(caps["heater_state"], "Heating".into());
        assert_eq!(caps["starts.compressor"], 1usize.into());
        assert_eq!(caps["starts.fan"], 0usize.into());
        assert_eq!(caps["runtime.compressor"], "0ms".into());
        assert_eq!(caps.len(), 13);
    }

    #[tokio::test(start_paused = true)]
    async fn compressor_cycle_of_ninety_seconds() {
        let config = DeviceConfig::heater("abc");
        let (mut reconciler, _cloud, hub) = setup(&config, true);

        reconciler.on_telemetry(&telemetry(1, 0, 0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(90)).await;
        reconciler.on_telemetry(&telemetry(0, 0, 0)).await.unwrap();

        assert_eq!(hub.capability("abc", "starts.compressor"), Some(1usize.into()));
        assert_eq!(
            hub.capability("abc", "runtime.compressor"),
            Some("1m 30s".into())
        );
        let counter = reconciler.counter(HeaterSignal::Compressor).unwrap();
        assert!(!counter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_on_reports_keep_one_interval() {
        let config = DeviceConfig::heater("abc");
        let (mut reconciler, _cloud, _hub) = setup(&config, true);

        for _ in 0..3 {
            reconciler.on_telemetry(&telemetry(0, 1, 0)).await.unwrap();
            tokio::time::advance(Duration::from_secs(10)).await;
        }

        let fan = reconciler.counter(HeaterSignal::Fan).unwrap();
        assert_eq!(fan.number_of_events(), 1);
        assert!(fan.is_running());
    }

    #[tokio::test]
    async fn malformed_telemetry_writes_nothing() {
        let config = DeviceConfig::heater("abc");
        let (mut reconciler, _cloud, hub) = setup(&config, true);

        let event = RawEvent::new(HEATER_EVENT, r#"{"compressor_on":1}"#);
        let err = reconciler.on_event(event).await.unwrap_err();

        assert!(matches!(err, DecodeError::MissingField("fan_on")));
        assert_eq!(hub.capability_writes(), 0);
    }

    #[tokio::test]
    async fn heater_ignores_other_events() {
        let config = DeviceConfig::heater("abc");
        let (mut reconciler, _cloud, hub) = setup(&config, true);

        reconciler
            .on_event(RawEvent::new("spark/status", "online"))
            .await
            .unwrap();
        assert_eq!(hub.capability_writes(), 0);
    }

    #[tokio::test]
    async fn cloud_device_events_pass_through() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, _cloud, hub) = setup(&config, true);
        let mut rx = hub.subscribe();

        reconciler
            .on_event(RawEvent::new("door", "open"))
            .await
            .unwrap();

        let triggers = drain(&mut rx);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].card(), TriggerCard::DeviceEvent);
        assert_eq!(triggers[0].token("event_name"), Some("door"));
        assert_eq!(triggers[0].token("event_value"), Some("open"));
    }

    #[tokio::test(start_paused = true)]
    async fn maintenance_prunes_old_intervals() {
        let config = DeviceConfig::heater("abc");
        let (mut reconciler, _cloud, _hub) = setup(&config, true);

        reconciler.on_telemetry(&telemetry(1, 1, 0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        reconciler.on_telemetry(&telemetry(0, 0, 0)).await.unwrap();

        assert_eq!(reconciler.counter_maintenance(), 0);
        tokio::time::advance(DutyCycleCounter::DAY).await;
        assert_eq!(reconciler.counter_maintenance(), 2);
        assert_eq!(reconciler.counter_maintenance(), 0);
    }

    #[tokio::test]
    async fn calls_short_circuit_before_first_poll_and_when_offline() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, cloud, _hub) = setup(&config, false);
        cloud.set_variable("temp", serde_json::json!(21.5));

        assert_eq!(reconciler.call_function("led", "on").await, FunctionResponse::OFFLINE);
        assert!(reconciler.read_variable("temp").await.is_none());

        reconciler.refresh_status().await.unwrap();
        assert_eq!(reconciler.call_function("led", "on").await.status_code, 400);
        assert!(reconciler.read_variable("temp").await.is_none());

        assert_eq!(cloud.call_function_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cloud.get_variable_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn online_calls_reach_the_cloud() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, cloud, _hub) = setup(&config, true);
        cloud.set_variable("temp", serde_json::json!(21.5));
        reconciler.refresh_status().await.unwrap();

        let response = reconciler.call_function("led", "1").await;
        assert!(response.is_success());
        assert_eq!(response.return_value, Some(1));
        assert_eq!(
            reconciler.read_variable("temp").await,
            Some(serde_json::json!(21.5))
        );
        assert!(reconciler.read_variable("missing").await.is_none());
    }

    #[tokio::test]
    async fn function_errors_map_to_status() {
        let config = DeviceConfig::cloud_device("abc");
        let (mut reconciler, cloud, _hub) = setup(&config, true);
        reconciler.refresh_status().await.unwrap();

        cloud.fail_functions_with(400);
        assert_eq!(reconciler.call_function("led", "on").await.status_code, 400);

        cloud.fail_functions_with(404);
        assert_eq!(reconciler.call_function("led", "on").await.status_code, 404);
    }

    #[test]
    fn rename_changes_the_name() {
        let config = DeviceConfig::cloud_device("abc").with_name("Old");
        let (mut reconciler, _cloud, _hub) = setup(&config, true);
        reconciler.rename("New");
        assert_eq!(reconciler.name(), "New");
    }
}
