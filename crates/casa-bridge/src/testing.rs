//! Test utilities for exercising the bridge without a real gateway
//!
//! `ScriptedGateway` is an in-memory [`DeviceGateway`] with per-property
//! failure injection and a write log; `RecordingReporter` captures
//! state-change reports. Both are used by this crate's own tests and by
//! downstream integration tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use casa_core::{
    DeviceGateway, DeviceKind, GatewayDevice, GatewayError, GatewayResult, PropertyRef, Session,
    StateReporter, StateSnapshot,
};
use parking_lot::Mutex;
use serde_json::Value;

/// A session pointing at nothing in particular; the scripted gateway
/// ignores it beyond the signature.
pub fn session() -> Session {
    Session::new("http://gateway.test", "test-token", "agent-user-test")
}

/// Build a device descriptor with property refs in the gateway's
/// href-addressed shape.
pub fn device(id: &str, kind: DeviceKind, properties: &[&str]) -> GatewayDevice {
    GatewayDevice {
        name: format!("{id} device"),
        kind,
        href: format!("/things/{id}"),
        properties: properties
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    PropertyRef {
                        href: format!("/things/{id}/properties/{name}"),
                    },
                )
            })
            .collect(),
    }
}

type PropertyKey = (String, String);

/// Scripted in-memory gateway with failure injection
#[derive(Default)]
pub struct ScriptedGateway {
    devices: Mutex<Vec<GatewayDevice>>,
    values: Mutex<HashMap<PropertyKey, Value>>,
    failing_reads: Mutex<HashSet<PropertyKey>>,
    failing_writes: Mutex<HashSet<PropertyKey>>,
    listing_fails: Mutex<bool>,
    write_log: Mutex<Vec<(String, String, Value)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&self, device: GatewayDevice) {
        self.devices.lock().push(device);
    }

    pub fn set_value(&self, device_id: &str, property: &str, value: Value) {
        self.values
            .lock()
            .insert((device_id.to_string(), property.to_string()), value);
    }

    /// Make every read of the given property fail with a transport error.
    pub fn fail_read(&self, device_id: &str, property: &str) {
        self.failing_reads
            .lock()
            .insert((device_id.to_string(), property.to_string()));
    }

    /// Make every write of the given property fail with a transport error.
    pub fn fail_write(&self, device_id: &str, property: &str) {
        self.failing_writes
            .lock()
            .insert((device_id.to_string(), property.to_string()));
    }

    /// Make the next device listings fail with a transport error.
    pub fn fail_listing(&self) {
        *self.listing_fails.lock() = true;
    }

    /// Every successful write so far, in order: (device id, property, value).
    pub fn writes(&self) -> Vec<(String, String, Value)> {
        self.write_log.lock().clone()
    }
}

#[async_trait]
impl DeviceGateway for ScriptedGateway {
    async fn list_devices(
        &self,
        _session: &Session,
        filter: Option<&[String]>,
    ) -> GatewayResult<Vec<GatewayDevice>> {
        if *self.listing_fails.lock() {
            return Err(GatewayError::Transport("scripted listing failure".into()));
        }

        let devices = self.devices.lock().clone();
        Ok(match filter {
            Some(ids) => devices
                .into_iter()
                .filter(|d| ids.iter().any(|id| id == d.id()))
                .collect(),
            None => devices,
        })
    }

    async fn read_property(
        &self,
        _session: &Session,
        device: &GatewayDevice,
        name: &str,
    ) -> GatewayResult<Value> {
        if !device.has_property(name) {
            return Err(GatewayError::property_not_found(device.id(), name));
        }

        let key = (device.id().to_string(), name.to_string());
        if self.failing_reads.lock().contains(&key) {
            return Err(GatewayError::Transport(format!(
                "scripted read failure for {}/{}",
                key.0, key.1
            )));
        }

        Ok(self.values.lock().get(&key).cloned().unwrap_or(Value::Null))
    }

    async fn write_property(
        &self,
        _session: &Session,
        device: &GatewayDevice,
        name: &str,
        value: Value,
    ) -> GatewayResult<Value> {
        if !device.has_property(name) {
            return Err(GatewayError::property_not_found(device.id(), name));
        }

        let key = (device.id().to_string(), name.to_string());
        if self.failing_writes.lock().contains(&key) {
            return Err(GatewayError::Transport(format!(
                "scripted write failure for {}/{}",
                key.0, key.1
            )));
        }

        self.write_log
            .lock()
            .push((key.0.clone(), key.1.clone(), value.clone()));
        self.values.lock().insert(key, value.clone());
        Ok(value)
    }
}

/// Captures reported state changes for assertions
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String, StateSnapshot)>>,
    failing: Mutex<bool>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every report fail; the dispatcher must swallow this.
    pub fn fail(&self) {
        *self.failing.lock() = true;
    }

    pub fn reports(&self) -> Vec<(String, String, StateSnapshot)> {
        self.reports.lock().clone()
    }
}

#[async_trait]
impl StateReporter for RecordingReporter {
    async fn report_state(
        &self,
        agent_user_id: &str,
        device_id: &str,
        state: &StateSnapshot,
    ) -> Result<(), String> {
        if *self.failing.lock() {
            return Err("scripted report failure".to_string());
        }
        self.reports.lock().push((
            agent_user_id.to_string(),
            device_id.to_string(),
            state.clone(),
        ));
        Ok(())
    }
}
