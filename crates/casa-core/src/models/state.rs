//! Per-device state models: snapshots and desired-state changes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Thermostat operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermostatMode {
    Off,
    Heat,
    Cool,
    On,
}

/// Color state as reported to the assistant: a 24-bit RGB integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorState {
    #[serde(rename = "spectrumRGB")]
    pub spectrum_rgb: u32,
}

/// One device's state as reported to the assistant.
///
/// Produced fresh per query or execute, never persisted. `online` is
/// mandatory; every trait field is present only when the device carries
/// the trait and the read/write succeeded. A failed snapshot is
/// `{online:false}` with no trait values at all; reads fail as a
/// whole, not per trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorState>,
    #[serde(rename = "thermostatMode", skip_serializing_if = "Option::is_none")]
    pub thermostat_mode: Option<ThermostatMode>,
    #[serde(
        rename = "thermostatTemperatureSetpoint",
        skip_serializing_if = "Option::is_none"
    )]
    pub thermostat_temperature_setpoint: Option<f64>,
}

impl StateSnapshot {
    /// An online snapshot with no trait values yet
    pub fn online() -> Self {
        Self {
            online: true,
            ..Self::default()
        }
    }

    /// The failure snapshot: offline, all trait values suppressed
    pub fn offline() -> Self {
        Self::default()
    }
}

/// Desired color change; the assistant may send additional color
/// representations (name, temperature) which the bridge ignores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredColor {
    #[serde(rename = "spectrumRGB", skip_serializing_if = "Option::is_none")]
    pub spectrum_rgb: Option<u32>,
}

/// The merged desired-state change of one command batch.
///
/// Keys that do not apply to a given device kind are silently ignored
/// when the batch is applied; unknown keys are dropped at deserialize
/// time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(
        rename = "brightnessRelativeWeight",
        skip_serializing_if = "Option::is_none"
    )]
    pub brightness_relative_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<DesiredColor>,
    #[serde(rename = "thermostatMode", skip_serializing_if = "Option::is_none")]
    pub thermostat_mode: Option<ThermostatMode>,
    #[serde(
        rename = "thermostatTemperatureSetpoint",
        skip_serializing_if = "Option::is_none"
    )]
    pub thermostat_temperature_setpoint: Option<f64>,
}

impl DesiredState {
    /// Decode a merged params map into a typed desired state.
    pub fn from_params(params: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(params))
    }

    /// The state the batch intends the device to end up in, used as the
    /// group-level result of a successful execute. A relative
    /// brightness change has no absolute projection and is omitted;
    /// the per-device snapshots carry the level actually written.
    pub fn projection(&self) -> StateSnapshot {
        StateSnapshot {
            online: true,
            on: self.on,
            brightness: self.brightness,
            color: self
                .color
                .and_then(|c| c.spectrum_rgb)
                .map(|spectrum_rgb| ColorState { spectrum_rgb }),
            thermostat_mode: self.thermostat_mode,
            thermostat_temperature_setpoint: self.thermostat_temperature_setpoint,
        }
    }
}

/// One execute group resolved to its targets and merged desired state
#[derive(Debug, Clone, PartialEq)]
pub struct CommandBatch {
    pub device_ids: Vec<String>,
    pub desired: DesiredState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_skips_absent_traits() {
        let json = serde_json::to_value(StateSnapshot {
            online: true,
            on: Some(true),
            ..StateSnapshot::default()
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "online": true, "on": true }));
    }

    #[test]
    fn offline_snapshot_is_bare() {
        let json = serde_json::to_value(StateSnapshot::offline()).unwrap();
        assert_eq!(json, serde_json::json!({ "online": false }));
    }

    #[test]
    fn desired_state_ignores_unknown_keys() {
        let params = serde_json::json!({
            "on": true,
            "pause": false,
            "fanSpeed": "high"
        });
        let Value::Object(map) = params else {
            unreachable!()
        };

        let desired = DesiredState::from_params(map).unwrap();
        assert_eq!(desired.on, Some(true));
        assert_eq!(desired.brightness, None);
    }

    #[test]
    fn projection_reflects_desired_values() {
        let desired = DesiredState {
            on: Some(true),
            brightness: Some(80.0),
            color: Some(DesiredColor {
                spectrum_rgb: Some(31655),
            }),
            ..DesiredState::default()
        };

        let snapshot = desired.projection();
        assert!(snapshot.online);
        assert_eq!(snapshot.on, Some(true));
        assert_eq!(snapshot.brightness, Some(80.0));
        assert_eq!(
            snapshot.color,
            Some(ColorState {
                spectrum_rgb: 31655
            })
        );
    }

    #[test]
    fn projection_omits_relative_brightness() {
        let desired = DesiredState {
            brightness_relative_weight: Some(20.0),
            ..DesiredState::default()
        };
        assert_eq!(desired.projection().brightness, None);
    }
}
