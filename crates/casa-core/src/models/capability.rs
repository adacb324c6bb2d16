//! Assistant-side device descriptors (types, traits, attributes)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Assistant device type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    #[serde(rename = "action.devices.types.SWITCH")]
    Switch,
    #[serde(rename = "action.devices.types.LIGHT")]
    Light,
    #[serde(rename = "action.devices.types.THERMOSTAT")]
    Thermostat,
}

/// Assistant capability trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trait {
    #[serde(rename = "action.devices.traits.OnOff")]
    OnOff,
    #[serde(rename = "action.devices.traits.Brightness")]
    Brightness,
    #[serde(rename = "action.devices.traits.ColorSpectrum")]
    ColorSpectrum,
    #[serde(rename = "action.devices.traits.TemperatureSetting")]
    TemperatureSetting,
}

/// Device naming block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceName {
    pub name: String,
}

/// Static hardware/software identification reported with every device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub hw_version: String,
    pub sw_version: String,
}

impl DeviceInfo {
    /// The fixed identification block for devices behind the gateway.
    /// The gateway does not expose per-device vendor data, so every
    /// device reports the gateway itself.
    pub fn gateway() -> Self {
        Self {
            manufacturer: "webthings".to_string(),
            model: "gateway".to_string(),
            hw_version: "1.0".to_string(),
            sw_version: "1.0".to_string(),
        }
    }
}

/// One device as described to the assistant.
///
/// Derived deterministically from a [`GatewayDevice`](super::GatewayDevice)
/// by classification; it has no lifecycle of its own. The trait set is a
/// pure function of the gateway kind (and, for generic things, of the
/// property refs present).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDevice {
    pub id: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub traits: Vec<Trait>,
    pub name: DeviceName,
    pub will_report_state: bool,
    /// Trait-specific static metadata (color model, thermostat modes, ...)
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub device_info: DeviceInfo,
}
