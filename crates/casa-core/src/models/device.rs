//! Gateway-side device models (things and their property refs)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The gateway's own device-type classification ("kind").
///
/// This is a closed enumeration: kinds the bridge does not map
/// deserialize to [`DeviceKind::Unsupported`] so that one exotic device
/// never fails a whole listing; it is silently dropped from discovery
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "onOffSwitch")]
    OnOffSwitch,
    #[serde(rename = "multilevelSwitch")]
    MultilevelSwitch,
    #[serde(rename = "smartPlug")]
    SmartPlug,
    #[serde(rename = "onOffLight")]
    OnOffLight,
    #[serde(rename = "dimmableLight")]
    DimmableLight,
    #[serde(rename = "onOffColorLight")]
    OnOffColorLight,
    #[serde(rename = "dimmableColorLight")]
    DimmableColorLight,
    /// Generic thing; capabilities are inferred from its property refs
    #[serde(rename = "thing")]
    Thing,
    /// Anything the bridge does not map
    #[serde(other)]
    Unsupported,
}

/// Addressable reference to one device property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    /// Resource path relative to the gateway base URL
    pub href: String,
}

/// One device as described by the gateway.
///
/// This is an immutable snapshot taken per request; the bridge never
/// caches descriptors across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayDevice {
    /// Human-readable device name
    pub name: String,
    /// Gateway device kind
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Resource path of the device itself; the device id is its last
    /// path segment
    pub href: String,
    /// Logical property name to addressable ref
    #[serde(default)]
    pub properties: HashMap<String, PropertyRef>,
}

impl GatewayDevice {
    /// The opaque device id: the last segment of the device href.
    pub fn id(&self) -> &str {
        self.href.rsplit('/').next().unwrap_or(self.href.as_str())
    }

    /// Whether the descriptor carries a ref for the named property.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Resource path for the named property, if the device has one.
    pub fn property_href(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.href.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_json(kind: &str) -> String {
        format!(
            r#"{{
                "name": "porch light",
                "type": "{kind}",
                "href": "/things/porch-1",
                "properties": {{
                    "on": {{ "href": "/things/porch-1/properties/on" }}
                }}
            }}"#
        )
    }

    #[test]
    fn known_kind_deserializes() {
        let device: GatewayDevice = serde_json::from_str(&device_json("dimmableLight")).unwrap();
        assert_eq!(device.kind, DeviceKind::DimmableLight);
        assert_eq!(device.id(), "porch-1");
        assert_eq!(
            device.property_href("on"),
            Some("/things/porch-1/properties/on")
        );
        assert!(!device.has_property("level"));
    }

    #[test]
    fn unknown_kind_falls_back_to_unsupported() {
        let device: GatewayDevice = serde_json::from_str(&device_json("quantumToaster")).unwrap();
        assert_eq!(device.kind, DeviceKind::Unsupported);
    }

    #[test]
    fn missing_properties_default_to_empty() {
        let device: GatewayDevice = serde_json::from_str(
            r#"{ "name": "bare", "type": "thing", "href": "/things/bare" }"#,
        )
        .unwrap();
        assert!(device.properties.is_empty());
    }
}
