//! Assistant intent envelope: requests and response payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::capability::CapabilityDevice;
use super::state::StateSnapshot;

/// Top-level assistant request: a request id plus intent inputs.
///
/// The protocol sends exactly one input per request; the bridge
/// processes the first and treats an empty list as a malformed request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntentRequest {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(default)]
    pub inputs: Vec<IntentInput>,
}

/// One intent with its payload. Unknown intents fail deserialization,
/// which surfaces as a client error before any device work.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "intent", content = "payload")]
pub enum IntentInput {
    #[serde(rename = "action.devices.SYNC")]
    Sync,
    #[serde(rename = "action.devices.QUERY")]
    Query(QueryRequestPayload),
    #[serde(rename = "action.devices.EXECUTE")]
    Execute(ExecuteRequestPayload),
}

/// Reference to one target device. The assistant may attach opaque
/// `customData`; the bridge does not use it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequestPayload {
    pub devices: Vec<DeviceRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecuteRequestPayload {
    pub commands: Vec<CommandRequest>,
}

/// One execute group: a device-id set sharing an execution step list
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandRequest {
    pub devices: Vec<DeviceRef>,
    pub execution: Vec<ExecutionStep>,
}

/// One execution step. Only `params` carries meaning for the bridge;
/// the `command` discriminator is not interpreted beyond logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionStep {
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl CommandRequest {
    /// Merge every step's params into one change set. Later steps
    /// overwrite earlier ones key by key; last write wins across the
    /// execution list.
    pub fn merged_params(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for step in &self.execution {
            for (key, value) in &step.params {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// The ids of the group's target devices, in request order.
    pub fn device_ids(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.id.clone()).collect()
    }
}

/// Response envelope echoing the request id
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntentResponse<P> {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub payload: P,
}

/// SYNC response payload: account id plus discovered devices
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncPayload {
    #[serde(rename = "agentUserId")]
    pub agent_user_id: String,
    pub devices: Vec<CapabilityDevice>,
}

/// QUERY response payload: device id to snapshot, in request order.
///
/// The wire shape is a JSON object; entry order mirrors the order of
/// the queried devices regardless of read completion order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryPayload {
    #[serde(with = "ordered_snapshots")]
    pub devices: Vec<(String, StateSnapshot)>,
}

/// EXECUTE response payload: one result per command group, in order
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutePayload {
    pub commands: Vec<CommandResult>,
}

/// Per-group execute outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    Success,
    Offline,
}

/// Result of one execute group. The status is binary: `SUCCESS` with
/// the applied state, or `OFFLINE` with a bare offline snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandResult {
    pub ids: Vec<String>,
    pub status: CommandStatus,
    pub states: StateSnapshot,
    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// Serialize a `Vec<(String, StateSnapshot)>` as a JSON object whose
/// entry order follows the vector, and read it back in wire order.
mod ordered_snapshots {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::StateSnapshot;

    pub fn serialize<S>(
        entries: &[(String, StateSnapshot)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (id, snapshot) in entries {
            map.serialize_entry(id, snapshot)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, StateSnapshot)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Vec<(String, StateSnapshot)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of device id to state snapshot")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_request_parses_without_payload() {
        let request: IntentRequest = serde_json::from_value(serde_json::json!({
            "requestId": "ff36a3cc-ec34-11e6-b1a0-64510650abcf",
            "inputs": [{ "intent": "action.devices.SYNC" }]
        }))
        .unwrap();

        assert!(matches!(request.inputs[0], IntentInput::Sync));
    }

    #[test]
    fn query_request_parses_device_refs() {
        let request: IntentRequest = serde_json::from_value(serde_json::json!({
            "requestId": "r-1",
            "inputs": [{
                "intent": "action.devices.QUERY",
                "payload": {
                    "devices": [
                        { "id": "123", "customData": { "fooValue": 12 } },
                        { "id": "234" }
                    ]
                }
            }]
        }))
        .unwrap();

        let IntentInput::Query(payload) = &request.inputs[0] else {
            panic!("expected QUERY input");
        };
        assert_eq!(payload.devices[0].id, "123");
        assert_eq!(payload.devices[1].id, "234");
    }

    #[test]
    fn unknown_intent_is_rejected() {
        let result: Result<IntentRequest, _> = serde_json::from_value(serde_json::json!({
            "requestId": "r-2",
            "inputs": [{ "intent": "action.devices.REBOOT" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn merged_params_last_write_wins() {
        let group: CommandRequest = serde_json::from_value(serde_json::json!({
            "devices": [{ "id": "123" }],
            "execution": [
                { "command": "action.devices.commands.OnOff", "params": { "on": true } },
                { "command": "action.devices.commands.OnOff", "params": { "on": false } }
            ]
        }))
        .unwrap();

        let merged = group.merged_params();
        assert_eq!(merged.get("on"), Some(&serde_json::json!(false)));
    }

    #[test]
    fn query_payload_preserves_entry_order() {
        let payload = QueryPayload {
            devices: vec![
                ("zeta".to_string(), StateSnapshot::online()),
                ("alpha".to_string(), StateSnapshot::offline()),
            ],
        };

        let json = serde_json::to_string(&payload).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha, "entry order must follow input order");

        let parsed: QueryPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.devices[0].0, "zeta");
        assert_eq!(parsed.devices[1].0, "alpha");
    }

    #[test]
    fn command_status_wire_strings() {
        assert_eq!(
            serde_json::to_value(CommandStatus::Success).unwrap(),
            "SUCCESS"
        );
        assert_eq!(
            serde_json::to_value(CommandStatus::Offline).unwrap(),
            "OFFLINE"
        );
    }
}
