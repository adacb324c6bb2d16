//! End-to-end tests: mock gateway -> client -> dispatcher -> router
//!
//! Everything here goes through real HTTP on both sides of the bridge,
//! the way casad runs it.

use std::time::Duration;

use casa_tests::{thing, TestStack};
use serde_json::{json, Value};

fn request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn sync_request(request_id: &str) -> Value {
    json!({
        "requestId": request_id,
        "inputs": [{ "intent": "action.devices.SYNC" }]
    })
}

fn query_request(request_id: &str, ids: &[&str]) -> Value {
    let devices: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({
        "requestId": request_id,
        "inputs": [{
            "intent": "action.devices.QUERY",
            "payload": { "devices": devices }
        }]
    })
}

fn execute_request(request_id: &str, ids: &[&str], execution: Value) -> Value {
    let devices: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({
        "requestId": request_id,
        "inputs": [{
            "intent": "action.devices.EXECUTE",
            "payload": {
                "commands": [{
                    "devices": devices,
                    "execution": execution
                }]
            }
        }]
    })
}

#[tokio::test]
async fn health_endpoint_answers() {
    let stack = TestStack::start().await;
    let response = stack.http.get(stack.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn sync_discovers_mapped_devices_and_drops_the_rest() {
    let stack = TestStack::start().await;
    stack.gateway.add_thing(thing("123", "smartPlug", &["on"]));
    stack
        .gateway
        .add_thing(thing("456", "dimmableColorLight", &["on", "level", "color"]));
    stack.gateway.add_thing(thing("999", "petFeeder", &["food"]));

    let id = request_id();
    let response = stack.intent(&sync_request(&id)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["requestId"], id.as_str());
    assert_eq!(body["payload"]["agentUserId"], "agent-demo");

    let devices = body["payload"]["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["id"], "123");
    assert_eq!(devices[0]["type"], "action.devices.types.SWITCH");
    assert_eq!(
        devices[0]["traits"],
        json!(["action.devices.traits.OnOff"])
    );
    assert_eq!(devices[1]["id"], "456");
    assert_eq!(devices[1]["type"], "action.devices.types.LIGHT");
    assert_eq!(
        devices[1]["traits"],
        json!([
            "action.devices.traits.OnOff",
            "action.devices.traits.Brightness",
            "action.devices.traits.ColorSpectrum"
        ])
    );
    assert_eq!(devices[1]["attributes"]["colorModel"], "rgb");
    assert_eq!(devices[1]["willReportState"], false);
}

#[tokio::test]
async fn execute_then_query_round_trip_for_a_color_light() {
    let stack = TestStack::start().await;
    stack
        .gateway
        .add_thing(thing("456", "dimmableColorLight", &["on", "level", "color"]));
    stack.gateway.set_value("456", "on", json!(false));
    stack.gateway.set_value("456", "level", json!(10));
    stack.gateway.set_value("456", "color", json!("#000000"));

    let id = request_id();
    let execute = execute_request(
        &id,
        &["456"],
        json!([
            { "command": "action.devices.commands.OnOff", "params": { "on": true } },
            { "command": "action.devices.commands.BrightnessAbsolute", "params": { "brightness": 80 } },
            { "command": "action.devices.commands.ColorAbsolute", "params": { "color": { "spectrumRGB": 31655 } } }
        ]),
    );
    let response = stack.intent(&execute).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    let result = &body["payload"]["commands"][0];
    assert_eq!(result["ids"], json!(["456"]));
    assert_eq!(result["status"], "SUCCESS");
    assert_eq!(result["states"]["online"], true);
    assert_eq!(result["states"]["on"], true);
    assert_eq!(result["states"]["brightness"], json!(80.0));
    assert_eq!(result["states"]["color"]["spectrumRGB"], 31655);

    // the three writes landed on the gateway
    assert_eq!(stack.gateway.value("456", "on"), Some(json!(true)));
    assert_eq!(stack.gateway.value("456", "level"), Some(json!(80.0)));
    assert_eq!(stack.gateway.value("456", "color"), Some(json!("#007ba7")));

    // and a fresh query reads them back
    let id = request_id();
    let response = stack.intent(&query_request(&id, &["456"])).await;
    let body: Value = response.json().await.unwrap();

    let state = &body["payload"]["devices"]["456"];
    assert_eq!(state["online"], true);
    assert_eq!(state["on"], true);
    assert_eq!(state["brightness"], json!(80.0));
    assert_eq!(state["color"]["spectrumRGB"], 31655);
}

#[tokio::test]
async fn query_isolates_failures_and_preserves_order() {
    let stack = TestStack::start().await;
    stack.gateway.add_thing(thing("a", "onOffLight", &["on"]));
    stack.gateway.add_thing(thing("b", "onOffLight", &["on"]));
    stack.gateway.set_value("a", "on", json!(true));
    stack.gateway.fail_property("b", "on");

    let response = stack
        .intent(&query_request(&request_id(), &["b", "a", "ghost"]))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    let devices = body["payload"]["devices"].as_object().unwrap();
    let order: Vec<&str> = devices.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["b", "a", "ghost"], "entries follow input order");

    assert_eq!(devices["b"], json!({ "online": false }));
    assert_eq!(devices["a"]["online"], true);
    assert_eq!(devices["a"]["on"], true);
    assert_eq!(devices["ghost"], json!({ "online": false }));
}

#[tokio::test]
async fn execute_applies_the_last_write_for_conflicting_steps() {
    let stack = TestStack::start().await;
    stack.gateway.add_thing(thing("sw", "onOffSwitch", &["on"]));

    let execute = execute_request(
        &request_id(),
        &["sw"],
        json!([
            { "command": "action.devices.commands.OnOff", "params": { "on": true } },
            { "command": "action.devices.commands.OnOff", "params": { "on": false } }
        ]),
    );
    let response = stack.intent(&execute).await;
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["payload"]["commands"][0]["status"], "SUCCESS");
    assert_eq!(body["payload"]["commands"][0]["states"]["on"], false);
    assert_eq!(stack.gateway.value("sw", "on"), Some(json!(false)));
}

#[tokio::test]
async fn relative_brightness_adjusts_the_current_level() {
    let stack = TestStack::start().await;
    stack
        .gateway
        .add_thing(thing("lamp", "dimmableLight", &["on", "level"]));
    stack.gateway.set_value("lamp", "level", json!(40));

    let execute = execute_request(
        &request_id(),
        &["lamp"],
        json!([{
            "command": "action.devices.commands.BrightnessRelative",
            "params": { "brightnessRelativeWeight": 20 }
        }]),
    );
    let response = stack.intent(&execute).await;
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["payload"]["commands"][0]["status"], "SUCCESS");
    assert_eq!(stack.gateway.value("lamp", "level"), Some(json!(60.0)));
}

#[tokio::test]
async fn failing_device_turns_its_group_offline() {
    let stack = TestStack::start().await;
    stack.gateway.add_thing(thing("ok", "onOffLight", &["on"]));
    stack.gateway.add_thing(thing("dead", "onOffLight", &["on"]));
    stack.gateway.fail_property("dead", "on");

    let id = request_id();
    let body = json!({
        "requestId": id,
        "inputs": [{
            "intent": "action.devices.EXECUTE",
            "payload": {
                "commands": [
                    {
                        "devices": [{ "id": "ok" }],
                        "execution": [{ "command": "action.devices.commands.OnOff", "params": { "on": true } }]
                    },
                    {
                        "devices": [{ "id": "dead" }],
                        "execution": [{ "command": "action.devices.commands.OnOff", "params": { "on": true } }]
                    }
                ]
            }
        }]
    });
    let response = stack.intent(&body).await;
    let body: Value = response.json().await.unwrap();

    let commands = body["payload"]["commands"].as_array().unwrap();
    assert_eq!(commands[0]["status"], "SUCCESS");
    assert_eq!(commands[1]["status"], "OFFLINE");
    assert_eq!(commands[1]["states"], json!({ "online": false }));
    assert_eq!(commands[1]["errorCode"], "deviceOffline");
}

#[tokio::test]
async fn successful_execute_reports_state_changes() {
    let stack = TestStack::start().await;
    stack.gateway.add_thing(thing("sw", "onOffSwitch", &["on"]));

    let execute = execute_request(
        &request_id(),
        &["sw"],
        json!([{ "command": "action.devices.commands.OnOff", "params": { "on": true } }]),
    );
    let response = stack.intent(&execute).await;
    assert_eq!(response.status(), 200);

    // reporting is fire-and-forget; give the detached task a beat
    tokio::time::sleep(Duration::from_millis(100)).await;

    let reports = stack.reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, "agent-demo");
    assert_eq!(reports[0].1, "sw");
    assert_eq!(reports[0].2.on, Some(true));
}

#[tokio::test]
async fn unknown_token_gets_the_auth_expired_envelope() {
    let stack = TestStack::start().await;

    let id = request_id();
    let response = stack
        .intent_with_token(Some("stale-token"), &sync_request(&id))
        .await;

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["requestId"], id.as_str());
    assert_eq!(body["payload"]["errorCode"], "authExpired");
}

#[tokio::test]
async fn missing_token_is_an_auth_error_too() {
    let stack = TestStack::start().await;

    let response = stack
        .intent_with_token(None, &sync_request(&request_id()))
        .await;

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["payload"]["errorCode"], "authExpired");
}

#[tokio::test]
async fn empty_inputs_are_a_client_error() {
    let stack = TestStack::start().await;

    let response = stack
        .intent(&json!({ "requestId": request_id(), "inputs": [] }))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn unknown_intents_are_rejected_before_any_device_work() {
    let stack = TestStack::start().await;

    let response = stack
        .intent(&json!({
            "requestId": request_id(),
            "inputs": [{ "intent": "action.devices.DISCO" }]
        }))
        .await;

    assert!(response.status().is_client_error(), "{}", response.status());
}
