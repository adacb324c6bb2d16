//! Capability and state translation
//!
//! Pure mapping between the gateway's device model (kinds, href-addressed
//! properties) and the assistant's capability model (types, traits,
//! per-trait state). The only I/O here goes through the property
//! read/write primitives of the [`DeviceGateway`] the caller hands in.

use casa_core::models::{
    CapabilityDevice, ColorState, DesiredState, DeviceInfo, DeviceKind, DeviceName, DeviceType,
    GatewayDevice, StateSnapshot, ThermostatMode, Trait,
};
use casa_core::{property, DeviceGateway, GatewayError, GatewayResult, Session};
use serde_json::{json, Map, Value};

use crate::color;

/// Classify a gateway device into its assistant descriptor.
///
/// Returns `None` for kinds the bridge does not map; the caller drops
/// those from discovery. The trait set is fully determined by the kind
/// (and, for generic things, by which property refs are present).
pub fn classify(device: &GatewayDevice) -> Option<CapabilityDevice> {
    let (device_type, traits, attributes) = match device.kind {
        // Known limitation: multilevel switches and smart plugs are
        // surfaced as plain on/off switches; their level capability is
        // intentionally not mapped.
        DeviceKind::OnOffSwitch | DeviceKind::MultilevelSwitch | DeviceKind::SmartPlug => {
            (DeviceType::Switch, vec![Trait::OnOff], Map::new())
        }
        DeviceKind::OnOffLight => (DeviceType::Light, vec![Trait::OnOff], Map::new()),
        DeviceKind::DimmableLight => (
            DeviceType::Light,
            vec![Trait::OnOff, Trait::Brightness],
            Map::new(),
        ),
        DeviceKind::OnOffColorLight => (
            DeviceType::Light,
            vec![Trait::OnOff, Trait::ColorSpectrum],
            rgb_attributes(),
        ),
        DeviceKind::DimmableColorLight => (
            DeviceType::Light,
            vec![Trait::OnOff, Trait::Brightness, Trait::ColorSpectrum],
            rgb_attributes(),
        ),
        // A generic thing is a thermostat iff it exposes both mode and
        // temperature; any other generic thing is not mapped.
        DeviceKind::Thing => {
            if device.has_property(property::MODE) && device.has_property(property::TEMPERATURE) {
                (
                    DeviceType::Thermostat,
                    vec![Trait::TemperatureSetting],
                    thermostat_attributes(),
                )
            } else {
                return None;
            }
        }
        DeviceKind::Unsupported => return None,
    };

    Some(CapabilityDevice {
        id: device.id().to_string(),
        device_type,
        traits,
        name: DeviceName {
            name: device.name.clone(),
        },
        will_report_state: false,
        attributes,
        device_info: DeviceInfo::gateway(),
    })
}

fn rgb_attributes() -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("colorModel".to_string(), json!("rgb"));
    attributes
}

fn thermostat_attributes() -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert(
        "availableThermostatModes".to_string(),
        json!("off,heat,cool,on"),
    );
    attributes.insert("thermostatTemperatureUnit".to_string(), json!("C"));
    attributes
}

/// Read a device's full state snapshot.
///
/// Property reads for the device's traits are issued in parallel. Any
/// failed sub-read fails the snapshot as a whole: the result is
/// `{online:false}` with no partial trait values.
pub async fn read_state(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
) -> StateSnapshot {
    match try_read_state(gateway, session, device).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(device = device.id(), error = %err, "state read failed, reporting offline");
            StateSnapshot::offline()
        }
    }
}

async fn try_read_state(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
) -> GatewayResult<StateSnapshot> {
    let mut snapshot = StateSnapshot::online();

    match device.kind {
        DeviceKind::OnOffSwitch
        | DeviceKind::MultilevelSwitch
        | DeviceKind::SmartPlug
        | DeviceKind::OnOffLight => {
            snapshot.on = Some(read_bool(gateway, session, device, property::ON).await?);
        }
        DeviceKind::DimmableLight => {
            let (on, brightness) = tokio::try_join!(
                read_bool(gateway, session, device, property::ON),
                read_number(gateway, session, device, property::LEVEL),
            )?;
            snapshot.on = Some(on);
            snapshot.brightness = Some(brightness);
        }
        DeviceKind::OnOffColorLight => {
            let (on, color) = tokio::try_join!(
                read_bool(gateway, session, device, property::ON),
                read_color(gateway, session, device),
            )?;
            snapshot.on = Some(on);
            snapshot.color = Some(color);
        }
        DeviceKind::DimmableColorLight => {
            let (on, brightness, color) = tokio::try_join!(
                read_bool(gateway, session, device, property::ON),
                read_number(gateway, session, device, property::LEVEL),
                read_color(gateway, session, device),
            )?;
            snapshot.on = Some(on);
            snapshot.brightness = Some(brightness);
            snapshot.color = Some(color);
        }
        DeviceKind::Thing => {
            if device.has_property(property::MODE) && device.has_property(property::TEMPERATURE) {
                let (mode, setpoint) = tokio::try_join!(
                    read_mode(gateway, session, device),
                    read_number(gateway, session, device, property::TEMPERATURE),
                )?;
                snapshot.thermostat_mode = Some(mode);
                snapshot.thermostat_temperature_setpoint = Some(setpoint);
            }
        }
        DeviceKind::Unsupported => {}
    }

    Ok(snapshot)
}

/// Apply a desired-state change to one device.
///
/// Writes are issued one at a time; keys the device's kind does not
/// support are silently ignored. The first failed write aborts the
/// device's remaining writes and yields `{online:false}`; other devices
/// in the same batch are unaffected. The returned snapshot carries the
/// values actually written (a relative brightness change reports the
/// computed absolute level).
pub async fn apply_state(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
    desired: &DesiredState,
) -> StateSnapshot {
    match try_apply_state(gateway, session, device, desired).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(device = device.id(), error = %err, "state write failed, reporting offline");
            StateSnapshot::offline()
        }
    }
}

async fn try_apply_state(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
    desired: &DesiredState,
) -> GatewayResult<StateSnapshot> {
    let mut snapshot = StateSnapshot::online();

    match device.kind {
        DeviceKind::OnOffSwitch
        | DeviceKind::MultilevelSwitch
        | DeviceKind::SmartPlug
        | DeviceKind::OnOffLight => {
            apply_on(gateway, session, device, desired, &mut snapshot).await?;
        }
        DeviceKind::DimmableLight => {
            apply_on(gateway, session, device, desired, &mut snapshot).await?;
            apply_brightness(gateway, session, device, desired, &mut snapshot).await?;
        }
        DeviceKind::OnOffColorLight => {
            apply_on(gateway, session, device, desired, &mut snapshot).await?;
            apply_color(gateway, session, device, desired, &mut snapshot).await?;
        }
        DeviceKind::DimmableColorLight => {
            apply_on(gateway, session, device, desired, &mut snapshot).await?;
            apply_brightness(gateway, session, device, desired, &mut snapshot).await?;
            apply_color(gateway, session, device, desired, &mut snapshot).await?;
        }
        DeviceKind::Thing => {
            if device.has_property(property::MODE) && device.has_property(property::TEMPERATURE) {
                if let Some(mode) = desired.thermostat_mode {
                    gateway
                        .write_property(session, device, property::MODE, json!(mode))
                        .await?;
                    snapshot.thermostat_mode = Some(mode);
                }
                if let Some(setpoint) = desired.thermostat_temperature_setpoint {
                    gateway
                        .write_property(session, device, property::TEMPERATURE, json!(setpoint))
                        .await?;
                    snapshot.thermostat_temperature_setpoint = Some(setpoint);
                }
            }
        }
        DeviceKind::Unsupported => {}
    }

    Ok(snapshot)
}

async fn apply_on(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
    desired: &DesiredState,
    snapshot: &mut StateSnapshot,
) -> GatewayResult<()> {
    if let Some(on) = desired.on {
        gateway
            .write_property(session, device, property::ON, json!(on))
            .await?;
        snapshot.on = Some(on);
    }
    Ok(())
}

async fn apply_brightness(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
    desired: &DesiredState,
    snapshot: &mut StateSnapshot,
) -> GatewayResult<()> {
    if let Some(level) = desired.brightness {
        gateway
            .write_property(session, device, property::LEVEL, json!(level))
            .await?;
        snapshot.brightness = Some(level);
    }

    if let Some(delta) = desired.brightness_relative_weight {
        // Read-then-write; not atomic against concurrent writers. The
        // dispatcher guarantees one write path per device per request.
        let current = read_number(gateway, session, device, property::LEVEL).await?;
        let target = current + delta;
        gateway
            .write_property(session, device, property::LEVEL, json!(target))
            .await?;
        snapshot.brightness = Some(target);
    }

    Ok(())
}

async fn apply_color(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
    desired: &DesiredState,
    snapshot: &mut StateSnapshot,
) -> GatewayResult<()> {
    if let Some(spectrum) = desired.color.and_then(|c| c.spectrum_rgb) {
        let hex = color::spectrum_to_hex(spectrum);
        gateway
            .write_property(session, device, property::COLOR, json!(hex))
            .await?;
        snapshot.color = Some(ColorState {
            spectrum_rgb: spectrum,
        });
    }
    Ok(())
}

async fn read_bool(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
    name: &str,
) -> GatewayResult<bool> {
    let value = gateway.read_property(session, device, name).await?;
    value
        .as_bool()
        .ok_or_else(|| GatewayError::unexpected_value(name, format!("expected boolean, got {value}")))
}

async fn read_number(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
    name: &str,
) -> GatewayResult<f64> {
    let value = gateway.read_property(session, device, name).await?;
    value
        .as_f64()
        .ok_or_else(|| GatewayError::unexpected_value(name, format!("expected number, got {value}")))
}

async fn read_color(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
) -> GatewayResult<ColorState> {
    let value = gateway
        .read_property(session, device, property::COLOR)
        .await?;
    let hex = value.as_str().ok_or_else(|| {
        GatewayError::unexpected_value(property::COLOR, format!("expected hex string, got {value}"))
    })?;
    let spectrum_rgb = color::hex_to_spectrum(hex).ok_or_else(|| {
        GatewayError::unexpected_value(property::COLOR, format!("not a color: {hex}"))
    })?;
    Ok(ColorState { spectrum_rgb })
}

async fn read_mode(
    gateway: &dyn DeviceGateway,
    session: &Session,
    device: &GatewayDevice,
) -> GatewayResult<ThermostatMode> {
    let value = gateway
        .read_property(session, device, property::MODE)
        .await?;
    serde_json::from_value(value.clone()).map_err(|_| {
        GatewayError::unexpected_value(property::MODE, format!("unrecognized mode {value}"))
    })
}
