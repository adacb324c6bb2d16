//! Logical gateway property names
//!
//! The gateway addresses per-device state through named property
//! resources. These are the logical names the bridge understands;
//! everything else a device exposes is ignored.

/// On/off state (boolean)
pub const ON: &str = "on";
/// Brightness level (number, percent)
pub const LEVEL: &str = "level";
/// Color as a `#rrggbb` hex string
pub const COLOR: &str = "color";
/// Thermostat operating mode (string)
pub const MODE: &str = "mode";
/// Thermostat temperature setpoint (number, degrees C)
pub const TEMPERATURE: &str = "temperature";
