// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payloads exchanged with a device handle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Brightness, ColorTemperature, HsbColor};

/// Raw system info snapshot reported by a device.
///
/// The snapshot is forwarded to the host verbatim; only the fields the node
/// itself needs have typed accessors.
///
/// # Examples
///
/// ```
/// use kasa_node::transport::SysInfo;
/// use serde_json::json;
///
/// let plug = SysInfo::from_value(json!({"alias": "Lamp", "relay_state": 1})).unwrap();
/// assert_eq!(plug.power_on(), Some(true));
///
/// let bulb = SysInfo::from_value(json!({"light_state": {"on_off": 0}})).unwrap();
/// assert_eq!(bulb.power_on(), Some(false));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SysInfo(Map<String, Value>);

impl SysInfo {
    /// Wraps a JSON object.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON value if it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Returns the user-assigned device name.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.0.get("alias").and_then(Value::as_str)
    }

    /// Returns the relay (plug) or light (bulb) power state.
    #[must_use]
    pub fn power_on(&self) -> Option<bool> {
        if let Some(relay) = self.0.get("relay_state") {
            return flag(relay);
        }
        self.0
            .get("light_state")
            .and_then(|light| light.get("on_off"))
            .and_then(flag)
    }

    /// Returns the underlying fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the snapshot into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

/// Instantaneous energy meter reading in milli-units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Active power in milliwatts.
    pub power_mw: f64,
    /// Voltage in millivolts.
    pub voltage_mv: f64,
    /// Current in milliamperes.
    pub current_ma: f64,
    /// Accumulated energy in watt-hours, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_wh: Option<f64>,
}

impl MeterReading {
    /// Creates a reading from milli-unit values.
    #[must_use]
    pub const fn new(power_mw: f64, voltage_mv: f64, current_ma: f64) -> Self {
        Self {
            power_mw,
            voltage_mv,
            current_ma,
            total_wh: None,
        }
    }

    /// Returns power in Watts.
    #[must_use]
    pub fn watts(&self) -> f64 {
        self.power_mw / 1000.0
    }

    /// Returns voltage in Volts.
    #[must_use]
    pub fn volts(&self) -> f64 {
        self.voltage_mv / 1000.0
    }

    /// Returns current in Amperes.
    #[must_use]
    pub fn amps(&self) -> f64 {
        self.current_ma / 1000.0
    }

    /// Converts the reading to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A partial light state for the bulb lighting service.
///
/// Only the populated fields are sent to the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LightState {
    /// Brightness level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<Brightness>,
    /// Color temperature in Kelvin; `0` clears it in favor of HSB color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<u16>,
    /// Hue in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    /// Saturation in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u8>,
}

impl LightState {
    /// A light state that only changes brightness.
    #[must_use]
    pub fn with_brightness(brightness: Brightness) -> Self {
        Self {
            brightness: Some(brightness),
            ..Self::default()
        }
    }

    /// A light state that only changes the white color temperature.
    #[must_use]
    pub fn with_color_temperature(temperature: ColorTemperature) -> Self {
        Self {
            color_temp: Some(temperature.kelvin()),
            ..Self::default()
        }
    }

    /// A light state that sets HSB color and clears color temperature.
    #[must_use]
    pub fn with_hsb(color: HsbColor) -> Self {
        Self {
            brightness: Some(color.brightness()),
            color_temp: Some(0),
            hue: Some(color.hue()),
            saturation: Some(color.saturation()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sys_info_rejects_non_objects() {
        assert!(SysInfo::from_value(json!([1, 2])).is_none());
        assert!(SysInfo::from_value(json!("info")).is_none());
    }

    #[test]
    fn sys_info_power_on_unknown_without_fields() {
        let info = SysInfo::from_value(json!({"alias": "Desk"})).unwrap();
        assert_eq!(info.alias(), Some("Desk"));
        assert_eq!(info.power_on(), None);
    }

    #[test]
    fn meter_reading_unit_conversion() {
        let reading = MeterReading::new(1500.0, 120_000.0, 500.0);
        assert!((reading.watts() - 1.5).abs() < f64::EPSILON);
        assert!((reading.volts() - 120.0).abs() < f64::EPSILON);
        assert!((reading.amps() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn meter_reading_serializes_milli_units() {
        let value = MeterReading::new(1500.0, 120_000.0, 500.0).to_value();
        assert_eq!(value["power_mw"], json!(1500.0));
        assert!(value.get("total_wh").is_none());
    }

    #[test]
    fn hsb_light_state_clears_color_temperature() {
        let color = HsbColor::new(120, 80, 40).unwrap();
        let state = LightState::with_hsb(color);
        let value = serde_json::to_value(state).unwrap();
        assert_eq!(
            value,
            json!({"brightness": 40, "color_temp": 0, "hue": 120, "saturation": 80})
        );
    }

    #[test]
    fn brightness_light_state_omits_other_fields() {
        let state = LightState::with_brightness(Brightness::new(30).unwrap());
        assert_eq!(serde_json::to_value(state).unwrap(), json!({"brightness": 30}));
    }
}
