// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turning a classified payload into device operations.

use serde_json::Value;

use crate::Capabilities;
use crate::error::{CommandError, DeviceError, Error, ValueError};
use crate::subscription::Directive;
use crate::types::{Brightness, ColorTemperature, HsbColor, PowerAction};

use super::{ControlFields, Payload, TextCommand};

/// A validated device control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Toggle or switch the relay or light.
    Power(PowerAction),
    /// Set brightness.
    Brightness(Brightness),
    /// Set white color temperature.
    Temperature(ColorTemperature),
    /// Set HSB color.
    Hsb(HsbColor),
    /// Switch the status LED.
    Led(bool),
}

/// Everything one input asks for, plus the parts that were rejected.
#[derive(Debug, Default)]
pub struct Plan {
    /// Device controls, run concurrently.
    pub controls: Vec<Control>,
    /// Named commands, run concurrently with the controls.
    pub commands: Vec<TextCommand>,
    /// Subscription changes, applied before any operation starts.
    pub directives: Vec<Directive>,
    /// Validation, capability, and command failures to report.
    pub rejected: Vec<Error>,
}

impl Plan {
    /// Builds the plan for `payload` on a device with `capabilities`.
    ///
    /// Each field or element is handled independently: a rejected one is
    /// recorded and the rest still proceed.
    #[must_use]
    pub fn build(payload: &Payload, capabilities: &Capabilities) -> Self {
        let mut plan = Self::default();
        match payload {
            Payload::Structured(fields) => plan.structured(fields, capabilities),
            Payload::EventList(items) => {
                for item in items {
                    plan.list_item(item);
                }
            }
            Payload::Text(text) => plan.text(text),
            Payload::Toggle(on) => plan.controls.push(Control::Power(PowerAction::from(*on))),
            Payload::Unsupported => plan.reject(CommandError::UnsupportedPayload(
                "expected an object, array, string, or boolean".to_string(),
            )),
        }
        plan
    }

    fn structured(&mut self, fields: &ControlFields, capabilities: &Capabilities) {
        if let Some(state) = &fields.state {
            self.push_control(PowerAction::from_json(state).map(Control::Power).map_err(Error::from));
        }

        if let Some(brightness) = &fields.brightness {
            let control = require(capabilities.supports_brightness(), "brightness")
                .and_then(|()| Brightness::from_json(brightness).map_err(Error::from))
                .map(Control::Brightness);
            self.push_control(control);
        }

        if let Some(temperature) = &fields.temperature {
            let control = require(capabilities.color_temperature, "color temperature")
                .and_then(|()| ColorTemperature::from_json(temperature).map_err(Error::from))
                .map(Control::Temperature);
            self.push_control(control);
        }

        if let Some(hsb) = &fields.hsb {
            let control = require(capabilities.color, "color")
                .and_then(|()| HsbColor::from_json(hsb).map_err(Error::from))
                .map(Control::Hsb);
            self.push_control(control);
        }

        if let Some(led) = &fields.led {
            let control = require(capabilities.led, "status LED").and_then(|()| match led {
                Value::Bool(on) => Ok(Control::Led(*on)),
                other => Err(ValueError::NotABoolean {
                    field: "led",
                    value: other.to_string(),
                }
                .into()),
            });
            self.push_control(control);
        }

        if let Some(events) = &fields.events {
            match events {
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(s) => self.directive(s),
                            other => self.reject(CommandError::InvalidInput(other.to_string())),
                        }
                    }
                }
                Value::String(s) => self.directives(s),
                other => self.reject(CommandError::InvalidInput(other.to_string())),
            }
        }
    }

    fn list_item(&mut self, item: &Value) {
        match item {
            Value::String(s) => {
                if let Ok(action) = s.parse::<PowerAction>() {
                    self.controls.push(Control::Power(action));
                } else if let Ok(command) = s.parse::<TextCommand>() {
                    self.commands.push(command);
                } else {
                    self.directive(s);
                }
            }
            Value::Bool(on) => self.controls.push(Control::Power(PowerAction::from(*on))),
            other => self.reject(CommandError::InvalidInput(other.to_string())),
        }
    }

    fn text(&mut self, text: &str) {
        if let Ok(action) = text.parse::<PowerAction>() {
            self.controls.push(Control::Power(action));
        } else if text.contains('|') || Directive::is_directive_like(text) {
            self.directives(text);
        } else {
            match text.parse::<TextCommand>() {
                Ok(command) => self.commands.push(command),
                Err(e) => self.reject(e),
            }
        }
    }

    fn directives(&mut self, delimited: &str) {
        for part in delimited.split('|').filter(|part| !part.trim().is_empty()) {
            self.directive(part);
        }
    }

    fn directive(&mut self, s: &str) {
        match s.parse::<Directive>() {
            Ok(directive) => self.directives.push(directive),
            Err(e) => self.reject(e),
        }
    }

    fn push_control(&mut self, control: Result<Control, Error>) {
        match control {
            Ok(control) => self.controls.push(control),
            Err(e) => self.rejected.push(e),
        }
    }

    fn reject(&mut self, error: impl Into<Error>) {
        self.rejected.push(error.into());
    }
}

fn require(supported: bool, capability: &'static str) -> Result<(), Error> {
    if supported {
        Ok(())
    } else {
        Err(DeviceError::UnsupportedCapability { capability }.into())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::subscription::EventCategory;

    fn plan(payload: Value, capabilities: &Capabilities) -> Plan {
        Plan::build(&Payload::classify(&payload), capabilities)
    }

    #[test]
    fn state_field_maps_to_power() {
        let plan = plan(json!({"state": "on"}), &Capabilities::plug());
        assert_eq!(plan.controls, vec![Control::Power(PowerAction::On)]);
        assert!(plan.rejected.is_empty());
    }

    #[test]
    fn invalid_state_is_rejected() {
        let plan = plan(json!({"state": "dim"}), &Capabilities::plug());
        assert!(plan.controls.is_empty());
        assert_eq!(plan.rejected.len(), 1);
        assert_eq!(plan.rejected[0].kind(), ErrorKind::Validation);
    }

    #[test]
    fn brightness_out_of_range_skips_only_that_field() {
        let plan = plan(
            json!({"brightness": 150, "state": "off"}),
            &Capabilities::dimmer_switch(),
        );
        assert_eq!(plan.controls, vec![Control::Power(PowerAction::Off)]);
        assert_eq!(plan.rejected.len(), 1);
        assert!(matches!(
            plan.rejected[0],
            Error::Value(ValueError::OutOfRange { actual: 150, .. })
        ));
    }

    #[test]
    fn brightness_bounds() {
        let caps = Capabilities::white_bulb();
        for ok in [1, 100] {
            assert!(plan(json!({"brightness": ok}), &caps).rejected.is_empty());
        }
        for bad in [0, 101] {
            assert_eq!(plan(json!({"brightness": bad}), &caps).rejected.len(), 1);
        }
    }

    #[test]
    fn temperature_bounds() {
        let caps = Capabilities::color_bulb();
        for ok in [2700, 6500] {
            assert!(plan(json!({"temperature": ok}), &caps).rejected.is_empty());
        }
        for bad in [2699, 6501] {
            assert_eq!(plan(json!({"temperature": bad}), &caps).rejected.len(), 1);
        }
    }

    #[test]
    fn missing_capability_is_reported() {
        let plan = plan(
            json!({"hsb": {"hue": 10, "saturation": 10, "brightness": 10}, "temperature": 3000}),
            &Capabilities::plug(),
        );
        assert!(plan.controls.is_empty());
        assert_eq!(plan.rejected.len(), 2);
        assert!(plan.rejected.iter().all(|e| e.kind() == ErrorKind::Capability));
    }

    #[test]
    fn hsb_requires_every_key() {
        let plan = plan(
            json!({"hsb": {"hue": 10, "saturation": 10}}),
            &Capabilities::color_bulb(),
        );
        assert!(matches!(
            plan.rejected[0],
            Error::Value(ValueError::MissingField("brightness"))
        ));
    }

    #[test]
    fn led_needs_a_boolean() {
        let caps = Capabilities::plug();
        assert_eq!(plan(json!({"led": false}), &caps).controls, vec![Control::Led(false)]);
        assert_eq!(plan(json!({"led": "off"}), &caps).rejected.len(), 1);
        assert_eq!(
            plan(json!({"led": true}), &Capabilities::white_bulb()).rejected[0].kind(),
            ErrorKind::Capability
        );
    }

    #[test]
    fn events_field_accepts_array_or_delimited_string() {
        let caps = Capabilities::plug();
        let from_array = plan(json!({"events": ["startMeterEvents", "stopPowerEvents"]}), &caps);
        let from_string = plan(json!({"events": "startMeterEvents|stopPowerEvents"}), &caps);

        let expected = vec![
            Directive::Start(EventCategory::Meter),
            Directive::Stop(EventCategory::Power),
        ];
        assert_eq!(from_array.directives, expected);
        assert_eq!(from_string.directives, expected);
    }

    #[test]
    fn text_routing() {
        let caps = Capabilities::plug();
        assert_eq!(plan(json!("toggle"), &caps).controls, vec![Control::Power(PowerAction::Toggle)]);
        assert_eq!(plan(json!("getMeterInfo"), &caps).commands, vec![TextCommand::GetMeterInfo]);
        assert_eq!(
            plan(json!("startInfoEvents"), &caps).directives,
            vec![Directive::Start(EventCategory::Info)]
        );
        assert_eq!(plan(json!("stopAllEvents"), &caps).directives, vec![Directive::StopAll]);

        let unknown = plan(json!("dance"), &caps);
        assert!(unknown.commands.is_empty());
        assert_eq!(unknown.rejected[0].kind(), ErrorKind::Command);
    }

    #[test]
    fn event_list_mixes_directives_commands_and_power() {
        let plan = plan(
            json!(["startPowerEvents", "getInfo", true, "off", 3]),
            &Capabilities::plug(),
        );
        assert_eq!(plan.directives, vec![Directive::Start(EventCategory::Power)]);
        assert_eq!(plan.commands, vec![TextCommand::GetInfo]);
        assert_eq!(
            plan.controls,
            vec![Control::Power(PowerAction::On), Control::Power(PowerAction::Off)]
        );
        assert_eq!(plan.rejected.len(), 1);
    }

    #[test]
    fn unsupported_payload_does_nothing() {
        let plan = plan(json!(12), &Capabilities::plug());
        assert!(plan.controls.is_empty() && plan.commands.is_empty());
        assert!(matches!(
            plan.rejected[0],
            Error::Command(CommandError::UnsupportedPayload(_))
        ));
    }
}
