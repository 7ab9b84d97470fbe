// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-native events and their subscribable categories.

use serde_json::{Map, Value, json};

use crate::subscription::EventCategory;
use crate::transport::{MeterReading, SysInfo};

/// An event raised by a device handle.
///
/// Light-state changes of bulbs are reported as the power variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// The device switched on.
    PowerOn,
    /// The device switched off.
    PowerOff,
    /// Periodic power-state report, changed or not.
    PowerUpdate(bool),
    /// Load started drawing power.
    InUse,
    /// Load stopped drawing power.
    NotInUse,
    /// Periodic in-use report, changed or not.
    InUseUpdate(bool),
    /// Periodic energy meter report.
    MeterUpdate(MeterReading),
    /// System info fetched by a poll.
    SysInfoUpdate(SysInfo),
    /// A poll failed.
    PollingError(String),
}

impl NativeEvent {
    /// Returns the subscribable category of this event.
    ///
    /// Polling errors are not subscribable.
    #[must_use]
    pub fn category(&self) -> Option<EventCategory> {
        match self {
            Self::PowerOn | Self::PowerOff => Some(EventCategory::Power),
            Self::PowerUpdate(_) => Some(EventCategory::PowerUpdate),
            Self::InUse | Self::NotInUse => Some(EventCategory::InUse),
            Self::InUseUpdate(_) => Some(EventCategory::InUseUpdate),
            Self::MeterUpdate(_) => Some(EventCategory::Meter),
            Self::SysInfoUpdate(_) => Some(EventCategory::Info),
            Self::PollingError(_) => None,
        }
    }

    /// Returns the power state this event reveals, if any.
    #[must_use]
    pub fn power_state(&self) -> Option<bool> {
        match self {
            Self::PowerOn => Some(true),
            Self::PowerOff => Some(false),
            Self::PowerUpdate(on) => Some(*on),
            Self::SysInfoUpdate(info) => info.power_on(),
            _ => None,
        }
    }

    /// Returns the event-specific fields of the outbound message.
    #[must_use]
    pub fn fields(&self) -> Map<String, Value> {
        let value = match self {
            Self::PowerOn => json!({"powerOn": true, "state": true}),
            Self::PowerOff => json!({"powerOn": false, "state": false}),
            Self::PowerUpdate(on) => json!({"powerOn": on, "state": on}),
            Self::InUse => json!({"inUse": true, "state": true}),
            Self::NotInUse => json!({"inUse": false, "state": false}),
            Self::InUseUpdate(in_use) => json!({"inUse": in_use, "state": in_use}),
            Self::MeterUpdate(reading) => json!({"emeter": reading.to_value()}),
            Self::SysInfoUpdate(info) => return info.fields().clone(),
            Self::PollingError(message) => json!({"error": message}),
        };
        match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_power_variant_maps_to_a_category() {
        assert_eq!(NativeEvent::PowerOn.category(), Some(EventCategory::Power));
        assert_eq!(NativeEvent::PowerOff.category(), Some(EventCategory::Power));
        assert_eq!(
            NativeEvent::PowerUpdate(true).category(),
            Some(EventCategory::PowerUpdate)
        );
        assert_eq!(NativeEvent::NotInUse.category(), Some(EventCategory::InUse));
        assert_eq!(
            NativeEvent::InUseUpdate(false).category(),
            Some(EventCategory::InUseUpdate)
        );
    }

    #[test]
    fn polling_errors_are_not_subscribable() {
        assert_eq!(NativeEvent::PollingError("timeout".into()).category(), None);
    }

    #[test]
    fn meter_fields_carry_emeter_object() {
        let reading = MeterReading::new(1500.0, 120_000.0, 500.0);
        let fields = NativeEvent::MeterUpdate(reading).fields();
        assert_eq!(fields["emeter"]["current_ma"], json!(500.0));
    }

    #[test]
    fn power_state_from_events() {
        assert_eq!(NativeEvent::PowerOff.power_state(), Some(false));
        assert_eq!(NativeEvent::PowerUpdate(true).power_state(), Some(true));
        assert_eq!(NativeEvent::InUse.power_state(), None);
    }
}
