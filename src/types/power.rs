// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power control actions.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ValueError;

/// A requested change to a device's relay or light.
///
/// Parsed case-insensitively from `TOGGLE`/`SWITCH`, `ON`/`TRUE`, and
/// `OFF`/`FALSE`, or taken from a JSON boolean.
///
/// # Examples
///
/// ```
/// use kasa_node::types::PowerAction;
///
/// assert_eq!("switch".parse::<PowerAction>().unwrap(), PowerAction::Toggle);
/// assert_eq!("True".parse::<PowerAction>().unwrap(), PowerAction::On);
/// assert_eq!(PowerAction::from(false), PowerAction::Off);
/// assert!("dim".parse::<PowerAction>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerAction {
    /// Invert the current power state.
    Toggle,
    /// Switch on.
    On,
    /// Switch off.
    Off,
}

impl PowerAction {
    /// Parses a power action from a JSON `state` field.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidPowerState` for anything other than a
    /// boolean or a recognized word.
    pub fn from_json(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(Self::from(*b)),
            Value::String(s) => s.parse(),
            other => Err(ValueError::InvalidPowerState(other.to_string())),
        }
    }

    /// Returns the canonical upper-case word.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Toggle => "TOGGLE",
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TOGGLE" | "SWITCH" => Ok(Self::Toggle),
            "ON" | "TRUE" => Ok(Self::On),
            "OFF" | "FALSE" => Ok(Self::Off),
            _ => Err(ValueError::InvalidPowerState(s.to_string())),
        }
    }
}

impl From<bool> for PowerAction {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}
