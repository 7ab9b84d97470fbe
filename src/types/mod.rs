// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for device control.
//!
//! Each type guarantees at construction that its value lies within the closed
//! interval the devices accept, so an out-of-range request never reaches the
//! transport.
//!
//! # Types
//!
//! - [`PowerAction`] - Toggle/On/Off parsed from loose input words
//! - [`Brightness`] - Brightness level (1-100%)
//! - [`ColorTemperature`] - White color temperature in Kelvin (2700-6500)
//! - [`HsbColor`] - HSB color (Hue 0-360, Saturation 0-100, Brightness 1-100)

mod brightness;
mod color;
mod power;

pub use brightness::Brightness;
pub use color::{ColorTemperature, HsbColor};
pub use power::PowerAction;

use serde_json::Value;

use crate::error::ValueError;

/// Reads an integer out of a JSON value.
///
/// Accepts JSON integers, floats without a fractional part, and strings that
/// hold an integer.
pub(crate) fn integer_field(field: &'static str, value: &Value) -> Result<i64, ValueError> {
    let not_an_integer = || ValueError::NotAnInteger {
        field,
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                #[allow(clippy::cast_possible_truncation)]
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(f as i64),
                _ => Err(not_an_integer()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_an_integer()),
        _ => Err(not_an_integer()),
    }
}

/// Checks that `actual` lies in `[min, max]`.
pub(crate) fn check_range(
    field: &'static str,
    actual: i64,
    min: i64,
    max: i64,
) -> Result<i64, ValueError> {
    if (min..=max).contains(&actual) {
        Ok(actual)
    } else {
        Err(ValueError::OutOfRange {
            field,
            min,
            max,
            actual,
        })
    }
}
