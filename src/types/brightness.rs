// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for dimmer and bulb control.

use std::fmt;

use serde_json::Value;

use crate::error::ValueError;

use super::{check_range, integer_field};

/// Brightness level as a percentage (1-100).
///
/// Zero is not a brightness: switching a device off goes through
/// [`PowerAction`](super::PowerAction).
///
/// # Examples
///
/// ```
/// use kasa_node::types::Brightness;
///
/// let level = Brightness::new(75).unwrap();
/// assert_eq!(level.value(), 75);
///
/// assert!(Brightness::new(0).is_err());
/// assert!(Brightness::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Brightness(u8);

impl Brightness {
    /// Lowest accepted brightness.
    pub const MIN: Self = Self(1);

    /// Highest accepted brightness.
    pub const MAX: Self = Self(100);

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside `[1, 100]`.
    pub fn new(value: i64) -> Result<Self, ValueError> {
        Self::checked("brightness", value)
    }

    /// Parses a brightness from a JSON field value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the value is not an integer in `[1, 100]`.
    pub fn from_json(value: &Value) -> Result<Self, ValueError> {
        Self::checked_json("brightness", value)
    }

    pub(crate) fn checked_json(field: &'static str, value: &Value) -> Result<Self, ValueError> {
        Self::checked(field, integer_field(field, value)?)
    }

    fn checked(field: &'static str, value: i64) -> Result<Self, ValueError> {
        let v = check_range(
            field,
            value,
            i64::from(Self::MIN.0),
            i64::from(Self::MAX.0),
        )?;
        // Range checked above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(v as u8))
    }

    /// Returns the brightness percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
