// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for smart bulbs.
//!
//! - [`ColorTemperature`] - White color temperature in Kelvin
//! - [`HsbColor`] - Hue, saturation, and brightness color representation

use std::fmt;

use serde_json::Value;

use crate::error::ValueError;

use super::{Brightness, check_range, integer_field};

/// White color temperature in Kelvin (2700-6500).
///
/// # Examples
///
/// ```
/// use kasa_node::types::ColorTemperature;
///
/// let warm = ColorTemperature::new(2700).unwrap();
/// assert_eq!(warm.kelvin(), 2700);
///
/// assert!(ColorTemperature::new(2699).is_err());
/// assert!(ColorTemperature::new(6501).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ColorTemperature(u16);

impl ColorTemperature {
    /// Warmest supported white.
    pub const WARMEST: Self = Self(2700);

    /// Coolest supported white.
    pub const COOLEST: Self = Self(6500);

    /// Creates a new color temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if kelvin is outside `[2700, 6500]`.
    pub fn new(kelvin: i64) -> Result<Self, ValueError> {
        let v = check_range(
            "temperature",
            kelvin,
            i64::from(Self::WARMEST.0),
            i64::from(Self::COOLEST.0),
        )?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(v as u16))
    }

    /// Parses a color temperature from a JSON field value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the value is not an integer in `[2700, 6500]`.
    pub fn from_json(value: &Value) -> Result<Self, ValueError> {
        Self::new(integer_field("temperature", value)?)
    }

    /// Returns the temperature in Kelvin.
    #[must_use]
    pub const fn kelvin(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

/// HSB (Hue, Saturation, Brightness) color.
///
/// All three components are required; a partial color is rejected rather
/// than completed with defaults.
///
/// # Examples
///
/// ```
/// use kasa_node::types::HsbColor;
///
/// let green = HsbColor::new(120, 100, 50).unwrap();
/// assert_eq!(green.hue(), 120);
/// assert_eq!(green.brightness().value(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HsbColor {
    hue: u16,
    saturation: u8,
    brightness: Brightness,
}

impl HsbColor {
    /// Maximum hue value.
    pub const MAX_HUE: u16 = 360;

    /// Maximum saturation value.
    pub const MAX_SATURATION: u8 = 100;

    /// Creates a new HSB color.
    ///
    /// # Errors
    ///
    /// Returns error if any value is outside its valid range.
    pub fn new(hue: i64, saturation: i64, brightness: i64) -> Result<Self, ValueError> {
        let hue = check_range("hue", hue, 0, i64::from(Self::MAX_HUE))?;
        let saturation = check_range("saturation", saturation, 0, i64::from(Self::MAX_SATURATION))?;
        let brightness = Brightness::new(brightness)?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self {
            hue: hue as u16,
            saturation: saturation as u8,
            brightness,
        })
    }

    /// Parses an `{hue, saturation, brightness}` object.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingField` if a key is absent, or a range /
    /// integer error for the first invalid component.
    pub fn from_json(value: &Value) -> Result<Self, ValueError> {
        let Some(obj) = value.as_object() else {
            return Err(ValueError::MissingField("hue"));
        };
        let hue = obj.get("hue").ok_or(ValueError::MissingField("hue"))?;
        let saturation = obj
            .get("saturation")
            .ok_or(ValueError::MissingField("saturation"))?;
        let brightness = obj
            .get("brightness")
            .ok_or(ValueError::MissingField("brightness"))?;

        let hue = check_range("hue", integer_field("hue", hue)?, 0, i64::from(Self::MAX_HUE))?;
        let saturation = check_range(
            "saturation",
            integer_field("saturation", saturation)?,
            0,
            i64::from(Self::MAX_SATURATION),
        )?;
        let brightness = Brightness::checked_json("brightness", brightness)?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self {
            hue: hue as u16,
            saturation: saturation as u8,
            brightness,
        })
    }

    /// Returns the hue value (0-360).
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }

    /// Returns the saturation value (0-100).
    #[must_use]
    pub const fn saturation(&self) -> u8 {
        self.saturation
    }

    /// Returns the brightness.
    #[must_use]
    pub const fn brightness(&self) -> Brightness {
        self.brightness
    }
}

impl fmt::Display for HsbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HSB({}, {}%, {})",
            self.hue, self.saturation, self.brightness
        )
    }
}
