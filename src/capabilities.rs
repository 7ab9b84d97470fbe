// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capabilities.
//!
//! A connected device reports which features it supports. The dispatcher
//! checks these flags before issuing an operation; a missing capability is
//! handled like a validation failure (the field is skipped and reported).

/// Broad family of a device, which decides how some operations are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Smart plug, power strip outlet, or wall switch.
    #[default]
    Plug,
    /// Smart light bulb or light strip.
    Bulb,
}

/// Capabilities of a smart-home device.
///
/// # Examples
///
/// ```
/// use kasa_node::Capabilities;
///
/// let basic = Capabilities::default();
/// assert!(!basic.dimmer);
///
/// let plug = Capabilities::metering_plug();
/// assert!(plug.metering);
/// assert!(plug.led);
///
/// let bulb = Capabilities::color_bulb();
/// assert!(bulb.supports_brightness());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
// Each boolean is an independent feature flag reported by the device.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Device family.
    pub kind: DeviceKind,

    /// Supports dimming through a plug/switch dimmer service.
    pub dimmer: bool,

    /// Supports brightness through the bulb lighting service.
    pub brightness: bool,

    /// Supports white color temperature.
    pub color_temperature: bool,

    /// Supports HSB color.
    pub color: bool,

    /// Supports energy metering (power, voltage, current).
    pub metering: bool,

    /// Has a controllable status LED.
    pub led: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::plug()
    }
}

impl Capabilities {
    /// A plain on/off plug with a status LED.
    #[must_use]
    pub const fn plug() -> Self {
        Self {
            kind: DeviceKind::Plug,
            dimmer: false,
            brightness: false,
            color_temperature: false,
            color: false,
            metering: false,
            led: true,
        }
    }

    /// A plug with energy metering.
    #[must_use]
    pub const fn metering_plug() -> Self {
        Self {
            metering: true,
            ..Self::plug()
        }
    }

    /// A dimmer wall switch.
    #[must_use]
    pub const fn dimmer_switch() -> Self {
        Self {
            dimmer: true,
            ..Self::plug()
        }
    }

    /// A dimmable white bulb.
    #[must_use]
    pub const fn white_bulb() -> Self {
        Self {
            kind: DeviceKind::Bulb,
            dimmer: false,
            brightness: true,
            color_temperature: false,
            color: false,
            metering: false,
            led: false,
        }
    }

    /// A bulb with tunable white and HSB color.
    #[must_use]
    pub const fn color_bulb() -> Self {
        Self {
            color_temperature: true,
            color: true,
            ..Self::white_bulb()
        }
    }

    /// Returns whether brightness can be set by either service.
    #[must_use]
    pub const fn supports_brightness(&self) -> bool {
        self.dimmer || self.brightness
    }

    /// Returns whether this is a bulb.
    #[must_use]
    pub const fn is_bulb(&self) -> bool {
        matches!(self.kind, DeviceKind::Bulb)
    }
}

/// Builder for creating custom capabilities.
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl CapabilitiesBuilder {
    /// Creates a new builder starting from a plain plug.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device family.
    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.inner.kind = kind;
        self
    }

    /// Enables dimmer support.
    #[must_use]
    pub fn with_dimmer(mut self) -> Self {
        self.inner.dimmer = true;
        self
    }

    /// Enables bulb brightness support.
    #[must_use]
    pub fn with_brightness(mut self) -> Self {
        self.inner.brightness = true;
        self
    }

    /// Enables color temperature support.
    #[must_use]
    pub fn with_color_temperature(mut self) -> Self {
        self.inner.color_temperature = true;
        self
    }

    /// Enables HSB color support.
    #[must_use]
    pub fn with_color(mut self) -> Self {
        self.inner.color = true;
        self
    }

    /// Enables energy metering support.
    #[must_use]
    pub fn with_metering(mut self) -> Self {
        self.inner.metering = true;
        self
    }

    /// Sets whether the device has a controllable LED.
    #[must_use]
    pub fn led(mut self, led: bool) -> Self {
        self.inner.led = led;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_plain_plug() {
        let caps = Capabilities::default();
        assert_eq!(caps.kind, DeviceKind::Plug);
        assert!(!caps.supports_brightness());
        assert!(!caps.metering);
        assert!(caps.led);
    }

    #[test]
    fn bulbs_have_no_led() {
        let caps = Capabilities::color_bulb();
        assert!(caps.is_bulb());
        assert!(caps.color);
        assert!(caps.color_temperature);
        assert!(!caps.led);
    }

    #[test]
    fn dimmer_switch_supports_brightness() {
        let caps = Capabilities::dimmer_switch();
        assert!(caps.supports_brightness());
        assert!(!caps.is_bulb());
    }

    #[test]
    fn builder_pattern() {
        let caps = CapabilitiesBuilder::new()
            .kind(DeviceKind::Bulb)
            .with_brightness()
            .with_metering()
            .led(false)
            .build();

        assert!(caps.is_bulb());
        assert!(caps.brightness);
        assert!(caps.metering);
        assert!(!caps.led);
        assert!(!caps.color);
    }
}
