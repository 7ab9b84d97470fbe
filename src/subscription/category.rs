// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable event categories.

use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// A class of device-originated events that can be enabled per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventCategory {
    /// Power switched on or off.
    Power,
    /// Power state reported on each poll.
    PowerUpdate,
    /// Load started or stopped drawing power.
    InUse,
    /// In-use state reported on each poll.
    InUseUpdate,
    /// Energy meter reported on each poll.
    Meter,
    /// Discovery saw the device go online or offline.
    Online,
    /// System info fetched on each poll.
    Info,
}

impl EventCategory {
    /// Every category.
    pub const ALL: [Self; 7] = [
        Self::Power,
        Self::PowerUpdate,
        Self::InUse,
        Self::InUseUpdate,
        Self::Meter,
        Self::Online,
        Self::Info,
    ];

    /// Returns the name used in directives and outbound messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "PowerEvents",
            Self::PowerUpdate => "PowerUpdateEvents",
            Self::InUse => "InUseEvents",
            Self::InUseUpdate => "InUseUpdateEvents",
            Self::Meter => "MeterEvents",
            Self::Online => "OnlineEvents",
            Self::Info => "InfoEvents",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventCategory {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| CommandError::UnknownEventCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for category in EventCategory::ALL {
            assert_eq!(category.name().parse::<EventCategory>().unwrap(), category);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "DanceEvents".parse::<EventCategory>(),
            Err(CommandError::UnknownEventCategory("DanceEvents".to_string()))
        );
    }
}
