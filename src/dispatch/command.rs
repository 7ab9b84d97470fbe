// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named text commands.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::CommandError;

/// A named query or maintenance command sent as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum TextCommand {
    /// Full system info snapshot.
    #[default]
    #[serde(rename = "getInfo")]
    GetInfo,
    /// Cloud-link metadata.
    #[serde(rename = "getCloudInfo")]
    GetCloudInfo,
    /// Lightweight info, tagged with the outlet index for child sessions.
    #[serde(rename = "getQuickInfo")]
    GetQuickInfo,
    /// Instantaneous power, voltage, and current.
    #[serde(rename = "getMeterInfo")]
    GetMeterInfo,
    /// Reset the energy counters.
    #[serde(rename = "eraseStats")]
    EraseStats,
    /// Disable every event category of the session.
    #[serde(rename = "clearEvents")]
    ClearEvents,
}

impl TextCommand {
    /// All commands.
    pub const ALL: [Self; 6] = [
        Self::GetInfo,
        Self::GetCloudInfo,
        Self::GetQuickInfo,
        Self::GetMeterInfo,
        Self::EraseStats,
        Self::ClearEvents,
    ];

    /// Returns the command string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetInfo => "getInfo",
            Self::GetCloudInfo => "getCloudInfo",
            Self::GetQuickInfo => "getQuickInfo",
            Self::GetMeterInfo => "getMeterInfo",
            Self::EraseStats => "eraseStats",
            Self::ClearEvents => "clearEvents",
        }
    }
}

impl fmt::Display for TextCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.name() == s)
            .ok_or_else(|| CommandError::InvalidInput(s.to_string()))
    }
}
