// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node status computation.
//!
//! A node shows one indicator for all of its sessions. With a single online
//! device the text carries that device's power state and, for metering
//! devices, its last meter reading:
//!
//! ```
//! use kasa_node::session::SessionState;
//! use kasa_node::status::{SessionSummary, StatusAggregator, StatusLevel};
//! use kasa_node::transport::MeterReading;
//!
//! let plug = SessionSummary {
//!     state: SessionState::Connected,
//!     power_on: Some(true),
//!     metering: true,
//!     meter: Some(MeterReading::new(1500.0, 120_000.0, 500.0)),
//! };
//! let status = StatusAggregator::compute([plug]);
//! assert_eq!(status.level, StatusLevel::Normal);
//! assert_eq!(status.text, "One device connected (ON) [1.50W: 120.0V@0.500A]");
//! ```

use std::fmt;

use serde::Serialize;

use crate::session::{DeviceSession, SessionState};
use crate::transport::{DeviceHandle, MeterReading};

/// Indicator level, from healthy to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// Devices connected, none offline.
    Normal,
    /// Nothing connected, or some devices offline.
    Degraded,
    /// Nothing connected and some devices offline.
    Critical,
}

impl StatusLevel {
    /// Returns the next worse level, saturating at `Critical`.
    #[must_use]
    pub const fn downgrade(self) -> Self {
        match self {
            Self::Normal => Self::Degraded,
            Self::Degraded | Self::Critical => Self::Critical,
        }
    }
}

/// Status descriptor shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStatus {
    /// Indicator level.
    pub level: StatusLevel,
    /// Human-readable text.
    pub text: String,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.level, self.text)
    }
}

/// The facts about one session that status computation needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    /// Lifecycle state.
    pub state: SessionState,
    /// Last known power state.
    pub power_on: Option<bool>,
    /// Whether the device reports energy metering.
    pub metering: bool,
    /// Last meter reading.
    pub meter: Option<MeterReading>,
}

impl<H: DeviceHandle> From<&DeviceSession<H>> for SessionSummary {
    fn from(session: &DeviceSession<H>) -> Self {
        Self {
            state: session.state(),
            power_on: session.snapshot().power_on,
            metering: session.capabilities().is_some_and(|caps| caps.metering),
            meter: session.snapshot().meter,
        }
    }
}

/// Reduces all sessions of a node to one [`NodeStatus`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusAggregator;

impl StatusAggregator {
    /// Computes the status of a set of sessions.
    ///
    /// Connected sessions count as online; offline, placeholder, and
    /// connecting sessions count as offline. Closed sessions are ignored.
    #[must_use]
    pub fn compute<I>(sessions: I) -> NodeStatus
    where
        I: IntoIterator<Item = SessionSummary>,
    {
        let mut online = Vec::new();
        let mut offline = 0usize;
        for session in sessions {
            match session.state {
                SessionState::Connected => online.push(session),
                SessionState::Closed => {}
                SessionState::Offline | SessionState::Placeholder | SessionState::Connecting => {
                    offline += 1;
                }
            }
        }

        let (mut level, mut text) = match online.as_slice() {
            [] => (StatusLevel::Degraded, "No devices connected".to_string()),
            [only] => (StatusLevel::Normal, single_device_text(only)),
            many => (StatusLevel::Normal, format!("{} devices connected", many.len())),
        };

        if offline > 0 {
            level = level.downgrade();
            text.push_str(&format!(" ({offline} offline)"));
        }

        NodeStatus { level, text }
    }
}

fn single_device_text(session: &SessionSummary) -> String {
    let state = if session.power_on == Some(true) { "ON" } else { "OFF" };
    let mut text = format!("One device connected ({state})");
    if let (true, Some(meter)) = (session.metering, session.meter) {
        text.push_str(&format!(
            " [{:.2}W: {:.1}V@{:.3}A]",
            meter.watts(),
            meter.volts(),
            meter.amps()
        ));
    }
    text
}
