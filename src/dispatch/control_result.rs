// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output policy applied after an input's controls succeed.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CommandError, ValueError};
use crate::event::Origin;

/// How the control-result payload is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    /// Parse the input as JSON.
    Json,
    /// Milliseconds since the Unix epoch.
    Date,
    /// `true` only if the input was the boolean `true`.
    Bool,
    /// The input as an integer, or `null`.
    Num,
    /// Run the default command and publish its result.
    #[default]
    Info,
}

impl PayloadType {
    /// Returns the configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Date => "date",
            Self::Bool => "bool",
            Self::Num => "num",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "date" => Ok(Self::Date),
            "bool" => Ok(Self::Bool),
            "num" => Ok(Self::Num),
            "info" => Ok(Self::Info),
            other => Err(ValueError::InvalidConfig {
                field: "payloadType",
                message: format!("unknown payload type {other}"),
            }),
        }
    }
}

/// What to do once every control of an input has succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlResult {
    /// Publish this payload.
    Publish(Value),
    /// Run the default command; its own result is the output.
    RunDefault,
    /// Publish nothing.
    Suppress,
}

/// Payload transform plus passthrough gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultPolicy {
    /// Transform applied to the input.
    pub payload_type: PayloadType,
    /// Publish transformed results for host inputs too.
    pub passthru: bool,
}

impl ResultPolicy {
    /// Decides the control-result for an input with payload `raw`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Json` if the `json` transform cannot parse a
    /// string input.
    pub fn resolve(&self, raw: &Value, origin: Origin) -> Result<ControlResult, CommandError> {
        let payload = match self.payload_type {
            PayloadType::Info => return Ok(ControlResult::RunDefault),
            _ if !self.passthru && origin == Origin::Input => return Ok(ControlResult::Suppress),
            PayloadType::Json => match raw {
                Value::String(s) => {
                    serde_json::from_str(s).map_err(|e| CommandError::Json(e.to_string()))?
                }
                other => other.clone(),
            },
            PayloadType::Date => Value::from(chrono::Utc::now().timestamp_millis()),
            PayloadType::Bool => Value::Bool(*raw == Value::Bool(true)),
            PayloadType::Num => leading_integer(raw).map_or(Value::Null, Value::from),
        };
        Ok(ControlResult::Publish(payload))
    }
}

/// Integer coercion: numbers are truncated, strings contribute their leading
/// optionally signed digits.
fn leading_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim_start();
            let digits_start = usize::from(s.starts_with(['-', '+']));
            let end = s[digits_start..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(s.len(), |i| i + digits_start);
            if end == digits_start {
                None
            } else {
                s[..end].parse().ok()
            }
        }
        _ => None,
    }
}
