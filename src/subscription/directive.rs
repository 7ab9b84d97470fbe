// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Start/stop directives for event categories.

use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

use super::EventCategory;

const START: &str = "start";
const STOP: &str = "stop";
const STOP_ALL: &str = "stopAllEvents";

/// A subscription change requested by an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Enable a category.
    Start(EventCategory),
    /// Disable a category.
    Stop(EventCategory),
    /// Disable every category.
    StopAll,
}

impl Directive {
    /// Returns whether `s` begins with a start/stop keyword, ignoring case.
    #[must_use]
    pub fn is_directive_like(s: &str) -> bool {
        strip_keyword(s, START).is_some() || strip_keyword(s, STOP).is_some()
    }
}

fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let head = s.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &s[keyword.len()..])
}

impl FromStr for Directive {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == STOP_ALL {
            return Ok(Self::StopAll);
        }
        if let Some(name) = strip_keyword(s, START) {
            return Ok(Self::Start(name.parse()?));
        }
        if let Some(name) = strip_keyword(s, STOP) {
            return Ok(Self::Stop(name.parse()?));
        }
        Err(CommandError::InvalidInput(s.to_string()))
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(category) => write!(f, "{START}{category}"),
            Self::Stop(category) => write!(f, "{STOP}{category}"),
            Self::StopAll => f.write_str(STOP_ALL),
        }
    }
}
