// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Identifier of a logical device: `<address>` or `<address>/<childIndex>`.
///
/// # Examples
///
/// ```
/// use kasa_node::session::SessionId;
///
/// let plug: SessionId = "10.0.0.5".parse().unwrap();
/// assert_eq!(plug.address(), "10.0.0.5");
/// assert_eq!(plug.child(), None);
///
/// let outlet: SessionId = "10.0.0.6/2".parse().unwrap();
/// assert_eq!(outlet.child(), Some(2));
/// assert_eq!(outlet.to_string(), "10.0.0.6/2");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId {
    address: String,
    child: Option<u8>,
}

impl SessionId {
    /// Creates an identifier for a whole device.
    #[must_use]
    pub fn device(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            child: None,
        }
    }

    /// Creates an identifier for a child outlet.
    #[must_use]
    pub fn outlet(address: impl Into<String>, child: u8) -> Self {
        Self {
            address: address.into(),
            child: Some(child),
        }
    }

    /// Returns the network address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the child outlet index, if this is an outlet.
    #[must_use]
    pub fn child(&self) -> Option<u8> {
        self.child
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({self})")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.child {
            Some(child) => write!(f, "{}/{child}", self.address),
            None => f.write_str(&self.address),
        }
    }
}

impl FromStr for SessionId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidSessionId(s.to_string());
        let s = s.trim();

        let (address, child) = match s.split_once('/') {
            Some((address, child)) => (address, Some(child.parse::<u8>().map_err(|_| invalid())?)),
            None => (s, None),
        };
        if address.is_empty() || address.contains(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self {
            address: address.to_string(),
            child,
        })
    }
}
