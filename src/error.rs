// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `kasa_node` library.
//!
//! Every failure in this crate is recoverable: it is either absorbed locally
//! (the offending field or directive is skipped and reported) or surfaced as
//! a report while the session stays usable. The hierarchy mirrors the kinds
//! of failure a node can observe: value validation, transport communication,
//! device capability checks, and command interpretation.

use std::fmt;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A field value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Communication with the device failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The device or session cannot perform the operation.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The input could not be interpreted as a command or directive.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

impl Error {
    /// Returns the coarse classification used in error reports.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Value(_) => ErrorKind::Validation,
            Self::Transport(_) | Self::Device(DeviceError::SessionClosed) => ErrorKind::Connection,
            Self::Device(DeviceError::UnsupportedCapability { .. }) => ErrorKind::Capability,
            Self::Command(_) => ErrorKind::Command,
        }
    }
}

/// Coarse error classification carried by [`ErrorReport`](crate::event::ErrorReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Out-of-range or malformed field.
    Validation,
    /// Connect or device operation failure.
    Connection,
    /// Operation requested for a capability the device lacks.
    Capability,
    /// Unknown command, directive, or payload.
    Command,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Connection => "connection",
            Self::Capability => "capability",
            Self::Command => "command",
        };
        f.write_str(name)
    }
}

/// Errors related to value validation and constraints.
///
/// These errors occur when an input field cannot be turned into one of the
/// constrained types in [`types`](crate::types).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("invalid {field} value {actual}; should be between {min} and {max}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A numeric field held something other than an integer.
    #[error("invalid {field} value {value}; expected an integer")]
    NotAnInteger {
        /// Name of the offending field.
        field: &'static str,
        /// JSON rendering of the rejected value.
        value: String,
    },

    /// A boolean field held something other than a boolean.
    #[error("invalid {field} value {value}; expected true or false")]
    NotABoolean {
        /// Name of the offending field.
        field: &'static str,
        /// JSON rendering of the rejected value.
        value: String,
    },

    /// A required key is missing from a composite value.
    #[error("key {0} is missing")]
    MissingField(&'static str),

    /// An invalid power state was provided.
    #[error("invalid state value {0}; should be toggle|switch|true|on|false|off")]
    InvalidPowerState(String),

    /// A device identifier does not follow `<address>` or `<address>/<child>`.
    #[error("invalid device id: {0}")]
    InvalidSessionId(String),

    /// A configuration value could not be interpreted.
    #[error("invalid configuration value for {field}: {message}")]
    InvalidConfig {
        /// The configuration field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// Errors related to communication with a device through the transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The device answered with an error.
    #[error("device rejected request: {0}")]
    Rejected(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// Periodic polling of the device failed.
    #[error("polling failed: {0}")]
    Polling(String),
}

/// Errors related to device sessions and capabilities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Device does not support the requested capability.
    #[error("device does not support {capability}")]
    UnsupportedCapability {
        /// The capability that is not supported.
        capability: &'static str,
    },

    /// The session was torn down.
    #[error("session is closed")]
    SessionClosed,
}

/// Errors related to interpreting text commands and directives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The string is neither a known command nor a directive.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A start/stop directive named an unknown event category.
    #[error("unknown event category: {0}")]
    UnknownEventCategory(String),

    /// The payload shape is not supported.
    #[error("unsupported payload: {0}")]
    UnsupportedPayload(String),

    /// A `json` control-result could not parse the input.
    #[error("cannot parse input as JSON: {0}")]
    Json(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
