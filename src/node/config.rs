// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node configuration.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::{DEFAULT_TIMEOUT, PayloadType, ResultPolicy, TextCommand};
use crate::error::{Error, ValueError};
use crate::session::SessionId;
use crate::transport::DiscoveryOptions;
use crate::types::integer_field;

/// Configuration of a [`KasaNode`](super::KasaNode).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kasa_node::dispatch::PayloadType;
/// use kasa_node::node::NodeConfig;
///
/// let config = NodeConfig::new()
///     .with_device("10.0.0.5".parse().unwrap())
///     .with_poll_interval(Duration::from_secs(10))
///     .with_payload_type(PayloadType::Bool)
///     .with_passthru(true);
/// assert_eq!(config.timeout(), Duration::from_secs(10));
///
/// let from_host = NodeConfig::from_json(&serde_json::json!({
///     "device": "10.0.0.6/1",
///     "interval": "5000",
///     "payload": "getQuickInfo"
/// }))
/// .unwrap();
/// assert!(from_host.discovery_options().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Device targeted by inputs without a topic; connected on start.
    pub device: Option<SessionId>,
    /// Discovery probe interval; discovery is off when unset.
    pub discovery_interval: Option<Duration>,
    /// Device polling interval; polling is off when unset.
    pub poll_interval: Option<Duration>,
    /// Command run by the `info` payload type.
    pub default_command: TextCommand,
    /// Control-result transform.
    pub payload_type: PayloadType,
    /// Publish transformed control-results for host inputs.
    pub passthru: bool,
    /// Forward absorbed polling failures to the host.
    pub debug: bool,
    /// Explicit bound on connect and device operations.
    pub timeout: Option<Duration>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device: None,
            discovery_interval: None,
            poll_interval: None,
            default_command: TextCommand::GetInfo,
            payload_type: PayloadType::Info,
            passthru: false,
            debug: false,
            timeout: None,
        }
    }
}

impl NodeConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default device.
    #[must_use]
    pub fn with_device(mut self, device: SessionId) -> Self {
        self.device = Some(device);
        self
    }

    /// Enables discovery with the given probe interval.
    #[must_use]
    pub fn with_discovery_interval(mut self, interval: Duration) -> Self {
        self.discovery_interval = Some(interval);
        self
    }

    /// Enables device polling with the given interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Sets the command run by the `info` payload type.
    #[must_use]
    pub fn with_default_command(mut self, command: TextCommand) -> Self {
        self.default_command = command;
        self
    }

    /// Sets the control-result transform.
    #[must_use]
    pub fn with_payload_type(mut self, payload_type: PayloadType) -> Self {
        self.payload_type = payload_type;
        self
    }

    /// Sets whether transformed control-results are published for host inputs.
    #[must_use]
    pub fn with_passthru(mut self, passthru: bool) -> Self {
        self.passthru = passthru;
        self
    }

    /// Sets whether absorbed failures are forwarded to the host.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the bound on connect and device operations.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the operation bound: explicit timeout, else polling interval,
    /// else 30 seconds.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
            .or(self.poll_interval)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Returns the control-result policy.
    #[must_use]
    pub fn result_policy(&self) -> ResultPolicy {
        ResultPolicy {
            payload_type: self.payload_type,
            passthru: self.passthru,
        }
    }

    /// Returns the discovery options, if discovery is enabled.
    #[must_use]
    pub fn discovery_options(&self) -> Option<DiscoveryOptions> {
        self.discovery_interval.map(DiscoveryOptions::new)
    }

    /// Parses the host's JSON node configuration.
    ///
    /// Intervals are milliseconds given as numbers or numeric strings; empty
    /// strings and zero disable the feature. Empty `payload`/`payloadType`
    /// fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` for malformed fields and `CommandError` for an
    /// unknown default command.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let raw = RawNodeConfig::deserialize(value).map_err(|e| ValueError::InvalidConfig {
            field: "node",
            message: e.to_string(),
        })?;

        let device = non_empty(raw.device.as_deref())
            .map(str::parse::<SessionId>)
            .transpose()?;
        let default_command = non_empty(raw.payload.as_deref())
            .map(str::parse::<TextCommand>)
            .transpose()?
            .unwrap_or_default();
        let payload_type = non_empty(raw.payload_type.as_deref())
            .map(str::parse::<PayloadType>)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            device,
            discovery_interval: millis("interval", raw.interval.as_ref())?,
            poll_interval: millis("eventInterval", raw.event_interval.as_ref())?,
            default_command,
            payload_type,
            passthru: raw.passthru,
            debug: raw.debug,
            timeout: millis("timeout", raw.timeout.as_ref())?,
        })
    }
}

/// Host-side shape of the node configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawNodeConfig {
    device: Option<String>,
    interval: Option<Value>,
    event_interval: Option<Value>,
    payload: Option<String>,
    payload_type: Option<String>,
    passthru: bool,
    debug: bool,
    timeout: Option<Value>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn millis(field: &'static str, value: Option<&Value>) -> Result<Option<Duration>, ValueError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(value) => value,
    };
    let ms = integer_field(field, value)?;
    match u64::try_from(ms) {
        Ok(0) => Ok(None),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(_) => Err(ValueError::InvalidConfig {
            field,
            message: format!("{ms} is negative"),
        }),
    }
}
