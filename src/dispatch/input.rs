// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound messages and their classified payloads.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::session::SessionId;

/// A message delivered by the host to a node.
///
/// # Examples
///
/// ```
/// use kasa_node::dispatch::InputMessage;
/// use serde_json::json;
///
/// let msg: InputMessage = serde_json::from_value(json!({
///     "topic": "10.0.0.5",
///     "payload": {"state": "on"}
/// }))
/// .unwrap();
/// assert_eq!(msg.topic.as_deref(), Some("10.0.0.5"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputMessage {
    /// Target device identifier; the node's default device when absent.
    #[serde(default)]
    pub topic: Option<String>,
    /// Message body.
    #[serde(default)]
    pub payload: Value,
}

impl InputMessage {
    /// Creates a message for the default device.
    #[must_use]
    pub fn new(payload: Value) -> Self {
        Self {
            topic: None,
            payload,
        }
    }

    /// Sets the target device identifier.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// Named fields of a structured control object.
///
/// Values are kept raw; validation happens when the dispatcher builds its
/// plan against the device capabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlFields {
    /// `state`: power action.
    pub state: Option<Value>,
    /// `brightness`: 1 to 100.
    pub brightness: Option<Value>,
    /// `temperature`: 2700 to 6500 Kelvin.
    pub temperature: Option<Value>,
    /// `hsb`: `{hue, saturation, brightness}`.
    pub hsb: Option<Value>,
    /// `led`: boolean.
    pub led: Option<Value>,
    /// `events`: array or `|`-delimited string of directives.
    pub events: Option<Value>,
}

impl ControlFields {
    fn from_map(map: &Map<String, Value>) -> Self {
        let field = |name: &str| map.get(name).cloned();
        Self {
            state: field("state"),
            brightness: field("brightness"),
            temperature: field("temperature"),
            hsb: field("hsb"),
            led: field("led"),
            events: field("events"),
        }
    }
}

/// The shape of an input payload, decided once on arrival.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON object with control fields.
    Structured(ControlFields),
    /// JSON array of directives, commands, or power values.
    EventList(Vec<Value>),
    /// A command, power word, or delimited directive string.
    Text(String),
    /// A JSON boolean switching power.
    Toggle(bool),
    /// Anything else.
    Unsupported,
}

impl Payload {
    /// Classifies a raw payload: object, then array, then string, then boolean.
    #[must_use]
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(ControlFields::from_map(map)),
            Value::Array(items) => Self::EventList(items.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Toggle(*b),
            Value::Null | Value::Number(_) => Self::Unsupported,
        }
    }
}

/// An input bound to its session, carrying both raw and classified payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEnvelope {
    /// Target session.
    pub id: SessionId,
    /// The payload as received, used by control-result transforms.
    pub raw: Value,
    /// The classified payload.
    pub payload: Payload,
}

impl InputEnvelope {
    /// Classifies `raw` and binds it to `id`.
    #[must_use]
    pub fn new(id: SessionId, raw: Value) -> Self {
        let payload = Payload::classify(&raw);
        Self { id, raw, payload }
    }
}
