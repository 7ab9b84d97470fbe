// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outputs a node hands to its host.

use chrono::{Local, SecondsFormat};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind};
use crate::status::NodeStatus;
use crate::subscription::EventCategory;

/// Where the processing cycle that produced an output started.
///
/// A [`KasaNode`](crate::KasaNode) only runs the control-result path for host
/// inputs, so it always dispatches with [`Origin::Input`]. The other variants
/// are for hosts that drive [`CommandDispatcher`](crate::dispatch::CommandDispatcher)
/// themselves, for example to replay a poll result; passthrough suppression
/// never applies to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// An inbound host message, live or replayed from a queue.
    Input,
    /// A periodic device poll.
    Poll,
    /// The discovery/heartbeat stream.
    Discovery,
}

/// Everything a node publishes for its host.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    /// A message for the node's output port.
    Message(OutboundMessage),
    /// A new status indicator for the node.
    Status(NodeStatus),
    /// A reported, non-fatal failure.
    Error(ErrorReport),
}

/// A message for the node's output port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    /// Device identifier the message is about.
    pub topic: String,
    /// Message body.
    pub payload: Value,
}

impl OutboundMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    /// Creates a subscribed-event message: `{event, timestamp, ...fields}`.
    #[must_use]
    pub fn event(topic: impl Into<String>, category: EventCategory, fields: Map<String, Value>) -> Self {
        let mut payload = Map::with_capacity(fields.len() + 2);
        payload.insert("event".to_string(), Value::from(category.name()));
        payload.insert("timestamp".to_string(), Value::from(timestamp()));
        payload.extend(fields);
        Self::new(topic, Value::Object(payload))
    }

    /// Creates a command-result message, stamping `timestamp` into the result.
    ///
    /// Non-object results are wrapped as `{result, timestamp}`.
    #[must_use]
    pub fn stamped(topic: impl Into<String>, result: Value) -> Self {
        let mut payload = match result {
            Value::Object(fields) => fields,
            other => {
                let mut fields = Map::new();
                fields.insert("result".to_string(), other);
                fields
            }
        };
        payload.insert("timestamp".to_string(), Value::from(timestamp()));
        Self::new(topic, Value::Object(payload))
    }
}

/// A reported, non-fatal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Device identifier, when the failure concerns one device.
    pub topic: Option<String>,
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl ErrorReport {
    /// Builds a report from an error.
    #[must_use]
    pub fn new(topic: Option<String>, error: &Error) -> Self {
        Self {
            topic,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Current local time as RFC 3339 with a numeric offset.
pub(crate) fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use serde_json::json;

    #[test]
    fn event_message_carries_name_and_timestamp() {
        let mut fields = Map::new();
        fields.insert("inUse".to_string(), json!(true));
        let msg = OutboundMessage::event("10.0.0.5/1", EventCategory::InUse, fields);

        assert_eq!(msg.topic, "10.0.0.5/1");
        assert_eq!(msg.payload["event"], json!("InUseEvents"));
        assert_eq!(msg.payload["inUse"], json!(true));
        assert!(msg.payload["timestamp"].is_string());
    }

    #[test]
    fn stamped_wraps_scalars() {
        let msg = OutboundMessage::stamped("10.0.0.5", json!(0));
        assert_eq!(msg.payload["result"], json!(0));
        assert!(msg.payload.get("timestamp").is_some());
    }

    #[test]
    fn stamped_extends_objects() {
        let msg = OutboundMessage::stamped("10.0.0.5", json!({"alias": "Lamp"}));
        assert_eq!(msg.payload["alias"], json!("Lamp"));
        assert!(msg.payload.get("timestamp").is_some());
    }

    #[test]
    fn error_report_classifies() {
        let err: Error = CommandError::InvalidInput("dance".into()).into();
        let report = ErrorReport::new(Some("10.0.0.5".into()), &err);
        assert_eq!(report.kind, ErrorKind::Command);
        assert_eq!(report.message, "command error: invalid input: dance");
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let ts = timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
