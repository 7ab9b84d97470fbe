// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events flowing into and out of a node.
//!
//! Inbound, a node consumes two event streams from its transport:
//!
//! - [`NativeEvent`] - per-device events (power changes, meter updates, poll
//!   results), gated by the [`EventSubscriptionTable`](crate::subscription::EventSubscriptionTable)
//! - [`DiscoveryEvent`] - presence and online/offline heartbeats for every
//!   device on the network
//!
//! Outbound, everything a node produces for its host is a [`NodeOutput`]
//! published on an [`OutputBus`].
//!
//! # Examples
//!
//! ```
//! use kasa_node::event::{NodeOutput, OutboundMessage, OutputBus};
//! use serde_json::json;
//!
//! let bus = OutputBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(NodeOutput::Message(OutboundMessage::new("10.0.0.5", json!(true))));
//! ```

mod discovery_event;
mod native_event;
mod node_output;
mod output_bus;

pub use discovery_event::{DiscoveredChild, DiscoveredDevice, DiscoveryEvent, PresenceKind};
pub use native_event::NativeEvent;
pub use node_output::{ErrorReport, NodeOutput, OutboundMessage, Origin};
pub use output_bus::OutputBus;
