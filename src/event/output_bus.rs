// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output bus for broadcasting node outputs to the host.

use tokio::sync::broadcast;

use super::NodeOutput;

/// Default channel capacity for the output bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Bus carrying messages, status updates, and error reports to the host.
///
/// The bus wraps tokio's broadcast channel. If a subscriber falls more than
/// the capacity behind, it loses the oldest outputs and receives
/// `RecvError::Lagged`.
///
/// # Examples
///
/// ```
/// use kasa_node::event::{NodeOutput, OutboundMessage, OutputBus};
/// use serde_json::json;
///
/// let bus = OutputBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(NodeOutput::Message(OutboundMessage::new("10.0.0.5", json!(1))));
/// ```
#[derive(Debug, Clone)]
pub struct OutputBus {
    sender: broadcast::Sender<NodeOutput>,
}

impl OutputBus {
    /// Creates a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new bus with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to node outputs published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NodeOutput> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an output to all subscribers.
    ///
    /// Without subscribers the output is silently discarded.
    pub fn publish(&self, output: NodeOutput) {
        // No subscribers is not an error for a node
        let _ = self.sender.send(output);
    }
}

impl Default for OutputBus {
    fn default() -> Self {
        Self::new()
    }
}
