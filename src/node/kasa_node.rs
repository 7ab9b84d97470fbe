// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The node facade used by the host runtime.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::dispatch::{InputEnvelope, InputMessage};
use crate::error::{DeviceError, Error};
use crate::event::{NodeOutput, OutputBus};
use crate::session::{Admission, SessionId, SessionState};
use crate::status::NodeStatus;
use crate::subscription::EventCategory;
use crate::transport::Transport;

use super::NodeConfig;
use super::connection::{ConnectionManager, release};
use super::context::NodeContext;
use super::discovery::DiscoveryWatcher;

/// A flow node controlling the devices reachable through one transport.
///
/// All methods must be called from within a tokio runtime. Clones share the
/// same node.
///
/// # Examples
///
/// ```ignore
/// use kasa_node::dispatch::InputMessage;
/// use kasa_node::node::{KasaNode, NodeConfig};
/// use serde_json::json;
///
/// let node = KasaNode::new(transport, NodeConfig::new());
/// let mut outputs = node.subscribe();
/// node.start();
///
/// node.input(InputMessage::new(json!({"state": "on"})).with_topic("10.0.0.5"));
/// while let Ok(output) = outputs.recv().await {
///     println!("{output:?}");
/// }
///
/// node.close().await;
/// ```
pub struct KasaNode<T: Transport> {
    ctx: Arc<NodeContext<T>>,
}

impl<T: Transport> KasaNode<T> {
    /// Creates a node. Nothing runs until [`start`](Self::start).
    #[must_use]
    pub fn new(transport: T, config: NodeConfig) -> Self {
        Self::with_bus(transport, config, OutputBus::new())
    }

    /// Creates a node publishing on the given bus.
    #[must_use]
    pub fn with_bus(transport: T, config: NodeConfig, bus: OutputBus) -> Self {
        Self {
            ctx: Arc::new(NodeContext::new(transport, config, bus)),
        }
    }

    /// Starts discovery if configured and connects the default device.
    ///
    /// Without a default device the initial status is published instead.
    pub fn start(&self) {
        if let Some(options) = self.ctx.config.discovery_options() {
            let mut task = self.ctx.discovery_task.lock();
            if task.is_none() {
                debug!(interval = ?options.interval, "Starting discovery");
                let events = self.ctx.transport.start_discovery(&options);
                *task = Some(DiscoveryWatcher::new(Arc::clone(&self.ctx)).spawn(events));
            }
        }

        match self.ctx.config.device.clone() {
            Some(id) => {
                let connect = {
                    let mut registry = self.ctx.registry.lock();
                    registry.get_or_create(&id);
                    registry.begin_connect(&id)
                };
                if connect {
                    ConnectionManager::spawn_connect(&self.ctx, id);
                }
            }
            None => self.ctx.publish_status(),
        }
    }

    /// Accepts an inbound message.
    ///
    /// The message targets its topic, or the configured default device when
    /// the topic is absent. Messages for one device are processed in arrival
    /// order; the first message for an unknown device starts its connect.
    pub fn input(&self, message: InputMessage) {
        let id = match message.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => match topic.parse::<SessionId>() {
                Ok(id) => id,
                Err(e) => {
                    self.ctx.report(None, &e.into());
                    return;
                }
            },
            None => match &self.ctx.config.device {
                Some(id) => id.clone(),
                None => {
                    debug!("Dropping input without a device id");
                    return;
                }
            },
        };

        let envelope = InputEnvelope::new(id.clone(), message.payload);
        let admission = self.ctx.registry.lock().admit(envelope);
        match admission {
            Admission::Connect => {
                debug!(session_id = %id, "Queued input for new session");
                ConnectionManager::spawn_connect(&self.ctx, id);
            }
            Admission::Queued => debug!(session_id = %id, "Queued input for pending session"),
            Admission::Dispatched => {}
            Admission::Rejected => {
                self.ctx
                    .report(Some(&id), &Error::Device(DeviceError::SessionClosed));
            }
        }
    }

    /// Subscribes to the node's outputs.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NodeOutput> {
        self.ctx.bus.subscribe()
    }

    /// Returns the node configuration.
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.ctx.config
    }

    /// Computes the current status.
    #[must_use]
    pub fn status(&self) -> NodeStatus {
        self.ctx.status()
    }

    /// Returns the state of a session, if it exists.
    #[must_use]
    pub fn session_state(&self, id: &SessionId) -> Option<SessionState> {
        self.ctx.registry.lock().get(id).map(|session| session.state())
    }

    /// Returns all session ids in creation order.
    #[must_use]
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.ctx.registry.lock().ids()
    }

    /// Returns whether a session has enabled an event category.
    #[must_use]
    pub fn is_subscribed(&self, id: &SessionId, category: EventCategory) -> bool {
        self.ctx.subscriptions.is_enabled(id, category)
    }

    /// Tears the node down.
    ///
    /// Stops discovery, stops every worker, and releases every handle. Each
    /// step logs and swallows its own failure so one device cannot keep the
    /// others from being released.
    pub async fn close(&self) {
        let discovery = self.ctx.discovery_task.lock().take();
        if let Some(task) = discovery {
            task.abort();
            if let Err(e) = self.ctx.transport.stop_discovery() {
                warn!(error = %e, "Failed to stop discovery");
            }
        }

        let closed = self.ctx.registry.lock().close_all();
        let timeout = self.ctx.config.timeout();
        for session in closed {
            if let Some(worker) = &session.worker {
                worker.abort();
            }
            if let Some(handle) = &session.handle {
                release(&session.id, handle.as_ref(), true, timeout).await;
            }
        }

        self.ctx.subscriptions.clear();
        debug!("Node closed");
    }
}

impl<T: Transport> Clone for KasaNode<T> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl<T: Transport> std::fmt::Debug for KasaNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KasaNode")
            .field("config", &self.ctx.config)
            .field("registry", &*self.ctx.registry.lock())
            .finish_non_exhaustive()
    }
}
