// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State shared by the tasks of one node.

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dispatch::{CommandDispatcher, Observations};
use crate::error::{Error, TransportError};
use crate::event::{ErrorReport, NativeEvent, NodeOutput, OutboundMessage, OutputBus};
use crate::session::{DeviceRegistry, SessionId};
use crate::status::{NodeStatus, SessionSummary, StatusAggregator};
use crate::subscription::{EventCategory, EventSubscriptionTable};
use crate::transport::Transport;

use super::NodeConfig;

/// Everything the node's tasks share.
///
/// The registry lock is never held across an `.await`, and never while
/// [`publish_status`](Self::publish_status) runs.
pub(crate) struct NodeContext<T: Transport> {
    pub transport: T,
    pub config: NodeConfig,
    pub registry: Mutex<DeviceRegistry<T::Handle>>,
    pub subscriptions: EventSubscriptionTable,
    pub dispatcher: CommandDispatcher,
    pub bus: OutputBus,
    pub discovery_task: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport> NodeContext<T> {
    pub fn new(transport: T, config: NodeConfig, bus: OutputBus) -> Self {
        let subscriptions = EventSubscriptionTable::new();
        let dispatcher = CommandDispatcher::new(subscriptions.clone(), bus.clone())
            .with_policy(config.result_policy())
            .with_default_command(config.default_command)
            .with_timeout(config.timeout());

        Self {
            transport,
            config,
            registry: Mutex::new(DeviceRegistry::new()),
            subscriptions,
            dispatcher,
            bus,
            discovery_task: Mutex::new(None),
        }
    }

    pub fn status(&self) -> NodeStatus {
        let registry = self.registry.lock();
        StatusAggregator::compute(registry.sessions().map(SessionSummary::from))
    }

    pub fn publish_status(&self) {
        let status = self.status();
        debug!(level = ?status.level, text = %status.text, "Status updated");
        self.bus.publish(NodeOutput::Status(status));
    }

    pub fn report(&self, id: Option<&SessionId>, error: &Error) {
        self.bus.publish(NodeOutput::Error(ErrorReport::new(
            id.map(ToString::to_string),
            error,
        )));
    }

    /// Reports an absorbed failure only when `debug` is configured.
    pub fn report_debug(&self, id: &SessionId, error: &Error) {
        if self.config.debug {
            self.report(Some(id), error);
        }
    }

    /// Records what a dispatched input revealed about the device.
    pub fn observe(&self, id: &SessionId, observed: Observations) {
        if observed.is_empty() {
            return;
        }
        {
            let mut registry = self.registry.lock();
            let Some(session) = registry.get_mut(id) else {
                return;
            };
            let snapshot = session.snapshot_mut();
            if let Some(info) = observed.info {
                snapshot.record_info(info);
            }
            if let Some(meter) = observed.meter {
                snapshot.meter = Some(meter);
            }
            if let Some(on) = observed.power_on {
                snapshot.power_on = Some(on);
            }
        }
        self.publish_status();
    }

    /// Updates the snapshot from a device event and publishes it if subscribed.
    pub fn forward_event(&self, id: &SessionId, event: NativeEvent) {
        if let NativeEvent::PollingError(message) = &event {
            warn!(session_id = %id, error = %message, "Polling failed");
            self.report_debug(id, &TransportError::Polling(message.clone()).into());
            return;
        }

        let single_session = {
            let mut registry = self.registry.lock();
            if let Some(session) = registry.get_mut(id) {
                let snapshot = session.snapshot_mut();
                if let Some(on) = event.power_state() {
                    snapshot.power_on = Some(on);
                }
                match &event {
                    NativeEvent::MeterUpdate(reading) => snapshot.meter = Some(*reading),
                    NativeEvent::SysInfoUpdate(info) => snapshot.record_info(info.clone()),
                    _ => {}
                }
            }
            registry.len() == 1
        };
        if single_session && matches!(event, NativeEvent::MeterUpdate(_)) {
            self.publish_status();
        }

        let Some(category) = event.category() else {
            return;
        };
        if !self.subscriptions.is_enabled(id, category) {
            return;
        }

        let message = if category == EventCategory::Info {
            OutboundMessage::new(id.to_string(), Value::Object(event.fields()))
        } else {
            OutboundMessage::event(id.to_string(), category, event.fields())
        };
        self.bus.publish(NodeOutput::Message(message));
    }

    /// Publishes an `OnlineEvents` message if the session subscribed to it.
    pub fn forward_presence(&self, id: &SessionId, online: bool) {
        if !self.subscriptions.is_enabled(id, EventCategory::Online) {
            return;
        }
        let mut fields = serde_json::Map::new();
        fields.insert("online".to_string(), Value::Bool(online));
        fields.insert("state".to_string(), Value::Bool(online));
        self.bus.publish(NodeOutput::Message(OutboundMessage::event(
            id.to_string(),
            EventCategory::Online,
            fields,
        )));
    }
}
