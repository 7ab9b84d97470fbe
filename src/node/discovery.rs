// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciling sessions with the discovery stream.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::event::{DiscoveredDevice, DiscoveryEvent};
use crate::session::{DeviceRegistry, SessionId, SessionState};
use crate::transport::{SysInfo, Transport};

use super::connection::ConnectionManager;
use super::context::NodeContext;

/// Applies presence reports to the sessions a node already tracks.
///
/// Discovery never creates sessions. It flips live sessions between
/// connected and offline, and promotes a placeholder whose connect failed
/// as soon as the device is seen again.
pub(crate) struct DiscoveryWatcher<T: Transport> {
    ctx: Arc<NodeContext<T>>,
    connections: ConnectionManager<T>,
}

impl<T: Transport> DiscoveryWatcher<T> {
    pub fn new(ctx: Arc<NodeContext<T>>) -> Self {
        let connections = ConnectionManager::new(Arc::clone(&ctx));
        Self { ctx, connections }
    }

    pub fn spawn(self, mut events: broadcast::Receiver<DiscoveryEvent<T::Handle>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Discovery events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Discovery watcher stopped");
        })
    }

    fn handle_event(&self, event: DiscoveryEvent<T::Handle>) {
        let online = event.kind.is_online();
        debug!(host = %event.device.host, kind = ?event.kind, "Discovery event");

        let mut reported = Vec::new();
        {
            let mut registry = self.ctx.registry.lock();
            for (id, handle, info) in expand(&mut registry, &event.device) {
                let Some(state) = registry.get(&id).map(|session| session.state()) else {
                    continue;
                };
                if online
                    && state == SessionState::Placeholder
                    && self.connections.promote(&mut registry, &id, handle)
                {
                    debug!(session_id = %id, "Promoted from discovery");
                    if let (Some(info), Some(session)) = (info, registry.get_mut(&id)) {
                        session.snapshot_mut().record_info(info);
                    }
                }
                if let Some(changed) = registry.set_presence(&id, online) {
                    if changed {
                        debug!(session_id = %id, online, "Presence changed");
                    }
                    reported.push(id);
                }
            }
        }

        for id in &reported {
            self.ctx.forward_presence(id, online);
        }
        self.ctx.publish_status();
    }
}

/// Expands one discovered device into the session ids it speaks for.
///
/// A parent reported with its children yields its own id plus one
/// `<host>/<index>` id per child, using indices pinned in the registry.
/// Hosts without any session yield nothing and pin nothing.
fn expand<H>(
    registry: &mut DeviceRegistry<H>,
    device: &DiscoveredDevice<H>,
) -> Vec<(SessionId, Arc<H>, Option<SysInfo>)>
where
    H: crate::transport::DeviceHandle,
{
    if !registry.tracks_address(&device.host) {
        return Vec::new();
    }

    if let Some(child_id) = &device.child_id {
        return registry
            .child_indices(&device.host, std::slice::from_ref(child_id))
            .into_iter()
            .flatten()
            .map(|index| {
                (
                    SessionId::outlet(&device.host, index),
                    Arc::clone(&device.handle),
                    device.info.clone(),
                )
            })
            .collect();
    }

    let mut ids = vec![(
        SessionId::device(&device.host),
        Arc::clone(&device.handle),
        device.info.clone(),
    )];
    let child_ids: Vec<String> = device.children.iter().map(|child| child.id.clone()).collect();
    let indices = registry.child_indices(&device.host, &child_ids);
    for (child, index) in device.children.iter().zip(indices) {
        if let Some(index) = index {
            ids.push((
                SessionId::outlet(&device.host, index),
                Arc::clone(&child.handle),
                child.info.clone(),
            ));
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capabilities;
    use crate::event::PresenceKind;
    use crate::transport::mock::MockHandle;

    fn handle() -> Arc<MockHandle> {
        Arc::new(MockHandle::new(Capabilities::plug()))
    }

    #[test]
    fn parent_with_children_expands_to_outlets() {
        let mut registry = DeviceRegistry::<MockHandle>::new();
        registry.get_or_create(&SessionId::device("10.0.0.6"));
        let event = DiscoveryEvent::new(PresenceKind::Online, "10.0.0.6", handle())
            .with_child("8006AA00", handle())
            .with_child("8006AA01", handle());

        let ids: Vec<String> = expand(&mut registry, &event.device)
            .into_iter()
            .map(|(id, _, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["10.0.0.6", "10.0.0.6/0", "10.0.0.6/1"]);
    }

    #[test]
    fn broken_out_child_uses_pinned_index() {
        let mut registry = DeviceRegistry::<MockHandle>::new();
        registry.get_or_create(&SessionId::outlet("10.0.0.6", 1));
        let parent = DiscoveryEvent::new(PresenceKind::New, "10.0.0.6", handle())
            .with_child("8006AA00", handle())
            .with_child("8006AA01", handle());
        expand(&mut registry, &parent.device);

        let mut child = DiscoveryEvent::new(PresenceKind::Online, "10.0.0.6", handle());
        child.device.child_id = Some("8006AA01".to_string());

        let ids: Vec<String> = expand(&mut registry, &child.device)
            .into_iter()
            .map(|(id, _, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["10.0.0.6/1"]);
    }

    #[test]
    fn untracked_hosts_pin_nothing() {
        let mut registry = DeviceRegistry::<MockHandle>::new();
        let stranger = DiscoveryEvent::new(PresenceKind::Online, "10.0.0.99", handle())
            .with_child("9999AA00", handle());
        assert!(expand(&mut registry, &stranger.device).is_empty());

        // Pinning starts from the first observation after a session exists.
        registry.get_or_create(&SessionId::device("10.0.0.99"));
        let reordered = DiscoveryEvent::new(PresenceKind::Online, "10.0.0.99", handle())
            .with_child("9999AA01", handle())
            .with_child("9999AA00", handle());
        let ids: Vec<String> = expand(&mut registry, &reordered.device)
            .into_iter()
            .map(|(id, _, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["10.0.0.99", "10.0.0.99/0", "10.0.0.99/1"]);
    }

    #[test]
    fn expansion_carries_reported_info() {
        let mut registry = DeviceRegistry::<MockHandle>::new();
        registry.get_or_create(&SessionId::device("10.0.0.5"));
        let info = SysInfo::from_value(serde_json::json!({"relay_state": 1})).unwrap();
        let event = DiscoveryEvent::new(PresenceKind::Online, "10.0.0.5", handle()).with_info(info);

        let expanded = expand(&mut registry, &event.device);
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].2.as_ref().and_then(SysInfo::power_on), Some(true));
    }
}
