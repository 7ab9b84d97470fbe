// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presence events from the discovery/heartbeat stream.

use std::fmt;
use std::sync::Arc;

use crate::transport::SysInfo;

/// Kind of presence transition reported by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceKind {
    /// First sighting of a device.
    New,
    /// A known device answered again after being offline.
    Online,
    /// A known device missed its heartbeat.
    Offline,
}

impl PresenceKind {
    /// Returns whether the device is reachable after this transition.
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::New | Self::Online)
    }
}

/// A child outlet reported together with its parent.
pub struct DiscoveredChild<H> {
    /// Device-assigned child identifier.
    pub id: String,
    /// Live handle scoped to the child.
    pub handle: Arc<H>,
    /// Info snapshot carried by the discovery response.
    pub info: Option<SysInfo>,
}

/// A device seen by discovery.
pub struct DiscoveredDevice<H> {
    /// Network address of the device.
    pub host: String,
    /// Set when the transport reports a single child rather than a parent.
    pub child_id: Option<String>,
    /// Live handle ready to use.
    pub handle: Arc<H>,
    /// Info snapshot carried by the discovery response.
    pub info: Option<SysInfo>,
    /// Child outlets, in the order the device lists them.
    pub children: Vec<DiscoveredChild<H>>,
}

/// One presence transition for one device.
pub struct DiscoveryEvent<H> {
    /// What happened.
    pub kind: PresenceKind,
    /// The device it happened to.
    pub device: DiscoveredDevice<H>,
}

impl<H> DiscoveryEvent<H> {
    /// Creates an event for a device without children.
    #[must_use]
    pub fn new(kind: PresenceKind, host: impl Into<String>, handle: Arc<H>) -> Self {
        Self {
            kind,
            device: DiscoveredDevice {
                host: host.into(),
                child_id: None,
                handle,
                info: None,
                children: Vec::new(),
            },
        }
    }

    /// Attaches the info snapshot the device answered with.
    #[must_use]
    pub fn with_info(mut self, info: SysInfo) -> Self {
        self.device.info = Some(info);
        self
    }

    /// Adds a child outlet to the reported device.
    #[must_use]
    pub fn with_child(mut self, id: impl Into<String>, handle: Arc<H>) -> Self {
        self.device.children.push(DiscoveredChild {
            id: id.into(),
            handle,
            info: None,
        });
        self
    }

    /// Adds a child outlet together with its info snapshot.
    #[must_use]
    pub fn with_child_info(mut self, id: impl Into<String>, handle: Arc<H>, info: SysInfo) -> Self {
        self.device.children.push(DiscoveredChild {
            id: id.into(),
            handle,
            info: Some(info),
        });
        self
    }
}

impl<H> Clone for DiscoveredChild<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            handle: Arc::clone(&self.handle),
            info: self.info.clone(),
        }
    }
}

impl<H> Clone for DiscoveredDevice<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            child_id: self.child_id.clone(),
            handle: Arc::clone(&self.handle),
            info: self.info.clone(),
            children: self.children.clone(),
        }
    }
}

impl<H> Clone for DiscoveryEvent<H> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            device: self.device.clone(),
        }
    }
}

impl<H> fmt::Debug for DiscoveryEvent<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryEvent")
            .field("kind", &self.kind)
            .field("host", &self.device.host)
            .field("child_id", &self.device.child_id)
            .field("children", &self.device.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_online_flag() {
        assert!(PresenceKind::New.is_online());
        assert!(PresenceKind::Online.is_online());
        assert!(!PresenceKind::Offline.is_online());
    }

    #[test]
    fn children_keep_report_order() {
        let event = DiscoveryEvent::new(PresenceKind::New, "10.0.0.9", Arc::new(()))
            .with_child("A0", Arc::new(()))
            .with_child("A1", Arc::new(()));

        let ids: Vec<_> = event.device.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["A0", "A1"]);
        assert!(format!("{event:?}").contains("10.0.0.9"));
    }

    #[test]
    fn info_travels_with_device_and_children() {
        let info = |on: u8| {
            SysInfo::from_value(serde_json::json!({"relay_state": on})).unwrap()
        };
        let event = DiscoveryEvent::new(PresenceKind::Online, "10.0.0.9", Arc::new(()))
            .with_info(info(1))
            .with_child_info("A0", Arc::new(()), info(0))
            .with_child("A1", Arc::new(()));

        assert_eq!(event.device.info.as_ref().and_then(SysInfo::power_on), Some(true));
        assert_eq!(
            event.device.children[0].info.as_ref().and_then(SysInfo::power_on),
            Some(false)
        );
        assert!(event.device.children[1].info.is_none());
    }
}
