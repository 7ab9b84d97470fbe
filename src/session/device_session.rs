// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single logical device tracked by a node.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::Capabilities;
use crate::dispatch::InputEnvelope;
use crate::transport::{DeviceHandle, MeterReading, SysInfo};

use super::SessionId;

/// Lifecycle state of a [`DeviceSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No connection yet; inputs are queued.
    #[default]
    Placeholder,
    /// A connect attempt is in flight; inputs are queued.
    Connecting,
    /// Handle present and device reachable.
    Connected,
    /// Handle present but discovery reports the device unreachable.
    Offline,
    /// Torn down; nothing more is accepted.
    Closed,
}

impl SessionState {
    /// Returns true if the session owns a device handle.
    #[must_use]
    pub const fn has_handle(self) -> bool {
        matches!(self, Self::Connected | Self::Offline)
    }

    /// Returns true if inputs are held back until promotion.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Placeholder | Self::Connecting)
    }
}

/// Last observed device facts, used for status computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Last system information read from the device.
    pub info: Option<SysInfo>,
    /// Last energy meter reading.
    pub meter: Option<MeterReading>,
    /// Last known relay or light state.
    pub power_on: Option<bool>,
}

impl SessionSnapshot {
    /// Stores a system information read and the power state it carries.
    pub fn record_info(&mut self, info: SysInfo) {
        if let Some(on) = info.power_on() {
            self.power_on = Some(on);
        }
        self.info = Some(info);
    }
}

/// Ordered input channel and the tasks serving a live session.
pub(crate) struct SessionWorker {
    pub sender: mpsc::UnboundedSender<InputEnvelope>,
    pub tasks: Vec<JoinHandle<()>>,
}

impl SessionWorker {
    pub fn abort(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// What is left of a session after it was closed.
pub(crate) struct ClosedSession<H> {
    pub id: SessionId,
    pub handle: Option<Arc<H>>,
    pub worker: Option<SessionWorker>,
}

/// One logical device or child outlet.
///
/// The handle is present exactly when the state is
/// [`Connected`](SessionState::Connected) or [`Offline`](SessionState::Offline);
/// the queue is non-empty only while the session is pending.
pub struct DeviceSession<H> {
    id: SessionId,
    state: SessionState,
    queue: VecDeque<InputEnvelope>,
    handle: Option<Arc<H>>,
    online: bool,
    snapshot: SessionSnapshot,
    worker: Option<SessionWorker>,
}

impl<H: DeviceHandle> DeviceSession<H> {
    /// Creates a placeholder session.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::Placeholder,
            queue: VecDeque::new(),
            handle: None,
            online: false,
            snapshot: SessionSnapshot::default(),
            worker: None,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the device handle of a live session.
    #[must_use]
    pub fn handle(&self) -> Option<&Arc<H>> {
        self.handle.as_ref()
    }

    /// Returns the capabilities of the connected device.
    #[must_use]
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.handle.as_ref().map(|handle| handle.capabilities())
    }

    /// Returns whether the device was last seen reachable.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Returns the number of queued inputs.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns the child outlet index, if any.
    #[must_use]
    pub fn child_index(&self) -> Option<u8> {
        self.id.child()
    }

    /// Returns the last observed device facts.
    #[must_use]
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// Returns the last observed device facts for update.
    pub fn snapshot_mut(&mut self) -> &mut SessionSnapshot {
        &mut self.snapshot
    }

    /// Appends an input to the queue of a pending session.
    ///
    /// Returns the input back if the session is not pending.
    pub(crate) fn enqueue(&mut self, envelope: InputEnvelope) -> Result<(), InputEnvelope> {
        if self.state.is_pending() {
            self.queue.push_back(envelope);
            Ok(())
        } else {
            Err(envelope)
        }
    }

    /// Marks a placeholder as connecting. Returns false if it is not a placeholder.
    pub(crate) fn begin_connect(&mut self) -> bool {
        if self.state == SessionState::Placeholder {
            self.state = SessionState::Connecting;
            true
        } else {
            false
        }
    }

    /// Returns a connecting session to placeholder, keeping its queue.
    pub(crate) fn connect_failed(&mut self) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::Placeholder;
        }
    }

    /// Attaches a handle and drains the queue in arrival order.
    ///
    /// Returns `None` if the session was already promoted or closed, in which
    /// case the handle is not taken.
    pub(crate) fn promote(&mut self, handle: Arc<H>) -> Option<Vec<InputEnvelope>> {
        if !self.state.is_pending() {
            return None;
        }
        self.handle = Some(handle);
        self.state = SessionState::Connected;
        self.online = true;
        Some(self.queue.drain(..).collect())
    }

    /// Applies a discovery presence report to a live session.
    ///
    /// Returns true if the reachability flag changed.
    pub(crate) fn set_presence(&mut self, online: bool) -> bool {
        if !self.state.has_handle() {
            return false;
        }
        let changed = self.online != online;
        self.online = online;
        self.state = if online {
            SessionState::Connected
        } else {
            SessionState::Offline
        };
        changed
    }

    pub(crate) fn attach_worker(&mut self, worker: SessionWorker) {
        self.worker = Some(worker);
    }

    pub(crate) fn worker(&self) -> Option<&SessionWorker> {
        self.worker.as_ref()
    }

    /// Closes the session, dropping its queue.
    pub(crate) fn close(&mut self) -> ClosedSession<H> {
        self.state = SessionState::Closed;
        self.online = false;
        self.queue.clear();
        ClosedSession {
            id: self.id.clone(),
            handle: self.handle.take(),
            worker: self.worker.take(),
        }
    }
}

impl<H> fmt::Debug for DeviceSession<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("online", &self.online)
            .field("queued", &self.queue.len())
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}
