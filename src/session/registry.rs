// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of all sessions owned by a node.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::InputEnvelope;
use crate::transport::DeviceHandle;

use super::device_session::ClosedSession;
use super::{DeviceSession, SessionId, SessionState};

/// Outcome of handing an input to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A new placeholder was created and queued; the caller must connect it.
    Connect,
    /// The input was queued on a pending session.
    Queued,
    /// The input was sent to the session's ordered worker.
    Dispatched,
    /// The session or registry is closed; the input was dropped.
    Rejected,
}

/// All sessions of a node, keyed by identifier.
///
/// Sessions are never removed before teardown, so an identifier maps to the
/// same session for the lifetime of the node.
pub struct DeviceRegistry<H> {
    sessions: HashMap<SessionId, DeviceSession<H>>,
    order: Vec<SessionId>,
    children: HashMap<String, Vec<String>>,
    closed: bool,
}

impl<H: DeviceHandle> DeviceRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            order: Vec::new(),
            children: HashMap::new(),
            closed: false,
        }
    }

    /// Returns the number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no session exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns true once [`close_all`](Self::close_all) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns a session.
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<&DeviceSession<H>> {
        self.sessions.get(id)
    }

    /// Returns a session for update.
    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut DeviceSession<H>> {
        self.sessions.get_mut(id)
    }

    /// Returns all identifiers in creation order.
    #[must_use]
    pub fn ids(&self) -> Vec<SessionId> {
        self.order.clone()
    }

    /// Iterates over sessions in creation order.
    pub fn sessions(&self) -> impl Iterator<Item = &DeviceSession<H>> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    /// Returns whether any session belongs to the device at `address`.
    #[must_use]
    pub fn tracks_address(&self, address: &str) -> bool {
        self.order.iter().any(|id| id.address() == address)
    }

    /// Returns the session for `id`, creating a placeholder if absent.
    pub fn get_or_create(&mut self, id: &SessionId) -> &mut DeviceSession<H> {
        if !self.sessions.contains_key(id) {
            self.order.push(id.clone());
        }
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| DeviceSession::new(id.clone()))
    }

    /// Routes an input to its session.
    ///
    /// An unknown identifier gets a placeholder that is immediately marked
    /// connecting, so concurrent inputs for the same device coalesce onto a
    /// single connect attempt. Live sessions forward the input to their
    /// ordered worker while the registry is still borrowed, so an input can
    /// never overtake one admitted earlier.
    pub fn admit(&mut self, envelope: InputEnvelope) -> Admission {
        if self.closed {
            return Admission::Rejected;
        }
        let created = !self.sessions.contains_key(&envelope.id);
        let session = self.get_or_create(&envelope.id.clone());

        match session.state() {
            SessionState::Placeholder | SessionState::Connecting => {
                if session.enqueue(envelope).is_err() {
                    return Admission::Rejected;
                }
                if created && session.begin_connect() {
                    Admission::Connect
                } else {
                    Admission::Queued
                }
            }
            SessionState::Connected | SessionState::Offline => match session.worker() {
                Some(worker) if worker.sender.send(envelope).is_ok() => Admission::Dispatched,
                _ => Admission::Rejected,
            },
            SessionState::Closed => Admission::Rejected,
        }
    }

    /// Marks a placeholder as connecting. Returns false if it is not a placeholder.
    pub fn begin_connect(&mut self, id: &SessionId) -> bool {
        self.sessions
            .get_mut(id)
            .is_some_and(DeviceSession::begin_connect)
    }

    /// Returns a connecting session to placeholder after a failed attempt.
    pub fn connect_failed(&mut self, id: &SessionId) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.connect_failed();
        }
    }

    /// Promotes a pending session, returning its queued inputs in order.
    ///
    /// Returns `None` when the session is unknown or already live; the first
    /// promotion wins and later ones must release their handle.
    pub fn promote(&mut self, id: &SessionId, handle: Arc<H>) -> Option<Vec<InputEnvelope>> {
        if self.closed {
            return None;
        }
        self.sessions.get_mut(id)?.promote(handle)
    }

    /// Applies a discovery presence report.
    ///
    /// Returns `Some(changed)` for live sessions and `None` otherwise.
    pub fn set_presence(&mut self, id: &SessionId, online: bool) -> Option<bool> {
        let session = self.sessions.get_mut(id)?;
        session
            .state()
            .has_handle()
            .then(|| session.set_presence(online))
    }

    /// Maps the child ids reported for a device to stable outlet indices.
    ///
    /// Indices are pinned the first time a device is observed; children that
    /// show up later are appended after the known ones.
    pub fn child_indices(&mut self, address: &str, child_ids: &[String]) -> Vec<Option<u8>> {
        let pinned = self.children.entry(address.to_string()).or_default();
        child_ids
            .iter()
            .map(|child| {
                let position = match pinned.iter().position(|known| known == child) {
                    Some(position) => position,
                    None => {
                        pinned.push(child.clone());
                        pinned.len() - 1
                    }
                };
                u8::try_from(position).ok()
            })
            .collect()
    }

    /// Closes every session and refuses further inputs.
    pub(crate) fn close_all(&mut self) -> Vec<ClosedSession<H>> {
        self.closed = true;
        let mut closed = Vec::with_capacity(self.order.len());
        for id in &self.order {
            if let Some(session) = self.sessions.get_mut(id) {
                closed.push(session.close());
            }
        }
        closed
    }
}

impl<H: DeviceHandle> Default for DeviceRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for DeviceRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("sessions", &self.order)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
