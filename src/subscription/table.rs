// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-session subscription table.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::session::SessionId;

use super::{Directive, EventCategory};

/// Mapping from session to the set of enabled event categories.
///
/// The table is read by every event producer (poll ticks, device callbacks,
/// discovery) and written only by explicit directives. Clones share the same
/// table.
#[derive(Debug, Clone, Default)]
pub struct EventSubscriptionTable {
    inner: Arc<RwLock<HashMap<SessionId, BTreeSet<EventCategory>>>>,
}

impl EventSubscriptionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a category. Returns `true` if it was not enabled before.
    pub fn enable(&self, id: &SessionId, category: EventCategory) -> bool {
        self.inner
            .write()
            .entry(id.clone())
            .or_default()
            .insert(category)
    }

    /// Disables a category. Returns `true` if it was enabled before.
    pub fn disable(&self, id: &SessionId, category: EventCategory) -> bool {
        self.inner
            .write()
            .get_mut(id)
            .is_some_and(|set| set.remove(&category))
    }

    /// Disables every category of a session.
    pub fn disable_all(&self, id: &SessionId) {
        if let Some(set) = self.inner.write().get_mut(id) {
            set.clear();
        }
    }

    /// Returns whether a category is enabled.
    #[must_use]
    pub fn is_enabled(&self, id: &SessionId, category: EventCategory) -> bool {
        self.inner
            .read()
            .get(id)
            .is_some_and(|set| set.contains(&category))
    }

    /// Returns the enabled categories of a session, in a stable order.
    #[must_use]
    pub fn enabled(&self, id: &SessionId) -> Vec<EventCategory> {
        self.inner
            .read()
            .get(id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Applies a directive.
    pub fn apply(&self, id: &SessionId, directive: Directive) {
        match directive {
            Directive::Start(category) => {
                self.enable(id, category);
            }
            Directive::Stop(category) => {
                self.disable(id, category);
            }
            Directive::StopAll => self.disable_all(id),
        }
    }

    /// Drops every session's entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SessionId {
        s.parse().unwrap()
    }

    #[test]
    fn enable_is_idempotent() {
        let table = EventSubscriptionTable::new();
        let a = id("10.0.0.5");

        assert!(table.enable(&a, EventCategory::Meter));
        assert!(!table.enable(&a, EventCategory::Meter));
        assert_eq!(table.enabled(&a), vec![EventCategory::Meter]);
    }

    #[test]
    fn disable_unset_is_noop() {
        let table = EventSubscriptionTable::new();
        let a = id("10.0.0.5");

        assert!(!table.disable(&a, EventCategory::Power));
        table.enable(&a, EventCategory::Meter);
        assert!(!table.disable(&a, EventCategory::Power));
        assert_eq!(table.enabled(&a), vec![EventCategory::Meter]);
    }

    #[test]
    fn stop_all_empties_any_set() {
        let table = EventSubscriptionTable::new();
        let a = id("10.0.0.5");

        table.apply(&a, Directive::StopAll);
        assert!(table.enabled(&a).is_empty());

        for category in EventCategory::ALL {
            table.enable(&a, category);
        }
        table.apply(&a, Directive::StopAll);
        assert!(table.enabled(&a).is_empty());
    }

    #[test]
    fn sessions_are_independent() {
        let table = EventSubscriptionTable::new();
        let parent = id("10.0.0.5");
        let child = id("10.0.0.5/1");

        table.apply(&parent, Directive::Start(EventCategory::Power));
        assert!(table.is_enabled(&parent, EventCategory::Power));
        assert!(!table.is_enabled(&child, EventCategory::Power));

        table.apply(&child, Directive::Start(EventCategory::Power));
        table.apply(&parent, Directive::Stop(EventCategory::Power));
        assert!(table.is_enabled(&child, EventCategory::Power));
    }

    #[test]
    fn clones_share_state() {
        let table = EventSubscriptionTable::new();
        let view = table.clone();
        let a = id("10.0.0.5");

        table.enable(&a, EventCategory::Online);
        assert!(view.is_enabled(&a, EventCategory::Online));

        view.clear();
        assert!(!table.is_enabled(&a, EventCategory::Online));
    }
}
