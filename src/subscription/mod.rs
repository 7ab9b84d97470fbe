// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-session event subscriptions.
//!
//! A device produces a steady stream of native events, but a node only emits
//! the categories that were explicitly enabled for that session. Categories
//! are switched with directives:
//!
//! - `start<Category>` enables a category, e.g. `startMeterEvents`
//! - `stop<Category>` disables it, e.g. `stopMeterEvents`
//! - `stopAllEvents` disables every category of the session
//!
//! Both directions are idempotent.
//!
//! # Examples
//!
//! ```
//! use kasa_node::session::SessionId;
//! use kasa_node::subscription::{Directive, EventCategory, EventSubscriptionTable};
//!
//! let table = EventSubscriptionTable::new();
//! let id: SessionId = "10.0.0.5".parse().unwrap();
//!
//! table.apply(&id, "startMeterEvents".parse::<Directive>().unwrap());
//! assert!(table.is_enabled(&id, EventCategory::Meter));
//!
//! table.apply(&id, Directive::StopAll);
//! assert!(!table.is_enabled(&id, EventCategory::Meter));
//! ```

mod category;
mod directive;
mod table;

pub use category::EventCategory;
pub use directive::Directive;
pub use table::EventSubscriptionTable;
