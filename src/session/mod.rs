// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device sessions and their registry.
//!
//! A [`DeviceSession`] tracks one logical device or child outlet through its
//! lifecycle:
//!
//! ```text
//! Placeholder --connect success------> Connected
//! Placeholder --connect failure------> Placeholder
//! Placeholder --discovery presence---> Connected
//! Connected   --discovery offline----> Offline
//! Offline     --discovery online-----> Connected
//! any         --teardown-------------> Closed
//! ```
//!
//! Inputs that arrive before a connection exists are queued on the session
//! and replayed, in arrival order, the moment it is promoted. The
//! [`DeviceRegistry`] owns all sessions of a node and admits at most one
//! connect attempt per identifier.

mod device_session;
mod registry;
mod session_id;

pub use device_session::{DeviceSession, SessionSnapshot, SessionState};
pub use registry::{Admission, DeviceRegistry};
pub use session_id::SessionId;

pub(crate) use device_session::SessionWorker;
