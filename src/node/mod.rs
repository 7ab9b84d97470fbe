// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The running node: configuration, connections, discovery, and teardown.
//!
//! [`KasaNode`] ties the pieces together. Inputs flow through the session
//! registry; a session's first input starts a connect attempt, and once the
//! session is live its inputs are served by one ordered worker task. Device
//! events and discovery reports are forwarded according to the subscription
//! table, and every session transition recomputes the node status.

mod config;
mod connection;
mod context;
mod discovery;
mod kasa_node;

pub use config::NodeConfig;
pub use kasa_node::KasaNode;
