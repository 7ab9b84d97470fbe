// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input classification and command dispatch.
//!
//! An inbound payload is classified exactly once into a [`Payload`] variant:
//!
//! | payload | handling |
//! |---|---|
//! | object | `state`, `brightness`, `temperature`, `hsb`, `led`, `events` fields |
//! | array | each element is a directive, a [`TextCommand`], or a power value |
//! | string | power word, `|`-delimited directives, or a [`TextCommand`] |
//! | boolean | switch power |
//!
//! The [`CommandDispatcher`] validates every field against the device
//! capabilities, runs the resulting operations concurrently, and decides the
//! control-result according to the configured [`ResultPolicy`].

mod command;
mod control_result;
mod dispatcher;
mod input;
mod plan;

pub use command::TextCommand;
pub use control_result::{ControlResult, PayloadType, ResultPolicy};
pub use dispatcher::{CommandDispatcher, DEFAULT_TIMEOUT, Observations};
pub use input::{ControlFields, InputEnvelope, InputMessage, Payload};
pub use plan::{Control, Plan};
