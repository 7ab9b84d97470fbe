// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `kasa_node` - the core of a flow node for TP-Link Kasa smart-home devices.
//!
//! A host runtime feeds inbound messages into a [`KasaNode`] and receives
//! outbound messages, status updates, and error reports on a broadcast
//! channel. The node:
//!
//! - lazily connects one session per device or child outlet, queueing inputs
//!   until the connection is up and replaying them in order,
//! - validates control fields against device capabilities and runs them,
//! - forwards device events only for categories a session has subscribed to,
//! - reconciles sessions with a passive discovery stream, which can bring a
//!   failed session live without an explicit retry.
//!
//! The wire protocol is not part of this crate. Devices are reached through
//! the [`Transport`](transport::Transport) and
//! [`DeviceHandle`](transport::DeviceHandle) traits.
//!
//! # Inputs
//!
//! | payload | effect |
//! |---|---|
//! | `{"state": "on"}` | switch on (also `off`, `toggle`, booleans) |
//! | `{"brightness": 75}` | dimmer or bulb brightness, 1 to 100 |
//! | `{"temperature": 4000}` | color temperature, 2700 to 6500 K |
//! | `{"hsb": {"hue": 240, "saturation": 50, "brightness": 75}}` | color |
//! | `{"led": false}` | status LED |
//! | `"getInfo"`, `"getMeterInfo"`, ... | named commands |
//! | `"startMeterEvents\|stopPowerEvents"` | event subscriptions |
//!
//! # Quick Start
//!
//! ```ignore
//! use kasa_node::{KasaNode, NodeConfig, NodeOutput};
//! use kasa_node::dispatch::InputMessage;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = NodeConfig::new().with_poll_interval(std::time::Duration::from_secs(10));
//!     let node = KasaNode::new(MyTransport::new(), config);
//!     let mut outputs = node.subscribe();
//!     node.start();
//!
//!     node.input(InputMessage::new(json!("startMeterEvents")).with_topic("10.0.0.5"));
//!
//!     while let Ok(output) = outputs.recv().await {
//!         if let NodeOutput::Message(message) = output {
//!             println!("{}: {}", message.topic, message.payload);
//!         }
//!     }
//! }
//! ```

mod capabilities;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod node;
pub mod session;
pub mod status;
pub mod subscription;
pub mod transport;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder, DeviceKind};
pub use error::{CommandError, DeviceError, Error, ErrorKind, Result, TransportError, ValueError};
pub use event::{NodeOutput, OutboundMessage, OutputBus};
pub use node::{KasaNode, NodeConfig};
pub use session::{SessionId, SessionState};
pub use status::{NodeStatus, StatusLevel};
pub use subscription::EventCategory;
pub use types::{Brightness, ColorTemperature, HsbColor, PowerAction};
