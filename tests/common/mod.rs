// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport for node integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use kasa_node::event::{DiscoveryEvent, ErrorReport, NativeEvent, PresenceKind};
use kasa_node::transport::{
    DeviceHandle, DiscoveryOptions, LightState, MeterReading, SysInfo, Transport,
};
use kasa_node::{Brightness, Capabilities, NodeOutput, OutboundMessage, TransportError};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tokio::sync::{Semaphore, broadcast};

/// How long helpers wait for an expected output.
pub const WAIT: Duration = Duration::from_secs(2);

/// A simulated device shared by every handle obtained for its id.
pub struct MockDevice {
    pub id: String,
    capabilities: Capabilities,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    power: Mutex<bool>,
    polling: Mutex<Option<Duration>>,
    events: broadcast::Sender<NativeEvent>,
}

impl MockDevice {
    fn new(id: String, capabilities: Capabilities) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            id,
            capabilities,
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            power: Mutex::new(false),
            polling: Mutex::new(None),
            events,
        }
    }

    /// Makes an operation fail from now on.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    /// Returns every call made on this device, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Returns the calls that are not the connect-time info read.
    pub fn calls_except_info(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call != "sys_info")
            .collect()
    }

    /// Returns the active polling interval.
    pub fn polling(&self) -> Option<Duration> {
        *self.polling.lock()
    }

    /// Sets the relay state the device reports.
    pub fn set_power(&self, on: bool) {
        *self.power.lock() = on;
    }

    /// Raises a device event.
    pub fn emit(&self, event: NativeEvent) {
        let _ = self.events.send(event);
    }

    fn record(&self, operation: &'static str, call: String) -> Result<(), TransportError> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(operation) {
            Err(TransportError::Rejected(format!("{operation} failed")))
        } else {
            Ok(())
        }
    }

    fn info(&self) -> SysInfo {
        let mut fields = Map::new();
        fields.insert("alias".to_string(), json!(format!("Device {}", self.id)));
        fields.insert("relay_state".to_string(), json!(u8::from(*self.power.lock())));
        SysInfo::new(fields)
    }
}

/// Handle onto a [`MockDevice`].
pub struct MockHandle {
    device: Arc<MockDevice>,
}

impl DeviceHandle for MockHandle {
    fn capabilities(&self) -> Capabilities {
        self.device.capabilities.clone()
    }

    async fn sys_info(&self) -> Result<SysInfo, TransportError> {
        self.device.record("sys_info", "sys_info".to_string())?;
        Ok(self.device.info())
    }

    async fn quick_info(&self) -> Result<Value, TransportError> {
        self.device.record("quick_info", "quick_info".to_string())?;
        Ok(json!({ "sysInfo": self.device.info() }))
    }

    async fn cloud_info(&self) -> Result<Value, TransportError> {
        self.device.record("cloud_info", "cloud_info".to_string())?;
        Ok(json!({ "binded": 1, "server": "n-devs.tplinkcloud.com" }))
    }

    async fn set_power_state(&self, on: bool) -> Result<(), TransportError> {
        self.device.record("set_power_state", format!("set_power_state({on})"))?;
        *self.device.power.lock() = on;
        Ok(())
    }

    async fn toggle_power_state(&self) -> Result<bool, TransportError> {
        self.device.record("toggle_power_state", "toggle_power_state".to_string())?;
        let mut power = self.device.power.lock();
        *power = !*power;
        Ok(*power)
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<(), TransportError> {
        self.device
            .record("set_brightness", format!("set_brightness({})", brightness.value()))
    }

    async fn set_light_state(&self, state: LightState) -> Result<(), TransportError> {
        let body = serde_json::to_string(&state).unwrap_or_default();
        self.device.record("set_light_state", format!("set_light_state({body})"))
    }

    async fn set_led_state(&self, on: bool) -> Result<(), TransportError> {
        self.device.record("set_led_state", format!("set_led_state({on})"))
    }

    async fn meter_realtime(&self) -> Result<MeterReading, TransportError> {
        self.device.record("meter_realtime", "meter_realtime".to_string())?;
        Ok(MeterReading::new(1500.0, 120_000.0, 500.0))
    }

    async fn erase_meter_stats(&self) -> Result<Value, TransportError> {
        self.device.record("erase_meter_stats", "erase_meter_stats".to_string())?;
        Ok(json!({ "err_code": 0 }))
    }

    fn events(&self) -> broadcast::Receiver<NativeEvent> {
        self.device.events.subscribe()
    }

    fn start_polling(&self, interval: Duration) -> Result<(), TransportError> {
        self.device.record("start_polling", "start_polling".to_string())?;
        *self.device.polling.lock() = Some(interval);
        Ok(())
    }

    fn stop_polling(&self) -> Result<(), TransportError> {
        self.device.record("stop_polling", "stop_polling".to_string())?;
        *self.device.polling.lock() = None;
        Ok(())
    }

    async fn close_connection(&self) -> Result<(), TransportError> {
        self.device.record("close_connection", "close_connection".to_string())
    }
}

#[derive(Default)]
struct Registry {
    capabilities: HashMap<String, Capabilities>,
    devices: HashMap<String, Arc<MockDevice>>,
    unreachable: HashSet<String>,
    connects: Vec<String>,
}

struct Inner {
    state: Mutex<Registry>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    discovery: broadcast::Sender<DiscoveryEvent<MockHandle>>,
    discovery_options: Mutex<Option<DiscoveryOptions>>,
    discovery_stopped: Mutex<bool>,
}

/// Transport serving [`MockDevice`]s. Clones share the same devices.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (discovery, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(Registry::default()),
                gate: Mutex::new(None),
                discovery,
                discovery_options: Mutex::new(None),
                discovery_stopped: Mutex::new(false),
            }),
        }
    }

    /// Declares the capabilities of the device at `id`.
    pub fn with_device(self, id: &str, capabilities: Capabilities) -> Self {
        self.inner
            .state
            .lock()
            .capabilities
            .insert(id.to_string(), capabilities);
        self
    }

    /// Returns the simulated device for `id`, creating it if needed.
    pub fn device(&self, id: &str) -> Arc<MockDevice> {
        let mut state = self.inner.state.lock();
        let capabilities = state
            .capabilities
            .get(id)
            .cloned()
            .unwrap_or_else(Capabilities::plug);
        Arc::clone(
            state
                .devices
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(MockDevice::new(id.to_string(), capabilities))),
        )
    }

    /// Makes connects to `id` fail, or succeed again.
    pub fn set_unreachable(&self, id: &str, unreachable: bool) {
        let mut state = self.inner.state.lock();
        if unreachable {
            state.unreachable.insert(id.to_string());
        } else {
            state.unreachable.remove(id);
        }
    }

    /// Holds every connect until [`open_gate`](Self::open_gate).
    pub fn close_gate(&self) {
        *self.inner.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Releases held and future connects.
    pub fn open_gate(&self) {
        if let Some(gate) = self.inner.gate.lock().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Returns the ids of every connect attempt, in order.
    pub fn connects(&self) -> Vec<String> {
        self.inner.state.lock().connects.clone()
    }

    pub fn discovery_options(&self) -> Option<DiscoveryOptions> {
        self.inner.discovery_options.lock().clone()
    }

    pub fn discovery_stopped(&self) -> bool {
        *self.inner.discovery_stopped.lock()
    }

    /// Creates a handle the way discovery would report it.
    pub fn handle(&self, id: &str) -> Arc<MockHandle> {
        Arc::new(MockHandle {
            device: self.device(id),
        })
    }

    /// Reports a device on the discovery stream, with its current info.
    pub fn announce(&self, kind: PresenceKind, host: &str) {
        let event = DiscoveryEvent::new(kind, host, self.handle(host))
            .with_info(self.device(host).info());
        let _ = self.inner.discovery.send(event);
    }

    /// Reports a parent device with children on the discovery stream.
    pub fn announce_with_children(&self, kind: PresenceKind, host: &str, children: &[&str]) {
        let mut event = DiscoveryEvent::new(kind, host, self.handle(host))
            .with_info(self.device(host).info());
        for (index, child) in children.iter().enumerate() {
            let id = format!("{host}/{index}");
            event = event.with_child_info(*child, self.handle(&id), self.device(&id).info());
        }
        let _ = self.inner.discovery.send(event);
    }
}

impl Transport for MockTransport {
    type Handle = MockHandle;

    async fn get_handle(&self, address: &str, child: Option<u8>) -> Result<MockHandle, TransportError> {
        let id = match child {
            Some(child) => format!("{address}/{child}"),
            None => address.to_string(),
        };
        self.inner.state.lock().connects.push(id.clone());

        let gate = self.inner.gate.lock().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        let unreachable = self.inner.state.lock().unreachable.contains(&id);
        if unreachable {
            return Err(TransportError::ConnectionFailed(format!("{id} unreachable")));
        }
        Ok(MockHandle {
            device: self.device(&id),
        })
    }

    fn start_discovery(&self, options: &DiscoveryOptions) -> broadcast::Receiver<DiscoveryEvent<MockHandle>> {
        *self.inner.discovery_options.lock() = Some(options.clone());
        self.inner.discovery.subscribe()
    }

    fn stop_discovery(&self) -> Result<(), TransportError> {
        *self.inner.discovery_stopped.lock() = true;
        Ok(())
    }
}

/// Waits for the next output matching `select`, skipping the others.
pub async fn next_matching<T>(
    outputs: &mut broadcast::Receiver<NodeOutput>,
    mut select: impl FnMut(NodeOutput) -> Option<T>,
) -> T {
    tokio::time::timeout(WAIT, async {
        loop {
            match outputs.recv().await {
                Ok(output) => {
                    if let Some(found) = select(output) {
                        return found;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("output bus closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for output")
}

/// Waits for the next outbound message.
pub async fn next_message(outputs: &mut broadcast::Receiver<NodeOutput>) -> OutboundMessage {
    next_matching(outputs, |output| match output {
        NodeOutput::Message(message) => Some(message),
        _ => None,
    })
    .await
}

/// Waits for the next error report.
pub async fn next_error(outputs: &mut broadcast::Receiver<NodeOutput>) -> ErrorReport {
    next_matching(outputs, |output| match output {
        NodeOutput::Error(report) => Some(report),
        _ => None,
    })
    .await
}

/// Returns the messages already published, without waiting.
pub fn pending_messages(outputs: &mut broadcast::Receiver<NodeOutput>) -> Vec<OutboundMessage> {
    let mut messages = Vec::new();
    while let Ok(output) = outputs.try_recv() {
        if let NodeOutput::Message(message) = output {
            messages.push(message);
        }
    }
    messages
}

/// Polls `condition` until it holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

/// Returns the event name of a subscribed-event message.
pub fn event_name(message: &OutboundMessage) -> Option<&str> {
    message.payload.get("event").and_then(Value::as_str)
}
