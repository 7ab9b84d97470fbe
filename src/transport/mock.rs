// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recording device handle for unit tests.

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tokio::sync::broadcast;

use crate::Capabilities;
use crate::error::TransportError;
use crate::event::NativeEvent;
use crate::types::Brightness;

use super::{DeviceHandle, LightState, MeterReading, SysInfo};

pub(crate) struct MockHandle {
    capabilities: Capabilities,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    power: Mutex<bool>,
    events: broadcast::Sender<NativeEvent>,
}

impl MockHandle {
    pub fn new(capabilities: Capabilities) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            capabilities,
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            power: Mutex::new(false),
            events,
        }
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
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
        fields.insert("alias".to_string(), json!("Mock"));
        fields.insert("relay_state".to_string(), json!(u8::from(*self.power.lock())));
        SysInfo::new(fields)
    }
}

impl DeviceHandle for MockHandle {
    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    async fn sys_info(&self) -> Result<SysInfo, TransportError> {
        self.record("sys_info", "sys_info".to_string())?;
        Ok(self.info())
    }

    async fn quick_info(&self) -> Result<Value, TransportError> {
        self.record("quick_info", "quick_info".to_string())?;
        Ok(json!({ "sysInfo": self.info() }))
    }

    async fn cloud_info(&self) -> Result<Value, TransportError> {
        self.record("cloud_info", "cloud_info".to_string())?;
        Ok(json!({ "binded": 1 }))
    }

    async fn set_power_state(&self, on: bool) -> Result<(), TransportError> {
        self.record("set_power_state", format!("set_power_state({on})"))?;
        *self.power.lock() = on;
        Ok(())
    }

    async fn toggle_power_state(&self) -> Result<bool, TransportError> {
        self.record("toggle_power_state", "toggle_power_state".to_string())?;
        let mut power = self.power.lock();
        *power = !*power;
        Ok(*power)
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<(), TransportError> {
        self.record("set_brightness", format!("set_brightness({})", brightness.value()))
    }

    async fn set_light_state(&self, state: LightState) -> Result<(), TransportError> {
        let body = serde_json::to_string(&state).unwrap_or_default();
        self.record("set_light_state", format!("set_light_state({body})"))
    }

    async fn set_led_state(&self, on: bool) -> Result<(), TransportError> {
        self.record("set_led_state", format!("set_led_state({on})"))
    }

    async fn meter_realtime(&self) -> Result<MeterReading, TransportError> {
        self.record("meter_realtime", "meter_realtime".to_string())?;
        Ok(MeterReading::new(1500.0, 120_000.0, 500.0))
    }

    async fn erase_meter_stats(&self) -> Result<Value, TransportError> {
        self.record("erase_meter_stats", "erase_meter_stats".to_string())?;
        Ok(json!({ "err_code": 0 }))
    }

    fn events(&self) -> broadcast::Receiver<NativeEvent> {
        self.events.subscribe()
    }

    fn start_polling(&self, interval: Duration) -> Result<(), TransportError> {
        self.record("start_polling", format!("start_polling({}ms)", interval.as_millis()))
    }

    fn stop_polling(&self) -> Result<(), TransportError> {
        self.record("stop_polling", "stop_polling".to_string())
    }

    async fn close_connection(&self) -> Result<(), TransportError> {
        self.record("close_connection", "close_connection".to_string())
    }
}
