// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Executing inputs against a live device.

use std::time::Duration;

use futures::future::{join, join_all};
use serde_json::Value;
use tracing::{debug, warn};

use crate::Capabilities;
use crate::error::{DeviceError, Error, TransportError};
use crate::event::{ErrorReport, NodeOutput, OutboundMessage, Origin, OutputBus};
use crate::session::SessionId;
use crate::subscription::EventSubscriptionTable;
use crate::transport::{DeviceHandle, LightState, MeterReading, SysInfo, with_timeout};

use super::plan::{Control, Plan};
use super::{ControlResult, InputEnvelope, ResultPolicy, TextCommand};

/// Default bound on a single device operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Device facts learned while dispatching, for the caller to record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observations {
    /// System info returned by `getInfo`.
    pub info: Option<SysInfo>,
    /// Meter reading returned by `getMeterInfo`.
    pub meter: Option<MeterReading>,
    /// Power state after a successful power control.
    pub power_on: Option<bool>,
}

impl Observations {
    fn merge(&mut self, other: Self) {
        if other.info.is_some() {
            self.info = other.info;
        }
        if other.meter.is_some() {
            self.meter = other.meter;
        }
        if other.power_on.is_some() {
            self.power_on = other.power_on;
        }
    }

    /// Returns true if nothing was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.info.is_none() && self.meter.is_none() && self.power_on.is_none()
    }
}

/// Validates inputs, runs their operations, and publishes the results.
///
/// Operations of one input run concurrently and are all awaited before the
/// control-result is decided. Calls for the same session must be serialized
/// by the caller to keep arrival order.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    subscriptions: EventSubscriptionTable,
    bus: OutputBus,
    policy: ResultPolicy,
    default_command: TextCommand,
    timeout: Duration,
}

impl CommandDispatcher {
    /// Creates a dispatcher with the `info` policy and `getInfo` default.
    #[must_use]
    pub fn new(subscriptions: EventSubscriptionTable, bus: OutputBus) -> Self {
        Self {
            subscriptions,
            bus,
            policy: ResultPolicy::default(),
            default_command: TextCommand::GetInfo,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the control-result policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ResultPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the command used by the `info` payload type.
    #[must_use]
    pub fn with_default_command(mut self, command: TextCommand) -> Self {
        self.default_command = command;
        self
    }

    /// Sets the bound on each device operation.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Processes one input on a live device.
    pub async fn dispatch<H: DeviceHandle>(
        &self,
        handle: &H,
        envelope: &InputEnvelope,
        origin: Origin,
    ) -> Observations {
        let id = &envelope.id;
        let capabilities = handle.capabilities();
        let plan = Plan::build(&envelope.payload, &capabilities);
        debug!(
            session_id = %id,
            controls = plan.controls.len(),
            commands = plan.commands.len(),
            directives = plan.directives.len(),
            "Dispatching input"
        );

        for error in &plan.rejected {
            self.report(id, error);
        }
        for directive in &plan.directives {
            self.subscriptions.apply(id, *directive);
        }

        let controls = join_all(
            plan.controls
                .iter()
                .map(|control| self.run_control(handle, &capabilities, *control)),
        );
        let commands = join_all(
            plan.commands
                .iter()
                .map(|command| self.run_command(handle, id, *command)),
        );
        let (control_results, command_results) = join(controls, commands).await;

        let mut observed = Observations::default();
        for result in command_results {
            observed.merge(result);
        }

        let mut all_succeeded = true;
        for result in control_results {
            match result {
                Ok(power_on) => observed.power_on = power_on.or(observed.power_on),
                Err(e) => {
                    all_succeeded = false;
                    warn!(session_id = %id, error = %e, "Device control failed");
                    self.report(id, &e.into());
                }
            }
        }

        if !plan.controls.is_empty() && all_succeeded {
            match self.policy.resolve(&envelope.raw, origin) {
                Ok(ControlResult::Publish(payload)) => {
                    self.publish(OutboundMessage::new(id.to_string(), payload));
                }
                Ok(ControlResult::RunDefault) => {
                    observed.merge(self.run_command(handle, id, self.default_command).await);
                }
                Ok(ControlResult::Suppress) => {}
                Err(e) => self.report(id, &e.into()),
            }
        }

        observed
    }

    /// Runs a named command and publishes its stamped result.
    pub async fn run_command<H: DeviceHandle>(
        &self,
        handle: &H,
        id: &SessionId,
        command: TextCommand,
    ) -> Observations {
        let mut observed = Observations::default();
        let result: Result<Value, Error> = match command {
            TextCommand::GetInfo => self.bounded(handle.sys_info()).await.map(|info| {
                let value = info.clone().into_value();
                observed.power_on = info.power_on();
                observed.info = Some(info);
                value
            }),
            TextCommand::GetCloudInfo => self.bounded(handle.cloud_info()).await,
            TextCommand::GetQuickInfo => {
                self.bounded(handle.quick_info())
                    .await
                    .map(|mut value| {
                        if let (Some(child), Value::Object(fields)) = (id.child(), &mut value) {
                            fields.insert("plug".to_string(), Value::from(child));
                        }
                        value
                    })
            }
            TextCommand::GetMeterInfo => match metering(&handle.capabilities()) {
                Ok(()) => self.bounded(handle.meter_realtime()).await.map(|reading| {
                    let value = reading.to_value();
                    observed.meter = Some(reading);
                    value
                }),
                Err(e) => Err(e),
            },
            TextCommand::EraseStats => match metering(&handle.capabilities()) {
                Ok(()) => self.bounded(handle.erase_meter_stats()).await,
                Err(e) => Err(e),
            },
            TextCommand::ClearEvents => {
                self.subscriptions.disable_all(id);
                return observed;
            }
        };

        match result {
            Ok(value) => self.publish(OutboundMessage::stamped(id.to_string(), value)),
            Err(e) => {
                warn!(session_id = %id, %command, error = %e, "Command failed");
                self.report(id, &e);
            }
        }
        observed
    }

    async fn run_control<H: DeviceHandle>(
        &self,
        handle: &H,
        capabilities: &Capabilities,
        control: Control,
    ) -> Result<Option<bool>, TransportError> {
        use crate::types::PowerAction;

        let timeout = self.timeout;
        match control {
            Control::Power(PowerAction::Toggle) => {
                with_timeout(timeout, handle.toggle_power_state()).await.map(Some)
            }
            Control::Power(action) => {
                let on = action == PowerAction::On;
                with_timeout(timeout, handle.set_power_state(on)).await?;
                Ok(Some(on))
            }
            Control::Brightness(brightness) if capabilities.is_bulb() => {
                let state = LightState::with_brightness(brightness);
                with_timeout(timeout, handle.set_light_state(state)).await.map(|()| None)
            }
            Control::Brightness(brightness) => {
                with_timeout(timeout, handle.set_brightness(brightness)).await.map(|()| None)
            }
            Control::Temperature(temperature) => {
                let state = LightState::with_color_temperature(temperature);
                with_timeout(timeout, handle.set_light_state(state)).await.map(|()| None)
            }
            Control::Hsb(color) => {
                let state = LightState::with_hsb(color);
                with_timeout(timeout, handle.set_light_state(state)).await.map(|()| None)
            }
            Control::Led(on) => with_timeout(timeout, handle.set_led_state(on)).await.map(|()| None),
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        Ok(with_timeout(self.timeout, fut).await?)
    }

    fn publish(&self, message: OutboundMessage) {
        self.bus.publish(NodeOutput::Message(message));
    }

    fn report(&self, id: &SessionId, error: &Error) {
        debug!(session_id = %id, error = %error, "Reporting error");
        self.bus
            .publish(NodeOutput::Error(ErrorReport::new(Some(id.to_string()), error)));
    }
}

fn metering(capabilities: &Capabilities) -> Result<(), Error> {
    if capabilities.metering {
        Ok(())
    } else {
        Err(DeviceError::UnsupportedCapability {
            capability: "energy metering",
        }
        .into())
    }
}
