// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The transport seam between a node and the physical devices.
//!
//! This crate does not speak the device wire protocol. A [`Transport`]
//! implementation hands out live [`DeviceHandle`]s and a passive discovery
//! stream; everything the node does to a device goes through these two
//! traits.
//!
//! # Implementing a transport
//!
//! Methods returning futures are declared as `impl Future + Send` so node
//! tasks can be spawned on a multi-threaded runtime. Implementations may use
//! plain `async fn`:
//!
//! ```ignore
//! impl DeviceHandle for MyHandle {
//!     async fn set_power_state(&self, on: bool) -> Result<(), TransportError> {
//!         self.client.send(relay_command(on)).await
//!     }
//!     // ...
//! }
//! ```

mod info;
#[cfg(test)]
pub(crate) mod mock;

pub use info::{LightState, MeterReading, SysInfo};

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::capabilities::Capabilities;
use crate::error::TransportError;
use crate::event::{DiscoveryEvent, NativeEvent};
use crate::types::Brightness;

/// Options passed to [`Transport::start_discovery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// How often the transport broadcasts a discovery probe.
    pub interval: Duration,
    /// Number of missed probes before a device is reported offline.
    pub offline_tolerance: u32,
    /// Whether the transport itself reports children as separate devices.
    pub breakout_children: bool,
}

impl DiscoveryOptions {
    /// Creates options with the given probe interval.
    ///
    /// Offline tolerance is 1 and children are reported with their parent.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            offline_tolerance: 1,
            breakout_children: false,
        }
    }
}

/// Provider of live device handles and presence information.
pub trait Transport: Send + Sync + 'static {
    /// The live handle type for one device or child outlet.
    type Handle: DeviceHandle;

    /// Opens a handle for the device at `address`, optionally scoped to the
    /// child outlet at `child`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the device cannot be reached.
    fn get_handle(
        &self,
        address: &str,
        child: Option<u8>,
    ) -> impl Future<Output = Result<Self::Handle, TransportError>> + Send;

    /// Starts the passive discovery/heartbeat stream.
    fn start_discovery(&self, options: &DiscoveryOptions)
    -> broadcast::Receiver<DiscoveryEvent<Self::Handle>>;

    /// Stops the discovery stream.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the stream cannot be stopped cleanly.
    fn stop_discovery(&self) -> Result<(), TransportError>;
}

/// A live capability object for one connected device or child outlet.
pub trait DeviceHandle: Send + Sync + 'static {
    /// Returns the feature flags reported by the device.
    fn capabilities(&self) -> Capabilities;

    /// Fetches the full system info snapshot.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn sys_info(&self) -> impl Future<Output = Result<SysInfo, TransportError>> + Send;

    /// Fetches the lightweight info summary.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn quick_info(&self) -> impl Future<Output = Result<Value, TransportError>> + Send;

    /// Fetches the cloud-link metadata.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn cloud_info(&self) -> impl Future<Output = Result<Value, TransportError>> + Send;

    /// Switches the relay or light on or off.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn set_power_state(&self, on: bool)
    -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Inverts the power state, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn toggle_power_state(&self) -> impl Future<Output = Result<bool, TransportError>> + Send;

    /// Sets brightness through the dimmer service of a plug or switch.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn set_brightness(
        &self,
        brightness: Brightness,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Applies a light state through the bulb lighting service.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn set_light_state(
        &self,
        state: LightState,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Switches the status LED.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn set_led_state(&self, on: bool) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Reads instantaneous power, voltage, and current.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn meter_realtime(&self) -> impl Future<Output = Result<MeterReading, TransportError>> + Send;

    /// Resets the energy counters.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on communication failure.
    fn erase_meter_stats(&self) -> impl Future<Output = Result<Value, TransportError>> + Send;

    /// Subscribes to device-native events.
    fn events(&self) -> broadcast::Receiver<NativeEvent>;

    /// Starts periodic polling; results arrive as [`NativeEvent`]s.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if polling cannot be started.
    fn start_polling(&self, interval: Duration) -> Result<(), TransportError>;

    /// Stops periodic polling.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if polling cannot be stopped cleanly.
    fn stop_polling(&self) -> Result<(), TransportError>;

    /// Releases the connection to the device.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the connection cannot be closed cleanly.
    fn close_connection(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Runs a transport future with a deadline.
///
/// # Errors
///
/// Returns the future's own error, or `TransportError::Timeout` if the
/// deadline elapses first.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        #[allow(clippy::cast_possible_truncation)]
        Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn with_timeout_maps_elapsed_deadline() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;

        assert_eq!(result, Err(TransportError::Timeout(50)));
    }

    #[tokio::test]
    async fn with_timeout_passes_through_result() {
        let ok = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<(), _> = with_timeout(Duration::from_secs(1), async {
            Err(TransportError::Rejected("busy".to_string()))
        })
        .await;
        assert_eq!(err, Err(TransportError::Rejected("busy".to_string())));
    }

    #[test]
    fn discovery_options_defaults() {
        let options = DiscoveryOptions::new(Duration::from_secs(10));
        assert_eq!(options.offline_tolerance, 1);
        assert!(!options.breakout_children);
    }
}
