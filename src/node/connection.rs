// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connecting sessions and bringing them live.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dispatch::InputEnvelope;
use crate::error::TransportError;
use crate::event::{NativeEvent, Origin};
use crate::session::{DeviceRegistry, SessionId, SessionWorker};
use crate::transport::{DeviceHandle, Transport, with_timeout};

use super::context::NodeContext;

/// Performs connects and promotes sessions to live.
///
/// Promotion is shared by the explicit connect path and opportunistic
/// discovery; whichever reaches a pending session first wins.
pub(crate) struct ConnectionManager<T: Transport> {
    ctx: Arc<NodeContext<T>>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(ctx: Arc<NodeContext<T>>) -> Self {
        Self { ctx }
    }

    /// Spawns a connect attempt for a session already marked connecting.
    pub fn spawn_connect(ctx: &Arc<NodeContext<T>>, id: SessionId) {
        let manager = Self::new(Arc::clone(ctx));
        tokio::spawn(async move { manager.connect(id).await });
    }

    /// Obtains a handle, confirms reachability, and promotes the session.
    ///
    /// A failure returns the session to placeholder; it is not retried, but
    /// discovery may still promote it later.
    pub async fn connect(&self, id: SessionId) {
        debug!(session_id = %id, "Connecting");
        let timeout = self.ctx.config.timeout();

        let handle = match with_timeout(
            timeout,
            self.ctx.transport.get_handle(id.address(), id.child()),
        )
        .await
        {
            Ok(handle) => Arc::new(handle),
            Err(e) => return self.connect_failed(&id, e),
        };

        let info = match with_timeout(timeout, handle.sys_info()).await {
            Ok(info) => info,
            Err(e) => {
                release(&id, handle.as_ref(), false, timeout).await;
                return self.connect_failed(&id, e);
            }
        };

        let promoted = {
            let mut registry = self.ctx.registry.lock();
            let promoted = self.promote(&mut registry, &id, Arc::clone(&handle));
            if promoted && let Some(session) = registry.get_mut(&id) {
                session.snapshot_mut().record_info(info);
            }
            promoted
        };

        if promoted {
            self.ctx.publish_status();
        } else {
            debug!(session_id = %id, "Session already live; releasing surplus handle");
            release(&id, handle.as_ref(), false, timeout).await;
        }
    }

    fn connect_failed(&self, id: &SessionId, error: TransportError) {
        warn!(session_id = %id, error = %error, "Connect failed");
        self.ctx.registry.lock().connect_failed(id);
        self.ctx.report(Some(id), &error.into());
        self.ctx.publish_status();
    }

    /// Promotes a pending session and starts serving it.
    ///
    /// Queued inputs are moved into the session's ordered channel before the
    /// registry is released, so later inputs land strictly behind them.
    /// Returns false if the session was not pending.
    pub fn promote(
        &self,
        registry: &mut DeviceRegistry<T::Handle>,
        id: &SessionId,
        handle: Arc<T::Handle>,
    ) -> bool {
        let Some(queued) = registry.promote(id, Arc::clone(&handle)) else {
            return false;
        };
        debug!(session_id = %id, replayed = queued.len(), "Session promoted");

        let (sender, receiver) = mpsc::unbounded_channel();
        for envelope in queued {
            // The receiver is alive until the worker below is spawned.
            let _ = sender.send(envelope);
        }

        let events = handle.events();
        let tasks = vec![
            self.spawn_worker(id.clone(), Arc::clone(&handle), receiver),
            self.spawn_event_forwarder(id.clone(), events),
        ];

        if let Some(interval) = self.ctx.config.poll_interval
            && let Err(e) = handle.start_polling(interval)
        {
            warn!(session_id = %id, error = %e, "Failed to start polling");
            self.ctx.report_debug(id, &e.into());
        }

        if let Some(session) = registry.get_mut(id) {
            session.attach_worker(SessionWorker { sender, tasks });
        }
        true
    }

    fn spawn_worker(
        &self,
        id: SessionId,
        handle: Arc<T::Handle>,
        mut inputs: mpsc::UnboundedReceiver<InputEnvelope>,
    ) -> JoinHandle<()> {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            while let Some(envelope) = inputs.recv().await {
                let observed = ctx
                    .dispatcher
                    .dispatch(handle.as_ref(), &envelope, Origin::Input)
                    .await;
                ctx.observe(&id, observed);
            }
            debug!(session_id = %id, "Input worker stopped");
        })
    }

    fn spawn_event_forwarder(
        &self,
        id: SessionId,
        mut events: broadcast::Receiver<NativeEvent>,
    ) -> JoinHandle<()> {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => ctx.forward_event(&id, event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session_id = %id, skipped, "Device events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(session_id = %id, "Event forwarder stopped");
        })
    }
}

/// Stops polling (if asked) and closes a handle, logging failures.
pub(crate) async fn release<H: DeviceHandle>(
    id: &SessionId,
    handle: &H,
    stop_polling: bool,
    timeout: Duration,
) {
    if stop_polling && let Err(e) = handle.stop_polling() {
        warn!(session_id = %id, error = %e, "Failed to stop polling");
    }
    if let Err(e) = with_timeout(timeout, handle.close_connection()).await {
        warn!(session_id = %id, error = %e, "Failed to close connection");
    }
}
