//! Rate-limited activity heartbeats.
//!
//! The first heartbeat of each interval goes out synchronously; later ones
//! within the interval are coalesced into a single trailing send that keeps
//! only the latest details. The interval is half the activity's heartbeat
//! timeout so the service always sees a beat well inside the timeout.

use cascade_core::api::common::Payloads;
use cascade_core::api::workflowservice::RecordActivityTaskHeartbeatRequest;
use cascade_core::client::WorkflowService;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Fallback interval for activities without a heartbeat timeout.
const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// The spacing between heartbeats actually sent to the service.
pub(crate) fn heartbeat_interval(heartbeat_timeout: Option<Duration>) -> Duration {
    match heartbeat_timeout {
        Some(timeout) if !timeout.is_zero() => timeout / 2,
        _ => DEFAULT_HEARTBEAT_INTERVAL,
    }
}

struct ThrottleState {
    /// Latest coalesced details, waiting for the trailing send.
    pending: Option<Option<Payloads>>,
    /// A trailing-send task is scheduled.
    flush_scheduled: bool,
    /// Inside the quiet period after a synchronous send.
    throttled: bool,
}

/// Shared heartbeat pump for one activity execution. Safe to call from any
/// number of threads; only the latest details are retained.
pub(crate) struct HeartbeatThrottle {
    service: Arc<dyn WorkflowService>,
    task_token: Vec<u8>,
    identity: String,
    interval: Duration,
    state: Mutex<ThrottleState>,
    cancel_tx: watch::Sender<bool>,
}

impl HeartbeatThrottle {
    pub(crate) fn new(
        service: Arc<dyn WorkflowService>,
        task_token: Vec<u8>,
        identity: String,
        interval: Duration,
        cancel_tx: watch::Sender<bool>,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            task_token,
            identity,
            interval,
            state: Mutex::new(ThrottleState {
                pending: None,
                flush_scheduled: false,
                throttled: false,
            }),
            cancel_tx,
        })
    }

    /// Record a heartbeat. Sends immediately when outside the quiet period,
    /// otherwise coalesces into the trailing send.
    pub(crate) fn record(self: &Arc<Self>, details: Option<Payloads>) {
        let send_now = {
            let mut state = self.state.lock();
            if state.throttled {
                state.pending = Some(details.clone());
                if !state.flush_scheduled {
                    state.flush_scheduled = true;
                    self.schedule_flush();
                }
                false
            } else {
                state.throttled = true;
                true
            }
        };

        if send_now {
            self.spawn_send(details);
            self.schedule_unthrottle();
        }
    }

    fn spawn_send(self: &Arc<Self>, details: Option<Payloads>) {
        let this = self.clone();
        tokio::spawn(async move {
            let response = this
                .service
                .record_activity_task_heartbeat(RecordActivityTaskHeartbeatRequest {
                    task_token: this.task_token.clone(),
                    details,
                    identity: this.identity.clone(),
                })
                .await;
            match response {
                Ok(response) if response.cancel_requested => {
                    let _ = this.cancel_tx.send(true);
                }
                Ok(_) => {}
                Err(status) => {
                    tracing::warn!(error = %status, "heartbeat RPC failed");
                }
            }
        });
    }

    /// Lift the quiet period once the interval elapses.
    fn schedule_unthrottle(self: &Arc<Self>) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.interval).await;
            let mut state = this.state.lock();
            if !state.flush_scheduled {
                state.throttled = false;
            }
        });
    }

    /// Send the latest coalesced details at the end of the interval.
    fn schedule_flush(self: &Arc<Self>) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.interval).await;
            let details = {
                let mut state = this.state.lock();
                state.flush_scheduled = false;
                state.throttled = true;
                state.pending.take()
            };
            if let Some(details) = details {
                this.spawn_send(details);
                this.schedule_unthrottle();
            }
        });
    }
}
