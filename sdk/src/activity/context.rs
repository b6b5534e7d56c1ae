//! Activity-side execution context.
//!
//! Activities run on ordinary tokio tasks; nothing here is deterministic.
//! Cancellation is delivered through heartbeat responses: when the service
//! reports the activity canceled, the context's cancellation watch flips
//! and `cancelled()` resolves.

use crate::activity::heartbeat::{heartbeat_interval, HeartbeatThrottle};
use cascade_core::api::common::{ActivityType, Payloads, WorkflowExecution};
use cascade_core::api::duration_from_proto;
use cascade_core::api::workflowservice::PollActivityTaskQueueResponse;
use cascade_core::client::WorkflowService;
use cascade_core::converter::{ConverterError, DataConverter, PayloadValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Identifying details of the running activity.
#[derive(Debug, Clone, Default)]
pub struct ActivityInfo {
    pub task_token: Vec<u8>,
    pub activity_id: String,
    pub activity_type: ActivityType,
    pub workflow_execution: WorkflowExecution,
    pub attempt: i32,
    pub heartbeat_timeout: Option<Duration>,
    pub start_to_close_timeout: Option<Duration>,
}

/// Handle passed to activity implementations.
#[derive(Clone)]
pub struct ActivityContext {
    info: Arc<ActivityInfo>,
    data_converter: DataConverter,
    heartbeat: Arc<HeartbeatThrottle>,
    heartbeat_details: Option<Payloads>,
    cancel_rx: watch::Receiver<bool>,
}

impl ActivityContext {
    /// Build the context for one polled activity task.
    pub fn new(
        service: Arc<dyn WorkflowService>,
        identity: impl Into<String>,
        data_converter: DataConverter,
        task: &PollActivityTaskQueueResponse,
    ) -> Self {
        let heartbeat_timeout = task.heartbeat_timeout.as_ref().map(duration_from_proto);
        let info = ActivityInfo {
            task_token: task.task_token.clone(),
            activity_id: task.activity_id.clone(),
            activity_type: task.activity_type.clone().unwrap_or_default(),
            workflow_execution: task.workflow_execution.clone().unwrap_or_default(),
            attempt: task.attempt,
            heartbeat_timeout,
            start_to_close_timeout: task.start_to_close_timeout.as_ref().map(duration_from_proto),
        };
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let heartbeat = HeartbeatThrottle::new(
            service,
            task.task_token.clone(),
            identity.into(),
            heartbeat_interval(heartbeat_timeout),
            cancel_tx,
        );
        Self {
            info: Arc::new(info),
            data_converter,
            heartbeat,
            heartbeat_details: task.heartbeat_details.clone(),
            cancel_rx,
        }
    }

    pub fn info(&self) -> &ActivityInfo {
        &self.info
    }

    /// Record progress. Calls are throttled and coalesced; only the latest
    /// details survive an interval. Concurrent calls are safe.
    pub fn record_heartbeat(&self, details: &[PayloadValue]) {
        let payloads = if details.is_empty() {
            None
        } else {
            match self.data_converter.to_payloads(details) {
                Ok(payloads) => Some(payloads),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode heartbeat details");
                    return;
                }
            }
        };
        self.heartbeat.record(payloads);
    }

    /// Whether the previous attempt recorded heartbeat details.
    pub fn has_heartbeat_details(&self) -> bool {
        self.heartbeat_details
            .as_ref()
            .map(|p| !p.payloads.is_empty())
            .unwrap_or(false)
    }

    /// Details recorded by the previous attempt's last heartbeat.
    pub fn heartbeat_details<T: DeserializeOwned>(&self) -> Result<T, ConverterError> {
        let payloads = self
            .heartbeat_details
            .as_ref()
            .ok_or(ConverterError::NoData)?;
        if payloads.payloads.is_empty() {
            return Err(ConverterError::NoData);
        }
        self.data_converter.from_payloads_at(payloads, 0)
    }

    /// Whether the service has requested cancellation of this activity.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Resolves when the service requests cancellation.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel_rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
