//! Asynchronous activity completion by task token.
//!
//! External processes finish activities they did not poll for: the task
//! token travels out-of-band and comes back with the result. Encoding uses
//! the same converter and failure-converter chain as inline completion.

use crate::error::WorkerError;
use cascade_core::api::common::Payloads;
use cascade_core::api::workflowservice::{
    RecordActivityTaskHeartbeatRequest, RespondActivityTaskCanceledRequest,
    RespondActivityTaskCompletedRequest, RespondActivityTaskFailedRequest,
};
use cascade_core::client::WorkflowService;
use cascade_core::converter::{DataConverter, FailureConverter, PayloadValue};
use cascade_core::error::{CanceledError, CascadeError};
use std::sync::Arc;

/// Completes activities on behalf of their external executors.
pub struct ActivityCompletionClient {
    service: Arc<dyn WorkflowService>,
    data_converter: DataConverter,
    failure_converter: FailureConverter,
    identity: String,
}

impl ActivityCompletionClient {
    pub fn new(
        service: Arc<dyn WorkflowService>,
        data_converter: DataConverter,
        failure_converter: FailureConverter,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            service,
            data_converter,
            failure_converter,
            identity: identity.into(),
        }
    }

    /// Report the activity's outcome. `Ok` values become a completed
    /// response; a canceled error becomes a canceled response; any other
    /// error becomes a failed response carrying the converted failure.
    pub async fn complete_activity(
        &self,
        task_token: Vec<u8>,
        result: Result<Vec<PayloadValue>, CascadeError>,
    ) -> Result<(), WorkerError> {
        match result {
            Ok(values) => {
                let result = if values.is_empty() {
                    None
                } else {
                    Some(self.data_converter.to_payloads(&values)?)
                };
                self.service
                    .respond_activity_task_completed(RespondActivityTaskCompletedRequest {
                        task_token,
                        result,
                        identity: self.identity.clone(),
                    })
                    .await?;
            }
            Err(CascadeError::Canceled(canceled)) => {
                let details = details_payloads(&self.data_converter, &canceled);
                self.service
                    .respond_activity_task_canceled(RespondActivityTaskCanceledRequest {
                        task_token,
                        details,
                        identity: self.identity.clone(),
                    })
                    .await?;
            }
            Err(error) => {
                let failure = self.failure_converter.error_to_failure(&error);
                self.service
                    .respond_activity_task_failed(RespondActivityTaskFailedRequest {
                        task_token,
                        failure: Some(failure),
                        identity: self.identity.clone(),
                        last_heartbeat_details: None,
                    })
                    .await?;
            }
        }
        Ok(())
    }

    /// Record a heartbeat for an externally-executing activity. Returns
    /// whether the service has requested cancellation.
    pub async fn record_heartbeat(
        &self,
        task_token: Vec<u8>,
        details: &[PayloadValue],
    ) -> Result<bool, WorkerError> {
        let details = if details.is_empty() {
            None
        } else {
            Some(self.data_converter.to_payloads(details)?)
        };
        let response = self
            .service
            .record_activity_task_heartbeat(RecordActivityTaskHeartbeatRequest {
                task_token,
                details,
                identity: self.identity.clone(),
            })
            .await?;
        Ok(response.cancel_requested)
    }
}

fn details_payloads(converter: &DataConverter, canceled: &CanceledError) -> Option<Payloads> {
    match canceled.details().to_payloads(converter) {
        Ok(payloads) => payloads,
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode cancellation details");
            None
        }
    }
}
