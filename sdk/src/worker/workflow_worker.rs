//! The workflow task driver: poll, execute, respond.

use crate::error::WorkerError;
use crate::worker::event_handler::{WorkflowExecutionEventHandler, WorkflowTaskResult};
use crate::worker::registry::WorkflowRegistry;
use crate::workflow::environment::{WorkflowEnvironment, WorkflowInfo};
use crate::workflow::propagator::ContextPropagator;
use cascade_core::api::workflowservice::{
    PollWorkflowTaskQueueRequest, PollWorkflowTaskQueueResponse,
    RespondWorkflowTaskCompletedRequest, RespondWorkflowTaskFailedRequest,
};
use cascade_core::client::WorkflowService;
use cascade_core::converter::{DataConverter, FailureConverter};
use cascade_core::error::{ApplicationError, CascadeError};
use std::sync::Arc;
use uuid::Uuid;

/// Configuration for a workflow worker.
#[derive(Clone)]
pub struct WorkflowWorkerConfig {
    pub namespace: String,
    pub task_queue: String,
    /// Reported to the service in responses; defaults to a random id.
    pub identity: String,
    pub data_converter: DataConverter,
    pub failure_converter: FailureConverter,
    pub propagators: Vec<Arc<dyn ContextPropagator>>,
}

impl WorkflowWorkerConfig {
    pub fn new(namespace: impl Into<String>, task_queue: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            task_queue: task_queue.into(),
            identity: format!("worker-{}", Uuid::new_v4()),
            data_converter: DataConverter::default(),
            failure_converter: FailureConverter::default(),
            propagators: Vec::new(),
        }
    }
}

/// Polls workflow tasks and runs them through the event handler.
pub struct WorkflowWorker {
    service: Arc<dyn WorkflowService>,
    registry: Arc<WorkflowRegistry>,
    config: WorkflowWorkerConfig,
}

impl WorkflowWorker {
    pub fn new(
        service: Arc<dyn WorkflowService>,
        registry: Arc<WorkflowRegistry>,
        config: WorkflowWorkerConfig,
    ) -> Self {
        Self {
            service,
            registry,
            config,
        }
    }

    /// Poll once and process the task, if any. Returns whether a task was
    /// handled.
    pub async fn poll_and_process_once(&self) -> Result<bool, WorkerError> {
        let task = self
            .service
            .poll_workflow_task_queue(PollWorkflowTaskQueueRequest {
                namespace: self.config.namespace.clone(),
                task_queue: self.config.task_queue.clone(),
                identity: self.config.identity.clone(),
            })
            .await?;
        if task.task_token.is_empty() {
            return Ok(false);
        }
        self.process_task(task).await?;
        Ok(true)
    }

    /// Execute one polled workflow task and send the response.
    pub async fn process_task(
        &self,
        task: PollWorkflowTaskQueueResponse,
    ) -> Result<(), WorkerError> {
        let workflow_type = task
            .workflow_type
            .as_ref()
            .map(|t| t.name.clone())
            .ok_or_else(|| WorkerError::MalformedTask("missing workflow type".to_string()))?;
        let execution = task.workflow_execution.clone().unwrap_or_default();

        let Some(workflow_fn) = self.registry.get(&workflow_type) else {
            tracing::warn!(workflow_type = %workflow_type, "no workflow registered");
            let error = CascadeError::Application(ApplicationError::new(
                format!(
                    "unable to find workflowType={workflow_type}; registered types: {:?}",
                    self.registry.registered_names()
                ),
                "WorkflowNotFoundError",
                true,
            ));
            return self.respond_failed(task.task_token, &error, "workflow not registered").await;
        };

        let env = WorkflowEnvironment::new(
            WorkflowInfo {
                namespace: self.config.namespace.clone(),
                task_queue: self.config.task_queue.clone(),
                workflow_execution: execution.clone(),
                workflow_type: workflow_type.clone(),
                attempt: 1,
            },
            self.config.data_converter.clone(),
            self.config.failure_converter.clone(),
            self.config.propagators.clone(),
        );
        let handler = WorkflowExecutionEventHandler::new(env);

        match handler.handle_workflow_task(&task, &workflow_fn) {
            Ok(result) => {
                tracing::debug!(
                    workflow_id = %execution.workflow_id,
                    run_id = %execution.run_id,
                    commands = result.commands.len(),
                    "workflow task completed"
                );
                self.respond_completed(task.task_token, result).await
            }
            Err(error) => {
                tracing::error!(
                    workflow_id = %execution.workflow_id,
                    run_id = %execution.run_id,
                    error = %error,
                    "workflow task failed"
                );
                let cause = match &error {
                    CascadeError::NonDeterministic(_) => "non-deterministic workflow execution",
                    CascadeError::Panic(_) => "workflow panic",
                    _ => "workflow task failure",
                };
                self.respond_failed(task.task_token, &error, cause).await
            }
        }
    }

    async fn respond_completed(
        &self,
        task_token: Vec<u8>,
        result: WorkflowTaskResult,
    ) -> Result<(), WorkerError> {
        let query_result = match result.query_result {
            Some(Ok(payloads)) => Some(payloads),
            Some(Err(error)) => {
                tracing::warn!(error = %error, "query handler failed");
                None
            }
            None => None,
        };
        self.service
            .respond_workflow_task_completed(RespondWorkflowTaskCompletedRequest {
                task_token,
                commands: result.commands,
                identity: self.config.identity.clone(),
                query_result,
            })
            .await?;
        Ok(())
    }

    async fn respond_failed(
        &self,
        task_token: Vec<u8>,
        error: &CascadeError,
        cause: &str,
    ) -> Result<(), WorkerError> {
        let failure = self.config.failure_converter.error_to_failure(error);
        self.service
            .respond_workflow_task_failed(RespondWorkflowTaskFailedRequest {
                task_token,
                failure: Some(failure),
                identity: self.config.identity.clone(),
                cause: cause.to_string(),
            })
            .await?;
        Ok(())
    }
}
