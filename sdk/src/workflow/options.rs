//! Options for workflow-initiated operations.

use cascade_core::options::RetryPolicy;
use std::time::Duration;

/// Options for scheduling an activity from workflow code.
#[derive(Debug, Clone, Default)]
pub struct ActivityOptions {
    /// Registered activity type name.
    pub activity_type: String,
    /// Explicit activity id; generated deterministically when empty.
    pub activity_id: Option<String>,
    /// Target task queue; the workflow's own queue when empty.
    pub task_queue: Option<String>,
    pub schedule_to_close_timeout: Option<Duration>,
    pub schedule_to_start_timeout: Option<Duration>,
    pub start_to_close_timeout: Option<Duration>,
    pub heartbeat_timeout: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
}

impl ActivityOptions {
    pub fn new(activity_type: impl Into<String>) -> Self {
        Self {
            activity_type: activity_type.into(),
            ..Default::default()
        }
    }

    pub fn with_activity_id(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    pub fn with_start_to_close_timeout(mut self, timeout: Duration) -> Self {
        self.start_to_close_timeout = Some(timeout);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }
}

/// Options for starting a child workflow.
#[derive(Debug, Clone, Default)]
pub struct ChildWorkflowOptions {
    pub workflow_type: String,
    /// Explicit child workflow id; generated deterministically when empty.
    pub workflow_id: Option<String>,
    pub namespace: Option<String>,
    pub task_queue: Option<String>,
    pub workflow_run_timeout: Option<Duration>,
    pub workflow_task_timeout: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
}

impl ChildWorkflowOptions {
    pub fn new(workflow_type: impl Into<String>) -> Self {
        Self {
            workflow_type: workflow_type.into(),
            ..Default::default()
        }
    }

    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }
}

/// Options carried by a continue-as-new request.
#[derive(Debug, Clone, Default)]
pub struct ContinueAsNewOptions {
    pub task_queue: Option<String>,
    pub workflow_run_timeout: Option<Duration>,
    pub workflow_task_timeout: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
}
