//! Shared harness for workflow task tests: a recording service standing in
//! for the Cascade server and a builder for synthetic histories.
#![allow(dead_code)]

use async_trait::async_trait;
use cascade_sdk::api::command::Command;
use cascade_sdk::api::common::{ActivityType, Header, Payloads, WorkflowExecution, WorkflowType};
use cascade_sdk::api::failure::Failure;
use cascade_sdk::api::history::{history_event, History, HistoryEvent};
use cascade_sdk::api::history::{
    ActivityTaskCompletedEventAttributes, ActivityTaskFailedEventAttributes,
    ActivityTaskScheduledEventAttributes, ActivityTaskStartedEventAttributes,
    ActivityTaskTimedOutEventAttributes, MarkerRecordedEventAttributes,
    SignalExternalWorkflowExecutionFailedEventAttributes,
    SignalExternalWorkflowExecutionInitiatedEventAttributes, TimerFiredEventAttributes,
    TimerStartedEventAttributes, WorkflowExecutionCancelRequestedEventAttributes,
    WorkflowExecutionSignaledEventAttributes, WorkflowExecutionStartedEventAttributes,
    WorkflowTaskCompletedEventAttributes, WorkflowTaskScheduledEventAttributes,
    WorkflowTaskStartedEventAttributes,
};
use cascade_sdk::api::workflowservice::*;
use cascade_sdk::{DataConverter, PayloadValue, WorkflowService};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// Captures worker responses and answers polls with canned tasks.
#[derive(Default)]
pub struct RecordingService {
    pub completed: Mutex<Vec<RespondWorkflowTaskCompletedRequest>>,
    pub failed: Mutex<Vec<RespondWorkflowTaskFailedRequest>>,
}

impl RecordingService {
    pub fn last_completed(&self) -> RespondWorkflowTaskCompletedRequest {
        self.completed
            .lock()
            .last()
            .cloned()
            .expect("a completed workflow task response was recorded")
    }

    pub fn last_failed(&self) -> RespondWorkflowTaskFailedRequest {
        self.failed
            .lock()
            .last()
            .cloned()
            .expect("a failed workflow task response was recorded")
    }
}

#[async_trait]
impl WorkflowService for RecordingService {
    async fn start_workflow_execution(
        &self,
        _request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn poll_workflow_task_queue(
        &self,
        _request: PollWorkflowTaskQueueRequest,
    ) -> Result<PollWorkflowTaskQueueResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn respond_workflow_task_completed(
        &self,
        request: RespondWorkflowTaskCompletedRequest,
    ) -> Result<RespondWorkflowTaskCompletedResponse, tonic::Status> {
        self.completed.lock().push(request);
        Ok(Default::default())
    }

    async fn respond_workflow_task_failed(
        &self,
        request: RespondWorkflowTaskFailedRequest,
    ) -> Result<RespondWorkflowTaskFailedResponse, tonic::Status> {
        self.failed.lock().push(request);
        Ok(Default::default())
    }

    async fn poll_activity_task_queue(
        &self,
        _request: PollActivityTaskQueueRequest,
    ) -> Result<PollActivityTaskQueueResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn respond_activity_task_completed(
        &self,
        _request: RespondActivityTaskCompletedRequest,
    ) -> Result<RespondActivityTaskCompletedResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn respond_activity_task_failed(
        &self,
        _request: RespondActivityTaskFailedRequest,
    ) -> Result<RespondActivityTaskFailedResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn respond_activity_task_canceled(
        &self,
        _request: RespondActivityTaskCanceledRequest,
    ) -> Result<RespondActivityTaskCanceledResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn record_activity_task_heartbeat(
        &self,
        _request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn signal_workflow_execution(
        &self,
        _request: SignalWorkflowExecutionRequest,
    ) -> Result<SignalWorkflowExecutionResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn query_workflow(
        &self,
        _request: QueryWorkflowRequest,
    ) -> Result<QueryWorkflowResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn describe_workflow_execution(
        &self,
        _request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn terminate_workflow_execution(
        &self,
        _request: TerminateWorkflowExecutionRequest,
    ) -> Result<TerminateWorkflowExecutionResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn request_cancel_workflow_execution(
        &self,
        _request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<RequestCancelWorkflowExecutionResponse, tonic::Status> {
        Ok(Default::default())
    }

    async fn get_cluster_info(
        &self,
        _request: GetClusterInfoRequest,
    ) -> Result<GetClusterInfoResponse, tonic::Status> {
        Ok(Default::default())
    }
}

/// Encode a JSON value sequence the way workflow inputs travel.
pub fn payloads(values: &[Value]) -> Payloads {
    let converted: Vec<PayloadValue> = values.iter().cloned().map(Into::into).collect();
    DataConverter::default().to_payloads(&converted).unwrap()
}

pub fn decode<T: serde::de::DeserializeOwned>(payloads: &Payloads, index: usize) -> T {
    DataConverter::default()
        .from_payloads_at(payloads, index)
        .unwrap()
}

/// Builds histories event by event, assigning sequential event ids.
pub struct HistoryBuilder {
    events: Vec<HistoryEvent>,
}

impl HistoryBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn push(&mut self, attributes: history_event::Attributes) -> i64 {
        let event_id = self.events.len() as i64 + 1;
        self.events.push(HistoryEvent {
            event_id,
            event_time: None,
            attributes: Some(attributes),
        });
        event_id
    }

    pub fn workflow_started(&mut self, workflow_type: &str, input: &[Value]) -> i64 {
        self.workflow_started_with_header(workflow_type, input, None)
    }

    pub fn workflow_started_with_header(
        &mut self,
        workflow_type: &str,
        input: &[Value],
        header: Option<Header>,
    ) -> i64 {
        let input = if input.is_empty() {
            None
        } else {
            Some(payloads(input))
        };
        self.push(history_event::Attributes::WorkflowExecutionStarted(
            WorkflowExecutionStartedEventAttributes {
                workflow_type: Some(WorkflowType {
                    name: workflow_type.to_string(),
                }),
                input,
                header,
                task_queue: "test-queue".to_string(),
                attempt: 1,
                retry_policy: None,
            },
        ))
    }

    pub fn workflow_task_scheduled(&mut self) -> i64 {
        self.push(history_event::Attributes::WorkflowTaskScheduled(
            WorkflowTaskScheduledEventAttributes {
                task_queue: "test-queue".to_string(),
            },
        ))
    }

    pub fn workflow_task_started(&mut self) -> i64 {
        let scheduled = self.events.len() as i64;
        self.push(history_event::Attributes::WorkflowTaskStarted(
            WorkflowTaskStartedEventAttributes {
                scheduled_event_id: scheduled,
                identity: "test-worker".to_string(),
            },
        ))
    }

    pub fn workflow_task_completed(&mut self) -> i64 {
        let started = self.events.len() as i64;
        self.push(history_event::Attributes::WorkflowTaskCompleted(
            WorkflowTaskCompletedEventAttributes {
                scheduled_event_id: started - 1,
                started_event_id: started,
                identity: "test-worker".to_string(),
            },
        ))
    }

    /// One full past workflow task cycle: scheduled, started, completed.
    pub fn closed_workflow_task(&mut self) {
        self.workflow_task_scheduled();
        self.workflow_task_started();
        self.workflow_task_completed();
    }

    /// The live task boundary: scheduled plus started, nothing after.
    pub fn open_workflow_task(&mut self) {
        self.workflow_task_scheduled();
        self.workflow_task_started();
    }

    pub fn activity_scheduled(&mut self, activity_id: &str, activity_type: &str) -> i64 {
        self.push(history_event::Attributes::ActivityTaskScheduled(
            ActivityTaskScheduledEventAttributes {
                activity_id: activity_id.to_string(),
                activity_type: Some(ActivityType {
                    name: activity_type.to_string(),
                }),
                ..Default::default()
            },
        ))
    }

    pub fn activity_started(&mut self, scheduled_event_id: i64) -> i64 {
        self.push(history_event::Attributes::ActivityTaskStarted(
            ActivityTaskStartedEventAttributes {
                scheduled_event_id,
                identity: "activity-worker".to_string(),
                attempt: 1,
            },
        ))
    }

    pub fn activity_completed(
        &mut self,
        scheduled_event_id: i64,
        started_event_id: i64,
        result: Value,
    ) -> i64 {
        self.push(history_event::Attributes::ActivityTaskCompleted(
            ActivityTaskCompletedEventAttributes {
                result: Some(payloads(&[result])),
                scheduled_event_id,
                started_event_id,
                identity: "activity-worker".to_string(),
            },
        ))
    }

    pub fn activity_failed(
        &mut self,
        scheduled_event_id: i64,
        started_event_id: i64,
        failure: Failure,
    ) -> i64 {
        self.push(history_event::Attributes::ActivityTaskFailed(
            ActivityTaskFailedEventAttributes {
                failure: Some(failure),
                scheduled_event_id,
                started_event_id,
                identity: "activity-worker".to_string(),
                retry_state: 0,
            },
        ))
    }

    pub fn activity_timed_out(
        &mut self,
        scheduled_event_id: i64,
        started_event_id: i64,
        failure: Failure,
    ) -> i64 {
        self.push(history_event::Attributes::ActivityTaskTimedOut(
            ActivityTaskTimedOutEventAttributes {
                failure: Some(failure),
                scheduled_event_id,
                started_event_id,
                retry_state: 0,
            },
        ))
    }

    pub fn timer_started(&mut self, timer_id: &str) -> i64 {
        self.push(history_event::Attributes::TimerStarted(
            TimerStartedEventAttributes {
                timer_id: timer_id.to_string(),
                ..Default::default()
            },
        ))
    }

    pub fn timer_fired(&mut self, timer_id: &str, started_event_id: i64) -> i64 {
        self.push(history_event::Attributes::TimerFired(
            TimerFiredEventAttributes {
                timer_id: timer_id.to_string(),
                started_event_id,
            },
        ))
    }

    pub fn workflow_signaled(&mut self, signal_name: &str, input: &[Value]) -> i64 {
        let input = if input.is_empty() {
            None
        } else {
            Some(payloads(input))
        };
        self.push(history_event::Attributes::WorkflowExecutionSignaled(
            WorkflowExecutionSignaledEventAttributes {
                signal_name: signal_name.to_string(),
                input,
                header: None,
                identity: "signaler".to_string(),
            },
        ))
    }

    pub fn cancel_requested(&mut self) -> i64 {
        self.push(history_event::Attributes::WorkflowExecutionCancelRequested(
            WorkflowExecutionCancelRequestedEventAttributes {
                cause: "operator".to_string(),
                identity: "operator".to_string(),
            },
        ))
    }

    pub fn marker_recorded(&mut self, marker_name: &str, id: &str, data: Value) -> i64 {
        let mut details = HashMap::new();
        details.insert("id".to_string(), payloads(&[Value::String(id.to_string())]));
        details.insert("data".to_string(), payloads(&[data]));
        self.push(history_event::Attributes::MarkerRecorded(
            MarkerRecordedEventAttributes {
                marker_name: marker_name.to_string(),
                details,
                ..Default::default()
            },
        ))
    }

    pub fn marker_recorded_failed(&mut self, marker_name: &str, id: &str, failure: Failure) -> i64 {
        let mut details = HashMap::new();
        details.insert("id".to_string(), payloads(&[Value::String(id.to_string())]));
        self.push(history_event::Attributes::MarkerRecorded(
            MarkerRecordedEventAttributes {
                marker_name: marker_name.to_string(),
                details,
                failure: Some(failure),
                ..Default::default()
            },
        ))
    }

    pub fn signal_external_initiated(&mut self, signal_name: &str, control: &str) -> i64 {
        self.push(
            history_event::Attributes::SignalExternalWorkflowExecutionInitiated(
                SignalExternalWorkflowExecutionInitiatedEventAttributes {
                    workflow_task_completed_event_id: self.events.len() as i64,
                    namespace: "default".to_string(),
                    workflow_execution: Some(WorkflowExecution {
                        workflow_id: "other-workflow".to_string(),
                        run_id: String::new(),
                    }),
                    signal_name: signal_name.to_string(),
                    input: None,
                    control: control.to_string(),
                },
            ),
        )
    }

    pub fn signal_external_failed(&mut self, initiated_event_id: i64, cause: i32) -> i64 {
        self.push(
            history_event::Attributes::SignalExternalWorkflowExecutionFailed(
                SignalExternalWorkflowExecutionFailedEventAttributes {
                    cause,
                    initiated_event_id,
                    namespace: "default".to_string(),
                    workflow_execution: None,
                    control: String::new(),
                },
            ),
        )
    }

    /// Package the history as a polled workflow task.
    pub fn into_task(self, workflow_type: &str) -> PollWorkflowTaskQueueResponse {
        let started_event_id = self
            .events
            .iter()
            .rev()
            .find(|e| {
                matches!(
                    e.attributes,
                    Some(history_event::Attributes::WorkflowTaskStarted(_))
                )
            })
            .map(|e| e.event_id)
            .unwrap_or_default();
        PollWorkflowTaskQueueResponse {
            task_token: b"test-task-token".to_vec(),
            workflow_execution: Some(WorkflowExecution {
                workflow_id: "test-workflow-id".to_string(),
                run_id: "test-run-id".to_string(),
            }),
            workflow_type: Some(WorkflowType {
                name: workflow_type.to_string(),
            }),
            previous_started_event_id: 0,
            started_event_id,
            history: Some(History {
                events: self.events,
            }),
            query: None,
        }
    }
}

/// Names of the commands in a completed-task response, for shape asserts.
pub fn command_names(commands: &[Command]) -> Vec<&'static str> {
    commands.iter().map(|c| c.type_name()).collect()
}
