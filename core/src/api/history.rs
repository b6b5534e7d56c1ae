//! History events — the service's persistent record of a workflow run.

use crate::api::common::{
    ActivityType, Header, Payloads, SearchAttributes, WorkflowExecution, WorkflowType,
};
use crate::api::failure::Failure;
use std::collections::HashMap;

/// A contiguous slice of a workflow's event history.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct History {
    #[prost(message, repeated, tag = "1")]
    pub events: Vec<HistoryEvent>,
}

/// One recorded event. `event_id` is the position in history (1-based);
/// the attribute variant identifies what happened.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HistoryEvent {
    #[prost(int64, tag = "1")]
    pub event_id: i64,
    #[prost(message, optional, tag = "2")]
    pub event_time: Option<prost_types::Timestamp>,
    #[prost(
        oneof = "history_event::Attributes",
        tags = "10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42"
    )]
    pub attributes: Option<history_event::Attributes>,
}

pub mod history_event {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Attributes {
        #[prost(message, tag = "10")]
        WorkflowExecutionStarted(super::WorkflowExecutionStartedEventAttributes),
        #[prost(message, tag = "11")]
        WorkflowExecutionCompleted(super::WorkflowExecutionCompletedEventAttributes),
        #[prost(message, tag = "12")]
        WorkflowExecutionFailed(super::WorkflowExecutionFailedEventAttributes),
        #[prost(message, tag = "13")]
        WorkflowExecutionCanceled(super::WorkflowExecutionCanceledEventAttributes),
        #[prost(message, tag = "14")]
        WorkflowExecutionTerminated(super::WorkflowExecutionTerminatedEventAttributes),
        #[prost(message, tag = "15")]
        WorkflowExecutionContinuedAsNew(super::WorkflowExecutionContinuedAsNewEventAttributes),
        #[prost(message, tag = "16")]
        WorkflowExecutionCancelRequested(super::WorkflowExecutionCancelRequestedEventAttributes),
        #[prost(message, tag = "17")]
        WorkflowExecutionSignaled(super::WorkflowExecutionSignaledEventAttributes),
        #[prost(message, tag = "18")]
        WorkflowTaskScheduled(super::WorkflowTaskScheduledEventAttributes),
        #[prost(message, tag = "19")]
        WorkflowTaskStarted(super::WorkflowTaskStartedEventAttributes),
        #[prost(message, tag = "20")]
        WorkflowTaskCompleted(super::WorkflowTaskCompletedEventAttributes),
        #[prost(message, tag = "21")]
        WorkflowTaskFailed(super::WorkflowTaskFailedEventAttributes),
        #[prost(message, tag = "22")]
        ActivityTaskScheduled(super::ActivityTaskScheduledEventAttributes),
        #[prost(message, tag = "23")]
        ActivityTaskStarted(super::ActivityTaskStartedEventAttributes),
        #[prost(message, tag = "24")]
        ActivityTaskCompleted(super::ActivityTaskCompletedEventAttributes),
        #[prost(message, tag = "25")]
        ActivityTaskFailed(super::ActivityTaskFailedEventAttributes),
        #[prost(message, tag = "26")]
        ActivityTaskTimedOut(super::ActivityTaskTimedOutEventAttributes),
        #[prost(message, tag = "27")]
        ActivityTaskCancelRequested(super::ActivityTaskCancelRequestedEventAttributes),
        #[prost(message, tag = "28")]
        ActivityTaskCanceled(super::ActivityTaskCanceledEventAttributes),
        #[prost(message, tag = "29")]
        TimerStarted(super::TimerStartedEventAttributes),
        #[prost(message, tag = "30")]
        TimerFired(super::TimerFiredEventAttributes),
        #[prost(message, tag = "31")]
        TimerCanceled(super::TimerCanceledEventAttributes),
        #[prost(message, tag = "32")]
        MarkerRecorded(super::MarkerRecordedEventAttributes),
        #[prost(message, tag = "33")]
        UpsertWorkflowSearchAttributes(super::UpsertWorkflowSearchAttributesEventAttributes),
        #[prost(message, tag = "34")]
        SignalExternalWorkflowExecutionInitiated(
            super::SignalExternalWorkflowExecutionInitiatedEventAttributes,
        ),
        #[prost(message, tag = "35")]
        SignalExternalWorkflowExecutionFailed(
            super::SignalExternalWorkflowExecutionFailedEventAttributes,
        ),
        #[prost(message, tag = "36")]
        ExternalWorkflowExecutionSignaled(super::ExternalWorkflowExecutionSignaledEventAttributes),
        #[prost(message, tag = "37")]
        RequestCancelExternalWorkflowExecutionInitiated(
            super::RequestCancelExternalWorkflowExecutionInitiatedEventAttributes,
        ),
        #[prost(message, tag = "38")]
        RequestCancelExternalWorkflowExecutionFailed(
            super::RequestCancelExternalWorkflowExecutionFailedEventAttributes,
        ),
        #[prost(message, tag = "39")]
        ExternalWorkflowExecutionCancelRequested(
            super::ExternalWorkflowExecutionCancelRequestedEventAttributes,
        ),
        #[prost(message, tag = "40")]
        StartChildWorkflowExecutionInitiated(
            super::StartChildWorkflowExecutionInitiatedEventAttributes,
        ),
        #[prost(message, tag = "41")]
        StartChildWorkflowExecutionFailed(super::StartChildWorkflowExecutionFailedEventAttributes),
        #[prost(message, tag = "42")]
        ChildWorkflowExecution(super::ChildWorkflowExecutionEventAttributes),
    }
}

impl HistoryEvent {
    /// Whether this event records a command the worker previously emitted
    /// (as opposed to something that happened to the workflow).
    pub fn is_command_event(&self) -> bool {
        use history_event::Attributes::*;
        matches!(
            self.attributes,
            Some(ActivityTaskScheduled(_))
                | Some(TimerStarted(_))
                | Some(MarkerRecorded(_))
                | Some(UpsertWorkflowSearchAttributes(_))
                | Some(SignalExternalWorkflowExecutionInitiated(_))
                | Some(RequestCancelExternalWorkflowExecutionInitiated(_))
                | Some(StartChildWorkflowExecutionInitiated(_))
                | Some(WorkflowExecutionCompleted(_))
                | Some(WorkflowExecutionFailed(_))
                | Some(WorkflowExecutionCanceled(_))
                | Some(WorkflowExecutionContinuedAsNew(_))
        )
    }

    /// A short name for logs and non-determinism diagnostics.
    pub fn type_name(&self) -> &'static str {
        use history_event::Attributes::*;
        match &self.attributes {
            Some(WorkflowExecutionStarted(_)) => "WorkflowExecutionStarted",
            Some(WorkflowExecutionCompleted(_)) => "WorkflowExecutionCompleted",
            Some(WorkflowExecutionFailed(_)) => "WorkflowExecutionFailed",
            Some(WorkflowExecutionCanceled(_)) => "WorkflowExecutionCanceled",
            Some(WorkflowExecutionTerminated(_)) => "WorkflowExecutionTerminated",
            Some(WorkflowExecutionContinuedAsNew(_)) => "WorkflowExecutionContinuedAsNew",
            Some(WorkflowExecutionCancelRequested(_)) => "WorkflowExecutionCancelRequested",
            Some(WorkflowExecutionSignaled(_)) => "WorkflowExecutionSignaled",
            Some(WorkflowTaskScheduled(_)) => "WorkflowTaskScheduled",
            Some(WorkflowTaskStarted(_)) => "WorkflowTaskStarted",
            Some(WorkflowTaskCompleted(_)) => "WorkflowTaskCompleted",
            Some(WorkflowTaskFailed(_)) => "WorkflowTaskFailed",
            Some(ActivityTaskScheduled(_)) => "ActivityTaskScheduled",
            Some(ActivityTaskStarted(_)) => "ActivityTaskStarted",
            Some(ActivityTaskCompleted(_)) => "ActivityTaskCompleted",
            Some(ActivityTaskFailed(_)) => "ActivityTaskFailed",
            Some(ActivityTaskTimedOut(_)) => "ActivityTaskTimedOut",
            Some(ActivityTaskCancelRequested(_)) => "ActivityTaskCancelRequested",
            Some(ActivityTaskCanceled(_)) => "ActivityTaskCanceled",
            Some(TimerStarted(_)) => "TimerStarted",
            Some(TimerFired(_)) => "TimerFired",
            Some(TimerCanceled(_)) => "TimerCanceled",
            Some(MarkerRecorded(_)) => "MarkerRecorded",
            Some(UpsertWorkflowSearchAttributes(_)) => "UpsertWorkflowSearchAttributes",
            Some(SignalExternalWorkflowExecutionInitiated(_)) => {
                "SignalExternalWorkflowExecutionInitiated"
            }
            Some(SignalExternalWorkflowExecutionFailed(_)) => {
                "SignalExternalWorkflowExecutionFailed"
            }
            Some(ExternalWorkflowExecutionSignaled(_)) => "ExternalWorkflowExecutionSignaled",
            Some(RequestCancelExternalWorkflowExecutionInitiated(_)) => {
                "RequestCancelExternalWorkflowExecutionInitiated"
            }
            Some(RequestCancelExternalWorkflowExecutionFailed(_)) => {
                "RequestCancelExternalWorkflowExecutionFailed"
            }
            Some(ExternalWorkflowExecutionCancelRequested(_)) => {
                "ExternalWorkflowExecutionCancelRequested"
            }
            Some(StartChildWorkflowExecutionInitiated(_)) => "StartChildWorkflowExecutionInitiated",
            Some(StartChildWorkflowExecutionFailed(_)) => "StartChildWorkflowExecutionFailed",
            Some(ChildWorkflowExecution(_)) => "ChildWorkflowExecution",
            None => "Unknown",
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionStartedEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(message, optional, tag = "2")]
    pub input: Option<Payloads>,
    #[prost(message, optional, tag = "3")]
    pub header: Option<Header>,
    #[prost(string, tag = "4")]
    pub task_queue: String,
    #[prost(int32, tag = "5")]
    pub attempt: i32,
    #[prost(message, optional, tag = "6")]
    pub retry_policy: Option<crate::api::common::RetryPolicy>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionCompletedEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub result: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionFailedEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub failure: Option<Failure>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionCanceledEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub details: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionTerminatedEventAttributes {
    #[prost(string, tag = "1")]
    pub reason: String,
    #[prost(message, optional, tag = "2")]
    pub details: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionContinuedAsNewEventAttributes {
    #[prost(string, tag = "1")]
    pub new_execution_run_id: String,
    #[prost(message, optional, tag = "2")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(message, optional, tag = "3")]
    pub input: Option<Payloads>,
    #[prost(message, optional, tag = "4")]
    pub header: Option<Header>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionCancelRequestedEventAttributes {
    #[prost(string, tag = "1")]
    pub cause: String,
    #[prost(string, tag = "2")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionSignaledEventAttributes {
    #[prost(string, tag = "1")]
    pub signal_name: String,
    #[prost(message, optional, tag = "2")]
    pub input: Option<Payloads>,
    #[prost(message, optional, tag = "3")]
    pub header: Option<Header>,
    #[prost(string, tag = "4")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowTaskScheduledEventAttributes {
    #[prost(string, tag = "1")]
    pub task_queue: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowTaskStartedEventAttributes {
    #[prost(int64, tag = "1")]
    pub scheduled_event_id: i64,
    #[prost(string, tag = "2")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowTaskCompletedEventAttributes {
    #[prost(int64, tag = "1")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "2")]
    pub started_event_id: i64,
    #[prost(string, tag = "3")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowTaskFailedEventAttributes {
    #[prost(int64, tag = "1")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "2")]
    pub started_event_id: i64,
    #[prost(message, optional, tag = "3")]
    pub failure: Option<Failure>,
    #[prost(string, tag = "4")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityTaskScheduledEventAttributes {
    #[prost(string, tag = "1")]
    pub activity_id: String,
    #[prost(message, optional, tag = "2")]
    pub activity_type: Option<ActivityType>,
    #[prost(string, tag = "3")]
    pub task_queue: String,
    #[prost(message, optional, tag = "4")]
    pub input: Option<Payloads>,
    #[prost(message, optional, tag = "5")]
    pub header: Option<Header>,
    #[prost(message, optional, tag = "6")]
    pub schedule_to_close_timeout: Option<prost_types::Duration>,
    #[prost(message, optional, tag = "7")]
    pub start_to_close_timeout: Option<prost_types::Duration>,
    #[prost(message, optional, tag = "8")]
    pub heartbeat_timeout: Option<prost_types::Duration>,
    #[prost(message, optional, tag = "9")]
    pub retry_policy: Option<crate::api::common::RetryPolicy>,
    #[prost(int64, tag = "10")]
    pub workflow_task_completed_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityTaskStartedEventAttributes {
    #[prost(int64, tag = "1")]
    pub scheduled_event_id: i64,
    #[prost(string, tag = "2")]
    pub identity: String,
    #[prost(int32, tag = "3")]
    pub attempt: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityTaskCompletedEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub result: Option<Payloads>,
    #[prost(int64, tag = "2")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "3")]
    pub started_event_id: i64,
    #[prost(string, tag = "4")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityTaskFailedEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub failure: Option<Failure>,
    #[prost(int64, tag = "2")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "3")]
    pub started_event_id: i64,
    #[prost(string, tag = "4")]
    pub identity: String,
    #[prost(enumeration = "crate::api::enums::RetryState", tag = "5")]
    pub retry_state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityTaskTimedOutEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub failure: Option<Failure>,
    #[prost(int64, tag = "2")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "3")]
    pub started_event_id: i64,
    #[prost(enumeration = "crate::api::enums::RetryState", tag = "4")]
    pub retry_state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityTaskCancelRequestedEventAttributes {
    #[prost(int64, tag = "1")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "2")]
    pub workflow_task_completed_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityTaskCanceledEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub details: Option<Payloads>,
    #[prost(int64, tag = "2")]
    pub latest_cancel_requested_event_id: i64,
    #[prost(int64, tag = "3")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "4")]
    pub started_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimerStartedEventAttributes {
    #[prost(string, tag = "1")]
    pub timer_id: String,
    #[prost(message, optional, tag = "2")]
    pub start_to_fire_timeout: Option<prost_types::Duration>,
    #[prost(int64, tag = "3")]
    pub workflow_task_completed_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimerFiredEventAttributes {
    #[prost(string, tag = "1")]
    pub timer_id: String,
    #[prost(int64, tag = "2")]
    pub started_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimerCanceledEventAttributes {
    #[prost(string, tag = "1")]
    pub timer_id: String,
    #[prost(int64, tag = "2")]
    pub started_event_id: i64,
    #[prost(int64, tag = "3")]
    pub workflow_task_completed_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MarkerRecordedEventAttributes {
    #[prost(string, tag = "1")]
    pub marker_name: String,
    #[prost(map = "string, message", tag = "2")]
    pub details: HashMap<String, Payloads>,
    #[prost(message, optional, tag = "3")]
    pub header: Option<Header>,
    #[prost(message, optional, tag = "4")]
    pub failure: Option<Failure>,
    #[prost(int64, tag = "5")]
    pub workflow_task_completed_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpsertWorkflowSearchAttributesEventAttributes {
    #[prost(message, optional, tag = "1")]
    pub search_attributes: Option<SearchAttributes>,
    #[prost(int64, tag = "2")]
    pub workflow_task_completed_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignalExternalWorkflowExecutionInitiatedEventAttributes {
    #[prost(int64, tag = "1")]
    pub workflow_task_completed_event_id: i64,
    #[prost(string, tag = "2")]
    pub namespace: String,
    #[prost(message, optional, tag = "3")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "4")]
    pub signal_name: String,
    #[prost(message, optional, tag = "5")]
    pub input: Option<Payloads>,
    #[prost(string, tag = "6")]
    pub control: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignalExternalWorkflowExecutionFailedEventAttributes {
    #[prost(
        enumeration = "crate::api::enums::SignalExternalWorkflowExecutionFailedCause",
        tag = "1"
    )]
    pub cause: i32,
    #[prost(int64, tag = "2")]
    pub initiated_event_id: i64,
    #[prost(string, tag = "3")]
    pub namespace: String,
    #[prost(message, optional, tag = "4")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "5")]
    pub control: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExternalWorkflowExecutionSignaledEventAttributes {
    #[prost(int64, tag = "1")]
    pub initiated_event_id: i64,
    #[prost(string, tag = "2")]
    pub namespace: String,
    #[prost(message, optional, tag = "3")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "4")]
    pub control: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestCancelExternalWorkflowExecutionInitiatedEventAttributes {
    #[prost(int64, tag = "1")]
    pub workflow_task_completed_event_id: i64,
    #[prost(string, tag = "2")]
    pub namespace: String,
    #[prost(message, optional, tag = "3")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "4")]
    pub control: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestCancelExternalWorkflowExecutionFailedEventAttributes {
    #[prost(
        enumeration = "crate::api::enums::CancelExternalWorkflowExecutionFailedCause",
        tag = "1"
    )]
    pub cause: i32,
    #[prost(int64, tag = "2")]
    pub initiated_event_id: i64,
    #[prost(string, tag = "3")]
    pub namespace: String,
    #[prost(message, optional, tag = "4")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "5")]
    pub control: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExternalWorkflowExecutionCancelRequestedEventAttributes {
    #[prost(int64, tag = "1")]
    pub initiated_event_id: i64,
    #[prost(string, tag = "2")]
    pub namespace: String,
    #[prost(message, optional, tag = "3")]
    pub workflow_execution: Option<WorkflowExecution>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartChildWorkflowExecutionInitiatedEventAttributes {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub workflow_id: String,
    #[prost(message, optional, tag = "3")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(string, tag = "4")]
    pub task_queue: String,
    #[prost(message, optional, tag = "5")]
    pub input: Option<Payloads>,
    #[prost(message, optional, tag = "6")]
    pub header: Option<Header>,
    #[prost(int64, tag = "7")]
    pub workflow_task_completed_event_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartChildWorkflowExecutionFailedEventAttributes {
    #[prost(
        enumeration = "crate::api::enums::StartChildWorkflowExecutionFailedCause",
        tag = "1"
    )]
    pub cause: i32,
    #[prost(int64, tag = "2")]
    pub initiated_event_id: i64,
    #[prost(string, tag = "3")]
    pub workflow_id: String,
    #[prost(message, optional, tag = "4")]
    pub workflow_type: Option<WorkflowType>,
}

/// What happened to a running child workflow. Collapsed into one attribute
/// message with a stage discriminant so every child terminal state shares the
/// identifying fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChildWorkflowExecutionEventAttributes {
    #[prost(enumeration = "ChildWorkflowExecutionStage", tag = "1")]
    pub stage: i32,
    #[prost(string, tag = "2")]
    pub namespace: String,
    #[prost(message, optional, tag = "3")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(message, optional, tag = "4")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(int64, tag = "5")]
    pub initiated_event_id: i64,
    #[prost(int64, tag = "6")]
    pub started_event_id: i64,
    /// Set for Completed.
    #[prost(message, optional, tag = "7")]
    pub result: Option<Payloads>,
    /// Set for Failed and TimedOut.
    #[prost(message, optional, tag = "8")]
    pub failure: Option<Failure>,
    /// Set for Canceled.
    #[prost(message, optional, tag = "9")]
    pub details: Option<Payloads>,
    #[prost(enumeration = "crate::api::enums::RetryState", tag = "10")]
    pub retry_state: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ChildWorkflowExecutionStage {
    Unspecified = 0,
    Started = 1,
    Completed = 2,
    Failed = 3,
    Canceled = 4,
    TimedOut = 5,
    Terminated = 6,
}
