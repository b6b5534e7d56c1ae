//! Commands — worker-originated intents the service turns into history.

/// One command in a workflow task response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Command {
    #[prost(
        oneof = "command::Attributes",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13"
    )]
    pub attributes: Option<command::Attributes>,
}

pub mod command {
    use crate::api::common::{
        ActivityType, Header, Payloads, RetryPolicy, SearchAttributes, WorkflowExecution,
        WorkflowType,
    };
    use crate::api::failure::Failure;
    use std::collections::HashMap;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Attributes {
        #[prost(message, tag = "1")]
        ScheduleActivityTask(ScheduleActivityTaskCommandAttributes),
        #[prost(message, tag = "2")]
        RequestCancelActivityTask(RequestCancelActivityTaskCommandAttributes),
        #[prost(message, tag = "3")]
        StartTimer(StartTimerCommandAttributes),
        #[prost(message, tag = "4")]
        CancelTimer(CancelTimerCommandAttributes),
        #[prost(message, tag = "5")]
        CompleteWorkflowExecution(CompleteWorkflowExecutionCommandAttributes),
        #[prost(message, tag = "6")]
        FailWorkflowExecution(FailWorkflowExecutionCommandAttributes),
        #[prost(message, tag = "7")]
        CancelWorkflowExecution(CancelWorkflowExecutionCommandAttributes),
        #[prost(message, tag = "8")]
        ContinueAsNewWorkflowExecution(ContinueAsNewWorkflowExecutionCommandAttributes),
        #[prost(message, tag = "9")]
        RecordMarker(RecordMarkerCommandAttributes),
        #[prost(message, tag = "10")]
        SignalExternalWorkflowExecution(SignalExternalWorkflowExecutionCommandAttributes),
        #[prost(message, tag = "11")]
        RequestCancelExternalWorkflowExecution(
            RequestCancelExternalWorkflowExecutionCommandAttributes,
        ),
        #[prost(message, tag = "12")]
        StartChildWorkflowExecution(StartChildWorkflowExecutionCommandAttributes),
        #[prost(message, tag = "13")]
        UpsertWorkflowSearchAttributes(UpsertWorkflowSearchAttributesCommandAttributes),
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ScheduleActivityTaskCommandAttributes {
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
        pub schedule_to_start_timeout: Option<prost_types::Duration>,
        #[prost(message, optional, tag = "9")]
        pub heartbeat_timeout: Option<prost_types::Duration>,
        #[prost(message, optional, tag = "10")]
        pub retry_policy: Option<RetryPolicy>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RequestCancelActivityTaskCommandAttributes {
        #[prost(int64, tag = "1")]
        pub scheduled_event_id: i64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct StartTimerCommandAttributes {
        #[prost(string, tag = "1")]
        pub timer_id: String,
        #[prost(message, optional, tag = "2")]
        pub start_to_fire_timeout: Option<prost_types::Duration>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CancelTimerCommandAttributes {
        #[prost(string, tag = "1")]
        pub timer_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CompleteWorkflowExecutionCommandAttributes {
        #[prost(message, optional, tag = "1")]
        pub result: Option<Payloads>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FailWorkflowExecutionCommandAttributes {
        #[prost(message, optional, tag = "1")]
        pub failure: Option<Failure>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CancelWorkflowExecutionCommandAttributes {
        #[prost(message, optional, tag = "1")]
        pub details: Option<Payloads>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ContinueAsNewWorkflowExecutionCommandAttributes {
        #[prost(message, optional, tag = "1")]
        pub workflow_type: Option<WorkflowType>,
        #[prost(string, tag = "2")]
        pub task_queue: String,
        #[prost(message, optional, tag = "3")]
        pub input: Option<Payloads>,
        #[prost(message, optional, tag = "4")]
        pub header: Option<Header>,
        #[prost(message, optional, tag = "5")]
        pub retry_policy: Option<RetryPolicy>,
        #[prost(message, optional, tag = "6")]
        pub workflow_run_timeout: Option<prost_types::Duration>,
        #[prost(message, optional, tag = "7")]
        pub workflow_task_timeout: Option<prost_types::Duration>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RecordMarkerCommandAttributes {
        #[prost(string, tag = "1")]
        pub marker_name: String,
        #[prost(map = "string, message", tag = "2")]
        pub details: HashMap<String, Payloads>,
        #[prost(message, optional, tag = "3")]
        pub header: Option<Header>,
        #[prost(message, optional, tag = "4")]
        pub failure: Option<Failure>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SignalExternalWorkflowExecutionCommandAttributes {
        #[prost(string, tag = "1")]
        pub namespace: String,
        #[prost(message, optional, tag = "2")]
        pub execution: Option<WorkflowExecution>,
        #[prost(string, tag = "3")]
        pub signal_name: String,
        #[prost(message, optional, tag = "4")]
        pub input: Option<Payloads>,
        #[prost(string, tag = "5")]
        pub control: String,
        #[prost(bool, tag = "6")]
        pub child_workflow_only: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RequestCancelExternalWorkflowExecutionCommandAttributes {
        #[prost(string, tag = "1")]
        pub namespace: String,
        #[prost(string, tag = "2")]
        pub workflow_id: String,
        #[prost(string, tag = "3")]
        pub run_id: String,
        #[prost(string, tag = "4")]
        pub control: String,
        #[prost(bool, tag = "5")]
        pub child_workflow_only: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct StartChildWorkflowExecutionCommandAttributes {
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
        #[prost(message, optional, tag = "7")]
        pub retry_policy: Option<RetryPolicy>,
        #[prost(message, optional, tag = "8")]
        pub workflow_run_timeout: Option<prost_types::Duration>,
        #[prost(message, optional, tag = "9")]
        pub workflow_task_timeout: Option<prost_types::Duration>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpsertWorkflowSearchAttributesCommandAttributes {
        #[prost(message, optional, tag = "1")]
        pub search_attributes: Option<SearchAttributes>,
    }
}

impl Command {
    /// A short name for logs and non-determinism diagnostics.
    pub fn type_name(&self) -> &'static str {
        use command::Attributes::*;
        match &self.attributes {
            Some(ScheduleActivityTask(_)) => "ScheduleActivityTask",
            Some(RequestCancelActivityTask(_)) => "RequestCancelActivityTask",
            Some(StartTimer(_)) => "StartTimer",
            Some(CancelTimer(_)) => "CancelTimer",
            Some(CompleteWorkflowExecution(_)) => "CompleteWorkflowExecution",
            Some(FailWorkflowExecution(_)) => "FailWorkflowExecution",
            Some(CancelWorkflowExecution(_)) => "CancelWorkflowExecution",
            Some(ContinueAsNewWorkflowExecution(_)) => "ContinueAsNewWorkflowExecution",
            Some(RecordMarker(_)) => "RecordMarker",
            Some(SignalExternalWorkflowExecution(_)) => "SignalExternalWorkflowExecution",
            Some(RequestCancelExternalWorkflowExecution(_)) => {
                "RequestCancelExternalWorkflowExecution"
            }
            Some(StartChildWorkflowExecution(_)) => "StartChildWorkflowExecution",
            Some(UpsertWorkflowSearchAttributes(_)) => "UpsertWorkflowSearchAttributes",
            None => "Unknown",
        }
    }
}
