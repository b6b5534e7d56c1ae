//! Request and response messages for the Cascade workflow service RPCs.

use crate::api::command::Command;
use crate::api::common::{
    ActivityType, Header, Payloads, RetryPolicy, WorkflowExecution, WorkflowType,
};
use crate::api::failure::Failure;
use crate::api::history::History;
use std::collections::HashMap;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartWorkflowExecutionRequest {
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
    #[prost(string, tag = "7")]
    pub identity: String,
    #[prost(string, tag = "8")]
    pub request_id: String,
    #[prost(message, optional, tag = "9")]
    pub retry_policy: Option<RetryPolicy>,
    #[prost(message, optional, tag = "10")]
    pub workflow_run_timeout: Option<prost_types::Duration>,
    #[prost(message, optional, tag = "11")]
    pub workflow_task_timeout: Option<prost_types::Duration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartWorkflowExecutionResponse {
    #[prost(string, tag = "1")]
    pub run_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PollWorkflowTaskQueueRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub task_queue: String,
    #[prost(string, tag = "3")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PollWorkflowTaskQueueResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(message, optional, tag = "3")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(int64, tag = "4")]
    pub previous_started_event_id: i64,
    #[prost(int64, tag = "5")]
    pub started_event_id: i64,
    #[prost(message, optional, tag = "6")]
    pub history: Option<History>,
    #[prost(message, optional, tag = "7")]
    pub query: Option<WorkflowQuery>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowQuery {
    #[prost(string, tag = "1")]
    pub query_type: String,
    #[prost(message, optional, tag = "2")]
    pub query_args: Option<Payloads>,
    #[prost(message, optional, tag = "3")]
    pub header: Option<Header>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondWorkflowTaskCompletedRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub commands: Vec<Command>,
    #[prost(string, tag = "3")]
    pub identity: String,
    #[prost(message, optional, tag = "4")]
    pub query_result: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondWorkflowTaskCompletedResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondWorkflowTaskFailedRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub failure: Option<Failure>,
    #[prost(string, tag = "3")]
    pub identity: String,
    #[prost(string, tag = "4")]
    pub cause: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondWorkflowTaskFailedResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PollActivityTaskQueueRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub task_queue: String,
    #[prost(string, tag = "3")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PollActivityTaskQueueResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(message, optional, tag = "3")]
    pub activity_type: Option<ActivityType>,
    #[prost(string, tag = "4")]
    pub activity_id: String,
    #[prost(message, optional, tag = "5")]
    pub input: Option<Payloads>,
    #[prost(message, optional, tag = "6")]
    pub header: Option<Header>,
    #[prost(message, optional, tag = "7")]
    pub heartbeat_details: Option<Payloads>,
    #[prost(int32, tag = "8")]
    pub attempt: i32,
    #[prost(message, optional, tag = "9")]
    pub heartbeat_timeout: Option<prost_types::Duration>,
    #[prost(message, optional, tag = "10")]
    pub start_to_close_timeout: Option<prost_types::Duration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondActivityTaskCompletedRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub result: Option<Payloads>,
    #[prost(string, tag = "3")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondActivityTaskCompletedResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondActivityTaskFailedRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub failure: Option<Failure>,
    #[prost(string, tag = "3")]
    pub identity: String,
    #[prost(message, optional, tag = "4")]
    pub last_heartbeat_details: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondActivityTaskFailedResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondActivityTaskCanceledRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub details: Option<Payloads>,
    #[prost(string, tag = "3")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RespondActivityTaskCanceledResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordActivityTaskHeartbeatRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub task_token: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub details: Option<Payloads>,
    #[prost(string, tag = "3")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordActivityTaskHeartbeatResponse {
    #[prost(bool, tag = "1")]
    pub cancel_requested: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignalWorkflowExecutionRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(message, optional, tag = "2")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "3")]
    pub signal_name: String,
    #[prost(message, optional, tag = "4")]
    pub input: Option<Payloads>,
    #[prost(message, optional, tag = "5")]
    pub header: Option<Header>,
    #[prost(string, tag = "6")]
    pub identity: String,
    #[prost(string, tag = "7")]
    pub request_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignalWorkflowExecutionResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryWorkflowRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(message, optional, tag = "2")]
    pub execution: Option<WorkflowExecution>,
    #[prost(message, optional, tag = "3")]
    pub query: Option<WorkflowQuery>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryWorkflowResponse {
    #[prost(message, optional, tag = "1")]
    pub query_result: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DescribeWorkflowExecutionRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(message, optional, tag = "2")]
    pub execution: Option<WorkflowExecution>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DescribeWorkflowExecutionResponse {
    #[prost(message, optional, tag = "1")]
    pub execution: Option<WorkflowExecution>,
    #[prost(message, optional, tag = "2")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(enumeration = "WorkflowExecutionStatus", tag = "3")]
    pub status: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum WorkflowExecutionStatus {
    Unspecified = 0,
    Running = 1,
    Completed = 2,
    Failed = 3,
    Canceled = 4,
    Terminated = 5,
    ContinuedAsNew = 6,
    TimedOut = 7,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TerminateWorkflowExecutionRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(message, optional, tag = "2")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "3")]
    pub reason: String,
    #[prost(message, optional, tag = "4")]
    pub details: Option<Payloads>,
    #[prost(string, tag = "5")]
    pub identity: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TerminateWorkflowExecutionResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestCancelWorkflowExecutionRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(message, optional, tag = "2")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(string, tag = "3")]
    pub identity: String,
    #[prost(string, tag = "4")]
    pub request_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestCancelWorkflowExecutionResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetClusterInfoRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetClusterInfoResponse {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub server_version: String,
    #[prost(map = "string, string", tag = "3")]
    pub capabilities: HashMap<String, String>,
}
