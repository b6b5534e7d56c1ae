//! The recursive failure message and its per-kind info variants.

use crate::api::common::{ActivityType, Payload, Payloads, WorkflowExecution, WorkflowType};

/// Wire form of an error. `cause` nests recursively; exactly one
/// `failure_info` variant identifies the concrete kind.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Failure {
    #[prost(string, tag = "1")]
    pub message: String,
    /// Which SDK produced this failure (e.g. "RustSDK", "JavaSDK").
    #[prost(string, tag = "2")]
    pub source: String,
    #[prost(string, tag = "3")]
    pub stack_trace: String,
    /// When common attributes are encoded, the true message/stack trace live
    /// here as an encoded payload and the plain fields carry sentinels.
    #[prost(message, optional, tag = "4")]
    pub encoded_attributes: Option<Payload>,
    #[prost(message, optional, boxed, tag = "5")]
    pub cause: Option<Box<Failure>>,
    #[prost(
        oneof = "failure::FailureInfo",
        tags = "10, 11, 12, 13, 14, 15, 16, 17"
    )]
    pub failure_info: Option<failure::FailureInfo>,
}

pub mod failure {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum FailureInfo {
        #[prost(message, tag = "10")]
        ApplicationFailureInfo(super::ApplicationFailureInfo),
        #[prost(message, tag = "11")]
        TimeoutFailureInfo(super::TimeoutFailureInfo),
        #[prost(message, tag = "12")]
        CanceledFailureInfo(super::CanceledFailureInfo),
        #[prost(message, tag = "13")]
        TerminatedFailureInfo(super::TerminatedFailureInfo),
        #[prost(message, tag = "14")]
        ServerFailureInfo(super::ServerFailureInfo),
        #[prost(message, tag = "15")]
        ActivityFailureInfo(super::ActivityFailureInfo),
        #[prost(message, tag = "16")]
        ChildWorkflowExecutionFailureInfo(super::ChildWorkflowExecutionFailureInfo),
        #[prost(message, tag = "17")]
        HandlerFailureInfo(super::HandlerFailureInfo),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplicationFailureInfo {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(bool, tag = "2")]
    pub non_retryable: bool,
    #[prost(message, optional, tag = "3")]
    pub details: Option<Payloads>,
    #[prost(enumeration = "crate::api::enums::ApplicationErrorCategory", tag = "4")]
    pub category: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeoutFailureInfo {
    #[prost(enumeration = "crate::api::enums::TimeoutType", tag = "1")]
    pub timeout_type: i32,
    #[prost(message, optional, tag = "2")]
    pub last_heartbeat_details: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CanceledFailureInfo {
    #[prost(message, optional, tag = "1")]
    pub details: Option<Payloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TerminatedFailureInfo {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerFailureInfo {
    #[prost(bool, tag = "1")]
    pub non_retryable: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityFailureInfo {
    #[prost(int64, tag = "1")]
    pub scheduled_event_id: i64,
    #[prost(int64, tag = "2")]
    pub started_event_id: i64,
    #[prost(string, tag = "3")]
    pub identity: String,
    #[prost(message, optional, tag = "4")]
    pub activity_type: Option<ActivityType>,
    #[prost(string, tag = "5")]
    pub activity_id: String,
    #[prost(enumeration = "crate::api::enums::RetryState", tag = "6")]
    pub retry_state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChildWorkflowExecutionFailureInfo {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(message, optional, tag = "2")]
    pub workflow_execution: Option<WorkflowExecution>,
    #[prost(message, optional, tag = "3")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(int64, tag = "4")]
    pub initiated_event_id: i64,
    #[prost(int64, tag = "5")]
    pub started_event_id: i64,
    #[prost(enumeration = "crate::api::enums::RetryState", tag = "6")]
    pub retry_state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HandlerFailureInfo {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(
        enumeration = "crate::api::enums::HandlerErrorRetryBehavior",
        tag = "2"
    )]
    pub retry_behavior: i32,
}

impl Failure {
    /// Shorthand accessor for the application variant, if set.
    pub fn application_failure_info(&self) -> Option<&ApplicationFailureInfo> {
        match &self.failure_info {
            Some(failure::FailureInfo::ApplicationFailureInfo(info)) => Some(info),
            _ => None,
        }
    }

    pub fn timeout_failure_info(&self) -> Option<&TimeoutFailureInfo> {
        match &self.failure_info {
            Some(failure::FailureInfo::TimeoutFailureInfo(info)) => Some(info),
            _ => None,
        }
    }

    pub fn canceled_failure_info(&self) -> Option<&CanceledFailureInfo> {
        match &self.failure_info {
            Some(failure::FailureInfo::CanceledFailureInfo(info)) => Some(info),
            _ => None,
        }
    }

    pub fn server_failure_info(&self) -> Option<&ServerFailureInfo> {
        match &self.failure_info {
            Some(failure::FailureInfo::ServerFailureInfo(info)) => Some(info),
            _ => None,
        }
    }

    pub fn activity_failure_info(&self) -> Option<&ActivityFailureInfo> {
        match &self.failure_info {
            Some(failure::FailureInfo::ActivityFailureInfo(info)) => Some(info),
            _ => None,
        }
    }

    pub fn child_workflow_execution_failure_info(
        &self,
    ) -> Option<&ChildWorkflowExecutionFailureInfo> {
        match &self.failure_info {
            Some(failure::FailureInfo::ChildWorkflowExecutionFailureInfo(info)) => Some(info),
            _ => None,
        }
    }

    pub fn handler_failure_info(&self) -> Option<&HandlerFailureInfo> {
        match &self.failure_info {
            Some(failure::FailureInfo::HandlerFailureInfo(info)) => Some(info),
            _ => None,
        }
    }
}
