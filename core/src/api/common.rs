//! Common message shapes shared across the service surface.

use std::collections::HashMap;

/// A single unit of user data on the wire. The `metadata` map always carries
/// an `"encoding"` key naming the converter that produced `data`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    #[prost(map = "string, bytes", tag = "1")]
    pub metadata: HashMap<String, Vec<u8>>,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

/// An ordered sequence of payloads, e.g. the argument list of a workflow.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payloads {
    #[prost(message, repeated, tag = "1")]
    pub payloads: Vec<Payload>,
}

impl Payloads {
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }
}

/// Out-of-band metadata propagated alongside inputs (tracing baggage,
/// tenant info and the like).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(map = "string, message", tag = "1")]
    pub fields: HashMap<String, Payload>,
}

/// Identifies one run of a workflow.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecution {
    #[prost(string, tag = "1")]
    pub workflow_id: String,
    #[prost(string, tag = "2")]
    pub run_id: String,
}

/// Registered name of a workflow implementation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowType {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Registered name of an activity implementation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityType {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Server-interpreted retry policy for activities, workflows and children.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RetryPolicy {
    #[prost(message, optional, tag = "1")]
    pub initial_interval: Option<prost_types::Duration>,
    #[prost(double, tag = "2")]
    pub backoff_coefficient: f64,
    #[prost(message, optional, tag = "3")]
    pub maximum_interval: Option<prost_types::Duration>,
    #[prost(int32, tag = "4")]
    pub maximum_attempts: i32,
    #[prost(string, repeated, tag = "5")]
    pub non_retryable_error_types: Vec<String>,
}

/// Indexed key/value pairs attached to an execution for visibility queries.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchAttributes {
    #[prost(map = "string, message", tag = "1")]
    pub indexed_fields: HashMap<String, Payload>,
}
