//! User-facing option types shared across the SDK layers.

use crate::api::common;
use crate::api::{duration_from_proto, duration_to_proto};
use std::time::Duration;

/// Retry policy with std durations. Converts to and from the wire shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetryPolicy {
    pub initial_interval: Option<Duration>,
    pub backoff_coefficient: f64,
    pub maximum_interval: Option<Duration>,
    pub maximum_attempts: i32,
    pub non_retryable_error_types: Vec<String>,
}

impl RetryPolicy {
    pub fn to_proto(&self) -> common::RetryPolicy {
        common::RetryPolicy {
            initial_interval: self.initial_interval.map(duration_to_proto),
            backoff_coefficient: self.backoff_coefficient,
            maximum_interval: self.maximum_interval.map(duration_to_proto),
            maximum_attempts: self.maximum_attempts,
            non_retryable_error_types: self.non_retryable_error_types.clone(),
        }
    }

    pub fn from_proto(proto: &common::RetryPolicy) -> Self {
        Self {
            initial_interval: proto.initial_interval.as_ref().map(duration_from_proto),
            backoff_coefficient: proto.backoff_coefficient,
            maximum_interval: proto.maximum_interval.as_ref().map(duration_from_proto),
            maximum_attempts: proto.maximum_attempts,
            non_retryable_error_types: proto.non_retryable_error_types.clone(),
        }
    }
}
