//! Wire-level message types for the Cascade service contract.
//!
//! These are the prost message shapes the service speaks. They are kept by
//! hand (rather than generated at build time) so the crate builds without a
//! protoc toolchain, but they follow generated-code conventions: plain data
//! structs, `oneof` enums for variant fields, and no behavior beyond small
//! accessors.

pub mod command;
pub mod common;
pub mod enums;
pub mod failure;
pub mod history;
pub mod workflowservice;

pub use command::Command;
pub use common::{
    ActivityType, Header, Payload, Payloads, RetryPolicy, SearchAttributes, WorkflowExecution,
    WorkflowType,
};
pub use failure::Failure;
pub use history::{History, HistoryEvent};

use std::time::Duration;

/// Convert a std duration into the wire duration shape.
pub fn duration_to_proto(d: Duration) -> prost_types::Duration {
    prost_types::Duration {
        seconds: d.as_secs() as i64,
        nanos: d.subsec_nanos() as i32,
    }
}

/// Convert a wire duration back into a std duration. Negative wire values
/// clamp to zero.
pub fn duration_from_proto(d: &prost_types::Duration) -> Duration {
    if d.seconds < 0 {
        return Duration::ZERO;
    }
    Duration::new(d.seconds as u64, d.nanos.max(0) as u32)
}
