//! # Cascade SDK for Rust
//!
//! Worker-side runtime for the Cascade durable-execution service. Workflow
//! code runs on a deterministic cooperative scheduler: operations that look
//! asynchronous (timers, activities, child workflows, signals) emit
//! commands to the service and suspend on futures that later history events
//! resolve, so an execution can always be rebuilt from its history.
//!
//! ## Architecture
//!
//! Built on `cascade-core`, which provides the wire message shapes, the
//! payload/codec pipeline, the failure converter and the client-side
//! interceptors. This crate adds:
//!
//! - [`workflow`] — the deterministic runtime: [`WorkflowContext`],
//!   channels, selectors, cancellation scopes and context propagators
//! - [`worker`] — command state machines, the workflow-task event handler
//!   and the poll/respond driver
//! - [`activity`] — the non-deterministic side: activity context,
//!   rate-limited heartbeats and completion by task token
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use cascade_sdk::prelude::*;
//!
//! let registry = Arc::new(WorkflowRegistry::new());
//! registry.register("greeting-workflow", |ctx: WorkflowContext, _input| {
//!     Box::pin(async move {
//!         let name: String = ctx
//!             .execute_activity(ActivityOptions::new("fetch-name"), &[])
//!             .result()
//!             .await?;
//!         let payloads = DataConverter::default()
//!             .to_payloads(&[serde_json::json!(format!("Hello {name}")).into()])?;
//!         Ok(Some(payloads))
//!     })
//! });
//!
//! let worker = WorkflowWorker::new(service, registry, WorkflowWorkerConfig::new("default", "greetings"));
//! while worker.poll_and_process_once().await? {}
//! ```

pub mod activity;
pub mod error;
pub mod worker;
pub mod workflow;

// Re-export the core layers SDK users interact with.
pub use cascade_core::api;
pub use cascade_core::client::{
    FailureCodecInterceptor, PayloadCodecInterceptor, WorkflowService,
};
pub use cascade_core::converter::{
    DataConverter, EncodedValues, FailureConverter, FailureConverterOptions, PayloadCodec,
    PayloadValue, ZlibCodec, ZlibCodecOptions,
};
pub use cascade_core::options::RetryPolicy;

pub use activity::{ActivityCompletionClient, ActivityContext, ActivityInfo};
pub use error::{
    is_retryable, ActivityError, ApplicationError, ApplicationErrorOptions, CanceledError,
    CascadeError, ChildWorkflowExecutionError, ContinueAsNewError, ErrorDetails, HandlerError,
    NonDeterministicError, PanicError, ServerError, TerminatedError, TimeoutError,
    UnknownExternalWorkflowExecutionError, WorkerError,
};
pub use worker::{
    WorkflowExecutionResult, WorkflowFunction, WorkflowOutcome, WorkflowRegistry,
    WorkflowTaskResult, WorkflowWorker, WorkflowWorkerConfig,
};
pub use workflow::{
    ActivityOptions, CancelHandle, Channel, ChildWorkflowOptions, ContextPropagator,
    ContinueAsNewOptions, KeysPropagator, Selector, WorkflowContext, WorkflowFuture, WorkflowInfo,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::activity::{ActivityCompletionClient, ActivityContext, ActivityInfo};
    pub use crate::error::{
        is_retryable, ActivityError, ApplicationError, ApplicationErrorOptions, CanceledError,
        CascadeError, ContinueAsNewError, PanicError, TimeoutError, WorkerError,
    };
    pub use crate::worker::{
        WorkflowExecutionResult, WorkflowOutcome, WorkflowRegistry, WorkflowWorker,
        WorkflowWorkerConfig,
    };
    pub use crate::workflow::{
        ActivityOptions, CancelHandle, Channel, ChildWorkflowOptions, ContextPropagator,
        ContinueAsNewOptions, KeysPropagator, Selector, WorkflowContext, WorkflowFuture,
        WorkflowInfo,
    };
    pub use cascade_core::converter::{DataConverter, FailureConverter, PayloadValue};
    pub use cascade_core::options::RetryPolicy;
    pub use futures::future::BoxFuture;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Value};
    pub use std::sync::Arc;
}
