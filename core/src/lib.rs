//! # Cascade core
//!
//! Wire types, conversion pipelines and client plumbing shared by every
//! layer of the Cascade Rust SDK:
//!
//! - [`api`] — the service's message shapes (payloads, failures, history
//!   events, commands, RPC requests/responses)
//! - [`converter`] — payload converters, payload codecs and the failure
//!   converter
//! - [`error`] — the closed error taxonomy and retryability rules
//! - [`client`] — the typed `WorkflowService` surface and the codec
//!   interceptors wrapping it
//!
//! The deterministic workflow runtime lives in the `cascade-sdk` crate on
//! top of this one.

pub mod api;
pub mod client;
pub mod converter;
pub mod error;
pub mod options;

pub use client::{FailureCodecInterceptor, PayloadCodecInterceptor, WorkflowService};
pub use converter::{
    ConverterError, DataConverter, EncodedValues, FailureConverter, FailureConverterOptions,
    PayloadCodec, PayloadValue, ZlibCodec, ZlibCodecOptions,
};
pub use error::{
    is_retryable, ActivityError, ApplicationError, ApplicationErrorOptions, CanceledError,
    CascadeError, ChildWorkflowExecutionError, ContinueAsNewError, ErrorDetails, HandlerError,
    NonDeterministicError, PanicError, ServerError, TerminatedError, TimeoutError,
    UnknownExternalWorkflowExecutionError,
};
pub use options::RetryPolicy;
