//! Error types for the Cascade SDK.

// The taxonomy lives in cascade-core; re-export it for SDK users.
pub use cascade_core::error::{
    is_retryable, ActivityError, ApplicationError, ApplicationErrorOptions, CanceledError,
    CascadeError, ChildWorkflowExecutionError, ContinueAsNewError, ErrorDetails, HandlerError,
    NonDeterministicError, PanicError, ServerError, TerminatedError, TimeoutError,
    UnknownExternalWorkflowExecutionError,
};
pub use cascade_core::converter::ConverterError;

/// Infrastructure errors raised by workers and clients, as opposed to the
/// workflow failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// gRPC communication error
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// Payload or failure conversion error
    #[error("conversion error: {0}")]
    Converter(#[from] ConverterError),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No implementation registered under the requested workflow type
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    /// No implementation registered under the requested activity type
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    /// The poll response was structurally unusable
    #[error("malformed task: {0}")]
    MalformedTask(String),

    /// Invalid worker configuration
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for worker operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Conversion failures observed inside workflow code surface as
/// non-retryable application errors; retrying cannot fix a bad payload.
pub fn converter_error(err: ConverterError) -> CascadeError {
    CascadeError::Application(ApplicationError::new(
        err.to_string(),
        "ConverterError",
        true,
    ))
}
