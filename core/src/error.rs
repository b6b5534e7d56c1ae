//! The closed error taxonomy.
//!
//! Every kind here maps to exactly one `failure_info` variant on the wire
//! (see `converter::FailureConverter`). The `Display` strings of
//! [`ApplicationError`] and [`TimeoutError`] are part of the SDK contract;
//! tests depend on their exact form.

use crate::api::common::{ActivityType, Header, Payloads};
use crate::api::enums::{
    ApplicationErrorCategory, HandlerErrorRetryBehavior, RetryState, TimeoutType,
};
use crate::api::failure::Failure;
use crate::converter::{ConverterError, DataConverter, EncodedValues, PayloadValue};
use crate::options::RetryPolicy;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// Detail values attached to an error. Locally-constructed errors hold the
/// raw values; errors decoded from the wire hold encoded payloads.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ErrorDetails {
    #[default]
    Missing,
    Values(Vec<PayloadValue>),
    Encoded(EncodedValues),
}

impl ErrorDetails {
    pub fn has_values(&self) -> bool {
        match self {
            ErrorDetails::Missing => false,
            ErrorDetails::Values(values) => !values.is_empty(),
            ErrorDetails::Encoded(encoded) => encoded.has_values(),
        }
    }

    /// Decode the detail at `index`.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, ConverterError> {
        match self {
            ErrorDetails::Missing => Err(ConverterError::NoData),
            ErrorDetails::Values(values) => {
                if values.is_empty() {
                    return Err(ConverterError::NoData);
                }
                values
                    .get(index)
                    .ok_or(ConverterError::SizeMismatch {
                        requested: index + 1,
                        actual: values.len(),
                    })?
                    .clone()
                    .into_typed()
            }
            ErrorDetails::Encoded(encoded) => encoded.get(index),
        }
    }

    /// The wire form, encoding raw values with `converter` when needed.
    pub fn to_payloads(
        &self,
        converter: &DataConverter,
    ) -> Result<Option<Payloads>, ConverterError> {
        match self {
            ErrorDetails::Missing => Ok(None),
            ErrorDetails::Values(values) => Ok(Some(converter.to_payloads(values)?)),
            ErrorDetails::Encoded(encoded) => Ok(encoded.payloads().cloned()),
        }
    }
}

// ============================================================================
// Error kinds
// ============================================================================

/// Failure raised by user code, and the catch-all for error kinds with no
/// dedicated wire variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationError {
    pub(crate) message: String,
    pub(crate) error_type: String,
    pub(crate) non_retryable: bool,
    pub(crate) category: ApplicationErrorCategory,
    pub(crate) details: ErrorDetails,
    pub(crate) cause: Option<Box<CascadeError>>,
    pub(crate) original_failure: Option<Failure>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationErrorOptions {
    pub non_retryable: bool,
    pub cause: Option<CascadeError>,
    pub details: Vec<PayloadValue>,
    pub category: ApplicationErrorCategory,
}

impl ApplicationError {
    pub fn new(
        message: impl Into<String>,
        error_type: impl Into<String>,
        non_retryable: bool,
    ) -> Self {
        Self::with_options(
            message,
            error_type,
            ApplicationErrorOptions {
                non_retryable,
                ..Default::default()
            },
        )
    }

    pub fn with_options(
        message: impl Into<String>,
        error_type: impl Into<String>,
        options: ApplicationErrorOptions,
    ) -> Self {
        let details = if options.details.is_empty() {
            ErrorDetails::Missing
        } else {
            ErrorDetails::Values(options.details)
        };
        Self {
            message: message.into(),
            error_type: error_type.into(),
            non_retryable: options.non_retryable,
            category: options.category,
            details,
            cause: options.cause.map(Box::new),
            original_failure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    pub fn non_retryable(&self) -> bool {
        self.non_retryable
    }

    pub fn category(&self) -> ApplicationErrorCategory {
        self.category
    }

    pub fn has_details(&self) -> bool {
        self.details.has_values()
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn cause(&self) -> Option<&CascadeError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_type.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(
                f,
                "{} (type: {}, retryable: {})",
                self.message, self.error_type, !self.non_retryable
            )?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// Cancellation, optionally carrying detail values.
#[derive(Debug, Clone, PartialEq)]
pub struct CanceledError {
    pub(crate) details: ErrorDetails,
    pub(crate) original_failure: Option<Failure>,
}

impl CanceledError {
    pub fn new() -> Self {
        Self {
            details: ErrorDetails::Missing,
            original_failure: None,
        }
    }

    pub fn with_details(details: Vec<PayloadValue>) -> Self {
        Self {
            details: if details.is_empty() {
                ErrorDetails::Missing
            } else {
                ErrorDetails::Values(details)
            },
            original_failure: None,
        }
    }

    /// Cancellation carrying already-encoded details, as delivered by
    /// cancellation history events.
    pub fn with_encoded_details(details: EncodedValues) -> Self {
        Self {
            details: ErrorDetails::Encoded(details),
            original_failure: None,
        }
    }

    pub fn has_details(&self) -> bool {
        self.details.has_values()
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }
}

impl Default for CanceledError {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CanceledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canceled")
    }
}

/// A timeout, with the timeout kind and (for heartbeat timeouts) the details
/// from the last recorded heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutError {
    pub(crate) message: String,
    pub(crate) timeout_type: TimeoutType,
    pub(crate) last_heartbeat_details: ErrorDetails,
    pub(crate) cause: Option<Box<CascadeError>>,
    pub(crate) original_failure: Option<Failure>,
}

impl TimeoutError {
    pub fn new(
        message: impl Into<String>,
        timeout_type: TimeoutType,
        cause: Option<CascadeError>,
    ) -> Self {
        Self {
            message: message.into(),
            timeout_type,
            last_heartbeat_details: ErrorDetails::Missing,
            cause: cause.map(Box::new),
            original_failure: None,
        }
    }

    /// Heartbeat timeout carrying the details of the last heartbeat.
    pub fn heartbeat(details: Vec<PayloadValue>) -> Self {
        Self {
            message: "heartbeat timeout".to_string(),
            timeout_type: TimeoutType::Heartbeat,
            last_heartbeat_details: if details.is_empty() {
                ErrorDetails::Missing
            } else {
                ErrorDetails::Values(details)
            },
            cause: None,
            original_failure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timeout_type(&self) -> TimeoutType {
        self.timeout_type
    }

    pub fn has_last_heartbeat_details(&self) -> bool {
        self.last_heartbeat_details.has_values()
    }

    pub fn last_heartbeat_details(&self) -> &ErrorDetails {
        &self.last_heartbeat_details
    }

    pub fn cause(&self) -> Option<&CascadeError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (type: {})",
            self.message,
            self.timeout_type.display_name()
        )?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// The execution was terminated from outside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TerminatedError {
    pub(crate) original_failure: Option<Failure>,
}

impl TerminatedError {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for TerminatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminated")
    }
}

/// A panic captured from user code. Workflow-originated panics are never
/// retryable.
#[derive(Debug, Clone, PartialEq)]
pub struct PanicError {
    pub(crate) message: String,
    pub(crate) stack_trace: String,
    pub(crate) workflow_panic: bool,
    pub(crate) original_failure: Option<Failure>,
}

impl PanicError {
    pub fn new(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: stack_trace.into(),
            workflow_panic: false,
            original_failure: None,
        }
    }

    /// A panic originating from workflow code; fails the workflow task and
    /// is never retried.
    pub fn workflow(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self {
            workflow_panic: true,
            ..Self::new(message, stack_trace)
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    pub fn is_workflow_panic(&self) -> bool {
        self.workflow_panic
    }
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Failure originating inside the service rather than user code.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    pub(crate) message: String,
    pub(crate) non_retryable: bool,
    pub(crate) cause: Option<Box<CascadeError>>,
    pub(crate) original_failure: Option<Failure>,
}

impl ServerError {
    pub fn new(
        message: impl Into<String>,
        non_retryable: bool,
        cause: Option<CascadeError>,
    ) -> Self {
        Self {
            message: message.into(),
            non_retryable,
            cause: cause.map(Box::new),
            original_failure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn non_retryable(&self) -> bool {
        self.non_retryable
    }

    pub fn cause(&self) -> Option<&CascadeError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// Wraps the cause of a failed activity with the identifying context of the
/// activity that raised it. Unwrapping yields the cause.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityError {
    pub(crate) scheduled_event_id: i64,
    pub(crate) started_event_id: i64,
    pub(crate) identity: String,
    pub(crate) activity_type: Option<ActivityType>,
    pub(crate) activity_id: String,
    pub(crate) retry_state: RetryState,
    pub(crate) cause: Option<Box<CascadeError>>,
    pub(crate) original_failure: Option<Failure>,
}

impl ActivityError {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scheduled_event_id: i64,
        started_event_id: i64,
        identity: impl Into<String>,
        activity_type: Option<ActivityType>,
        activity_id: impl Into<String>,
        retry_state: RetryState,
        cause: Option<CascadeError>,
    ) -> Self {
        Self {
            scheduled_event_id,
            started_event_id,
            identity: identity.into(),
            activity_type,
            activity_id: activity_id.into(),
            retry_state,
            cause: cause.map(Box::new),
            original_failure: None,
        }
    }

    pub fn scheduled_event_id(&self) -> i64 {
        self.scheduled_event_id
    }

    pub fn started_event_id(&self) -> i64 {
        self.started_event_id
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn activity_type(&self) -> Option<&ActivityType> {
        self.activity_type.as_ref()
    }

    pub fn activity_id(&self) -> &str {
        &self.activity_id
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry_state
    }

    pub fn cause(&self) -> Option<&CascadeError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ActivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "activity error (type: {}, scheduledEventID: {}, startedEventID: {}, identity: {})",
            self.activity_type
                .as_ref()
                .map(|t| t.name.as_str())
                .unwrap_or(""),
            self.scheduled_event_id,
            self.started_event_id,
            self.identity
        )?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// Wraps the cause of a failed child workflow with the identifying context
/// of the child.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildWorkflowExecutionError {
    pub(crate) namespace: String,
    pub(crate) workflow_id: String,
    pub(crate) run_id: String,
    pub(crate) workflow_type: String,
    pub(crate) initiated_event_id: i64,
    pub(crate) started_event_id: i64,
    pub(crate) retry_state: RetryState,
    pub(crate) cause: Option<Box<CascadeError>>,
    pub(crate) original_failure: Option<Failure>,
}

impl ChildWorkflowExecutionError {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        namespace: impl Into<String>,
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
        workflow_type: impl Into<String>,
        initiated_event_id: i64,
        started_event_id: i64,
        retry_state: RetryState,
        cause: Option<CascadeError>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
            workflow_type: workflow_type.into(),
            initiated_event_id,
            started_event_id,
            retry_state,
            cause: cause.map(Box::new),
            original_failure: None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn workflow_type(&self) -> &str {
        &self.workflow_type
    }

    pub fn initiated_event_id(&self) -> i64 {
        self.initiated_event_id
    }

    pub fn started_event_id(&self) -> i64 {
        self.started_event_id
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry_state
    }

    pub fn cause(&self) -> Option<&CascadeError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ChildWorkflowExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "child workflow execution error (type: {}, workflowID: {}, runID: {}, initiatedEventID: {}, startedEventID: {})",
            self.workflow_type,
            self.workflow_id,
            self.run_id,
            self.initiated_event_id,
            self.started_event_id
        )?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// Failure raised by an RPC handler. Retryability derives from the handler's
/// declared retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError {
    pub(crate) handler_type: String,
    pub(crate) retry_behavior: HandlerErrorRetryBehavior,
    pub(crate) cause: Option<Box<CascadeError>>,
    pub(crate) original_failure: Option<Failure>,
}

impl HandlerError {
    pub fn new(
        handler_type: impl Into<String>,
        retry_behavior: HandlerErrorRetryBehavior,
        cause: Option<CascadeError>,
    ) -> Self {
        Self {
            handler_type: handler_type.into(),
            retry_behavior,
            cause: cause.map(Box::new),
            original_failure: None,
        }
    }

    pub fn handler_type(&self) -> &str {
        &self.handler_type
    }

    pub fn retry_behavior(&self) -> HandlerErrorRetryBehavior {
        self.retry_behavior
    }

    pub fn cause(&self) -> Option<&CascadeError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler error ({})", self.handler_type)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// Typed resolution for a signal or cancel aimed at a workflow that does not
/// exist.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownExternalWorkflowExecutionError;

impl fmt::Display for UnknownExternalWorkflowExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown external workflow execution")
    }
}

/// Sentinel returned from workflow code to finish the current run and start
/// a fresh one. Input payloads are already encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinueAsNewError {
    pub workflow_type: String,
    pub input: Payloads,
    pub header: Option<Header>,
    pub task_queue: Option<String>,
    pub retry_policy: Option<RetryPolicy>,
    pub workflow_run_timeout: Option<Duration>,
    pub workflow_task_timeout: Option<Duration>,
}

impl fmt::Display for ContinueAsNewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "continue as new")
    }
}

/// Replay diverged from recorded history. Fatal for the workflow task and
/// never retryable.
#[derive(Debug, Clone, PartialEq)]
pub struct NonDeterministicError {
    pub(crate) message: String,
}

impl NonDeterministicError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NonDeterministicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ============================================================================
// The taxonomy
// ============================================================================

/// Any error the runtime can produce or round-trip through the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeError {
    Application(ApplicationError),
    Canceled(CanceledError),
    Timeout(TimeoutError),
    Terminated(TerminatedError),
    Panic(PanicError),
    Server(ServerError),
    Activity(ActivityError),
    ChildWorkflowExecution(ChildWorkflowExecutionError),
    Handler(HandlerError),
    UnknownExternalWorkflowExecution(UnknownExternalWorkflowExecutionError),
    ContinueAsNew(ContinueAsNewError),
    NonDeterministic(NonDeterministicError),
}

impl CascadeError {
    /// Wrap a plain error message the way untyped user errors are wrapped:
    /// an application error with no type.
    pub fn from_message(message: impl Into<String>) -> Self {
        CascadeError::Application(ApplicationError::new(message, "", false))
    }

    /// The message that goes in the wire `Failure.message` field.
    pub fn message(&self) -> String {
        match self {
            CascadeError::Application(e) => e.message.clone(),
            CascadeError::Canceled(_) => "canceled".to_string(),
            CascadeError::Timeout(e) => e.message.clone(),
            CascadeError::Terminated(_) => "terminated".to_string(),
            CascadeError::Panic(e) => e.message.clone(),
            CascadeError::Server(e) => e.message.clone(),
            CascadeError::Activity(_) => "activity error".to_string(),
            CascadeError::ChildWorkflowExecution(_) => {
                "child workflow execution error".to_string()
            }
            CascadeError::Handler(e) => e.to_string(),
            CascadeError::UnknownExternalWorkflowExecution(e) => e.to_string(),
            CascadeError::ContinueAsNew(e) => e.to_string(),
            CascadeError::NonDeterministic(e) => e.message.clone(),
        }
    }

    /// The next error in the cause chain, if any.
    pub fn cause(&self) -> Option<&CascadeError> {
        match self {
            CascadeError::Application(e) => e.cause.as_deref(),
            CascadeError::Timeout(e) => e.cause.as_deref(),
            CascadeError::Server(e) => e.cause.as_deref(),
            CascadeError::Activity(e) => e.cause.as_deref(),
            CascadeError::ChildWorkflowExecution(e) => e.cause.as_deref(),
            CascadeError::Handler(e) => e.cause.as_deref(),
            _ => None,
        }
    }

    /// The wire failure this error was decoded from, if it came off the wire.
    pub fn original_failure(&self) -> Option<&Failure> {
        match self {
            CascadeError::Application(e) => e.original_failure.as_ref(),
            CascadeError::Canceled(e) => e.original_failure.as_ref(),
            CascadeError::Timeout(e) => e.original_failure.as_ref(),
            CascadeError::Terminated(e) => e.original_failure.as_ref(),
            CascadeError::Panic(e) => e.original_failure.as_ref(),
            CascadeError::Server(e) => e.original_failure.as_ref(),
            CascadeError::Activity(e) => e.original_failure.as_ref(),
            CascadeError::ChildWorkflowExecution(e) => e.original_failure.as_ref(),
            CascadeError::Handler(e) => e.original_failure.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn set_original_failure(&mut self, failure: Failure) {
        match self {
            CascadeError::Application(e) => e.original_failure = Some(failure),
            CascadeError::Canceled(e) => e.original_failure = Some(failure),
            CascadeError::Timeout(e) => e.original_failure = Some(failure),
            CascadeError::Terminated(e) => e.original_failure = Some(failure),
            CascadeError::Panic(e) => e.original_failure = Some(failure),
            CascadeError::Server(e) => e.original_failure = Some(failure),
            CascadeError::Activity(e) => e.original_failure = Some(failure),
            CascadeError::ChildWorkflowExecution(e) => e.original_failure = Some(failure),
            CascadeError::Handler(e) => e.original_failure = Some(failure),
            _ => {}
        }
    }

    /// Whether this error or anything in its cause chain is a cancellation.
    pub fn is_canceled(&self) -> bool {
        let mut current = Some(self);
        while let Some(err) = current {
            if matches!(err, CascadeError::Canceled(_)) {
                return true;
            }
            current = err.cause();
        }
        false
    }

    pub fn as_application(&self) -> Option<&ApplicationError> {
        match self {
            CascadeError::Application(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_timeout(&self) -> Option<&TimeoutError> {
        match self {
            CascadeError::Timeout(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_activity(&self) -> Option<&ActivityError> {
        match self {
            CascadeError::Activity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_continue_as_new(&self) -> Option<&ContinueAsNewError> {
        match self {
            CascadeError::ContinueAsNew(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for CascadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeError::Application(e) => e.fmt(f),
            CascadeError::Canceled(e) => e.fmt(f),
            CascadeError::Timeout(e) => e.fmt(f),
            CascadeError::Terminated(e) => e.fmt(f),
            CascadeError::Panic(e) => e.fmt(f),
            CascadeError::Server(e) => e.fmt(f),
            CascadeError::Activity(e) => e.fmt(f),
            CascadeError::ChildWorkflowExecution(e) => e.fmt(f),
            CascadeError::Handler(e) => e.fmt(f),
            CascadeError::UnknownExternalWorkflowExecution(e) => e.fmt(f),
            CascadeError::ContinueAsNew(e) => e.fmt(f),
            CascadeError::NonDeterministic(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CascadeError {}

impl From<ApplicationError> for CascadeError {
    fn from(e: ApplicationError) -> Self {
        CascadeError::Application(e)
    }
}

impl From<CanceledError> for CascadeError {
    fn from(e: CanceledError) -> Self {
        CascadeError::Canceled(e)
    }
}

impl From<TimeoutError> for CascadeError {
    fn from(e: TimeoutError) -> Self {
        CascadeError::Timeout(e)
    }
}

impl From<ContinueAsNewError> for CascadeError {
    fn from(e: ContinueAsNewError) -> Self {
        CascadeError::ContinueAsNew(e)
    }
}

/// Whether the service should retry the operation that raised `err`.
///
/// Terminations, cancellations and workflow panics never retry. Application
/// errors retry unless flagged non-retryable or their type appears in
/// `non_retryable_types`. Timeouts retry only for start-to-close and
/// heartbeat kinds. Server and handler errors follow their own flags.
pub fn is_retryable(err: &CascadeError, non_retryable_types: &[String]) -> bool {
    match err {
        CascadeError::Terminated(_) | CascadeError::Canceled(_) => false,
        CascadeError::Panic(e) => !e.workflow_panic,
        CascadeError::Timeout(e) => matches!(
            e.timeout_type,
            TimeoutType::StartToClose | TimeoutType::Heartbeat
        ),
        CascadeError::Application(e) => {
            if e.non_retryable {
                return false;
            }
            !non_retryable_types.iter().any(|t| t == &e.error_type)
        }
        CascadeError::Server(e) => !e.non_retryable,
        CascadeError::Handler(e) => e.retry_behavior != HandlerErrorRetryBehavior::NonRetryable,
        CascadeError::NonDeterministic(_) => false,
        CascadeError::ContinueAsNew(_) => false,
        _ => true,
    }
}
