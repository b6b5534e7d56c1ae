//! Error taxonomy ⇄ wire `Failure` conversion.

use crate::api::enums::{
    ApplicationErrorCategory, HandlerErrorRetryBehavior, RetryState, TimeoutType,
};
use crate::api::failure::{
    failure::FailureInfo, ActivityFailureInfo, ApplicationFailureInfo, CanceledFailureInfo,
    ChildWorkflowExecutionFailureInfo, Failure, HandlerFailureInfo, ServerFailureInfo,
    TerminatedFailureInfo, TimeoutFailureInfo,
};
use crate::converter::{ConverterError, DataConverter, EncodedValues};
use crate::error::{
    ActivityError, ApplicationError, CanceledError, CascadeError, ChildWorkflowExecutionError,
    ErrorDetails, HandlerError, PanicError, ServerError, TerminatedError, TimeoutError,
};
use serde::{Deserialize, Serialize};

/// Sentinel message on failures whose true message and stack trace live in
/// `encoded_attributes`.
pub const ENCODED_FAILURE_MESSAGE: &str = "Encoded failure";

/// Identifies failures produced by this SDK.
const FAILURE_SOURCE: &str = "RustSDK";

/// Self-referential or absurdly deep cause chains stop here.
const MAX_CAUSE_DEPTH: usize = 32;

/// The attributes moved into an encoded payload under
/// encode-common-attributes mode.
#[derive(Debug, Serialize, Deserialize)]
struct EncodedFailureAttributes {
    message: String,
    stack_trace: String,
}

#[derive(Debug, Clone, Default)]
pub struct FailureConverterOptions {
    pub data_converter: DataConverter,
    /// Replace `message`/`stack_trace` with a sentinel and carry the true
    /// values in an encoded payload, so codecs (e.g. encryption) cover them.
    pub encode_common_attributes: bool,
}

/// Maps the closed error taxonomy onto the recursive wire failure and back.
#[derive(Debug, Clone, Default)]
pub struct FailureConverter {
    data_converter: DataConverter,
    encode_common_attributes: bool,
}

impl FailureConverter {
    pub fn new(options: FailureConverterOptions) -> Self {
        Self {
            data_converter: options.data_converter,
            encode_common_attributes: options.encode_common_attributes,
        }
    }

    pub fn data_converter(&self) -> &DataConverter {
        &self.data_converter
    }

    /// Render an error as its wire failure, walking the cause chain.
    ///
    /// An error that was itself decoded from a failure re-emits that
    /// original unchanged; later mutations to the typed fields are
    /// deliberately ignored so foreign-SDK failures survive a round trip.
    pub fn error_to_failure(&self, error: &CascadeError) -> Failure {
        let mut failure = self.convert_error(error, 0);
        if self.encode_common_attributes {
            if let Err(e) = encode_common_failure_attributes(&self.data_converter, &mut failure) {
                tracing::warn!(error = %e, "failed to encode common failure attributes");
            }
        }
        failure
    }

    fn convert_error(&self, error: &CascadeError, depth: usize) -> Failure {
        if let Some(original) = error.original_failure() {
            return original.clone();
        }

        let cause = if depth < MAX_CAUSE_DEPTH {
            error
                .cause()
                .map(|c| Box::new(self.convert_error(c, depth + 1)))
        } else {
            None
        };

        let (failure_info, stack_trace) = match error {
            CascadeError::Application(e) => (
                FailureInfo::ApplicationFailureInfo(ApplicationFailureInfo {
                    r#type: e.error_type.clone(),
                    non_retryable: e.non_retryable,
                    details: self.encode_details(&e.details),
                    category: e.category as i32,
                }),
                String::new(),
            ),
            CascadeError::Canceled(e) => (
                FailureInfo::CanceledFailureInfo(CanceledFailureInfo {
                    details: self.encode_details(&e.details),
                }),
                String::new(),
            ),
            CascadeError::Timeout(e) => (
                FailureInfo::TimeoutFailureInfo(TimeoutFailureInfo {
                    timeout_type: e.timeout_type as i32,
                    last_heartbeat_details: self.encode_details(&e.last_heartbeat_details),
                }),
                String::new(),
            ),
            CascadeError::Terminated(_) => (
                FailureInfo::TerminatedFailureInfo(TerminatedFailureInfo {}),
                String::new(),
            ),
            CascadeError::Panic(e) => (
                FailureInfo::ApplicationFailureInfo(ApplicationFailureInfo {
                    r#type: "PanicError".to_string(),
                    non_retryable: e.workflow_panic,
                    details: None,
                    category: ApplicationErrorCategory::Unspecified as i32,
                }),
                e.stack_trace.clone(),
            ),
            CascadeError::Server(e) => (
                FailureInfo::ServerFailureInfo(ServerFailureInfo {
                    non_retryable: e.non_retryable,
                }),
                String::new(),
            ),
            CascadeError::Activity(e) => (
                FailureInfo::ActivityFailureInfo(ActivityFailureInfo {
                    scheduled_event_id: e.scheduled_event_id,
                    started_event_id: e.started_event_id,
                    identity: e.identity.clone(),
                    activity_type: e.activity_type.clone(),
                    activity_id: e.activity_id.clone(),
                    retry_state: e.retry_state as i32,
                }),
                String::new(),
            ),
            CascadeError::ChildWorkflowExecution(e) => (
                FailureInfo::ChildWorkflowExecutionFailureInfo(
                    ChildWorkflowExecutionFailureInfo {
                        namespace: e.namespace.clone(),
                        workflow_execution: Some(crate::api::common::WorkflowExecution {
                            workflow_id: e.workflow_id.clone(),
                            run_id: e.run_id.clone(),
                        }),
                        workflow_type: Some(crate::api::common::WorkflowType {
                            name: e.workflow_type.clone(),
                        }),
                        initiated_event_id: e.initiated_event_id,
                        started_event_id: e.started_event_id,
                        retry_state: e.retry_state as i32,
                    },
                ),
                String::new(),
            ),
            CascadeError::Handler(e) => (
                FailureInfo::HandlerFailureInfo(HandlerFailureInfo {
                    r#type: e.handler_type.clone(),
                    retry_behavior: e.retry_behavior as i32,
                }),
                String::new(),
            ),
            // Kinds without a dedicated wire variant fall back to an
            // application failure carrying the kind name as the type.
            CascadeError::UnknownExternalWorkflowExecution(_) => (
                FailureInfo::ApplicationFailureInfo(ApplicationFailureInfo {
                    r#type: "UnknownExternalWorkflowExecutionError".to_string(),
                    non_retryable: false,
                    details: None,
                    category: ApplicationErrorCategory::Unspecified as i32,
                }),
                String::new(),
            ),
            CascadeError::ContinueAsNew(_) => (
                FailureInfo::ApplicationFailureInfo(ApplicationFailureInfo {
                    r#type: "ContinueAsNewError".to_string(),
                    non_retryable: false,
                    details: None,
                    category: ApplicationErrorCategory::Unspecified as i32,
                }),
                String::new(),
            ),
            CascadeError::NonDeterministic(_) => (
                FailureInfo::ApplicationFailureInfo(ApplicationFailureInfo {
                    r#type: "NonDeterministicError".to_string(),
                    non_retryable: true,
                    details: None,
                    category: ApplicationErrorCategory::Unspecified as i32,
                }),
                String::new(),
            ),
        };

        Failure {
            message: error.message(),
            source: FAILURE_SOURCE.to_string(),
            stack_trace,
            encoded_attributes: None,
            cause,
            failure_info: Some(failure_info),
        }
    }

    fn encode_details(&self, details: &ErrorDetails) -> Option<crate::api::common::Payloads> {
        match details.to_payloads(&self.data_converter) {
            Ok(payloads) => payloads,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode error details");
                None
            }
        }
    }

    /// Rebuild the typed error from a wire failure. The inverse of
    /// [`FailureConverter::error_to_failure`].
    pub fn failure_to_error(&self, failure: &Failure) -> CascadeError {
        self.convert_failure(failure, 0)
    }

    fn convert_failure(&self, failure: &Failure, depth: usize) -> CascadeError {
        // Keep the untouched wire form as a sidecar so re-serialization is
        // lossless, then restore display attributes locally.
        let original = failure.clone();
        let (message, stack_trace) = self.decoded_attributes(failure);

        let cause = if depth < MAX_CAUSE_DEPTH {
            failure
                .cause
                .as_deref()
                .map(|c| self.convert_failure(c, depth + 1))
        } else {
            None
        };

        let mut error = match &failure.failure_info {
            Some(FailureInfo::ApplicationFailureInfo(info)) => {
                if info.r#type == "PanicError" {
                    CascadeError::Panic(PanicError {
                        message,
                        stack_trace,
                        workflow_panic: info.non_retryable,
                        original_failure: None,
                    })
                } else {
                    CascadeError::Application(ApplicationError {
                        message,
                        error_type: info.r#type.clone(),
                        non_retryable: info.non_retryable,
                        category: ApplicationErrorCategory::try_from(info.category)
                            .unwrap_or_default(),
                        details: self.decode_details(info.details.as_ref()),
                        cause: cause.map(Box::new),
                        original_failure: None,
                    })
                }
            }
            Some(FailureInfo::TimeoutFailureInfo(info)) => CascadeError::Timeout(TimeoutError {
                message,
                timeout_type: TimeoutType::try_from(info.timeout_type)
                    .unwrap_or(TimeoutType::Unspecified),
                last_heartbeat_details: self.decode_details(info.last_heartbeat_details.as_ref()),
                cause: cause.map(Box::new),
                original_failure: None,
            }),
            Some(FailureInfo::CanceledFailureInfo(info)) => CascadeError::Canceled(CanceledError {
                details: self.decode_details(info.details.as_ref()),
                original_failure: None,
            }),
            Some(FailureInfo::TerminatedFailureInfo(_)) => {
                CascadeError::Terminated(TerminatedError {
                    original_failure: None,
                })
            }
            Some(FailureInfo::ServerFailureInfo(info)) => CascadeError::Server(ServerError {
                message,
                non_retryable: info.non_retryable,
                cause: cause.map(Box::new),
                original_failure: None,
            }),
            Some(FailureInfo::ActivityFailureInfo(info)) => CascadeError::Activity(ActivityError {
                scheduled_event_id: info.scheduled_event_id,
                started_event_id: info.started_event_id,
                identity: info.identity.clone(),
                activity_type: info.activity_type.clone(),
                activity_id: info.activity_id.clone(),
                retry_state: RetryState::try_from(info.retry_state)
                    .unwrap_or(RetryState::Unspecified),
                cause: cause.map(Box::new),
                original_failure: None,
            }),
            Some(FailureInfo::ChildWorkflowExecutionFailureInfo(info)) => {
                let execution = info.workflow_execution.clone().unwrap_or_default();
                CascadeError::ChildWorkflowExecution(ChildWorkflowExecutionError {
                    namespace: info.namespace.clone(),
                    workflow_id: execution.workflow_id,
                    run_id: execution.run_id,
                    workflow_type: info
                        .workflow_type
                        .as_ref()
                        .map(|t| t.name.clone())
                        .unwrap_or_default(),
                    initiated_event_id: info.initiated_event_id,
                    started_event_id: info.started_event_id,
                    retry_state: RetryState::try_from(info.retry_state)
                        .unwrap_or(RetryState::Unspecified),
                    cause: cause.map(Box::new),
                    original_failure: None,
                })
            }
            Some(FailureInfo::HandlerFailureInfo(info)) => CascadeError::Handler(HandlerError {
                handler_type: info.r#type.clone(),
                retry_behavior: HandlerErrorRetryBehavior::try_from(info.retry_behavior)
                    .unwrap_or(HandlerErrorRetryBehavior::Unspecified),
                cause: cause.map(Box::new),
                original_failure: None,
            }),
            // No info at all; the best rendering is an untyped application
            // error so the message is not lost.
            None => CascadeError::Application(ApplicationError {
                message,
                error_type: String::new(),
                non_retryable: false,
                category: ApplicationErrorCategory::Unspecified,
                details: ErrorDetails::Missing,
                cause: cause.map(Box::new),
                original_failure: None,
            }),
        };
        error.set_original_failure(original);
        error
    }

    /// The display message and stack trace, decoding `encoded_attributes`
    /// when present.
    fn decoded_attributes(&self, failure: &Failure) -> (String, String) {
        if let Some(encoded) = &failure.encoded_attributes {
            match self
                .data_converter
                .from_payload::<EncodedFailureAttributes>(encoded)
            {
                Ok(attrs) => return (attrs.message, attrs.stack_trace),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to decode common failure attributes");
                }
            }
        }
        (failure.message.clone(), failure.stack_trace.clone())
    }

    fn decode_details(&self, payloads: Option<&crate::api::common::Payloads>) -> ErrorDetails {
        match payloads {
            Some(p) => ErrorDetails::Encoded(EncodedValues::from_payloads(
                Some(p.clone()),
                self.data_converter.clone(),
            )),
            None => ErrorDetails::Missing,
        }
    }
}

/// Move `message` and `stack_trace` into an encoded payload, recursively
/// through the cause chain. Idempotent on already-encoded failures.
pub fn encode_common_failure_attributes(
    converter: &DataConverter,
    failure: &mut Failure,
) -> Result<(), ConverterError> {
    let mut depth = 0;
    let mut current = failure;
    loop {
        if current.encoded_attributes.is_none() {
            let attributes = EncodedFailureAttributes {
                message: std::mem::replace(
                    &mut current.message,
                    ENCODED_FAILURE_MESSAGE.to_string(),
                ),
                stack_trace: std::mem::take(&mut current.stack_trace),
            };
            current.encoded_attributes = Some(converter.to_payload(&attributes)?);
        }
        match current.cause.as_deref_mut() {
            Some(cause) if depth < MAX_CAUSE_DEPTH => {
                depth += 1;
                current = cause;
            }
            _ => return Ok(()),
        }
    }
}

/// Restore `message` and `stack_trace` from the encoded payload, recursively
/// through the cause chain. The inverse of
/// [`encode_common_failure_attributes`].
pub fn decode_common_failure_attributes(
    converter: &DataConverter,
    failure: &mut Failure,
) -> Result<(), ConverterError> {
    let mut depth = 0;
    let mut current = failure;
    loop {
        if let Some(encoded) = current.encoded_attributes.take() {
            let attributes: EncodedFailureAttributes = converter.from_payload(&encoded)?;
            current.message = attributes.message;
            current.stack_trace = attributes.stack_trace;
        }
        match current.cause.as_deref_mut() {
            Some(cause) if depth < MAX_CAUSE_DEPTH => {
                depth += 1;
                current = cause;
            }
            _ => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApplicationErrorOptions;
    use serde_json::json;

    fn default_converter() -> FailureConverter {
        FailureConverter::default()
    }

    fn encoding_converter() -> FailureConverter {
        FailureConverter::new(FailureConverterOptions {
            data_converter: DataConverter::default(),
            encode_common_attributes: true,
        })
    }

    fn app_error_with_cause() -> CascadeError {
        CascadeError::Application(ApplicationError::with_options(
            "message",
            "customType",
            ApplicationErrorOptions {
                non_retryable: true,
                cause: Some(CascadeError::from_message("cause error")),
                details: vec![json!("details").into(), json!(2208).into()],
                ..Default::default()
            },
        ))
    }

    // ========================================================================
    // error_to_failure
    // ========================================================================

    #[test]
    fn test_application_error_to_failure() {
        let fc = default_converter();
        let f = fc.error_to_failure(&app_error_with_cause());

        assert_eq!(f.message, "message");
        let info = f.application_failure_info().unwrap();
        assert_eq!(info.r#type, "customType");
        assert!(info.non_retryable);
        let details = info.details.as_ref().unwrap();
        assert_eq!(details.payloads[0].data, br#""details""#);
        assert_eq!(details.payloads[1].data, b"2208");

        let cause = f.cause.as_ref().unwrap();
        assert_eq!(cause.message, "cause error");
        assert_eq!(cause.application_failure_info().unwrap().r#type, "");
        assert!(cause.cause.is_none());
    }

    #[test]
    fn test_application_failure_round_trip() {
        let fc = default_converter();
        let f = fc.error_to_failure(&app_error_with_cause());

        let err = fc.failure_to_error(&f);
        assert_eq!(
            err.to_string(),
            "message (type: customType, retryable: false): cause error"
        );
        assert_eq!(err.cause().unwrap().to_string(), "cause error");
    }

    #[test]
    fn test_benign_category_round_trip() {
        let fc = default_converter();
        let err = CascadeError::Application(ApplicationError::with_options(
            "message",
            "customType",
            ApplicationErrorOptions {
                non_retryable: true,
                category: ApplicationErrorCategory::Benign,
                ..Default::default()
            },
        ));
        let f = fc.error_to_failure(&err);
        assert_eq!(
            f.application_failure_info().unwrap().category,
            ApplicationErrorCategory::Benign as i32
        );

        let err2 = fc.failure_to_error(&f);
        assert_eq!(
            err2.as_application().unwrap().category(),
            ApplicationErrorCategory::Benign
        );
    }

    #[test]
    fn test_canceled_error_to_failure() {
        let fc = default_converter();
        let err = CascadeError::Canceled(CanceledError::with_details(vec![
            json!("details").into(),
            json!(2208).into(),
        ]));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "canceled");
        let details = f
            .canceled_failure_info()
            .unwrap()
            .details
            .as_ref()
            .unwrap();
        assert_eq!(details.payloads[0].data, br#""details""#);
        assert_eq!(details.payloads[1].data, b"2208");
        assert!(f.cause.is_none());

        let err2 = fc.failure_to_error(&f);
        assert!(matches!(err2, CascadeError::Canceled(_)));
    }

    #[test]
    fn test_panic_error_to_failure() {
        let fc = default_converter();
        let err = CascadeError::Panic(PanicError::new("panic message", "long call stack"));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "panic message");
        assert_eq!(f.stack_trace, "long call stack");
        let info = f.application_failure_info().unwrap();
        assert_eq!(info.r#type, "PanicError");
        assert!(!info.non_retryable);
        assert!(f.cause.is_none());

        let err2 = fc.failure_to_error(&f);
        match &err2 {
            CascadeError::Panic(p) => {
                assert_eq!(p.message(), "panic message");
                assert_eq!(p.stack_trace(), "long call stack");
                assert!(!p.is_workflow_panic());
            }
            other => panic!("expected PanicError, got {other:?}"),
        }

        // Workflow panics round-trip the non-retryable flag.
        let f = fc.error_to_failure(&CascadeError::Panic(PanicError::workflow(
            "panic message",
            "long call stack",
        )));
        assert!(f.application_failure_info().unwrap().non_retryable);
        let err2 = fc.failure_to_error(&f);
        match &err2 {
            CascadeError::Panic(p) => assert!(p.is_workflow_panic()),
            other => panic!("expected PanicError, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_error_to_failure() {
        let fc = default_converter();
        let cool = CascadeError::Application(ApplicationError::new("cool error", "coolError", false));
        let err = CascadeError::Timeout(TimeoutError::new(
            "timeout",
            TimeoutType::Heartbeat,
            Some(cool.clone()),
        ));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "timeout");
        assert_eq!(
            f.timeout_failure_info().unwrap().timeout_type,
            TimeoutType::Heartbeat as i32
        );
        assert_eq!(*f.cause.as_ref().unwrap().as_ref(), fc.error_to_failure(&cool));

        let err2 = fc.failure_to_error(&f);
        let timeout = err2.as_timeout().unwrap();
        assert_eq!(
            err2.to_string(),
            "timeout (type: Heartbeat): cool error (type: coolError, retryable: true)"
        );
        assert_eq!(timeout.timeout_type(), TimeoutType::Heartbeat);
    }

    #[test]
    fn test_terminated_error_to_failure() {
        let fc = default_converter();
        let f = fc.error_to_failure(&CascadeError::Terminated(TerminatedError::new()));
        assert_eq!(f.message, "terminated");
        assert!(f.cause.is_none());

        let err2 = fc.failure_to_error(&f);
        assert!(matches!(err2, CascadeError::Terminated(_)));
    }

    #[test]
    fn test_server_error_to_failure() {
        let fc = default_converter();
        let cool = CascadeError::Application(ApplicationError::new("cool error", "coolError", false));
        let err = CascadeError::Server(ServerError::new("message", true, Some(cool)));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "message");
        assert!(f.server_failure_info().unwrap().non_retryable);

        let err2 = fc.failure_to_error(&f);
        assert_eq!(
            err2.to_string(),
            "message: cool error (type: coolError, retryable: true)"
        );
        match err2 {
            CascadeError::Server(s) => assert!(s.non_retryable()),
            other => panic!("expected ServerError, got {other:?}"),
        }
    }

    #[test]
    fn test_activity_error_to_failure() {
        let fc = default_converter();
        let app = CascadeError::Application(ApplicationError::new("app err", "", true));
        let err = CascadeError::Activity(ActivityError::new(
            8,
            22,
            "alex",
            Some(crate::api::common::ActivityType {
                name: "activityType".to_string(),
            }),
            "32283",
            RetryState::NonRetryableFailure,
            Some(app.clone()),
        ));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "activity error");
        let info = f.activity_failure_info().unwrap();
        assert_eq!(info.scheduled_event_id, 8);
        assert_eq!(info.started_event_id, 22);
        assert_eq!(info.identity, "alex");
        assert_eq!(info.activity_type.as_ref().unwrap().name, "activityType");
        assert_eq!(info.activity_id, "32283");
        assert_eq!(info.retry_state, RetryState::NonRetryableFailure as i32);
        assert_eq!(*f.cause.as_ref().unwrap().as_ref(), fc.error_to_failure(&app));

        let err2 = fc.failure_to_error(&f);
        let activity = err2.as_activity().unwrap();
        assert_eq!(err.to_string(), err2.to_string());
        assert_eq!(activity.started_event_id(), 22);

        let cause = err2.cause().unwrap().as_application().unwrap();
        assert_eq!(cause.to_string(), "app err");
        assert!(cause.non_retryable());
    }

    #[test]
    fn test_child_workflow_error_to_failure() {
        let fc = default_converter();
        let app = CascadeError::Application(ApplicationError::new("app err", "", true));
        let err = CascadeError::ChildWorkflowExecution(ChildWorkflowExecutionError::new(
            "namespace",
            "wID",
            "rID",
            "wfType",
            8,
            22,
            RetryState::NonRetryableFailure,
            Some(app.clone()),
        ));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "child workflow execution error");
        let info = f.child_workflow_execution_failure_info().unwrap();
        assert_eq!(info.initiated_event_id, 8);
        assert_eq!(info.started_event_id, 22);
        assert_eq!(info.namespace, "namespace");
        assert_eq!(info.retry_state, RetryState::NonRetryableFailure as i32);
        assert_eq!(*f.cause.as_ref().unwrap().as_ref(), fc.error_to_failure(&app));

        let err2 = fc.failure_to_error(&f);
        match &err2 {
            CascadeError::ChildWorkflowExecution(child) => {
                assert_eq!(err.to_string(), err2.to_string());
                assert_eq!(child.started_event_id(), 22);
            }
            other => panic!("expected ChildWorkflowExecutionError, got {other:?}"),
        }
    }

    #[test]
    fn test_handler_error_to_failure() {
        let fc = default_converter();
        let err = CascadeError::Handler(HandlerError::new(
            "INTERNAL",
            HandlerErrorRetryBehavior::NonRetryable,
            Some(CascadeError::from_message("custom cause")),
        ));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "handler error (INTERNAL): custom cause");
        let info = f.handler_failure_info().unwrap();
        assert_eq!(info.r#type, "INTERNAL");
        assert_eq!(
            info.retry_behavior,
            HandlerErrorRetryBehavior::NonRetryable as i32
        );
        assert_eq!(f.cause.as_ref().unwrap().application_failure_info().unwrap().r#type, "");
        assert_eq!(f.cause.as_ref().unwrap().message, "custom cause");

        let err2 = fc.failure_to_error(&f);
        match &err2 {
            CascadeError::Handler(h) => {
                assert_eq!(h.handler_type(), "INTERNAL");
                assert_eq!(h.retry_behavior(), HandlerErrorRetryBehavior::NonRetryable);
                assert_eq!(h.to_string(), "handler error (INTERNAL): custom cause");
                assert_eq!(h.cause().unwrap().to_string(), "custom cause");
            }
            other => panic!("expected HandlerError, got {other:?}"),
        }
    }

    #[test]
    fn test_untyped_error_to_failure() {
        let fc = default_converter();
        let err = CascadeError::Application(ApplicationError::new("cool error", "coolError", false));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, "cool error");
        assert_eq!(f.application_failure_info().unwrap().r#type, "coolError");
        assert!(!f.application_failure_info().unwrap().non_retryable);
        assert!(f.cause.is_none());

        let err2 = fc.failure_to_error(&f);
        let app = err2.as_application().unwrap();
        assert_eq!(app.to_string(), "cool error (type: coolError, retryable: true)");
        assert_eq!(app.error_type(), "coolError");
    }

    #[test]
    fn test_kind_without_wire_variant_falls_back_to_application() {
        let fc = default_converter();
        let err = CascadeError::UnknownExternalWorkflowExecution(
            crate::error::UnknownExternalWorkflowExecutionError,
        );
        let f = fc.error_to_failure(&err);
        assert_eq!(
            f.application_failure_info().unwrap().r#type,
            "UnknownExternalWorkflowExecutionError"
        );
        assert!(!f.application_failure_info().unwrap().non_retryable);
    }

    // ========================================================================
    // Saved original failure
    // ========================================================================

    #[test]
    fn test_saved_failure_reemitted_unchanged() {
        let fc = default_converter();
        let foreign = Failure {
            message: "actual message".to_string(),
            stack_trace: "some stack trace".to_string(),
            source: "JavaSDK".to_string(),
            failure_info: Some(FailureInfo::ApplicationFailureInfo(ApplicationFailureInfo {
                r#type: "SomeJavaException".to_string(),
                non_retryable: true,
                ..Default::default()
            })),
            ..Default::default()
        };

        let err = fc.failure_to_error(&foreign);
        let f = fc.error_to_failure(&err);
        assert_eq!(f, foreign);
        assert_eq!(f.message, "actual message");
        assert_eq!(f.source, "JavaSDK");
        assert_eq!(f.stack_trace, "some stack trace");
        assert_eq!(
            f.application_failure_info().unwrap().r#type,
            "SomeJavaException"
        );
    }

    #[test]
    fn test_saved_failure_nested_cause_preserved() {
        let fc = default_converter();
        let foreign = Failure {
            message: "message".to_string(),
            stack_trace: "long stack trace".to_string(),
            source: "JavaSDK".to_string(),
            cause: Some(Box::new(Failure {
                message: "application message".to_string(),
                stack_trace: "application long stack trace".to_string(),
                source: "JavaSDK".to_string(),
                failure_info: Some(FailureInfo::ApplicationFailureInfo(
                    ApplicationFailureInfo {
                        r#type: "SomeJavaException".to_string(),
                        non_retryable: true,
                        ..Default::default()
                    },
                )),
                ..Default::default()
            })),
            failure_info: Some(FailureInfo::ActivityFailureInfo(ActivityFailureInfo {
                started_event_id: 1,
                scheduled_event_id: 2,
                identity: "alex".to_string(),
                ..Default::default()
            })),
            ..Default::default()
        };

        let err = fc.failure_to_error(&foreign);
        assert!(err.as_activity().is_some());
        assert!(err.cause().unwrap().as_application().is_some());

        let f2 = fc.error_to_failure(&err);
        assert_eq!(f2.message, "message");
        assert_eq!(f2.stack_trace, "long stack trace");
        assert_eq!(f2.source, "JavaSDK");
        assert_eq!(f2.activity_failure_info().unwrap().started_event_id, 1);
        assert_eq!(f2.activity_failure_info().unwrap().scheduled_event_id, 2);
        assert_eq!(f2.activity_failure_info().unwrap().identity, "alex");

        let cause = f2.cause.as_ref().unwrap();
        assert_eq!(cause.message, "application message");
        assert_eq!(cause.stack_trace, "application long stack trace");
        assert_eq!(cause.source, "JavaSDK");
        assert_eq!(
            cause.application_failure_info().unwrap().r#type,
            "SomeJavaException"
        );
        assert!(cause.application_failure_info().unwrap().non_retryable);
    }

    // ========================================================================
    // Encode common attributes
    // ========================================================================

    #[test]
    fn test_encode_common_attributes() {
        let fc = encoding_converter();
        let f = fc.error_to_failure(&app_error_with_cause());

        assert_eq!(f.message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(f.stack_trace, "");
        let info = f.application_failure_info().unwrap();
        assert_eq!(info.r#type, "customType");
        assert!(info.non_retryable);
        assert_eq!(info.details.as_ref().unwrap().payloads[0].data, br#""details""#);
        assert_eq!(info.details.as_ref().unwrap().payloads[1].data, b"2208");
        assert_eq!(f.cause.as_ref().unwrap().message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(f.cause.as_ref().unwrap().application_failure_info().unwrap().r#type, "");
        assert!(f.cause.as_ref().unwrap().cause.is_none());

        let err = fc.failure_to_error(&f);
        assert_eq!(
            err.to_string(),
            "message (type: customType, retryable: false): cause error"
        );
        assert_eq!(err.cause().unwrap().to_string(), "cause error");
    }

    #[test]
    fn test_encode_decode_encode_is_involution() {
        let fc = encoding_converter();
        let sub = CascadeError::Application(ApplicationError::with_options(
            "sub message",
            "sub customType",
            ApplicationErrorOptions {
                non_retryable: true,
                cause: Some(CascadeError::from_message("cause error")),
                details: vec![json!("sub details").into(), json!(2208).into()],
                ..Default::default()
            },
        ));
        let err = CascadeError::Application(ApplicationError::with_options(
            "message",
            "customType",
            ApplicationErrorOptions {
                non_retryable: true,
                cause: Some(sub),
                details: vec![json!("details").into(), json!(2208).into()],
                ..Default::default()
            },
        ));

        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(f.stack_trace, "");
        assert_eq!(f.application_failure_info().unwrap().r#type, "customType");
        let sub_failure = f.cause.as_ref().unwrap();
        assert_eq!(sub_failure.message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(sub_failure.stack_trace, "");
        assert_eq!(
            sub_failure.application_failure_info().unwrap().r#type,
            "sub customType"
        );
        let sub_sub = sub_failure.cause.as_ref().unwrap();
        assert_eq!(sub_sub.message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(sub_sub.application_failure_info().unwrap().r#type, "");
        assert!(sub_sub.cause.is_none());

        let err2 = fc.failure_to_error(&f);
        assert_eq!(
            err2.to_string(),
            "message (type: customType, retryable: false): sub message (type: sub customType, retryable: false): cause error"
        );
        let sub_err = err2.cause().unwrap();
        assert_eq!(
            sub_err.to_string(),
            "sub message (type: sub customType, retryable: false): cause error"
        );
        let sub_sub_err = sub_err.cause().unwrap();
        assert_eq!(sub_sub_err.to_string(), "cause error");

        // Re-encoding the decoded error reproduces the encoded structure.
        let f2 = fc.error_to_failure(&err2);
        assert_eq!(f2.message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(f2.stack_trace, "");
        assert_eq!(f2.application_failure_info().unwrap().r#type, "customType");
        assert_eq!(f2.cause.as_ref().unwrap().message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(
            f2.cause.as_ref().unwrap().application_failure_info().unwrap().r#type,
            "sub customType"
        );
        assert_eq!(
            f2.cause.as_ref().unwrap().cause.as_ref().unwrap().message,
            ENCODED_FAILURE_MESSAGE
        );
        assert!(f2.cause.as_ref().unwrap().cause.as_ref().unwrap().cause.is_none());
    }

    #[test]
    fn test_encode_stack_trace() {
        let fc = encoding_converter();
        let err = CascadeError::Panic(PanicError::new("panic message", "long call stack"));
        let f = fc.error_to_failure(&err);
        assert_eq!(f.message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(f.stack_trace, "");
        assert_eq!(f.application_failure_info().unwrap().r#type, "PanicError");
        assert!(!f.application_failure_info().unwrap().non_retryable);
        assert!(f.cause.is_none());

        let err2 = fc.failure_to_error(&f);
        match &err2 {
            CascadeError::Panic(p) => {
                assert_eq!(p.message(), "panic message");
                assert_eq!(p.stack_trace(), "long call stack");
            }
            other => panic!("expected PanicError, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_helpers_round_trip() {
        let dc = DataConverter::default();
        let mut f = Failure {
            message: "internal error: code 123".to_string(),
            stack_trace: "internal_file:12".to_string(),
            ..Default::default()
        };

        encode_common_failure_attributes(&dc, &mut f).unwrap();
        assert_eq!(f.message, ENCODED_FAILURE_MESSAGE);
        assert_eq!(f.stack_trace, "");
        assert!(f.encoded_attributes.is_some());

        // Encoding again must not double-wrap.
        let snapshot = f.clone();
        encode_common_failure_attributes(&dc, &mut f).unwrap();
        assert_eq!(f, snapshot);

        decode_common_failure_attributes(&dc, &mut f).unwrap();
        assert_eq!(f.message, "internal error: code 123");
        assert_eq!(f.stack_trace, "internal_file:12");
        assert!(f.encoded_attributes.is_none());
    }

    #[test]
    fn test_self_referential_depth_is_capped() {
        let fc = default_converter();
        // A pathological chain deeper than the cap.
        let mut err = CascadeError::from_message("leaf");
        for i in 0..100 {
            err = CascadeError::Application(ApplicationError::with_options(
                format!("level {i}"),
                "",
                ApplicationErrorOptions {
                    cause: Some(err),
                    ..Default::default()
                },
            ));
        }
        let f = fc.error_to_failure(&err);
        let mut depth = 0;
        let mut cursor = &f;
        while let Some(cause) = cursor.cause.as_deref() {
            depth += 1;
            cursor = cause;
        }
        assert!(depth <= MAX_CAUSE_DEPTH);
    }
}
