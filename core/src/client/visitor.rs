//! Static traversal of payload and failure fields across the RPC surface.
//!
//! Interceptors need to find every `Payload`, `Payloads` and `Failure`
//! occurrence in every request and response. The traversal is a static
//! per-message table (rather than proto reflection); adding a field to a
//! message means adding it here.

use crate::api::command::{command, Command};
use crate::api::common::{Header, Payload, Payloads, SearchAttributes};
use crate::api::failure::Failure;
use crate::api::history::{history_event, HistoryEvent};
use crate::api::workflowservice::*;
use crate::converter::ConverterError;

/// Callbacks invoked for each wire field found during traversal. Unneeded
/// hooks default to no-ops.
pub trait PayloadVisitor {
    fn visit_payload(&mut self, _payload: &mut Payload) -> Result<(), ConverterError> {
        Ok(())
    }

    fn visit_payloads(&mut self, _payloads: &mut Payloads) -> Result<(), ConverterError> {
        Ok(())
    }

    fn visit_failure(&mut self, _failure: &mut Failure) -> Result<(), ConverterError> {
        Ok(())
    }
}

/// Implemented by every message that carries payloads or failures anywhere
/// in its field tree.
pub trait VisitWireFields {
    fn visit_wire_fields(&mut self, visitor: &mut dyn PayloadVisitor)
        -> Result<(), ConverterError>;
}

fn visit_opt_payloads(
    payloads: &mut Option<Payloads>,
    visitor: &mut dyn PayloadVisitor,
) -> Result<(), ConverterError> {
    if let Some(p) = payloads {
        visitor.visit_payloads(p)?;
    }
    Ok(())
}

fn visit_opt_header(
    header: &mut Option<Header>,
    visitor: &mut dyn PayloadVisitor,
) -> Result<(), ConverterError> {
    if let Some(header) = header {
        for payload in header.fields.values_mut() {
            visitor.visit_payload(payload)?;
        }
    }
    Ok(())
}

fn visit_opt_search_attributes(
    attrs: &mut Option<SearchAttributes>,
    visitor: &mut dyn PayloadVisitor,
) -> Result<(), ConverterError> {
    if let Some(attrs) = attrs {
        for payload in attrs.indexed_fields.values_mut() {
            visitor.visit_payload(payload)?;
        }
    }
    Ok(())
}

/// Announce a failure to the visitor, then walk the payloads the failure
/// chain itself carries (details, heartbeat details, encoded attributes).
pub fn visit_failure_payloads(
    failure: &mut Failure,
    visitor: &mut dyn PayloadVisitor,
) -> Result<(), ConverterError> {
    use crate::api::failure::failure::FailureInfo;

    visitor.visit_failure(failure)?;
    let mut current = Some(failure);
    while let Some(f) = current {
        if let Some(encoded) = &mut f.encoded_attributes {
            visitor.visit_payload(encoded)?;
        }
        match &mut f.failure_info {
            Some(FailureInfo::ApplicationFailureInfo(info)) => {
                visit_opt_payloads(&mut info.details, visitor)?
            }
            Some(FailureInfo::TimeoutFailureInfo(info)) => {
                visit_opt_payloads(&mut info.last_heartbeat_details, visitor)?
            }
            Some(FailureInfo::CanceledFailureInfo(info)) => {
                visit_opt_payloads(&mut info.details, visitor)?
            }
            _ => {}
        }
        current = f.cause.as_deref_mut();
    }
    Ok(())
}

fn visit_opt_failure(
    failure: &mut Option<Failure>,
    visitor: &mut dyn PayloadVisitor,
) -> Result<(), ConverterError> {
    if let Some(f) = failure {
        visit_failure_payloads(f, visitor)?;
    }
    Ok(())
}

fn visit_opt_query(
    query: &mut Option<WorkflowQuery>,
    visitor: &mut dyn PayloadVisitor,
) -> Result<(), ConverterError> {
    if let Some(query) = query {
        visit_opt_payloads(&mut query.query_args, visitor)?;
        visit_opt_header(&mut query.header, visitor)?;
    }
    Ok(())
}

impl VisitWireFields for Command {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        use command::Attributes::*;
        match &mut self.attributes {
            Some(ScheduleActivityTask(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(CompleteWorkflowExecution(attrs)) => {
                visit_opt_payloads(&mut attrs.result, visitor)?;
            }
            Some(FailWorkflowExecution(attrs)) => {
                visit_opt_failure(&mut attrs.failure, visitor)?;
            }
            Some(CancelWorkflowExecution(attrs)) => {
                visit_opt_payloads(&mut attrs.details, visitor)?;
            }
            Some(ContinueAsNewWorkflowExecution(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(RecordMarker(attrs)) => {
                for payloads in attrs.details.values_mut() {
                    visitor.visit_payloads(payloads)?;
                }
                visit_opt_header(&mut attrs.header, visitor)?;
                visit_opt_failure(&mut attrs.failure, visitor)?;
            }
            Some(SignalExternalWorkflowExecution(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
            }
            Some(StartChildWorkflowExecution(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(UpsertWorkflowSearchAttributes(attrs)) => {
                visit_opt_search_attributes(&mut attrs.search_attributes, visitor)?;
            }
            Some(RequestCancelActivityTask(_))
            | Some(StartTimer(_))
            | Some(CancelTimer(_))
            | Some(RequestCancelExternalWorkflowExecution(_))
            | None => {}
        }
        Ok(())
    }
}

impl VisitWireFields for HistoryEvent {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        use history_event::Attributes::*;
        match &mut self.attributes {
            Some(WorkflowExecutionStarted(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(WorkflowExecutionCompleted(attrs)) => {
                visit_opt_payloads(&mut attrs.result, visitor)?;
            }
            Some(WorkflowExecutionFailed(attrs)) => {
                visit_opt_failure(&mut attrs.failure, visitor)?;
            }
            Some(WorkflowExecutionCanceled(attrs)) => {
                visit_opt_payloads(&mut attrs.details, visitor)?;
            }
            Some(WorkflowExecutionTerminated(attrs)) => {
                visit_opt_payloads(&mut attrs.details, visitor)?;
            }
            Some(WorkflowExecutionContinuedAsNew(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(WorkflowExecutionSignaled(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(WorkflowTaskFailed(attrs)) => {
                visit_opt_failure(&mut attrs.failure, visitor)?;
            }
            Some(ActivityTaskScheduled(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(ActivityTaskCompleted(attrs)) => {
                visit_opt_payloads(&mut attrs.result, visitor)?;
            }
            Some(ActivityTaskFailed(attrs)) => {
                visit_opt_failure(&mut attrs.failure, visitor)?;
            }
            Some(ActivityTaskTimedOut(attrs)) => {
                visit_opt_failure(&mut attrs.failure, visitor)?;
            }
            Some(ActivityTaskCanceled(attrs)) => {
                visit_opt_payloads(&mut attrs.details, visitor)?;
            }
            Some(MarkerRecorded(attrs)) => {
                for payloads in attrs.details.values_mut() {
                    visitor.visit_payloads(payloads)?;
                }
                visit_opt_header(&mut attrs.header, visitor)?;
                visit_opt_failure(&mut attrs.failure, visitor)?;
            }
            Some(UpsertWorkflowSearchAttributes(attrs)) => {
                visit_opt_search_attributes(&mut attrs.search_attributes, visitor)?;
            }
            Some(SignalExternalWorkflowExecutionInitiated(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
            }
            Some(StartChildWorkflowExecutionInitiated(attrs)) => {
                visit_opt_payloads(&mut attrs.input, visitor)?;
                visit_opt_header(&mut attrs.header, visitor)?;
            }
            Some(ChildWorkflowExecution(attrs)) => {
                visit_opt_payloads(&mut attrs.result, visitor)?;
                visit_opt_failure(&mut attrs.failure, visitor)?;
                visit_opt_payloads(&mut attrs.details, visitor)?;
            }
            _ => {}
        }
        Ok(())
    }
}

macro_rules! no_wire_fields {
    ($($message:ty),* $(,)?) => {
        $(impl VisitWireFields for $message {
            fn visit_wire_fields(
                &mut self,
                _visitor: &mut dyn PayloadVisitor,
            ) -> Result<(), ConverterError> {
                Ok(())
            }
        })*
    };
}

no_wire_fields!(
    StartWorkflowExecutionResponse,
    PollWorkflowTaskQueueRequest,
    RespondWorkflowTaskCompletedResponse,
    RespondWorkflowTaskFailedResponse,
    PollActivityTaskQueueRequest,
    RespondActivityTaskCompletedResponse,
    RespondActivityTaskFailedResponse,
    RespondActivityTaskCanceledResponse,
    RecordActivityTaskHeartbeatResponse,
    SignalWorkflowExecutionResponse,
    DescribeWorkflowExecutionRequest,
    DescribeWorkflowExecutionResponse,
    TerminateWorkflowExecutionResponse,
    RequestCancelWorkflowExecutionRequest,
    RequestCancelWorkflowExecutionResponse,
    GetClusterInfoRequest,
    GetClusterInfoResponse,
);

impl VisitWireFields for StartWorkflowExecutionRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.input, visitor)?;
        visit_opt_header(&mut self.header, visitor)
    }
}

impl VisitWireFields for PollWorkflowTaskQueueResponse {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        if let Some(history) = &mut self.history {
            for event in &mut history.events {
                event.visit_wire_fields(visitor)?;
            }
        }
        visit_opt_query(&mut self.query, visitor)
    }
}

impl VisitWireFields for RespondWorkflowTaskCompletedRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        for command in &mut self.commands {
            command.visit_wire_fields(visitor)?;
        }
        visit_opt_payloads(&mut self.query_result, visitor)
    }
}

impl VisitWireFields for RespondWorkflowTaskFailedRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_failure(&mut self.failure, visitor)
    }
}

impl VisitWireFields for PollActivityTaskQueueResponse {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.input, visitor)?;
        visit_opt_header(&mut self.header, visitor)?;
        visit_opt_payloads(&mut self.heartbeat_details, visitor)
    }
}

impl VisitWireFields for RespondActivityTaskCompletedRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.result, visitor)
    }
}

impl VisitWireFields for RespondActivityTaskFailedRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_failure(&mut self.failure, visitor)?;
        visit_opt_payloads(&mut self.last_heartbeat_details, visitor)
    }
}

impl VisitWireFields for RespondActivityTaskCanceledRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.details, visitor)
    }
}

impl VisitWireFields for RecordActivityTaskHeartbeatRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.details, visitor)
    }
}

impl VisitWireFields for SignalWorkflowExecutionRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.input, visitor)?;
        visit_opt_header(&mut self.header, visitor)
    }
}

impl VisitWireFields for QueryWorkflowRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_query(&mut self.query, visitor)
    }
}

impl VisitWireFields for QueryWorkflowResponse {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.query_result, visitor)
    }
}

impl VisitWireFields for TerminateWorkflowExecutionRequest {
    fn visit_wire_fields(
        &mut self,
        visitor: &mut dyn PayloadVisitor,
    ) -> Result<(), ConverterError> {
        visit_opt_payloads(&mut self.details, visitor)
    }
}
