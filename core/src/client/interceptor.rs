//! Codec interceptors: decorators over [`WorkflowService`] that rewrite
//! payload and failure fields at the RPC boundary.

use crate::api::common::{Payload, Payloads};
use crate::api::failure::Failure;
use crate::api::workflowservice::*;
use crate::client::visitor::{PayloadVisitor, VisitWireFields};
use crate::client::WorkflowService;
use crate::converter::{
    decode_common_failure_attributes, encode_common_failure_attributes, ConverterError,
    DataConverter, PayloadCodec,
};
use async_trait::async_trait;
use std::sync::Arc;

fn codec_status(err: ConverterError) -> tonic::Status {
    tonic::Status::internal(format!("payload codec: {err}"))
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Encode,
    Decode,
}

// ============================================================================
// Payload codec interceptor
// ============================================================================

struct CodecVisitor<'a> {
    codecs: &'a [Arc<dyn PayloadCodec>],
    direction: Direction,
}

impl CodecVisitor<'_> {
    fn apply(&self, payloads: Vec<Payload>) -> Result<Vec<Payload>, ConverterError> {
        let mut payloads = payloads;
        match self.direction {
            Direction::Encode => {
                for codec in self.codecs {
                    payloads = codec.encode(payloads)?;
                }
            }
            Direction::Decode => {
                for codec in self.codecs.iter().rev() {
                    payloads = codec.decode(payloads)?;
                }
            }
        }
        Ok(payloads)
    }
}

impl PayloadVisitor for CodecVisitor<'_> {
    fn visit_payload(&mut self, payload: &mut Payload) -> Result<(), ConverterError> {
        let mut processed = self.apply(vec![std::mem::take(payload)])?;
        *payload = processed.remove(0);
        Ok(())
    }

    fn visit_payloads(&mut self, payloads: &mut Payloads) -> Result<(), ConverterError> {
        payloads.payloads = self.apply(std::mem::take(&mut payloads.payloads))?;
        Ok(())
    }
}

/// Applies a payload codec chain to every payload field of every request
/// (encode) and response (decode) passing through.
pub struct PayloadCodecInterceptor<S> {
    inner: S,
    codecs: Vec<Arc<dyn PayloadCodec>>,
}

impl<S> PayloadCodecInterceptor<S> {
    pub fn new(inner: S, codecs: Vec<Arc<dyn PayloadCodec>>) -> Self {
        Self { inner, codecs }
    }

    fn rewrite<T: VisitWireFields>(
        &self,
        message: &mut T,
        direction: Direction,
    ) -> Result<(), tonic::Status> {
        let mut visitor = CodecVisitor {
            codecs: &self.codecs,
            direction,
        };
        message.visit_wire_fields(&mut visitor).map_err(codec_status)
    }
}

// ============================================================================
// Failure codec interceptor
// ============================================================================

struct FailureVisitor<'a> {
    converter: &'a DataConverter,
    direction: Direction,
}

impl PayloadVisitor for FailureVisitor<'_> {
    fn visit_failure(&mut self, failure: &mut Failure) -> Result<(), ConverterError> {
        match self.direction {
            Direction::Encode => encode_common_failure_attributes(self.converter, failure),
            Direction::Decode => decode_common_failure_attributes(self.converter, failure),
        }
    }
}

/// Encodes the common attributes (message, stack trace) of every failure
/// field of every request, and restores them on responses.
pub struct FailureCodecInterceptor<S> {
    inner: S,
    converter: DataConverter,
}

impl<S> FailureCodecInterceptor<S> {
    pub fn new(inner: S, converter: DataConverter) -> Self {
        Self { inner, converter }
    }

    fn rewrite<T: VisitWireFields>(
        &self,
        message: &mut T,
        direction: Direction,
    ) -> Result<(), tonic::Status> {
        let mut visitor = FailureVisitor {
            converter: &self.converter,
            direction,
        };
        message.visit_wire_fields(&mut visitor).map_err(codec_status)
    }
}

// Every unary method has the same shape: rewrite the request outbound, call
// the inner service, rewrite the response inbound. Transport errors from the
// inner call propagate untouched. async-trait impls cannot host macro
// expansion, so both decorators spell the methods out.

#[async_trait]
impl<S: WorkflowService> WorkflowService for PayloadCodecInterceptor<S> {
    async fn start_workflow_execution(
        &self,
        mut request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.start_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn poll_workflow_task_queue(
        &self,
        mut request: PollWorkflowTaskQueueRequest,
    ) -> Result<PollWorkflowTaskQueueResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.poll_workflow_task_queue(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_workflow_task_completed(
        &self,
        mut request: RespondWorkflowTaskCompletedRequest,
    ) -> Result<RespondWorkflowTaskCompletedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_workflow_task_completed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_workflow_task_failed(
        &self,
        mut request: RespondWorkflowTaskFailedRequest,
    ) -> Result<RespondWorkflowTaskFailedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_workflow_task_failed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn poll_activity_task_queue(
        &self,
        mut request: PollActivityTaskQueueRequest,
    ) -> Result<PollActivityTaskQueueResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.poll_activity_task_queue(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_activity_task_completed(
        &self,
        mut request: RespondActivityTaskCompletedRequest,
    ) -> Result<RespondActivityTaskCompletedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_activity_task_completed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_activity_task_failed(
        &self,
        mut request: RespondActivityTaskFailedRequest,
    ) -> Result<RespondActivityTaskFailedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_activity_task_failed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_activity_task_canceled(
        &self,
        mut request: RespondActivityTaskCanceledRequest,
    ) -> Result<RespondActivityTaskCanceledResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_activity_task_canceled(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn record_activity_task_heartbeat(
        &self,
        mut request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.record_activity_task_heartbeat(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn signal_workflow_execution(
        &self,
        mut request: SignalWorkflowExecutionRequest,
    ) -> Result<SignalWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.signal_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn query_workflow(
        &self,
        mut request: QueryWorkflowRequest,
    ) -> Result<QueryWorkflowResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.query_workflow(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn describe_workflow_execution(
        &self,
        mut request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.describe_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn terminate_workflow_execution(
        &self,
        mut request: TerminateWorkflowExecutionRequest,
    ) -> Result<TerminateWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.terminate_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn request_cancel_workflow_execution(
        &self,
        mut request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<RequestCancelWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.request_cancel_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn get_cluster_info(
        &self,
        mut request: GetClusterInfoRequest,
    ) -> Result<GetClusterInfoResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.get_cluster_info(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }
}

#[async_trait]
impl<S: WorkflowService> WorkflowService for FailureCodecInterceptor<S> {
    async fn start_workflow_execution(
        &self,
        mut request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.start_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn poll_workflow_task_queue(
        &self,
        mut request: PollWorkflowTaskQueueRequest,
    ) -> Result<PollWorkflowTaskQueueResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.poll_workflow_task_queue(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_workflow_task_completed(
        &self,
        mut request: RespondWorkflowTaskCompletedRequest,
    ) -> Result<RespondWorkflowTaskCompletedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_workflow_task_completed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_workflow_task_failed(
        &self,
        mut request: RespondWorkflowTaskFailedRequest,
    ) -> Result<RespondWorkflowTaskFailedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_workflow_task_failed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn poll_activity_task_queue(
        &self,
        mut request: PollActivityTaskQueueRequest,
    ) -> Result<PollActivityTaskQueueResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.poll_activity_task_queue(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_activity_task_completed(
        &self,
        mut request: RespondActivityTaskCompletedRequest,
    ) -> Result<RespondActivityTaskCompletedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_activity_task_completed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_activity_task_failed(
        &self,
        mut request: RespondActivityTaskFailedRequest,
    ) -> Result<RespondActivityTaskFailedResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_activity_task_failed(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn respond_activity_task_canceled(
        &self,
        mut request: RespondActivityTaskCanceledRequest,
    ) -> Result<RespondActivityTaskCanceledResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.respond_activity_task_canceled(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn record_activity_task_heartbeat(
        &self,
        mut request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.record_activity_task_heartbeat(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn signal_workflow_execution(
        &self,
        mut request: SignalWorkflowExecutionRequest,
    ) -> Result<SignalWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.signal_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn query_workflow(
        &self,
        mut request: QueryWorkflowRequest,
    ) -> Result<QueryWorkflowResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.query_workflow(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn describe_workflow_execution(
        &self,
        mut request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.describe_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn terminate_workflow_execution(
        &self,
        mut request: TerminateWorkflowExecutionRequest,
    ) -> Result<TerminateWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.terminate_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn request_cancel_workflow_execution(
        &self,
        mut request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<RequestCancelWorkflowExecutionResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.request_cancel_workflow_execution(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }

    async fn get_cluster_info(
        &self,
        mut request: GetClusterInfoRequest,
    ) -> Result<GetClusterInfoResponse, tonic::Status> {
        self.rewrite(&mut request, Direction::Encode)?;
        let mut response = self.inner.get_cluster_info(request).await?;
        self.rewrite(&mut response, Direction::Decode)?;
        Ok(response)
    }
}
