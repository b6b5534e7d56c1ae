//! The client-side RPC surface and its codec interceptors.
//!
//! [`WorkflowService`] is the typed unary surface of the Cascade service.
//! Interceptors are decorators over this trait: each wraps an inner service,
//! rewrites payload/failure fields on the way out and back in, and passes
//! transport errors through untouched. Decorators compose in any order.

mod interceptor;
mod visitor;

pub use interceptor::{FailureCodecInterceptor, PayloadCodecInterceptor};
pub use visitor::{visit_failure_payloads, PayloadVisitor, VisitWireFields};

use crate::api::workflowservice::*;
use async_trait::async_trait;

/// Typed unary client surface of the Cascade workflow service.
///
/// Implementations include the gRPC transport client and the codec
/// interceptors wrapping it. All methods are cancellation-safe: dropping the
/// returned future aborts the call.
#[async_trait]
pub trait WorkflowService: Send + Sync {
    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, tonic::Status>;

    async fn poll_workflow_task_queue(
        &self,
        request: PollWorkflowTaskQueueRequest,
    ) -> Result<PollWorkflowTaskQueueResponse, tonic::Status>;

    async fn respond_workflow_task_completed(
        &self,
        request: RespondWorkflowTaskCompletedRequest,
    ) -> Result<RespondWorkflowTaskCompletedResponse, tonic::Status>;

    async fn respond_workflow_task_failed(
        &self,
        request: RespondWorkflowTaskFailedRequest,
    ) -> Result<RespondWorkflowTaskFailedResponse, tonic::Status>;

    async fn poll_activity_task_queue(
        &self,
        request: PollActivityTaskQueueRequest,
    ) -> Result<PollActivityTaskQueueResponse, tonic::Status>;

    async fn respond_activity_task_completed(
        &self,
        request: RespondActivityTaskCompletedRequest,
    ) -> Result<RespondActivityTaskCompletedResponse, tonic::Status>;

    async fn respond_activity_task_failed(
        &self,
        request: RespondActivityTaskFailedRequest,
    ) -> Result<RespondActivityTaskFailedResponse, tonic::Status>;

    async fn respond_activity_task_canceled(
        &self,
        request: RespondActivityTaskCanceledRequest,
    ) -> Result<RespondActivityTaskCanceledResponse, tonic::Status>;

    async fn record_activity_task_heartbeat(
        &self,
        request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, tonic::Status>;

    async fn signal_workflow_execution(
        &self,
        request: SignalWorkflowExecutionRequest,
    ) -> Result<SignalWorkflowExecutionResponse, tonic::Status>;

    async fn query_workflow(
        &self,
        request: QueryWorkflowRequest,
    ) -> Result<QueryWorkflowResponse, tonic::Status>;

    async fn describe_workflow_execution(
        &self,
        request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, tonic::Status>;

    async fn terminate_workflow_execution(
        &self,
        request: TerminateWorkflowExecutionRequest,
    ) -> Result<TerminateWorkflowExecutionResponse, tonic::Status>;

    async fn request_cancel_workflow_execution(
        &self,
        request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<RequestCancelWorkflowExecutionResponse, tonic::Status>;

    async fn get_cluster_info(
        &self,
        request: GetClusterInfoRequest,
    ) -> Result<GetClusterInfoResponse, tonic::Status>;
}

// Shared service handles are services too, so interceptors can wrap either.
#[async_trait]
impl<S: WorkflowService + ?Sized> WorkflowService for std::sync::Arc<S> {
    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, tonic::Status> {
        (**self).start_workflow_execution(request).await
    }

    async fn poll_workflow_task_queue(
        &self,
        request: PollWorkflowTaskQueueRequest,
    ) -> Result<PollWorkflowTaskQueueResponse, tonic::Status> {
        (**self).poll_workflow_task_queue(request).await
    }

    async fn respond_workflow_task_completed(
        &self,
        request: RespondWorkflowTaskCompletedRequest,
    ) -> Result<RespondWorkflowTaskCompletedResponse, tonic::Status> {
        (**self).respond_workflow_task_completed(request).await
    }

    async fn respond_workflow_task_failed(
        &self,
        request: RespondWorkflowTaskFailedRequest,
    ) -> Result<RespondWorkflowTaskFailedResponse, tonic::Status> {
        (**self).respond_workflow_task_failed(request).await
    }

    async fn poll_activity_task_queue(
        &self,
        request: PollActivityTaskQueueRequest,
    ) -> Result<PollActivityTaskQueueResponse, tonic::Status> {
        (**self).poll_activity_task_queue(request).await
    }

    async fn respond_activity_task_completed(
        &self,
        request: RespondActivityTaskCompletedRequest,
    ) -> Result<RespondActivityTaskCompletedResponse, tonic::Status> {
        (**self).respond_activity_task_completed(request).await
    }

    async fn respond_activity_task_failed(
        &self,
        request: RespondActivityTaskFailedRequest,
    ) -> Result<RespondActivityTaskFailedResponse, tonic::Status> {
        (**self).respond_activity_task_failed(request).await
    }

    async fn respond_activity_task_canceled(
        &self,
        request: RespondActivityTaskCanceledRequest,
    ) -> Result<RespondActivityTaskCanceledResponse, tonic::Status> {
        (**self).respond_activity_task_canceled(request).await
    }

    async fn record_activity_task_heartbeat(
        &self,
        request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, tonic::Status> {
        (**self).record_activity_task_heartbeat(request).await
    }

    async fn signal_workflow_execution(
        &self,
        request: SignalWorkflowExecutionRequest,
    ) -> Result<SignalWorkflowExecutionResponse, tonic::Status> {
        (**self).signal_workflow_execution(request).await
    }

    async fn query_workflow(
        &self,
        request: QueryWorkflowRequest,
    ) -> Result<QueryWorkflowResponse, tonic::Status> {
        (**self).query_workflow(request).await
    }

    async fn describe_workflow_execution(
        &self,
        request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, tonic::Status> {
        (**self).describe_workflow_execution(request).await
    }

    async fn terminate_workflow_execution(
        &self,
        request: TerminateWorkflowExecutionRequest,
    ) -> Result<TerminateWorkflowExecutionResponse, tonic::Status> {
        (**self).terminate_workflow_execution(request).await
    }

    async fn request_cancel_workflow_execution(
        &self,
        request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<RequestCancelWorkflowExecutionResponse, tonic::Status> {
        (**self).request_cancel_workflow_execution(request).await
    }

    async fn get_cluster_info(
        &self,
        request: GetClusterInfoRequest,
    ) -> Result<GetClusterInfoResponse, tonic::Status> {
        (**self).get_cluster_info(request).await
    }
}
