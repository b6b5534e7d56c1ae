//! End-to-end workflow task scenarios driven through the worker against a
//! recording service.

mod support;

use cascade_sdk::api::command::command;
use cascade_sdk::api::failure::{failure::FailureInfo, Failure, TimeoutFailureInfo};
use cascade_sdk::api::enums::TimeoutType;
use cascade_sdk::api::workflowservice::WorkflowQuery;
use cascade_sdk::error::converter_error;
use cascade_sdk::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::*;

fn worker(service: Arc<RecordingService>, registry: Arc<WorkflowRegistry>) -> WorkflowWorker {
    WorkflowWorker::new(
        service,
        registry,
        WorkflowWorkerConfig::new("default", "test-queue"),
    )
}

fn encoded_result(value: Value) -> WorkflowExecutionResult {
    Ok(Some(payloads(&[value])))
}

fn simple_workflow_registry() -> Arc<WorkflowRegistry> {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("SimpleWorkflow", |ctx: WorkflowContext, input| {
        Box::pin(async move {
            let name: String = match &input {
                Some(input) => DataConverter::default()
                    .from_payloads_at(input, 0)
                    .map_err(converter_error)?,
                None => String::new(),
            };
            let greeting: String = ctx
                .execute_activity(
                    ActivityOptions::new("Activity1").with_activity_id("id1"),
                    &[json!(name).into()],
                )
                .result()
                .await?;
            encoded_result(json!(greeting))
        })
    });
    registry
}

// ============================================================================
// Simple activity
// ============================================================================

#[tokio::test]
async fn test_simple_activity_first_task_schedules_activity() {
    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), simple_workflow_registry());

    let mut history = HistoryBuilder::new();
    history.workflow_started("SimpleWorkflow", &[json!("World")]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("SimpleWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    assert_eq!(
        command_names(&completed.commands),
        vec!["ScheduleActivityTask"]
    );
    match &completed.commands[0].attributes {
        Some(command::Attributes::ScheduleActivityTask(attrs)) => {
            assert_eq!(attrs.activity_id, "id1");
            assert_eq!(attrs.activity_type.as_ref().unwrap().name, "Activity1");
            let input: String = decode(attrs.input.as_ref().unwrap(), 0);
            assert_eq!(input, "World");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[tokio::test]
async fn test_simple_activity_completes_with_result() {
    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), simple_workflow_registry());

    let mut history = HistoryBuilder::new();
    history.workflow_started("SimpleWorkflow", &[json!("World")]);
    history.closed_workflow_task();
    let scheduled = history.activity_scheduled("id1", "Activity1");
    let started = history.activity_started(scheduled);
    history.activity_completed(scheduled, started, json!("Hello World"));
    history.open_workflow_task();

    worker
        .process_task(history.into_task("SimpleWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    assert_eq!(
        command_names(&completed.commands),
        vec!["CompleteWorkflowExecution"]
    );
    match &completed.commands[0].attributes {
        Some(command::Attributes::CompleteWorkflowExecution(attrs)) => {
            let result: String = decode(attrs.result.as_ref().unwrap(), 0);
            assert_eq!(result, "Hello World");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

// ============================================================================
// Activity failure
// ============================================================================

#[tokio::test]
async fn test_activity_failure_propagates_application_error() {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("FailingWorkflow", |ctx: WorkflowContext, _input| {
        Box::pin(async move {
            ctx.execute_activity(
                ActivityOptions::new("ActivityThatFails").with_activity_id("id1"),
                &[],
            )
            .result::<Value>()
            .await?;
            encoded_result(json!("unreachable"))
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), registry);

    let failure = FailureConverter::default()
        .error_to_failure(&CascadeError::from_message("simulated failure"));
    let mut history = HistoryBuilder::new();
    history.workflow_started("FailingWorkflow", &[]);
    history.closed_workflow_task();
    let scheduled = history.activity_scheduled("id1", "ActivityThatFails");
    let started = history.activity_started(scheduled);
    history.activity_failed(scheduled, started, failure);
    history.open_workflow_task();

    worker
        .process_task(history.into_task("FailingWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    assert_eq!(
        command_names(&completed.commands),
        vec!["FailWorkflowExecution"]
    );
    let failure = match &completed.commands[0].attributes {
        Some(command::Attributes::FailWorkflowExecution(attrs)) => {
            attrs.failure.as_ref().unwrap()
        }
        other => panic!("unexpected command: {other:?}"),
    };
    // The activity wrapper carries the untyped application cause.
    assert_eq!(failure.message, "activity error");
    assert!(failure.activity_failure_info().is_some());
    let cause = failure.cause.as_ref().unwrap();
    assert_eq!(cause.message, "simulated failure");
    let info = cause.application_failure_info().unwrap();
    assert_eq!(info.r#type, "");
    assert!(!info.non_retryable);
}

// ============================================================================
// Heartbeat timeout details
// ============================================================================

#[tokio::test]
async fn test_activity_timeout_preserves_last_heartbeat_details() {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("TimeoutWorkflow", |ctx: WorkflowContext, _input| {
        Box::pin(async move {
            let result = ctx
                .execute_activity(
                    ActivityOptions::new("Activity1").with_activity_id("activityID"),
                    &[],
                )
                .await;
            let err = result.expect_err("activity should time out");
            let timeout = match err.cause() {
                Some(CascadeError::Timeout(timeout)) => timeout,
                other => panic!("expected timeout cause, got {other:?}"),
            };
            assert!(timeout.has_last_heartbeat_details());
            let details: String = timeout.last_heartbeat_details().get(0).unwrap();
            encoded_result(json!(details))
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), registry);

    let timeout_failure = Failure {
        message: "timeout".to_string(),
        failure_info: Some(FailureInfo::TimeoutFailureInfo(TimeoutFailureInfo {
            timeout_type: TimeoutType::Heartbeat as i32,
            last_heartbeat_details: Some(payloads(&[json!("my details")])),
        })),
        ..Default::default()
    };
    let mut history = HistoryBuilder::new();
    history.workflow_started("TimeoutWorkflow", &[]);
    history.closed_workflow_task();
    let scheduled = history.activity_scheduled("activityID", "Activity1");
    let started = history.activity_started(scheduled);
    history.activity_timed_out(scheduled, started, timeout_failure);
    history.open_workflow_task();

    worker
        .process_task(history.into_task("TimeoutWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    match &completed.commands[0].attributes {
        Some(command::Attributes::CompleteWorkflowExecution(attrs)) => {
            let details: String = decode(attrs.result.as_ref().unwrap(), 0);
            assert_eq!(details, "my details");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

// ============================================================================
// Timers
// ============================================================================

fn timer_workflow_registry() -> Arc<WorkflowRegistry> {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("TimerWorkflow", |ctx: WorkflowContext, _input| {
        Box::pin(async move {
            ctx.sleep(std::time::Duration::from_secs(30)).await?;
            encoded_result(json!("woke up"))
        })
    });
    registry
}

#[tokio::test]
async fn test_timer_workflow_starts_timer_then_completes() {
    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), timer_workflow_registry());

    let mut history = HistoryBuilder::new();
    history.workflow_started("TimerWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("TimerWorkflow"))
        .await
        .unwrap();
    assert_eq!(
        command_names(&service.last_completed().commands),
        vec!["StartTimer"]
    );

    let mut history = HistoryBuilder::new();
    history.workflow_started("TimerWorkflow", &[]);
    history.closed_workflow_task();
    let timer_started = history.timer_started("1");
    history.timer_fired("1", timer_started);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("TimerWorkflow"))
        .await
        .unwrap();
    assert_eq!(
        command_names(&service.last_completed().commands),
        vec!["CompleteWorkflowExecution"]
    );
}

// ============================================================================
// Signals
// ============================================================================

#[tokio::test]
async fn test_signal_delivery_resumes_workflow() {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("SignalWorkflow", |ctx: WorkflowContext, _input| {
        Box::pin(async move {
            let channel = ctx.signal_channel("greeting");
            let (signal, _more) = channel.receive().await;
            let value: String = DataConverter::default()
                .from_payloads_at(&signal.unwrap_or_default(), 0)
                .map_err(converter_error)?;
            encoded_result(json!(format!("got {value}")))
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), registry);

    // First task: the workflow parks on the signal channel.
    let mut history = HistoryBuilder::new();
    history.workflow_started("SignalWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("SignalWorkflow"))
        .await
        .unwrap();
    assert!(service.last_completed().commands.is_empty());

    // Second task: the signal arrived.
    let mut history = HistoryBuilder::new();
    history.workflow_started("SignalWorkflow", &[]);
    history.closed_workflow_task();
    history.workflow_signaled("greeting", &[json!("hello")]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("SignalWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    match &completed.commands[0].attributes {
        Some(command::Attributes::CompleteWorkflowExecution(attrs)) => {
            let result: String = decode(attrs.result.as_ref().unwrap(), 0);
            assert_eq!(result, "got hello");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

// ============================================================================
// Workflow cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_request_cancels_timer_and_workflow() {
    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), timer_workflow_registry());

    let mut history = HistoryBuilder::new();
    history.workflow_started("TimerWorkflow", &[]);
    history.closed_workflow_task();
    history.timer_started("1");
    history.cancel_requested();
    history.open_workflow_task();
    worker
        .process_task(history.into_task("TimerWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    assert_eq!(
        command_names(&completed.commands),
        vec!["CancelTimer", "CancelWorkflowExecution"]
    );
}

// ============================================================================
// Panics in workflow code
// ============================================================================

#[tokio::test]
async fn test_workflow_panic_fails_task_non_retryably() {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("PanickyWorkflow", |_ctx: WorkflowContext, input| {
        Box::pin(async move {
            if input.is_none() {
                panic!("arithmetic went sideways");
            }
            Ok(None)
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), registry);

    let mut history = HistoryBuilder::new();
    history.workflow_started("PanickyWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("PanickyWorkflow"))
        .await
        .unwrap();

    let failed = service.last_failed();
    assert_eq!(failed.cause, "workflow panic");
    let failure = failed.failure.as_ref().unwrap();
    assert_eq!(failure.message, "arithmetic went sideways");
    let info = failure.application_failure_info().unwrap();
    assert_eq!(info.r#type, "PanicError");
    assert!(info.non_retryable);
}

// ============================================================================
// Side effects
// ============================================================================

#[tokio::test]
async fn test_side_effect_records_once_and_replays() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(WorkflowRegistry::new());
    let call_counter = calls.clone();
    registry.register("SideEffectWorkflow", move |ctx: WorkflowContext, _input| {
        let call_counter = call_counter.clone();
        Box::pin(async move {
            let lucky: i64 = ctx.side_effect(|| {
                call_counter.fetch_add(1, Ordering::SeqCst);
                42
            })?;
            ctx.sleep(std::time::Duration::from_secs(5)).await?;
            encoded_result(json!(lucky))
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), registry);

    // First task runs the side effect and records the marker.
    let mut history = HistoryBuilder::new();
    history.workflow_started("SideEffectWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("SideEffectWorkflow"))
        .await
        .unwrap();
    assert_eq!(
        command_names(&service.last_completed().commands),
        vec!["RecordMarker", "StartTimer"]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Replay returns the recorded value without re-running the function.
    let mut history = HistoryBuilder::new();
    history.workflow_started("SideEffectWorkflow", &[]);
    history.closed_workflow_task();
    history.marker_recorded("SideEffect", "1", json!(42));
    let timer_started = history.timer_started("2");
    history.timer_fired("2", timer_started);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("SideEffectWorkflow"))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let completed = service.last_completed();
    match &completed.commands[0].attributes {
        Some(command::Attributes::CompleteWorkflowExecution(attrs)) => {
            let value: i64 = decode(attrs.result.as_ref().unwrap(), 0);
            assert_eq!(value, 42);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

// ============================================================================
// Local activities
// ============================================================================

fn local_activity_registry(calls: Arc<AtomicUsize>, fail: bool) -> Arc<WorkflowRegistry> {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("LocalActivityWorkflow", move |ctx: WorkflowContext, _input| {
        let calls = calls.clone();
        Box::pin(async move {
            let looked_up = ctx.execute_local_activity(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(CascadeError::from_message("lookup failed"))
                } else {
                    Ok("from-cache".to_string())
                }
            });
            let value = match looked_up {
                Ok(value) => value,
                Err(err) => format!("error: {err}"),
            };
            ctx.sleep(std::time::Duration::from_secs(1)).await?;
            encoded_result(json!(value))
        })
    });
    registry
}

#[tokio::test]
async fn test_local_activity_records_once_and_replays() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), local_activity_registry(calls.clone(), false));

    let mut history = HistoryBuilder::new();
    history.workflow_started("LocalActivityWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("LocalActivityWorkflow"))
        .await
        .unwrap();
    assert_eq!(
        command_names(&service.last_completed().commands),
        vec!["RecordMarker", "StartTimer"]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let mut history = HistoryBuilder::new();
    history.workflow_started("LocalActivityWorkflow", &[]);
    history.closed_workflow_task();
    history.marker_recorded("LocalActivity", "1", json!("from-cache"));
    let timer_started = history.timer_started("2");
    history.timer_fired("2", timer_started);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("LocalActivityWorkflow"))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let completed = service.last_completed();
    match &completed.commands[0].attributes {
        Some(command::Attributes::CompleteWorkflowExecution(attrs)) => {
            let value: String = decode(attrs.result.as_ref().unwrap(), 0);
            assert_eq!(value, "from-cache");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[tokio::test]
async fn test_local_activity_failure_replays_as_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), local_activity_registry(calls.clone(), true));

    let failure =
        FailureConverter::default().error_to_failure(&CascadeError::from_message("lookup failed"));
    let mut history = HistoryBuilder::new();
    history.workflow_started("LocalActivityWorkflow", &[]);
    history.closed_workflow_task();
    history.marker_recorded_failed("LocalActivity", "1", failure);
    let timer_started = history.timer_started("2");
    history.timer_fired("2", timer_started);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("LocalActivityWorkflow"))
        .await
        .unwrap();

    // Replay takes the recorded failure; the function never runs.
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let completed = service.last_completed();
    match &completed.commands[0].attributes {
        Some(command::Attributes::CompleteWorkflowExecution(attrs)) => {
            let value: String = decode(attrs.result.as_ref().unwrap(), 0);
            assert_eq!(value, "error: lookup failed");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_query_answered_from_handler() {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("QueryableWorkflow", |ctx: WorkflowContext, _input| {
        Box::pin(async move {
            ctx.set_query_handler("state", |_args| {
                DataConverter::default()
                    .to_payloads(&[json!("waiting").into()])
                    .map_err(converter_error)
            });
            let channel = ctx.signal_channel("never");
            let _ = channel.receive().await;
            Ok(None)
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), registry);

    let mut history = HistoryBuilder::new();
    history.workflow_started("QueryableWorkflow", &[]);
    history.open_workflow_task();
    let mut task = history.into_task("QueryableWorkflow");
    task.query = Some(WorkflowQuery {
        query_type: "state".to_string(),
        query_args: None,
        header: None,
    });
    worker.process_task(task).await.unwrap();

    let completed = service.last_completed();
    let answer: String = decode(completed.query_result.as_ref().unwrap(), 0);
    assert_eq!(answer, "waiting");
}

// ============================================================================
// Unknown workflow types
// ============================================================================

#[tokio::test]
async fn test_unregistered_workflow_fails_task() {
    let service = Arc::new(RecordingService::default());
    let worker = worker(service.clone(), Arc::new(WorkflowRegistry::new()));

    let mut history = HistoryBuilder::new();
    history.workflow_started("NowhereWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("NowhereWorkflow"))
        .await
        .unwrap();

    let failed = service.last_failed();
    let failure = failed.failure.as_ref().unwrap();
    assert!(failure
        .message
        .contains("unable to find workflowType=NowhereWorkflow"));
}
