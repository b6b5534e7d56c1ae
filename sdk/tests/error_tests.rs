//! Error-surface scenarios: continue-as-new, header propagation and
//! signal-external resolution.

mod support;

use cascade_sdk::api::command::command;
use cascade_sdk::api::common::Header;
use cascade_sdk::api::enums::SignalExternalWorkflowExecutionFailedCause;
use cascade_sdk::prelude::*;
use std::time::Duration;
use support::*;

fn worker_with_propagators(
    service: Arc<RecordingService>,
    registry: Arc<WorkflowRegistry>,
    propagators: Vec<Arc<dyn ContextPropagator>>,
) -> WorkflowWorker {
    let mut config = WorkflowWorkerConfig::new("default", "test-queue");
    config.propagators = propagators;
    WorkflowWorker::new(service, registry, config)
}

fn continue_as_new_registry() -> Arc<WorkflowRegistry> {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("continueAsNewWorkflowFn", |ctx: WorkflowContext, _input| {
        Box::pin(async move {
            let directive = ctx.continue_as_new(
                "Fn",
                ContinueAsNewOptions {
                    retry_policy: Some(RetryPolicy {
                        maximum_attempts: 23,
                        initial_interval: Some(Duration::from_secs(2)),
                        backoff_coefficient: 1.1,
                        maximum_interval: Some(Duration::from_secs(60)),
                        non_retryable_error_types: vec![],
                    }),
                    ..Default::default()
                },
                &[json!(1234).into(), json!("some random input").into()],
            );
            // The directive is a sentinel error; returning it finishes this
            // run and starts the next one.
            let continued = directive.as_continue_as_new().expect("directive");
            assert_eq!(continued.workflow_type, "Fn");
            assert_eq!(
                continued.retry_policy.as_ref().unwrap().maximum_attempts,
                23
            );
            Err(directive)
        })
    });
    registry
}

#[tokio::test]
async fn test_continue_as_new_emits_command_with_retry_policy() {
    let service = Arc::new(RecordingService::default());
    let worker = worker_with_propagators(service.clone(), continue_as_new_registry(), vec![]);

    let mut history = HistoryBuilder::new();
    history.workflow_started("continueAsNewWorkflowFn", &[json!(101)]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("continueAsNewWorkflowFn"))
        .await
        .unwrap();

    let completed = service.last_completed();
    assert_eq!(
        command_names(&completed.commands),
        vec!["ContinueAsNewWorkflowExecution"]
    );
    let attrs = match &completed.commands[0].attributes {
        Some(command::Attributes::ContinueAsNewWorkflowExecution(attrs)) => attrs,
        other => panic!("unexpected command: {other:?}"),
    };

    assert_eq!(attrs.workflow_type.as_ref().unwrap().name, "Fn");
    let input = attrs.input.as_ref().unwrap();
    let first: i64 = decode(input, 0);
    let second: String = decode(input, 1);
    assert_eq!(first, 1234);
    assert_eq!(second, "some random input");

    let retry_policy = attrs.retry_policy.as_ref().unwrap();
    assert_eq!(retry_policy.maximum_attempts, 23);
    assert_eq!(retry_policy.backoff_coefficient, 1.1);
    assert_eq!(retry_policy.initial_interval.as_ref().unwrap().seconds, 2);
    assert_eq!(retry_policy.maximum_interval.as_ref().unwrap().seconds, 60);
}

#[tokio::test]
async fn test_continue_as_new_propagates_header_values() {
    let service = Arc::new(RecordingService::default());
    let worker = worker_with_propagators(
        service.clone(),
        continue_as_new_registry(),
        vec![Arc::new(KeysPropagator::new(vec!["test".to_string()]))],
    );

    let mut header = Header::default();
    header.fields.insert(
        "test".to_string(),
        DataConverter::default().to_payload("test-data").unwrap(),
    );
    let mut history = HistoryBuilder::new();
    history.workflow_started_with_header(
        "continueAsNewWorkflowFn",
        &[json!(101)],
        Some(header.clone()),
    );
    history.open_workflow_task();
    worker
        .process_task(history.into_task("continueAsNewWorkflowFn"))
        .await
        .unwrap();

    let completed = service.last_completed();
    let attrs = match &completed.commands[0].attributes {
        Some(command::Attributes::ContinueAsNewWorkflowExecution(attrs)) => attrs,
        other => panic!("unexpected command: {other:?}"),
    };
    assert_eq!(attrs.header.as_ref(), Some(&header));
}

#[tokio::test]
async fn test_signal_external_not_found_resolves_unknown_error() {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("SignallingWorkflow", |ctx: WorkflowContext, _input| {
        Box::pin(async move {
            let result = ctx
                .signal_external_workflow("nonexistent", "", "poke", &[])
                .await;
            let outcome = match result {
                Err(CascadeError::UnknownExternalWorkflowExecution(_)) => "unknown-workflow",
                Err(_) => "other-error",
                Ok(_) => "delivered",
            };
            let payloads = DataConverter::default()
                .to_payloads(&[json!(outcome).into()])
                .map_err(cascade_sdk::error::converter_error)?;
            Ok(Some(payloads))
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker_with_propagators(service.clone(), registry, vec![]);

    // First task emits the signal command.
    let mut history = HistoryBuilder::new();
    history.workflow_started("SignallingWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("SignallingWorkflow"))
        .await
        .unwrap();
    assert_eq!(
        command_names(&service.last_completed().commands),
        vec!["SignalExternalWorkflowExecution"]
    );

    // Second task: the service reports the target does not exist.
    let mut history = HistoryBuilder::new();
    history.workflow_started("SignallingWorkflow", &[]);
    history.closed_workflow_task();
    let initiated = history.signal_external_initiated("poke", "1");
    history.signal_external_failed(
        initiated,
        SignalExternalWorkflowExecutionFailedCause::ExternalWorkflowExecutionNotFound as i32,
    );
    history.open_workflow_task();
    worker
        .process_task(history.into_task("SignallingWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    match &completed.commands[0].attributes {
        Some(command::Attributes::CompleteWorkflowExecution(attrs)) => {
            let outcome: String = decode(attrs.result.as_ref().unwrap(), 0);
            assert_eq!(outcome, "unknown-workflow");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_workflow_round_trips_contractual_message() {
    let registry = Arc::new(WorkflowRegistry::new());
    registry.register("TypedFailureWorkflow", |_ctx: WorkflowContext, _input| {
        Box::pin(async move {
            Err(CascadeError::Application(ApplicationError::with_options(
                "message",
                "customType",
                ApplicationErrorOptions {
                    non_retryable: true,
                    cause: Some(CascadeError::from_message("cause error")),
                    ..Default::default()
                },
            )))
        })
    });

    let service = Arc::new(RecordingService::default());
    let worker = worker_with_propagators(service.clone(), registry, vec![]);

    let mut history = HistoryBuilder::new();
    history.workflow_started("TypedFailureWorkflow", &[]);
    history.open_workflow_task();
    worker
        .process_task(history.into_task("TypedFailureWorkflow"))
        .await
        .unwrap();

    let completed = service.last_completed();
    let failure = match &completed.commands[0].attributes {
        Some(command::Attributes::FailWorkflowExecution(attrs)) => {
            attrs.failure.as_ref().unwrap()
        }
        other => panic!("unexpected command: {other:?}"),
    };

    // Decoding the emitted failure restores the exact error string.
    let error = FailureConverter::default().failure_to_error(failure);
    assert_eq!(
        error.to_string(),
        "message (type: customType, retryable: false): cause error"
    );
}
