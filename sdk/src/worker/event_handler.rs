//! Drives one workflow task: history events in, commands out.
//!
//! Events are delivered in event-id order. Command-recording events
//! reconcile against the commands the re-executed workflow emits (any
//! mismatch is fatal non-determinism); completion events resolve machine
//! callbacks; each `WorkflowTaskStarted` boundary runs the coroutine
//! scheduler until every coroutine is blocked. The commands accumulated by
//! the final burst, plus at most one terminal command, form the response.

use crate::worker::commands::marker_id_of;
use crate::worker::registry::WorkflowFunction;
use crate::workflow::context::{canceled_error, WorkflowContext};
use crate::workflow::environment::{MarkerResult, WorkflowEnvironment};
use cascade_core::api::command::{command, Command};
use cascade_core::api::common::Payloads;
use cascade_core::api::history::{history_event, HistoryEvent};
use cascade_core::api::workflowservice::PollWorkflowTaskQueueResponse;
use cascade_core::error::{CascadeError, ContinueAsNewError, PanicError};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// How the workflow ended, when this task ended it.
#[derive(Debug, Clone)]
pub enum WorkflowOutcome {
    Completed(Option<Payloads>),
    Failed(CascadeError),
    Canceled,
    ContinuedAsNew(ContinueAsNewError),
}

/// The product of one workflow task.
pub struct WorkflowTaskResult {
    /// Commands for `RespondWorkflowTaskCompleted`, in emission order.
    pub commands: Vec<Command>,
    /// Answer to the task's query, when one was attached.
    pub query_result: Option<Result<Payloads, CascadeError>>,
    /// Set when the workflow reached a terminal state in this task.
    pub outcome: Option<WorkflowOutcome>,
}

/// Executes workflow tasks against a [`WorkflowEnvironment`].
pub struct WorkflowExecutionEventHandler {
    env: Arc<WorkflowEnvironment>,
}

impl WorkflowExecutionEventHandler {
    pub(crate) fn new(env: Arc<WorkflowEnvironment>) -> Self {
        Self { env }
    }

    /// Process a polled workflow task. An `Err` means the workflow task
    /// itself failed (non-determinism, workflow panic, malformed history)
    /// and should be reported via `RespondWorkflowTaskFailed`.
    pub fn handle_workflow_task(
        &self,
        task: &PollWorkflowTaskQueueResponse,
        workflow_fn: &WorkflowFunction,
    ) -> Result<WorkflowTaskResult, CascadeError> {
        let result = self.run_task(task, workflow_fn);
        // Parked coroutines reference the environment; release them so the
        // per-task environment does not outlive the task.
        self.env.scheduler.shutdown();
        result
    }

    fn run_task(
        &self,
        task: &PollWorkflowTaskQueueResponse,
        workflow_fn: &WorkflowFunction,
    ) -> Result<WorkflowTaskResult, CascadeError> {
        let history = task
            .history
            .as_ref()
            .ok_or_else(|| CascadeError::from_message("workflow task carries no history"))?;
        let events = &history.events;
        let last_started = events.iter().rposition(|event| {
            matches!(
                event.attributes,
                Some(history_event::Attributes::WorkflowTaskStarted(_))
            )
        });

        for (index, event) in events.iter().enumerate() {
            if let Some(timestamp) = &event.event_time {
                self.env
                    .set_now_millis(timestamp.seconds * 1_000 + i64::from(timestamp.nanos) / 1_000_000);
            }
            self.process_event(index, event, events, last_started, workflow_fn)?;
        }

        let query_result = task
            .query
            .as_ref()
            .map(|query| self.env.answer_query(&query.query_type, query.query_args.clone()));

        let outcome = self.env.workflow_result.lock().take();
        let mut commands = self.env.commands.lock().take_new_commands();
        let outcome = outcome.map(|result| self.terminal_command(result, &mut commands));

        Ok(WorkflowTaskResult {
            commands,
            query_result,
            outcome,
        })
    }

    fn process_event(
        &self,
        index: usize,
        event: &HistoryEvent,
        events: &[HistoryEvent],
        last_started: Option<usize>,
        workflow_fn: &WorkflowFunction,
    ) -> Result<(), CascadeError> {
        use history_event::Attributes::*;

        let Some(attributes) = &event.attributes else {
            return Ok(());
        };
        let commands = || self.env.commands.lock();
        match attributes {
            WorkflowExecutionStarted(attrs) => {
                let ctx = WorkflowContext::root(self.env.clone(), attrs.header.as_ref());
                let future = workflow_fn(ctx, attrs.input.clone());
                let env = self.env.clone();
                self.env.scheduler.spawn(Box::pin(async move {
                    let result = future.await;
                    *env.workflow_result.lock() = Some(result);
                }));
            }
            WorkflowTaskStarted(_) => {
                let replaying = Some(index) != last_started;
                self.env.set_replaying(replaying);
                // Commands emitted by the previous burst must all have been
                // matched by now; leftovers mean the history diverged.
                commands().check_pending_empty()?;
                self.preplay_markers(&events[index + 1..]);
                self.run_scheduler()?;
            }
            WorkflowTaskScheduled(_) | WorkflowTaskCompleted(_) | WorkflowTaskFailed(_) => {}
            WorkflowExecutionSignaled(attrs) => {
                self.env
                    .deliver_signal(&attrs.signal_name, attrs.input.clone());
            }
            WorkflowExecutionCancelRequested(_) => {
                self.env.cancel_requested.store(true, Ordering::SeqCst);
                self.env.root_scope.cancel(canceled_error());
            }
            ActivityTaskScheduled(attrs) => {
                commands().handle_activity_task_scheduled(event.event_id, attrs)?
            }
            ActivityTaskStarted(attrs) => commands().handle_activity_task_started(attrs)?,
            ActivityTaskCompleted(attrs) => commands().handle_activity_task_completed(attrs)?,
            ActivityTaskFailed(attrs) => commands().handle_activity_task_failed(attrs)?,
            ActivityTaskTimedOut(attrs) => commands().handle_activity_task_timed_out(attrs)?,
            ActivityTaskCancelRequested(attrs) => {
                commands().handle_activity_task_cancel_requested(attrs)?
            }
            ActivityTaskCanceled(attrs) => commands().handle_activity_task_canceled(attrs)?,
            TimerStarted(attrs) => commands().handle_timer_started(attrs)?,
            TimerFired(attrs) => commands().handle_timer_fired(attrs)?,
            TimerCanceled(attrs) => commands().handle_timer_canceled(attrs)?,
            MarkerRecorded(attrs) => {
                self.record_marker_result(attrs);
                commands().handle_marker_recorded(attrs)?
            }
            UpsertWorkflowSearchAttributes(attrs) => {
                commands().handle_upsert_search_attributes(attrs)?
            }
            SignalExternalWorkflowExecutionInitiated(attrs) => {
                commands().handle_signal_external_initiated(event.event_id, attrs)?
            }
            SignalExternalWorkflowExecutionFailed(attrs) => {
                commands().handle_signal_external_failed(attrs)?
            }
            ExternalWorkflowExecutionSignaled(attrs) => {
                commands().handle_external_workflow_signaled(attrs)?
            }
            RequestCancelExternalWorkflowExecutionInitiated(attrs) => {
                commands().handle_cancel_external_initiated(event.event_id, attrs)?
            }
            RequestCancelExternalWorkflowExecutionFailed(attrs) => {
                commands().handle_cancel_external_failed(attrs)?
            }
            ExternalWorkflowExecutionCancelRequested(attrs) => {
                commands().handle_external_workflow_cancel_requested(attrs)?
            }
            StartChildWorkflowExecutionInitiated(attrs) => {
                commands().handle_start_child_workflow_initiated(attrs)?
            }
            StartChildWorkflowExecutionFailed(attrs) => {
                commands().handle_start_child_workflow_failed(attrs)?
            }
            ChildWorkflowExecution(attrs) => {
                commands().handle_child_workflow_execution_event(attrs)?
            }
            // Terminal events only appear when replaying an already-closed
            // workflow; there is nothing left to drive.
            WorkflowExecutionCompleted(_)
            | WorkflowExecutionFailed(_)
            | WorkflowExecutionCanceled(_)
            | WorkflowExecutionTerminated(_)
            | WorkflowExecutionContinuedAsNew(_) => {}
        }
        Ok(())
    }

    /// Marker results recorded by the upcoming burst must be visible before
    /// the burst runs, because side effects consult them synchronously.
    fn preplay_markers(&self, upcoming: &[HistoryEvent]) {
        for event in upcoming {
            match &event.attributes {
                Some(history_event::Attributes::WorkflowTaskStarted(_)) => break,
                Some(history_event::Attributes::MarkerRecorded(attrs)) => {
                    self.record_marker_result(attrs)
                }
                _ => {}
            }
        }
    }

    fn record_marker_result(
        &self,
        attrs: &cascade_core::api::history::MarkerRecordedEventAttributes,
    ) {
        let Some(id) = marker_id_of(&self.env.data_converter, &attrs.details) else {
            tracing::warn!(marker = %attrs.marker_name, "marker without id detail");
            return;
        };
        self.env.record_marker_result(
            &attrs.marker_name,
            &id,
            MarkerResult {
                data: attrs.details.get("data").cloned(),
                failure: attrs.failure.clone(),
            },
        );
    }

    fn run_scheduler(&self) -> Result<(), CascadeError> {
        self.env
            .scheduler
            .run_until_blocked()
            .map_err(|panic| CascadeError::Panic(PanicError::workflow(panic, "")))
    }

    /// Append the terminal command for a finished workflow.
    fn terminal_command(
        &self,
        result: Result<Option<Payloads>, CascadeError>,
        commands: &mut Vec<Command>,
    ) -> WorkflowOutcome {
        let cancel_requested = self.env.cancel_requested.load(Ordering::SeqCst);
        match result {
            Ok(payloads) => {
                commands.push(Command {
                    attributes: Some(command::Attributes::CompleteWorkflowExecution(
                        command::CompleteWorkflowExecutionCommandAttributes {
                            result: payloads.clone(),
                        },
                    )),
                });
                WorkflowOutcome::Completed(payloads)
            }
            Err(CascadeError::ContinueAsNew(directive)) => {
                commands.push(Command {
                    attributes: Some(command::Attributes::ContinueAsNewWorkflowExecution(
                        command::ContinueAsNewWorkflowExecutionCommandAttributes {
                            workflow_type: Some(cascade_core::api::common::WorkflowType {
                                name: directive.workflow_type.clone(),
                            }),
                            task_queue: directive.task_queue.clone().unwrap_or_default(),
                            input: Some(directive.input.clone()),
                            header: directive.header.clone(),
                            retry_policy: directive.retry_policy.as_ref().map(|p| p.to_proto()),
                            workflow_run_timeout: directive
                                .workflow_run_timeout
                                .map(cascade_core::api::duration_to_proto),
                            workflow_task_timeout: directive
                                .workflow_task_timeout
                                .map(cascade_core::api::duration_to_proto),
                        },
                    )),
                });
                WorkflowOutcome::ContinuedAsNew(directive)
            }
            Err(error) if cancel_requested && error.is_canceled() => {
                let details = match &error {
                    CascadeError::Canceled(canceled) => canceled
                        .details()
                        .to_payloads(&self.env.data_converter)
                        .ok()
                        .flatten(),
                    _ => None,
                };
                commands.push(Command {
                    attributes: Some(command::Attributes::CancelWorkflowExecution(
                        command::CancelWorkflowExecutionCommandAttributes { details },
                    )),
                });
                WorkflowOutcome::Canceled
            }
            Err(error) => {
                let failure = self.env.failure_converter.error_to_failure(&error);
                commands.push(Command {
                    attributes: Some(command::Attributes::FailWorkflowExecution(
                        command::FailWorkflowExecutionCommandAttributes {
                            failure: Some(failure),
                        },
                    )),
                });
                WorkflowOutcome::Failed(error)
            }
        }
    }
}
