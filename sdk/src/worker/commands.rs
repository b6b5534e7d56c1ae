//! Command state machines and the commands helper.
//!
//! Every operation a workflow initiates gets a state machine keyed by
//! `(kind, id)`. Machines accumulate outgoing commands for the current
//! workflow task and reconcile with history events on replay: each
//! command-recording event must match the next command the re-executed
//! workflow emitted, in order, or the task fails with a non-determinism
//! error. Completion events resolve machine callbacks, which wake the
//! suspended coroutines.

use crate::workflow::future::CommandCallback;
use cascade_core::api::command::{command, Command};
use cascade_core::api::common::Payloads;
use cascade_core::api::enums::{
    CancelExternalWorkflowExecutionFailedCause, RetryState,
    SignalExternalWorkflowExecutionFailedCause, TimeoutType,
};
use cascade_core::api::history;
use cascade_core::api::history::ChildWorkflowExecutionStage;
use cascade_core::converter::{DataConverter, EncodedValues, FailureConverter};
use cascade_core::error::{
    ActivityError, ApplicationError, CanceledError, CascadeError, ChildWorkflowExecutionError,
    NonDeterministicError, TerminatedError, TimeoutError, UnknownExternalWorkflowExecutionError,
};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CommandKind {
    Activity,
    CancelActivity,
    Timer,
    CancelTimer,
    ChildWorkflow,
    SignalExternal,
    CancelExternal,
    Marker,
    UpsertSearchAttributes,
}

impl CommandKind {
    fn name(&self) -> &'static str {
        match self {
            CommandKind::Activity => "ScheduleActivityTask",
            CommandKind::CancelActivity => "RequestCancelActivityTask",
            CommandKind::Timer => "StartTimer",
            CommandKind::CancelTimer => "CancelTimer",
            CommandKind::ChildWorkflow => "StartChildWorkflowExecution",
            CommandKind::SignalExternal => "SignalExternalWorkflowExecution",
            CommandKind::CancelExternal => "RequestCancelExternalWorkflowExecution",
            CommandKind::Marker => "RecordMarker",
            CommandKind::UpsertSearchAttributes => "UpsertWorkflowSearchAttributes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CommandId {
    kind: CommandKind,
    id: String,
}

impl CommandId {
    fn new(kind: CommandKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MachineState {
    /// Machine exists; its command has not been acknowledged by history.
    Created,
    /// Command handed to the server in this task's response.
    CommandSent,
    /// The command's recording event was matched in history.
    Initiated,
    Started,
    /// User code requested cancellation after the command was initiated.
    CancelRequested,
    Completed,
    Canceled,
    Failed,
    TimedOut,
}

impl MachineState {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            MachineState::Completed
                | MachineState::Canceled
                | MachineState::Failed
                | MachineState::TimedOut
        )
    }
}

struct StateMachine {
    id: CommandId,
    state: MachineState,
    command: Command,
    callback: Option<CommandCallback>,
    scheduled_event_id: i64,
}

impl StateMachine {
    fn new(id: CommandId, command: Command, callback: Option<CommandCallback>) -> Self {
        Self {
            id,
            state: MachineState::Created,
            command,
            callback,
            scheduled_event_id: 0,
        }
    }

    fn resolve(&mut self, state: MachineState, payloads: Option<Payloads>, error: Option<CascadeError>) {
        self.state = state;
        if let Some(callback) = self.callback.take() {
            callback(payloads, error);
        }
    }
}

fn non_deterministic(message: impl Into<String>) -> CascadeError {
    CascadeError::NonDeterministic(NonDeterministicError::new(message))
}

/// Tracks every state machine of one workflow execution and reconciles
/// emitted commands with history.
pub(crate) struct CommandsHelper {
    data_converter: DataConverter,
    failure_converter: FailureConverter,
    order: Vec<CommandId>,
    machines: HashMap<CommandId, StateMachine>,
    /// Emitted commands awaiting their recording event, in emission order.
    pending_match: VecDeque<CommandId>,
    scheduled_event_id_to_activity_id: HashMap<i64, String>,
    initiated_event_id_to_signal_id: HashMap<i64, String>,
    initiated_event_id_to_cancellation_id: HashMap<i64, String>,
}

impl CommandsHelper {
    pub(crate) fn new(data_converter: DataConverter, failure_converter: FailureConverter) -> Self {
        Self {
            data_converter,
            failure_converter,
            order: Vec::new(),
            machines: HashMap::new(),
            pending_match: VecDeque::new(),
            scheduled_event_id_to_activity_id: HashMap::new(),
            initiated_event_id_to_signal_id: HashMap::new(),
            initiated_event_id_to_cancellation_id: HashMap::new(),
        }
    }

    fn add_machine(&mut self, machine: StateMachine) {
        self.order.push(machine.id.clone());
        self.pending_match.push_back(machine.id.clone());
        self.machines.insert(machine.id.clone(), machine);
    }

    /// Pop the next expected command and verify it against a recording
    /// event. The verifier receives the machine's command.
    fn match_event(
        &mut self,
        kind: CommandKind,
        event_name: &str,
        verify: impl FnOnce(&Command) -> Result<(), String>,
    ) -> Result<&mut StateMachine, CascadeError> {
        let Some(expected) = self.pending_match.pop_front() else {
            return Err(non_deterministic(format!(
                "history records {event_name} but the workflow emitted no matching command"
            )));
        };
        if expected.kind != kind {
            return Err(non_deterministic(format!(
                "command mismatch: workflow emitted {} (id {:?}), history records {event_name}",
                expected.kind.name(),
                expected.id
            )));
        }
        let machine = self
            .machines
            .get_mut(&expected)
            .expect("pending command has a machine");
        if let Err(detail) = verify(&machine.command) {
            return Err(non_deterministic(format!(
                "command mismatch for {event_name}: {detail}"
            )));
        }
        machine.state = MachineState::Initiated;
        Ok(machine)
    }

    /// Commands emitted during replay must all have been consumed by their
    /// recording events before the next workflow task starts.
    pub(crate) fn check_pending_empty(&self) -> Result<(), CascadeError> {
        match self.pending_match.front() {
            None => Ok(()),
            Some(extra) => Err(non_deterministic(format!(
                "workflow emitted {} (id {:?}) not present in history",
                extra.kind.name(),
                extra.id
            ))),
        }
    }

    /// Drain commands for the task response, in creation order.
    pub(crate) fn take_new_commands(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        for id in &self.order {
            let machine = self.machines.get_mut(id).expect("ordered machine exists");
            if machine.state == MachineState::Created {
                machine.state = MachineState::CommandSent;
                commands.push(machine.command.clone());
            }
        }
        commands
    }

    // ========================================================================
    // Activities
    // ========================================================================

    pub(crate) fn schedule_activity(
        &mut self,
        attributes: command::ScheduleActivityTaskCommandAttributes,
        callback: CommandCallback,
    ) {
        let id = CommandId::new(CommandKind::Activity, attributes.activity_id.clone());
        let command = Command {
            attributes: Some(command::Attributes::ScheduleActivityTask(attributes)),
        };
        self.add_machine(StateMachine::new(id, command, Some(callback)));
    }

    /// Request cancellation of a scheduled activity. Unsent activities are
    /// dropped and resolved canceled immediately; initiated ones get a
    /// cancel command and resolve when the canceled event arrives.
    pub(crate) fn request_cancel_activity(&mut self, activity_id: &str) {
        let id = CommandId::new(CommandKind::Activity, activity_id);
        let Some(machine) = self.machines.get_mut(&id) else {
            return;
        };
        match machine.state {
            MachineState::Created => {
                machine.resolve(
                    MachineState::Canceled,
                    None,
                    Some(CascadeError::Canceled(CanceledError::new())),
                );
                self.pending_match.retain(|pending| pending != &id);
            }
            MachineState::Initiated | MachineState::Started | MachineState::CommandSent => {
                let scheduled_event_id = machine.scheduled_event_id;
                machine.state = MachineState::CancelRequested;
                let cancel_id = CommandId::new(CommandKind::CancelActivity, activity_id);
                if self.machines.contains_key(&cancel_id) {
                    return;
                }
                let command = Command {
                    attributes: Some(command::Attributes::RequestCancelActivityTask(
                        command::RequestCancelActivityTaskCommandAttributes {
                            scheduled_event_id,
                        },
                    )),
                };
                self.add_machine(StateMachine::new(cancel_id, command, None));
            }
            _ => {}
        }
    }

    pub(crate) fn handle_activity_task_scheduled(
        &mut self,
        event_id: i64,
        attributes: &history::ActivityTaskScheduledEventAttributes,
    ) -> Result<(), CascadeError> {
        let activity_id = attributes.activity_id.clone();
        let event_type = attributes
            .activity_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default();
        let machine = self.match_event(
            CommandKind::Activity,
            "ActivityTaskScheduled",
            |command| match &command.attributes {
                Some(command::Attributes::ScheduleActivityTask(cmd)) => {
                    if cmd.activity_id != activity_id {
                        return Err(format!(
                            "activity id {:?} != recorded {:?}",
                            cmd.activity_id, activity_id
                        ));
                    }
                    let cmd_type = cmd
                        .activity_type
                        .as_ref()
                        .map(|t| t.name.as_str())
                        .unwrap_or_default();
                    if cmd_type != event_type {
                        return Err(format!(
                            "activity type {cmd_type:?} != recorded {event_type:?}"
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a ScheduleActivityTask command".to_string()),
            },
        )?;
        machine.scheduled_event_id = event_id;
        self.scheduled_event_id_to_activity_id
            .insert(event_id, attributes.activity_id.clone());
        Ok(())
    }

    fn activity_machine_mut(
        &mut self,
        scheduled_event_id: i64,
        event_name: &str,
    ) -> Result<&mut StateMachine, CascadeError> {
        let activity_id = self
            .scheduled_event_id_to_activity_id
            .get(&scheduled_event_id)
            .cloned()
            .ok_or_else(|| {
                non_deterministic(format!(
                    "{event_name} references unknown scheduled event id {scheduled_event_id}"
                ))
            })?;
        Ok(self
            .machines
            .get_mut(&CommandId::new(CommandKind::Activity, activity_id))
            .expect("scheduled event id maps to a machine"))
    }

    pub(crate) fn handle_activity_task_started(
        &mut self,
        attributes: &history::ActivityTaskStartedEventAttributes,
    ) -> Result<(), CascadeError> {
        let machine =
            self.activity_machine_mut(attributes.scheduled_event_id, "ActivityTaskStarted")?;
        if !machine.state.is_terminal() {
            machine.state = MachineState::Started;
        }
        Ok(())
    }

    pub(crate) fn handle_activity_task_completed(
        &mut self,
        attributes: &history::ActivityTaskCompletedEventAttributes,
    ) -> Result<(), CascadeError> {
        let machine =
            self.activity_machine_mut(attributes.scheduled_event_id, "ActivityTaskCompleted")?;
        machine.resolve(MachineState::Completed, attributes.result.clone(), None);
        Ok(())
    }

    pub(crate) fn handle_activity_task_failed(
        &mut self,
        attributes: &history::ActivityTaskFailedEventAttributes,
    ) -> Result<(), CascadeError> {
        let failure_converter = self.failure_converter.clone();
        let machine =
            self.activity_machine_mut(attributes.scheduled_event_id, "ActivityTaskFailed")?;
        let cause = attributes
            .failure
            .as_ref()
            .map(|f| failure_converter.failure_to_error(f));
        let (activity_type, activity_id) = activity_identity(&machine.command);
        let error = ActivityError::new(
            attributes.scheduled_event_id,
            attributes.started_event_id,
            attributes.identity.clone(),
            activity_type,
            activity_id,
            RetryState::try_from(attributes.retry_state).unwrap_or(RetryState::Unspecified),
            cause,
        );
        machine.resolve(
            MachineState::Failed,
            None,
            Some(CascadeError::Activity(error)),
        );
        Ok(())
    }

    pub(crate) fn handle_activity_task_timed_out(
        &mut self,
        attributes: &history::ActivityTaskTimedOutEventAttributes,
    ) -> Result<(), CascadeError> {
        let failure_converter = self.failure_converter.clone();
        let machine =
            self.activity_machine_mut(attributes.scheduled_event_id, "ActivityTaskTimedOut")?;
        let cause = match attributes.failure.as_ref() {
            Some(failure) => failure_converter.failure_to_error(failure),
            None => CascadeError::Timeout(TimeoutError::new(
                "activity timeout",
                TimeoutType::Unspecified,
                None,
            )),
        };
        let (activity_type, activity_id) = activity_identity(&machine.command);
        let error = ActivityError::new(
            attributes.scheduled_event_id,
            attributes.started_event_id,
            String::new(),
            activity_type,
            activity_id,
            RetryState::try_from(attributes.retry_state).unwrap_or(RetryState::Unspecified),
            Some(cause),
        );
        machine.resolve(
            MachineState::TimedOut,
            None,
            Some(CascadeError::Activity(error)),
        );
        Ok(())
    }

    pub(crate) fn handle_activity_task_cancel_requested(
        &mut self,
        attributes: &history::ActivityTaskCancelRequestedEventAttributes,
    ) -> Result<(), CascadeError> {
        let scheduled_event_id = attributes.scheduled_event_id;
        self.match_event(
            CommandKind::CancelActivity,
            "ActivityTaskCancelRequested",
            |command| match &command.attributes {
                Some(command::Attributes::RequestCancelActivityTask(cmd)) => {
                    if cmd.scheduled_event_id != scheduled_event_id {
                        return Err(format!(
                            "cancel targets scheduled event {} but history records {}",
                            cmd.scheduled_event_id, scheduled_event_id
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a RequestCancelActivityTask command".to_string()),
            },
        )?;
        Ok(())
    }

    pub(crate) fn handle_activity_task_canceled(
        &mut self,
        attributes: &history::ActivityTaskCanceledEventAttributes,
    ) -> Result<(), CascadeError> {
        let data_converter = self.data_converter.clone();
        let machine =
            self.activity_machine_mut(attributes.scheduled_event_id, "ActivityTaskCanceled")?;
        let canceled = match attributes.details.clone() {
            Some(payloads) => CanceledError::with_encoded_details(EncodedValues::from_payloads(
                Some(payloads),
                data_converter,
            )),
            None => CanceledError::new(),
        };
        machine.resolve(
            MachineState::Canceled,
            None,
            Some(CascadeError::Canceled(canceled)),
        );
        Ok(())
    }

    // ========================================================================
    // Timers
    // ========================================================================

    pub(crate) fn start_timer(
        &mut self,
        attributes: command::StartTimerCommandAttributes,
        callback: CommandCallback,
    ) {
        let id = CommandId::new(CommandKind::Timer, attributes.timer_id.clone());
        let command = Command {
            attributes: Some(command::Attributes::StartTimer(attributes)),
        };
        self.add_machine(StateMachine::new(id, command, Some(callback)));
    }

    /// Cancel a timer. The timer future resolves canceled immediately; the
    /// cancel command is recorded for initiated timers.
    pub(crate) fn cancel_timer(&mut self, timer_id: &str) {
        let id = CommandId::new(CommandKind::Timer, timer_id);
        let Some(machine) = self.machines.get_mut(&id) else {
            return;
        };
        match machine.state {
            MachineState::Created => {
                machine.resolve(
                    MachineState::Canceled,
                    None,
                    Some(CascadeError::Canceled(CanceledError::new())),
                );
                self.pending_match.retain(|pending| pending != &id);
            }
            MachineState::Initiated | MachineState::Started | MachineState::CommandSent => {
                machine.resolve(
                    MachineState::Canceled,
                    None,
                    Some(CascadeError::Canceled(CanceledError::new())),
                );
                let cancel_id = CommandId::new(CommandKind::CancelTimer, timer_id);
                if self.machines.contains_key(&cancel_id) {
                    return;
                }
                let command = Command {
                    attributes: Some(command::Attributes::CancelTimer(
                        command::CancelTimerCommandAttributes {
                            timer_id: timer_id.to_string(),
                        },
                    )),
                };
                self.add_machine(StateMachine::new(cancel_id, command, None));
            }
            _ => {}
        }
    }

    pub(crate) fn handle_timer_started(
        &mut self,
        attributes: &history::TimerStartedEventAttributes,
    ) -> Result<(), CascadeError> {
        let timer_id = attributes.timer_id.clone();
        self.match_event(CommandKind::Timer, "TimerStarted", |command| {
            match &command.attributes {
                Some(command::Attributes::StartTimer(cmd)) => {
                    if cmd.timer_id != timer_id {
                        return Err(format!(
                            "timer id {:?} != recorded {:?}",
                            cmd.timer_id, timer_id
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a StartTimer command".to_string()),
            }
        })?;
        Ok(())
    }

    pub(crate) fn handle_timer_fired(
        &mut self,
        attributes: &history::TimerFiredEventAttributes,
    ) -> Result<(), CascadeError> {
        let id = CommandId::new(CommandKind::Timer, attributes.timer_id.clone());
        if let Some(machine) = self.machines.get_mut(&id) {
            machine.resolve(MachineState::Completed, None, None);
        }
        Ok(())
    }

    pub(crate) fn handle_timer_canceled(
        &mut self,
        attributes: &history::TimerCanceledEventAttributes,
    ) -> Result<(), CascadeError> {
        let timer_id = attributes.timer_id.clone();
        self.match_event(CommandKind::CancelTimer, "TimerCanceled", |command| {
            match &command.attributes {
                Some(command::Attributes::CancelTimer(cmd)) => {
                    if cmd.timer_id != timer_id {
                        return Err(format!(
                            "cancel timer id {:?} != recorded {:?}",
                            cmd.timer_id, timer_id
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a CancelTimer command".to_string()),
            }
        })?;
        // The timer machine resolved when the cancel was requested.
        let id = CommandId::new(CommandKind::Timer, timer_id);
        if let Some(machine) = self.machines.get_mut(&id) {
            machine.state = MachineState::Canceled;
        }
        Ok(())
    }

    // ========================================================================
    // Child workflows
    // ========================================================================

    pub(crate) fn start_child_workflow(
        &mut self,
        attributes: command::StartChildWorkflowExecutionCommandAttributes,
        callback: CommandCallback,
    ) {
        let id = CommandId::new(CommandKind::ChildWorkflow, attributes.workflow_id.clone());
        let command = Command {
            attributes: Some(command::Attributes::StartChildWorkflowExecution(attributes)),
        };
        self.add_machine(StateMachine::new(id, command, Some(callback)));
    }

    pub(crate) fn handle_start_child_workflow_initiated(
        &mut self,
        attributes: &history::StartChildWorkflowExecutionInitiatedEventAttributes,
    ) -> Result<(), CascadeError> {
        let workflow_id = attributes.workflow_id.clone();
        let workflow_type = attributes
            .workflow_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default();
        self.match_event(
            CommandKind::ChildWorkflow,
            "StartChildWorkflowExecutionInitiated",
            |command| match &command.attributes {
                Some(command::Attributes::StartChildWorkflowExecution(cmd)) => {
                    if cmd.workflow_id != workflow_id {
                        return Err(format!(
                            "child workflow id {:?} != recorded {:?}",
                            cmd.workflow_id, workflow_id
                        ));
                    }
                    let cmd_type = cmd
                        .workflow_type
                        .as_ref()
                        .map(|t| t.name.as_str())
                        .unwrap_or_default();
                    if cmd_type != workflow_type {
                        return Err(format!(
                            "child workflow type {cmd_type:?} != recorded {workflow_type:?}"
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a StartChildWorkflowExecution command".to_string()),
            },
        )?;
        Ok(())
    }

    pub(crate) fn handle_start_child_workflow_failed(
        &mut self,
        attributes: &history::StartChildWorkflowExecutionFailedEventAttributes,
    ) -> Result<(), CascadeError> {
        let id = CommandId::new(CommandKind::ChildWorkflow, attributes.workflow_id.clone());
        if let Some(machine) = self.machines.get_mut(&id) {
            let workflow_type = attributes
                .workflow_type
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_default();
            let error = ChildWorkflowExecutionError::new(
                "",
                attributes.workflow_id.clone(),
                "",
                workflow_type,
                attributes.initiated_event_id,
                0,
                RetryState::Unspecified,
                Some(CascadeError::Application(ApplicationError::new(
                    "child workflow execution already started",
                    "ChildWorkflowExecutionAlreadyStartedError",
                    true,
                ))),
            );
            machine.resolve(
                MachineState::Failed,
                None,
                Some(CascadeError::ChildWorkflowExecution(error)),
            );
        }
        Ok(())
    }

    pub(crate) fn handle_child_workflow_execution_event(
        &mut self,
        attributes: &history::ChildWorkflowExecutionEventAttributes,
    ) -> Result<(), CascadeError> {
        let failure_converter = self.failure_converter.clone();
        let data_converter = self.data_converter.clone();
        let workflow_id = attributes
            .workflow_execution
            .as_ref()
            .map(|e| e.workflow_id.clone())
            .unwrap_or_default();
        let run_id = attributes
            .workflow_execution
            .as_ref()
            .map(|e| e.run_id.clone())
            .unwrap_or_default();
        let id = CommandId::new(CommandKind::ChildWorkflow, workflow_id.clone());
        let Some(machine) = self.machines.get_mut(&id) else {
            return Err(non_deterministic(format!(
                "child workflow event for unknown workflow id {workflow_id:?}"
            )));
        };

        let workflow_type = attributes
            .workflow_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default();
        let retry_state =
            RetryState::try_from(attributes.retry_state).unwrap_or(RetryState::Unspecified);
        let child_error = |cause: CascadeError| {
            CascadeError::ChildWorkflowExecution(ChildWorkflowExecutionError::new(
                attributes.namespace.clone(),
                workflow_id.clone(),
                run_id.clone(),
                workflow_type.clone(),
                attributes.initiated_event_id,
                attributes.started_event_id,
                retry_state,
                Some(cause),
            ))
        };

        match ChildWorkflowExecutionStage::try_from(attributes.stage)
            .unwrap_or(ChildWorkflowExecutionStage::Unspecified)
        {
            ChildWorkflowExecutionStage::Started => {
                machine.state = MachineState::Started;
            }
            ChildWorkflowExecutionStage::Completed => {
                machine.resolve(MachineState::Completed, attributes.result.clone(), None);
            }
            ChildWorkflowExecutionStage::Failed => {
                let cause = attributes
                    .failure
                    .as_ref()
                    .map(|f| failure_converter.failure_to_error(f))
                    .unwrap_or_else(|| CascadeError::from_message("child workflow failed"));
                machine.resolve(MachineState::Failed, None, Some(child_error(cause)));
            }
            ChildWorkflowExecutionStage::Canceled => {
                let canceled = match attributes.details.clone() {
                    Some(details) => CanceledError::with_encoded_details(
                        EncodedValues::from_payloads(Some(details), data_converter),
                    ),
                    None => CanceledError::new(),
                };
                machine.resolve(
                    MachineState::Canceled,
                    None,
                    Some(CascadeError::Canceled(canceled)),
                );
            }
            ChildWorkflowExecutionStage::TimedOut => {
                let cause = match attributes.failure.as_ref() {
                    Some(failure) => failure_converter.failure_to_error(failure),
                    None => CascadeError::Timeout(TimeoutError::new(
                        "child workflow timeout",
                        TimeoutType::StartToClose,
                        None,
                    )),
                };
                machine.resolve(MachineState::TimedOut, None, Some(child_error(cause)));
            }
            ChildWorkflowExecutionStage::Terminated => {
                machine.resolve(
                    MachineState::Failed,
                    None,
                    Some(child_error(CascadeError::Terminated(TerminatedError::new()))),
                );
            }
            ChildWorkflowExecutionStage::Unspecified => {
                return Err(non_deterministic(
                    "child workflow event with unspecified stage",
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // External signals and cancellations
    // ========================================================================

    pub(crate) fn signal_external_workflow(
        &mut self,
        attributes: command::SignalExternalWorkflowExecutionCommandAttributes,
        callback: CommandCallback,
    ) {
        let id = CommandId::new(CommandKind::SignalExternal, attributes.control.clone());
        let command = Command {
            attributes: Some(command::Attributes::SignalExternalWorkflowExecution(
                attributes,
            )),
        };
        self.add_machine(StateMachine::new(id, command, Some(callback)));
    }

    pub(crate) fn handle_signal_external_initiated(
        &mut self,
        event_id: i64,
        attributes: &history::SignalExternalWorkflowExecutionInitiatedEventAttributes,
    ) -> Result<(), CascadeError> {
        let signal_name = attributes.signal_name.clone();
        let control = attributes.control.clone();
        self.match_event(
            CommandKind::SignalExternal,
            "SignalExternalWorkflowExecutionInitiated",
            |command| match &command.attributes {
                Some(command::Attributes::SignalExternalWorkflowExecution(cmd)) => {
                    if cmd.control != control {
                        return Err(format!(
                            "signal id {:?} != recorded {:?}",
                            cmd.control, control
                        ));
                    }
                    if cmd.signal_name != signal_name {
                        return Err(format!(
                            "signal name {:?} != recorded {:?}",
                            cmd.signal_name, signal_name
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a SignalExternalWorkflowExecution command".to_string()),
            },
        )?;
        self.initiated_event_id_to_signal_id.insert(event_id, control);
        Ok(())
    }

    pub(crate) fn handle_external_workflow_signaled(
        &mut self,
        attributes: &history::ExternalWorkflowExecutionSignaledEventAttributes,
    ) -> Result<(), CascadeError> {
        let signal_id = self
            .initiated_event_id_to_signal_id
            .get(&attributes.initiated_event_id)
            .cloned()
            .ok_or_else(|| {
                non_deterministic(format!(
                    "ExternalWorkflowExecutionSignaled references unknown initiated event id {}",
                    attributes.initiated_event_id
                ))
            })?;
        let id = CommandId::new(CommandKind::SignalExternal, signal_id);
        if let Some(machine) = self.machines.get_mut(&id) {
            machine.resolve(MachineState::Completed, None, None);
        }
        Ok(())
    }

    pub(crate) fn handle_signal_external_failed(
        &mut self,
        attributes: &history::SignalExternalWorkflowExecutionFailedEventAttributes,
    ) -> Result<(), CascadeError> {
        let signal_id = self
            .initiated_event_id_to_signal_id
            .get(&attributes.initiated_event_id)
            .cloned()
            .ok_or_else(|| {
                non_deterministic(format!(
                    "SignalExternalWorkflowExecutionFailed references unknown initiated event id {}",
                    attributes.initiated_event_id
                ))
            })?;
        let id = CommandId::new(CommandKind::SignalExternal, signal_id);
        if let Some(machine) = self.machines.get_mut(&id) {
            let cause = SignalExternalWorkflowExecutionFailedCause::try_from(attributes.cause)
                .unwrap_or(SignalExternalWorkflowExecutionFailedCause::Unspecified);
            let error = match cause {
                SignalExternalWorkflowExecutionFailedCause::ExternalWorkflowExecutionNotFound => {
                    CascadeError::UnknownExternalWorkflowExecution(
                        UnknownExternalWorkflowExecutionError,
                    )
                }
                _ => CascadeError::from_message("signal external workflow execution failed"),
            };
            machine.resolve(MachineState::Failed, None, Some(error));
        }
        Ok(())
    }

    pub(crate) fn request_cancel_external_workflow(
        &mut self,
        attributes: command::RequestCancelExternalWorkflowExecutionCommandAttributes,
        callback: CommandCallback,
    ) {
        let id = CommandId::new(CommandKind::CancelExternal, attributes.control.clone());
        let command = Command {
            attributes: Some(command::Attributes::RequestCancelExternalWorkflowExecution(
                attributes,
            )),
        };
        self.add_machine(StateMachine::new(id, command, Some(callback)));
    }

    pub(crate) fn handle_cancel_external_initiated(
        &mut self,
        event_id: i64,
        attributes: &history::RequestCancelExternalWorkflowExecutionInitiatedEventAttributes,
    ) -> Result<(), CascadeError> {
        let control = attributes.control.clone();
        let workflow_id = attributes
            .workflow_execution
            .as_ref()
            .map(|e| e.workflow_id.clone())
            .unwrap_or_default();
        self.match_event(
            CommandKind::CancelExternal,
            "RequestCancelExternalWorkflowExecutionInitiated",
            |command| match &command.attributes {
                Some(command::Attributes::RequestCancelExternalWorkflowExecution(cmd)) => {
                    if cmd.control != control {
                        return Err(format!(
                            "cancellation id {:?} != recorded {:?}",
                            cmd.control, control
                        ));
                    }
                    if cmd.workflow_id != workflow_id {
                        return Err(format!(
                            "target workflow id {:?} != recorded {:?}",
                            cmd.workflow_id, workflow_id
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a RequestCancelExternalWorkflowExecution command".to_string()),
            },
        )?;
        self.initiated_event_id_to_cancellation_id
            .insert(event_id, control);
        Ok(())
    }

    pub(crate) fn handle_external_workflow_cancel_requested(
        &mut self,
        attributes: &history::ExternalWorkflowExecutionCancelRequestedEventAttributes,
    ) -> Result<(), CascadeError> {
        let cancellation_id = self
            .initiated_event_id_to_cancellation_id
            .get(&attributes.initiated_event_id)
            .cloned()
            .ok_or_else(|| {
                non_deterministic(format!(
                    "ExternalWorkflowExecutionCancelRequested references unknown initiated event id {}",
                    attributes.initiated_event_id
                ))
            })?;
        let id = CommandId::new(CommandKind::CancelExternal, cancellation_id);
        if let Some(machine) = self.machines.get_mut(&id) {
            machine.resolve(MachineState::Completed, None, None);
        }
        Ok(())
    }

    pub(crate) fn handle_cancel_external_failed(
        &mut self,
        attributes: &history::RequestCancelExternalWorkflowExecutionFailedEventAttributes,
    ) -> Result<(), CascadeError> {
        let cancellation_id = self
            .initiated_event_id_to_cancellation_id
            .get(&attributes.initiated_event_id)
            .cloned()
            .ok_or_else(|| {
                non_deterministic(format!(
                    "RequestCancelExternalWorkflowExecutionFailed references unknown initiated event id {}",
                    attributes.initiated_event_id
                ))
            })?;
        let id = CommandId::new(CommandKind::CancelExternal, cancellation_id);
        if let Some(machine) = self.machines.get_mut(&id) {
            let cause = CancelExternalWorkflowExecutionFailedCause::try_from(attributes.cause)
                .unwrap_or(CancelExternalWorkflowExecutionFailedCause::Unspecified);
            let error = match cause {
                CancelExternalWorkflowExecutionFailedCause::ExternalWorkflowExecutionNotFound => {
                    CascadeError::UnknownExternalWorkflowExecution(
                        UnknownExternalWorkflowExecutionError,
                    )
                }
                _ => {
                    CascadeError::from_message("request cancel external workflow execution failed")
                }
            };
            machine.resolve(MachineState::Failed, None, Some(error));
        }
        Ok(())
    }

    // ========================================================================
    // Markers and search attributes
    // ========================================================================

    pub(crate) fn record_marker(
        &mut self,
        attributes: command::RecordMarkerCommandAttributes,
        marker_id: &str,
    ) {
        let id = CommandId::new(
            CommandKind::Marker,
            format!("{}:{}", attributes.marker_name, marker_id),
        );
        if self.machines.contains_key(&id) {
            return;
        }
        let command = Command {
            attributes: Some(command::Attributes::RecordMarker(attributes)),
        };
        self.add_machine(StateMachine::new(id, command, None));
    }

    pub(crate) fn handle_marker_recorded(
        &mut self,
        attributes: &history::MarkerRecordedEventAttributes,
    ) -> Result<(), CascadeError> {
        let marker_name = attributes.marker_name.clone();
        let converter = self.data_converter.clone();
        let event_marker_id = marker_id_of(&converter, &attributes.details);
        self.match_event(CommandKind::Marker, "MarkerRecorded", |command| {
            match &command.attributes {
                Some(command::Attributes::RecordMarker(cmd)) => {
                    if cmd.marker_name != marker_name {
                        return Err(format!(
                            "marker name {:?} != recorded {:?}",
                            cmd.marker_name, marker_name
                        ));
                    }
                    let command_marker_id = marker_id_of(&converter, &cmd.details);
                    if command_marker_id != event_marker_id {
                        return Err(format!(
                            "marker id {command_marker_id:?} != recorded {event_marker_id:?}"
                        ));
                    }
                    Ok(())
                }
                _ => Err("not a RecordMarker command".to_string()),
            }
        })?;
        Ok(())
    }

    pub(crate) fn upsert_search_attributes(
        &mut self,
        id: &str,
        attributes: command::UpsertWorkflowSearchAttributesCommandAttributes,
    ) {
        let command_id = CommandId::new(CommandKind::UpsertSearchAttributes, id);
        let command = Command {
            attributes: Some(command::Attributes::UpsertWorkflowSearchAttributes(
                attributes,
            )),
        };
        self.add_machine(StateMachine::new(command_id, command, None));
    }

    pub(crate) fn handle_upsert_search_attributes(
        &mut self,
        attributes: &history::UpsertWorkflowSearchAttributesEventAttributes,
    ) -> Result<(), CascadeError> {
        let mut event_keys: Vec<String> = attributes
            .search_attributes
            .as_ref()
            .map(|attrs| attrs.indexed_fields.keys().cloned().collect())
            .unwrap_or_default();
        event_keys.sort();
        self.match_event(
            CommandKind::UpsertSearchAttributes,
            "UpsertWorkflowSearchAttributes",
            |command| match &command.attributes {
                Some(command::Attributes::UpsertWorkflowSearchAttributes(cmd)) => {
                    let mut cmd_keys: Vec<String> = cmd
                        .search_attributes
                        .as_ref()
                        .map(|attrs| attrs.indexed_fields.keys().cloned().collect())
                        .unwrap_or_default();
                    cmd_keys.sort();
                    if cmd_keys != event_keys {
                        return Err(format!(
                            "search attribute keys {cmd_keys:?} != recorded {event_keys:?}"
                        ));
                    }
                    Ok(())
                }
                _ => Err("not an UpsertWorkflowSearchAttributes command".to_string()),
            },
        )?;
        Ok(())
    }
}

fn activity_identity(
    command: &Command,
) -> (Option<cascade_core::api::common::ActivityType>, String) {
    match &command.attributes {
        Some(command::Attributes::ScheduleActivityTask(cmd)) => {
            (cmd.activity_type.clone(), cmd.activity_id.clone())
        }
        _ => (None, String::new()),
    }
}

/// The marker's own id, stored under the `"id"` detail key.
pub(crate) fn marker_id_of(
    converter: &DataConverter,
    details: &HashMap<String, Payloads>,
) -> Option<String> {
    let payloads = details.get("id")?;
    converter.from_payloads_at::<String>(payloads, 0).ok()
}
