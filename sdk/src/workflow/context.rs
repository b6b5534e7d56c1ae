//! The workflow context: cancellation scopes, context values, and the API
//! workflow code uses to initiate operations.
//!
//! A context is a cheap cloneable handle. Deriving a context (`with_cancel`,
//! `with_value`, `with_timeout`) layers a new scope or value node over the
//! parent; cancelling a scope synchronously cancels every registered
//! non-disconnected descendant, first cancel wins.

use crate::error::converter_error;
use crate::workflow::channel::Channel;
use crate::workflow::environment::{
    WorkflowEnvironment, WorkflowInfo, LOCAL_ACTIVITY_MARKER, SIDE_EFFECT_MARKER, VERSION_MARKER,
};
use crate::workflow::future::{ResultSlot, WorkflowFuture};
use crate::workflow::options::{ActivityOptions, ChildWorkflowOptions, ContinueAsNewOptions};
use cascade_core::api::command::command;
use cascade_core::api::common::{ActivityType, Payload, Payloads, SearchAttributes, WorkflowType};
use cascade_core::api::duration_to_proto;
use cascade_core::api::enums::TimeoutType;
use cascade_core::converter::PayloadValue;
use cascade_core::error::{
    CanceledError, CascadeError, ContinueAsNewError, NonDeterministicError, TimeoutError,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// The error a canceled context reports from `err()`.
pub fn canceled_error() -> CascadeError {
    CascadeError::Canceled(CanceledError::new())
}

/// The error a timed-out context reports from `err()`.
pub fn deadline_exceeded_error() -> CascadeError {
    CascadeError::Timeout(TimeoutError::new(
        "deadline exceeded",
        TimeoutType::ScheduleToClose,
        None,
    ))
}

/// A cancellable scope in the context tree.
pub(crate) struct CancelScope {
    done: Channel<()>,
    err: Mutex<Option<CascadeError>>,
    children: Mutex<Vec<Weak<CancelScope>>>,
}

impl CancelScope {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            done: Channel::new("cancel-scope-done"),
            err: Mutex::new(None),
            children: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn err(&self) -> Option<CascadeError> {
        self.err.lock().clone()
    }

    pub(crate) fn done(&self) -> Channel<()> {
        self.done.clone()
    }

    /// Cancel this scope and every registered child. The first cancel wins;
    /// repeat calls are no-ops.
    pub(crate) fn cancel(self: &Arc<Self>, error: CascadeError) {
        {
            let mut err = self.err.lock();
            if err.is_some() {
                return;
            }
            *err = Some(error.clone());
        }
        self.done.close();
        let children = std::mem::take(&mut *self.children.lock());
        for child in children {
            if let Some(child) = child.upgrade() {
                child.cancel(error.clone());
            }
        }
    }

    /// Register `child` for cancellation propagation. A child of an
    /// already-canceled parent is canceled on the spot.
    fn register_child(self: &Arc<Self>, child: &Arc<CancelScope>) {
        let already_canceled = {
            let err = self.err.lock();
            match &*err {
                Some(error) => Some(error.clone()),
                None => {
                    self.children.lock().push(Arc::downgrade(child));
                    None
                }
            }
        };
        if let Some(error) = already_canceled {
            child.cancel(error);
        }
    }
}

/// Cancels the scope returned by `with_cancel`/`with_timeout`/
/// `disconnected`. Calling it more than once does nothing.
#[derive(Clone)]
pub struct CancelHandle {
    scope: Arc<CancelScope>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.scope.cancel(canceled_error());
    }
}

struct ValueNode {
    key: String,
    value: Value,
    parent: Option<Arc<ValueNode>>,
}

/// Handle to the running workflow, passed to workflow code.
#[derive(Clone)]
pub struct WorkflowContext {
    env: Arc<WorkflowEnvironment>,
    scope: Arc<CancelScope>,
    values: Option<Arc<ValueNode>>,
    deadline: Option<DateTime<Utc>>,
}

impl WorkflowContext {
    pub(crate) fn root(
        env: Arc<WorkflowEnvironment>,
        header: Option<&cascade_core::api::common::Header>,
    ) -> Self {
        let mut values = None;
        if let Some(header) = header {
            for propagator in &env.propagators {
                for (key, value) in propagator.extract(header) {
                    values = Some(Arc::new(ValueNode {
                        key,
                        value,
                        parent: values,
                    }));
                }
            }
        }
        Self {
            scope: env.root_scope.clone(),
            env,
            values,
            deadline: None,
        }
    }

    // ========================================================================
    // Context plumbing
    // ========================================================================

    pub fn info(&self) -> &WorkflowInfo {
        &self.env.info
    }

    /// Deterministic workflow time (the current task's server timestamp).
    pub fn now(&self) -> DateTime<Utc> {
        self.env.now()
    }

    pub fn is_replaying(&self) -> bool {
        self.env.is_replaying()
    }

    /// Closed when this context is canceled.
    pub fn done(&self) -> Channel<()> {
        self.scope.done()
    }

    /// Non-nil once the context is canceled or its deadline passed.
    pub fn err(&self) -> Option<CascadeError> {
        self.scope.err()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// The value stored under `key`, walking up the parent chain.
    pub fn value(&self, key: &str) -> Option<Value> {
        let mut node = self.values.as_ref();
        while let Some(current) = node {
            if current.key == key {
                return Some(current.value.clone());
            }
            node = current.parent.as_ref();
        }
        None
    }

    pub fn with_value(&self, key: impl Into<String>, value: Value) -> Self {
        let mut ctx = self.clone();
        ctx.values = Some(Arc::new(ValueNode {
            key: key.into(),
            value,
            parent: self.values.clone(),
        }));
        ctx
    }

    /// Derive a cancellable child context.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let scope = CancelScope::new();
        self.scope.register_child(&scope);
        let mut ctx = self.clone();
        ctx.scope = scope.clone();
        (ctx, CancelHandle { scope })
    }

    /// Derive a child that keeps the parent's values but ignores its
    /// cancellation. Used for cleanup work after the workflow is canceled.
    pub fn disconnected(&self) -> (Self, CancelHandle) {
        let scope = CancelScope::new();
        let mut ctx = self.clone();
        ctx.scope = scope.clone();
        (ctx, CancelHandle { scope })
    }

    /// Derive a child that cancels itself after `timeout` of workflow time.
    /// The deadline fires through a timer command, not a wall clock.
    pub fn with_timeout(&self, timeout: Duration) -> (Self, CancelHandle) {
        let (mut ctx, handle) = self.with_cancel();
        ctx.deadline = Some(
            self.env.now()
                + chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX),
        );
        let timer = ctx.start_timer(timeout);
        let scope = ctx.scope.clone();
        self.env.scheduler.spawn(Box::pin(async move {
            // The timer resolves canceled if the scope goes away first.
            if timer.await.is_ok() {
                scope.cancel(deadline_exceeded_error());
            }
        }));
        (ctx, handle)
    }

    /// Run another coroutine on the workflow's deterministic scheduler.
    pub fn spawn(&self, future: impl Future<Output = ()> + Send + 'static) {
        self.env.scheduler.spawn(Box::pin(future));
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Schedule an activity and suspend on its result.
    pub fn execute_activity(
        &self,
        options: ActivityOptions,
        args: &[PayloadValue],
    ) -> WorkflowFuture {
        let converter = self.env.data_converter.clone();
        if let Some(err) = self.scope.err() {
            return ResultSlot::ready(Err(err), converter);
        }
        let input = match converter.to_payloads(args) {
            Ok(payloads) if !args.is_empty() => Some(payloads),
            Ok(_) => None,
            Err(e) => return ResultSlot::ready(Err(converter_error(e)), converter),
        };

        let activity_id = options
            .activity_id
            .unwrap_or_else(|| self.env.next_id());
        let attributes = command::ScheduleActivityTaskCommandAttributes {
            activity_id: activity_id.clone(),
            activity_type: Some(ActivityType {
                name: options.activity_type,
            }),
            task_queue: options
                .task_queue
                .unwrap_or_else(|| self.env.info.task_queue.clone()),
            input,
            header: self.env.inject_header(self),
            schedule_to_close_timeout: options.schedule_to_close_timeout.map(duration_to_proto),
            start_to_close_timeout: options.start_to_close_timeout.map(duration_to_proto),
            schedule_to_start_timeout: options.schedule_to_start_timeout.map(duration_to_proto),
            heartbeat_timeout: options.heartbeat_timeout.map(duration_to_proto),
            retry_policy: options.retry_policy.as_ref().map(|p| p.to_proto()),
        };

        let slot = ResultSlot::new();
        self.env
            .commands
            .lock()
            .schedule_activity(attributes, slot.callback());
        self.watch_cancellation(move |env| {
            env.commands.lock().request_cancel_activity(&activity_id);
        });
        slot.future(converter)
    }

    /// Start a timer and suspend until it fires. Cancelling the context
    /// cancels the timer.
    pub fn start_timer(&self, duration: Duration) -> WorkflowFuture {
        let converter = self.env.data_converter.clone();
        if let Some(err) = self.scope.err() {
            return ResultSlot::ready(Err(err), converter);
        }
        let timer_id = self.env.next_id();
        let attributes = command::StartTimerCommandAttributes {
            timer_id: timer_id.clone(),
            start_to_fire_timeout: Some(duration_to_proto(duration)),
        };
        let slot = ResultSlot::new();
        self.env
            .commands
            .lock()
            .start_timer(attributes, slot.callback());
        self.watch_cancellation(move |env| {
            env.commands.lock().cancel_timer(&timer_id);
        });
        slot.future(converter)
    }

    /// Suspend for `duration` of workflow time.
    pub async fn sleep(&self, duration: Duration) -> Result<(), CascadeError> {
        self.start_timer(duration).await.map(|_| ())
    }

    /// Start a child workflow and suspend on its result.
    pub fn execute_child_workflow(
        &self,
        options: ChildWorkflowOptions,
        args: &[PayloadValue],
    ) -> WorkflowFuture {
        let converter = self.env.data_converter.clone();
        if let Some(err) = self.scope.err() {
            return ResultSlot::ready(Err(err), converter);
        }
        let input = match converter.to_payloads(args) {
            Ok(payloads) if !args.is_empty() => Some(payloads),
            Ok(_) => None,
            Err(e) => return ResultSlot::ready(Err(converter_error(e)), converter),
        };

        let workflow_id = options.workflow_id.unwrap_or_else(|| {
            format!(
                "{}_{}",
                self.env.info.workflow_execution.workflow_id,
                self.env.next_id()
            )
        });
        let namespace = options
            .namespace
            .unwrap_or_else(|| self.env.info.namespace.clone());
        let attributes = command::StartChildWorkflowExecutionCommandAttributes {
            namespace: namespace.clone(),
            workflow_id: workflow_id.clone(),
            workflow_type: Some(WorkflowType {
                name: options.workflow_type,
            }),
            task_queue: options
                .task_queue
                .unwrap_or_else(|| self.env.info.task_queue.clone()),
            input,
            header: self.env.inject_header(self),
            retry_policy: options.retry_policy.as_ref().map(|p| p.to_proto()),
            workflow_run_timeout: options.workflow_run_timeout.map(duration_to_proto),
            workflow_task_timeout: options.workflow_task_timeout.map(duration_to_proto),
        };

        let slot = ResultSlot::new();
        self.env
            .commands
            .lock()
            .start_child_workflow(attributes, slot.callback());
        self.watch_cancellation(move |env| {
            let control = env.next_id();
            env.commands.lock().request_cancel_external_workflow(
                command::RequestCancelExternalWorkflowExecutionCommandAttributes {
                    namespace,
                    workflow_id,
                    run_id: String::new(),
                    control,
                    child_workflow_only: true,
                },
                Box::new(|_, _| {}),
            );
        });
        slot.future(converter)
    }

    /// Signal another workflow execution. Resolves once the service
    /// delivered (or failed to deliver) the signal.
    pub fn signal_external_workflow(
        &self,
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
        signal_name: impl Into<String>,
        args: &[PayloadValue],
    ) -> WorkflowFuture {
        let converter = self.env.data_converter.clone();
        let input = match converter.to_payloads(args) {
            Ok(payloads) if !args.is_empty() => Some(payloads),
            Ok(_) => None,
            Err(e) => return ResultSlot::ready(Err(converter_error(e)), converter),
        };
        let attributes = command::SignalExternalWorkflowExecutionCommandAttributes {
            namespace: self.env.info.namespace.clone(),
            execution: Some(cascade_core::api::common::WorkflowExecution {
                workflow_id: workflow_id.into(),
                run_id: run_id.into(),
            }),
            signal_name: signal_name.into(),
            input,
            control: self.env.next_id(),
            child_workflow_only: false,
        };
        let slot = ResultSlot::new();
        self.env
            .commands
            .lock()
            .signal_external_workflow(attributes, slot.callback());
        slot.future(converter)
    }

    /// Request cancellation of another workflow execution.
    pub fn request_cancel_external_workflow(
        &self,
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> WorkflowFuture {
        let converter = self.env.data_converter.clone();
        let attributes = command::RequestCancelExternalWorkflowExecutionCommandAttributes {
            namespace: self.env.info.namespace.clone(),
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
            control: self.env.next_id(),
            child_workflow_only: false,
        };
        let slot = ResultSlot::new();
        self.env
            .commands
            .lock()
            .request_cancel_external_workflow(attributes, slot.callback());
        slot.future(converter)
    }

    /// Run a non-deterministic function once and record its result; replay
    /// returns the recorded value without re-running the function.
    pub fn side_effect<T, F>(&self, f: F) -> Result<T, CascadeError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let id = self.env.next_id();
        let converter = self.env.data_converter.clone();
        if let Some(recorded) = self.env.marker_result(SIDE_EFFECT_MARKER, &id) {
            self.record_marker(SIDE_EFFECT_MARKER, &id, recorded.data.clone(), None)?;
            let data = recorded.data.ok_or_else(|| {
                converter_error(cascade_core::converter::ConverterError::NoData)
            })?;
            return converter.from_payloads_at(&data, 0).map_err(converter_error);
        }

        let value = f();
        let data = converter
            .to_payloads(&[PayloadValue::from_serialize(&value).map_err(converter_error)?])
            .map_err(converter_error)?;
        self.record_marker(SIDE_EFFECT_MARKER, &id, Some(data), None)?;
        Ok(value)
    }

    /// Run a short activity inline on the workflow worker, recording its
    /// outcome in a marker instead of scheduling through the service. The
    /// function runs exactly once; replays return the recorded result or
    /// failure.
    pub fn execute_local_activity<T, F>(&self, f: F) -> Result<T, CascadeError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, CascadeError>,
    {
        let id = self.env.next_id();
        let converter = self.env.data_converter.clone();
        if let Some(recorded) = self.env.marker_result(LOCAL_ACTIVITY_MARKER, &id) {
            self.record_marker(
                LOCAL_ACTIVITY_MARKER,
                &id,
                recorded.data.clone(),
                recorded.failure.clone(),
            )?;
            if let Some(failure) = &recorded.failure {
                return Err(self.env.failure_converter.failure_to_error(failure));
            }
            let data = recorded.data.ok_or_else(|| {
                converter_error(cascade_core::converter::ConverterError::NoData)
            })?;
            return converter.from_payloads_at(&data, 0).map_err(converter_error);
        }

        match f() {
            Ok(value) => {
                let data = converter
                    .to_payloads(&[PayloadValue::from_serialize(&value)
                        .map_err(converter_error)?])
                    .map_err(converter_error)?;
                self.record_marker(LOCAL_ACTIVITY_MARKER, &id, Some(data), None)?;
                Ok(value)
            }
            Err(error) => {
                let failure = self.env.failure_converter.error_to_failure(&error);
                self.record_marker(LOCAL_ACTIVITY_MARKER, &id, None, Some(failure))?;
                Err(error)
            }
        }
    }

    /// Versioning gate for workflow code changes. Fresh executions record
    /// and return `max_supported`; replays return the recorded version and
    /// fail the task when it left the supported range.
    pub fn get_version(
        &self,
        change_id: &str,
        min_supported: i32,
        max_supported: i32,
    ) -> Result<i32, CascadeError> {
        let converter = self.env.data_converter.clone();
        if let Some(recorded) = self.env.marker_result(VERSION_MARKER, change_id) {
            let data = recorded.data.ok_or_else(|| {
                converter_error(cascade_core::converter::ConverterError::NoData)
            })?;
            let version: i32 = converter
                .from_payloads_at(&data, 0)
                .map_err(converter_error)?;
            self.record_marker(VERSION_MARKER, change_id, Some(data), None)?;
            if version < min_supported || version > max_supported {
                return Err(CascadeError::NonDeterministic(NonDeterministicError::new(
                    format!(
                        "recorded version {version} for change {change_id:?} is outside supported range [{min_supported}, {max_supported}]"
                    ),
                )));
            }
            return Ok(version);
        }

        let data = converter
            .to_payloads(&[PayloadValue::Json(Value::from(max_supported))])
            .map_err(converter_error)?;
        self.record_marker(VERSION_MARKER, change_id, Some(data), None)?;
        Ok(max_supported)
    }

    /// Merge search attributes into the execution's visibility record.
    pub fn upsert_search_attributes(
        &self,
        fields: HashMap<String, Value>,
    ) -> Result<(), CascadeError> {
        let converter = &self.env.data_converter;
        let mut indexed_fields: HashMap<String, Payload> = HashMap::new();
        for (key, value) in fields {
            let payload = converter.to_payload(&value).map_err(converter_error)?;
            indexed_fields.insert(key, payload);
        }
        let id = self.env.next_id();
        self.env.commands.lock().upsert_search_attributes(
            &id,
            command::UpsertWorkflowSearchAttributesCommandAttributes {
                search_attributes: Some(SearchAttributes { indexed_fields }),
            },
        );
        Ok(())
    }

    /// The channel receiving payloads of the named signal. Signals arriving
    /// before the first call buffer up.
    pub fn signal_channel(&self, name: &str) -> Channel<Payloads> {
        self.env.signal_channel(name)
    }

    /// Register a handler answering queries of `query_type`.
    pub fn set_query_handler(
        &self,
        query_type: &str,
        handler: impl Fn(Option<Payloads>) -> Result<Payloads, CascadeError> + Send + Sync + 'static,
    ) {
        self.env.set_query_handler(query_type, Box::new(handler));
    }

    /// Build the continue-as-new directive. Returning the produced error
    /// from workflow code finishes this run and starts a fresh one with the
    /// given input; context values survive through registered propagators.
    pub fn continue_as_new(
        &self,
        workflow_type: impl Into<String>,
        options: ContinueAsNewOptions,
        args: &[PayloadValue],
    ) -> CascadeError {
        let input = match self.env.data_converter.to_payloads(args) {
            Ok(payloads) => payloads,
            Err(e) => return converter_error(e),
        };
        CascadeError::ContinueAsNew(ContinueAsNewError {
            workflow_type: workflow_type.into(),
            input,
            header: self.env.inject_header(self),
            task_queue: options.task_queue,
            retry_policy: options.retry_policy,
            workflow_run_timeout: options.workflow_run_timeout,
            workflow_task_timeout: options.workflow_task_timeout,
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn record_marker(
        &self,
        marker_name: &str,
        id: &str,
        data: Option<Payloads>,
        failure: Option<cascade_core::api::failure::Failure>,
    ) -> Result<(), CascadeError> {
        let converter = &self.env.data_converter;
        let id_payloads = converter
            .to_payloads(&[PayloadValue::Json(Value::String(id.to_string()))])
            .map_err(converter_error)?;
        let mut details = HashMap::new();
        details.insert("id".to_string(), id_payloads);
        if let Some(data) = data {
            details.insert("data".to_string(), data);
        }
        self.env.commands.lock().record_marker(
            command::RecordMarkerCommandAttributes {
                marker_name: marker_name.to_string(),
                details,
                header: None,
                failure,
            },
            id,
        );
        Ok(())
    }

    /// Run `action` against the environment when this context is canceled.
    fn watch_cancellation(
        &self,
        action: impl FnOnce(&Arc<WorkflowEnvironment>) + Send + 'static,
    ) {
        let done = self.scope.done();
        let env = self.env.clone();
        self.env.scheduler.spawn(Box::pin(async move {
            done.receive().await;
            action(&env);
        }));
    }
}
