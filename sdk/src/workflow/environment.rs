//! Per-execution workflow environment.
//!
//! One `WorkflowEnvironment` backs one workflow execution for the duration
//! of a workflow task: the scheduler, the commands helper, signal channels,
//! recorded marker results and the deterministic clock all hang off it. The
//! user-facing [`WorkflowContext`](crate::workflow::context::WorkflowContext)
//! is a thin cloneable handle onto this structure.

use crate::workflow::channel::Channel;
use crate::workflow::context::{CancelScope, WorkflowContext};
use crate::workflow::future::ResolvedValue;
use crate::workflow::propagator::ContextPropagator;
use crate::workflow::scheduler::Scheduler;
use crate::worker::commands::CommandsHelper;
use cascade_core::api::common::{Header, Payloads, WorkflowExecution};
use cascade_core::api::failure::Failure;
use cascade_core::converter::{DataConverter, FailureConverter};
use cascade_core::error::CascadeError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;

/// Marker name used by side effects.
pub(crate) const SIDE_EFFECT_MARKER: &str = "SideEffect";
/// Marker name used by versioning.
pub(crate) const VERSION_MARKER: &str = "Version";
/// Marker name used by local activities.
pub(crate) const LOCAL_ACTIVITY_MARKER: &str = "LocalActivity";

/// Signals that arrive before anyone listens buffer up to this depth.
const SIGNAL_CHANNEL_BUFFER: usize = 10_000;

pub(crate) type QueryHandler =
    Box<dyn Fn(Option<Payloads>) -> Result<Payloads, CascadeError> + Send + Sync>;

/// What a recorded marker carried: result data, a failure, or both absent.
#[derive(Debug, Clone, Default)]
pub(crate) struct MarkerResult {
    pub(crate) data: Option<Payloads>,
    pub(crate) failure: Option<Failure>,
}

/// Identifying details of the running workflow, visible to workflow code.
#[derive(Debug, Clone, Default)]
pub struct WorkflowInfo {
    pub namespace: String,
    pub task_queue: String,
    pub workflow_execution: WorkflowExecution,
    pub workflow_type: String,
    pub attempt: i32,
}

pub(crate) struct WorkflowEnvironment {
    pub(crate) scheduler: Scheduler,
    pub(crate) commands: Mutex<CommandsHelper>,
    pub(crate) data_converter: DataConverter,
    pub(crate) failure_converter: FailureConverter,
    pub(crate) info: WorkflowInfo,
    pub(crate) propagators: Vec<Arc<dyn ContextPropagator>>,
    pub(crate) root_scope: Arc<CancelScope>,
    /// Set once the root coroutine returns.
    pub(crate) workflow_result: Mutex<Option<ResolvedValue>>,
    signal_channels: Mutex<HashMap<String, Channel<Payloads>>>,
    /// Recorded marker outcomes, keyed by `(marker_name, id)`.
    marker_results: Mutex<HashMap<(String, String), MarkerResult>>,
    query_handlers: Mutex<HashMap<String, QueryHandler>>,
    replaying: AtomicBool,
    now_millis: AtomicI64,
    id_counter: AtomicU32,
    pub(crate) cancel_requested: AtomicBool,
}

impl WorkflowEnvironment {
    pub(crate) fn new(
        info: WorkflowInfo,
        data_converter: DataConverter,
        failure_converter: FailureConverter,
        propagators: Vec<Arc<dyn ContextPropagator>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            scheduler: Scheduler::new(),
            commands: Mutex::new(CommandsHelper::new(
                data_converter.clone(),
                failure_converter.clone(),
            )),
            data_converter,
            failure_converter,
            info,
            propagators,
            root_scope: CancelScope::new(),
            workflow_result: Mutex::new(None),
            signal_channels: Mutex::new(HashMap::new()),
            marker_results: Mutex::new(HashMap::new()),
            query_handlers: Mutex::new(HashMap::new()),
            replaying: AtomicBool::new(false),
            now_millis: AtomicI64::new(0),
            id_counter: AtomicU32::new(0),
            cancel_requested: AtomicBool::new(false),
        })
    }

    /// Deterministic sequence for timer/activity/marker ids. Allocation
    /// order is identical on replay because user code runs identically.
    pub(crate) fn next_id(&self) -> String {
        (self.id_counter.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Workflow time: frozen at the current task's started-event timestamp.
    pub(crate) fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis.load(Ordering::SeqCst))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub(crate) fn set_now_millis(&self, millis: i64) {
        self.now_millis.store(millis, Ordering::SeqCst);
    }

    pub(crate) fn is_replaying(&self) -> bool {
        self.replaying.load(Ordering::SeqCst)
    }

    pub(crate) fn set_replaying(&self, replaying: bool) {
        self.replaying.store(replaying, Ordering::SeqCst);
    }

    pub(crate) fn signal_channel(&self, name: &str) -> Channel<Payloads> {
        self.signal_channels
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| {
                Channel::buffered(format!("signal-{name}"), SIGNAL_CHANNEL_BUFFER)
            })
            .clone()
    }

    pub(crate) fn deliver_signal(&self, name: &str, input: Option<Payloads>) {
        let channel = self.signal_channel(name);
        match channel.try_send(input.unwrap_or_default()) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(signal = %name, "signal channel full; dropping signal")
            }
            Err(_) => {
                tracing::warn!(signal = %name, "signal channel closed; dropping signal")
            }
        }
    }

    pub(crate) fn record_marker_result(&self, marker_name: &str, id: &str, result: MarkerResult) {
        self.marker_results
            .lock()
            .insert((marker_name.to_string(), id.to_string()), result);
    }

    pub(crate) fn marker_result(&self, marker_name: &str, id: &str) -> Option<MarkerResult> {
        self.marker_results
            .lock()
            .get(&(marker_name.to_string(), id.to_string()))
            .cloned()
    }

    pub(crate) fn set_query_handler(&self, name: &str, handler: QueryHandler) {
        self.query_handlers.lock().insert(name.to_string(), handler);
    }

    pub(crate) fn answer_query(
        &self,
        query_type: &str,
        args: Option<Payloads>,
    ) -> Result<Payloads, CascadeError> {
        let handlers = self.query_handlers.lock();
        let handler = handlers.get(query_type).ok_or_else(|| {
            CascadeError::from_message(format!("unknown query type {query_type:?}"))
        })?;
        handler(args)
    }

    /// Build the outgoing header from the context's values via every
    /// registered propagator. `None` when nothing was injected.
    pub(crate) fn inject_header(&self, ctx: &WorkflowContext) -> Option<Header> {
        let mut header = Header::default();
        for propagator in &self.propagators {
            propagator.inject(ctx, &mut header);
        }
        if header.fields.is_empty() {
            None
        } else {
            Some(header)
        }
    }
}
