//! One-shot futures resolved by command state machines.
//!
//! Every asynchronous workflow operation hands a callback to its state
//! machine and returns a [`WorkflowFuture`] backed by the same slot. When a
//! history event resolves the machine, the callback fills the slot and
//! wakes the suspended coroutine.

use cascade_core::api::common::Payloads;
use cascade_core::converter::DataConverter;
use cascade_core::error::CascadeError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::error::converter_error;

pub(crate) type ResolvedValue = Result<Option<Payloads>, CascadeError>;

/// Callback handed to a command state machine: `(payloads, error)` with
/// exactly one of the two meaningful.
pub(crate) type CommandCallback = Box<dyn FnOnce(Option<Payloads>, Option<CascadeError>) + Send>;

struct SlotState {
    result: Option<ResolvedValue>,
    waker: Option<Waker>,
}

/// Write side of a one-shot result.
#[derive(Clone)]
pub(crate) struct ResultSlot {
    state: Arc<Mutex<SlotState>>,
}

impl ResultSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState {
                result: None,
                waker: None,
            })),
        }
    }

    /// Resolve the slot. Later resolutions lose; the first one wins.
    pub(crate) fn resolve(&self, result: ResolvedValue) {
        let waker = {
            let mut state = self.state.lock();
            if state.result.is_some() {
                return;
            }
            state.result = Some(result);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// The machine-facing callback form of this slot.
    pub(crate) fn callback(&self) -> CommandCallback {
        let slot = self.clone();
        Box::new(move |payloads, error| match error {
            Some(error) => slot.resolve(Err(error)),
            None => slot.resolve(Ok(payloads)),
        })
    }

    /// A future reading this slot.
    pub(crate) fn future(&self, converter: DataConverter) -> WorkflowFuture {
        WorkflowFuture {
            state: self.state.clone(),
            converter,
        }
    }

    /// A future that is already resolved; used when an operation fails
    /// before a command is ever recorded.
    pub(crate) fn ready(result: ResolvedValue, converter: DataConverter) -> WorkflowFuture {
        let slot = Self::new();
        slot.resolve(result);
        slot.future(converter)
    }
}

/// The pending result of a workflow operation (activity, timer, child
/// workflow, external signal). Awaiting it is a suspension point.
pub struct WorkflowFuture {
    state: Arc<Mutex<SlotState>>,
    converter: DataConverter,
}

impl WorkflowFuture {
    /// Await and decode the first result payload into `T`. A missing result
    /// decodes as JSON null, so `()` and `Option<_>` work for void
    /// operations.
    pub async fn result<T: DeserializeOwned>(self) -> Result<T, CascadeError> {
        let converter = self.converter.clone();
        let payloads = self.await?;
        decode_first(&converter, payloads.as_ref())
    }
}

impl Future for WorkflowFuture {
    type Output = ResolvedValue;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.lock();
        match &state.result {
            Some(result) => Poll::Ready(result.clone()),
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Decode the first payload of an optional sequence, treating absence as
/// null.
pub(crate) fn decode_first<T: DeserializeOwned>(
    converter: &DataConverter,
    payloads: Option<&Payloads>,
) -> Result<T, CascadeError> {
    match payloads {
        Some(p) if !p.payloads.is_empty() => converter
            .from_payloads_at(p, 0)
            .map_err(converter_error),
        _ => serde_json::from_value(serde_json::Value::Null)
            .map_err(|e| converter_error(e.into())),
    }
}
