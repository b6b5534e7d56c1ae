//! The deterministic coroutine scheduler.
//!
//! Workflow code runs as coroutines on one logical thread. The scheduler
//! keeps coroutines in spawn order and a FIFO ready queue; wakers re-queue
//! their coroutine rather than handing it to a runtime, so the execution
//! order is a pure function of spawn order and resolution order. Nothing
//! here is time- or thread-dependent.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

struct CoroutineSlot {
    future: Option<BoxFuture<'static, ()>>,
    /// Guards against double-queueing; a coroutine appears in the ready
    /// queue at most once.
    queued: bool,
}

struct SchedulerState {
    coroutines: Vec<CoroutineSlot>,
    ready: VecDeque<usize>,
}

/// Single-threaded cooperative run loop.
#[derive(Clone)]
pub(crate) struct Scheduler {
    state: Arc<Mutex<SchedulerState>>,
}

struct CoroutineWaker {
    state: Arc<Mutex<SchedulerState>>,
    index: usize,
}

impl Wake for CoroutineWaker {
    fn wake(self: Arc<Self>) {
        let mut state = self.state.lock();
        let Some(slot) = state.coroutines.get_mut(self.index) else {
            return;
        };
        if !slot.queued && slot.future.is_some() {
            slot.queued = true;
            state.ready.push_back(self.index);
        }
    }
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SchedulerState {
                coroutines: Vec::new(),
                ready: VecDeque::new(),
            })),
        }
    }

    /// Add a coroutine. It is immediately ready and will run on the next
    /// [`Scheduler::run_until_blocked`].
    pub(crate) fn spawn(&self, future: BoxFuture<'static, ()>) {
        let mut state = self.state.lock();
        let index = state.coroutines.len();
        state.coroutines.push(CoroutineSlot {
            future: Some(future),
            queued: true,
        });
        state.ready.push_back(index);
    }

    /// Drive ready coroutines until every one of them is blocked or done.
    ///
    /// A panic inside a coroutine stops the loop and surfaces as the panic
    /// message; the panicking coroutine is dropped.
    pub(crate) fn run_until_blocked(&self) -> Result<(), String> {
        loop {
            let (index, mut future) = {
                let mut state = self.state.lock();
                let Some(index) = state.ready.pop_front() else {
                    return Ok(());
                };
                let slot = &mut state.coroutines[index];
                slot.queued = false;
                match slot.future.take() {
                    Some(future) => (index, future),
                    // Woken after completion; nothing to do.
                    None => continue,
                }
            };

            let waker = Waker::from(Arc::new(CoroutineWaker {
                state: self.state.clone(),
                index,
            }));
            let mut cx = Context::from_waker(&waker);

            let poll = std::panic::catch_unwind(AssertUnwindSafe(|| {
                future.as_mut().poll(&mut cx)
            }));

            match poll {
                Ok(Poll::Ready(())) => {}
                Ok(Poll::Pending) => {
                    self.state.lock().coroutines[index].future = Some(future);
                }
                Err(panic) => return Err(panic_message(panic)),
            }
        }
    }

    /// Drop every coroutine. Parked coroutines hold strong references back
    /// into the workflow environment; clearing them at the end of a task
    /// breaks the cycle so the environment can be freed.
    pub(crate) fn shutdown(&self) {
        let mut state = self.state.lock();
        state.coroutines.clear();
        state.ready.clear();
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic in workflow code".to_string()
    }
}
