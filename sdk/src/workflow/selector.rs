//! Deterministic multi-way select over channels and futures.
//!
//! Cases are evaluated in registration order on every poll, and the first
//! ready case wins, so selection replays identically. `select` suspends the
//! coroutine until exactly one case has fired and its handler has run.

use crate::workflow::channel::Channel;
use futures::future::BoxFuture;
use std::future::poll_fn;
use std::task::{Context, Poll};

type CaseFn = Box<dyn FnMut(&mut Context<'_>) -> bool + Send>;

/// Multi-way receive/send/future selection.
#[derive(Default)]
pub struct Selector {
    cases: Vec<CaseFn>,
    default_case: Option<Box<dyn FnOnce() + Send>>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire when a value (or the closed marker) is available on `channel`.
    pub fn add_receive<T: Send + 'static>(
        mut self,
        channel: &Channel<T>,
        handler: impl FnOnce(Option<T>, bool) + Send + 'static,
    ) -> Self {
        let channel = channel.clone();
        let mut handler = Some(handler);
        self.cases.push(Box::new(move |cx| {
            let Some(_) = handler.as_ref() else {
                return false; // already fired in an earlier select
            };
            match channel.poll_receive(cx) {
                Poll::Ready((value, more)) => {
                    (handler.take().expect("handler checked above"))(value, more);
                    true
                }
                Poll::Pending => false,
            }
        }));
        self
    }

    /// Fire when `value` has been delivered into `channel`.
    pub fn add_send<T: Send + 'static>(
        mut self,
        channel: &Channel<T>,
        value: T,
        handler: impl FnOnce() + Send + 'static,
    ) -> Self {
        let channel = channel.clone();
        let mut slot = Some(value);
        let mut ticket = None;
        let mut handler = Some(handler);
        self.cases.push(Box::new(move |cx| {
            let Some(_) = handler.as_ref() else {
                return false;
            };
            match channel.poll_send(cx, &mut slot, &mut ticket) {
                Poll::Ready(Ok(())) => {
                    (handler.take().expect("handler checked above"))();
                    true
                }
                // A send on a closed channel cannot fire; the case goes
                // permanently quiet, like a nil channel in a select.
                Poll::Ready(Err(_)) => {
                    handler.take();
                    false
                }
                Poll::Pending => false,
            }
        }));
        self
    }

    /// Fire when `future` resolves, passing its output to the handler.
    pub fn add_future<T: Send + 'static>(
        mut self,
        mut future: BoxFuture<'static, T>,
        handler: impl FnOnce(T) + Send + 'static,
    ) -> Self {
        let mut handler = Some(handler);
        self.cases.push(Box::new(move |cx| {
            let Some(_) = handler.as_ref() else {
                return false;
            };
            match future.as_mut().poll(cx) {
                Poll::Ready(output) => {
                    (handler.take().expect("handler checked above"))(output);
                    true
                }
                Poll::Pending => false,
            }
        }));
        self
    }

    /// Run `handler` immediately when no other case is ready at select time.
    pub fn add_default(mut self, handler: impl FnOnce() + Send + 'static) -> Self {
        self.default_case = Some(Box::new(handler));
        self
    }

    /// Suspend until one case fires. Exactly one handler runs per call.
    pub async fn select(&mut self) {
        poll_fn(|cx| {
            for case in &mut self.cases {
                if case(cx) {
                    return Poll::Ready(());
                }
            }
            if let Some(default_case) = self.default_case.take() {
                default_case();
                return Poll::Ready(());
            }
            Poll::Pending
        })
        .await
    }
}
