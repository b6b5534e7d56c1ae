//! Deterministic workflow channels.
//!
//! A channel is a named FIFO bound to the workflow's cooperative scheduler.
//! Receives on an empty channel and sends on a full one suspend the calling
//! coroutine; values hand over in strict order, so channel traffic replays
//! identically. The name shows up in diagnostics for blocked workflows.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::poll_fn;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// Send on a closed channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("send on closed channel {0:?}")]
pub struct ChannelClosedError(pub String);

/// A sender parked on a full (or unbuffered) channel, waiting for a
/// receiver to take its value.
pub(crate) struct PendingSend<T> {
    value: Option<T>,
    waker: Option<Waker>,
    delivered: bool,
    closed: bool,
}

struct ChannelState<T> {
    buffer: VecDeque<T>,
    capacity: usize,
    closed: bool,
    pending_sends: VecDeque<Arc<Mutex<PendingSend<T>>>>,
    recv_wakers: VecDeque<Waker>,
}

/// Deterministic FIFO channel for workflow code.
pub struct Channel<T> {
    name: String,
    state: Arc<Mutex<ChannelState<T>>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("name", &self.name).finish()
    }
}

impl<T: Send + 'static> Channel<T> {
    /// Unbuffered channel: every send rendezvouses with a receive.
    pub fn new(name: impl Into<String>) -> Self {
        Self::buffered(name, 0)
    }

    pub fn buffered(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(ChannelState {
                buffer: VecDeque::new(),
                capacity,
                closed: false,
                pending_sends: VecDeque::new(),
                recv_wakers: VecDeque::new(),
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of values immediately available.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.buffer.len() + state.pending_sends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the channel. Parked receivers observe `(None, false)` once
    /// drained; parked senders fail. Closing twice is a no-op.
    pub fn close(&self) {
        let (recv_wakers, send_wakers) = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let recv: Vec<Waker> = state.recv_wakers.drain(..).collect();
            let mut send = Vec::new();
            for pending in &state.pending_sends {
                let mut pending = pending.lock();
                pending.closed = true;
                if let Some(waker) = pending.waker.take() {
                    send.push(waker);
                }
            }
            (recv, send)
        };
        for waker in recv_wakers.into_iter().chain(send_wakers) {
            waker.wake();
        }
    }

    /// Non-blocking send. Returns `false` when the channel has no room.
    pub fn try_send(&self, value: T) -> Result<bool, ChannelClosedError> {
        let waker = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(ChannelClosedError(self.name.clone()));
            }
            let has_room =
                state.buffer.len() < state.capacity || !state.recv_wakers.is_empty();
            if !has_room {
                return Ok(false);
            }
            state.buffer.push_back(value);
            state.recv_wakers.pop_front()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
        Ok(true)
    }

    /// Non-blocking receive. `None` when nothing is immediately available.
    pub fn try_receive(&self) -> Option<T> {
        let (value, send_waker) = {
            let mut state = self.state.lock();
            take_value(&mut state)
        };
        if let Some(waker) = send_waker {
            waker.wake();
        }
        value
    }

    /// Suspend until a value arrives or the channel closes empty. Returns
    /// `(Some(value), true)` on receipt, `(None, false)` once closed and
    /// drained.
    pub async fn receive(&self) -> (Option<T>, bool) {
        poll_fn(|cx| self.poll_receive(cx)).await
    }

    /// Suspend until the value is delivered. Fails on a closed channel.
    pub async fn send(&self, value: T) -> Result<(), ChannelClosedError> {
        let mut slot = Some(value);
        let mut ticket: Option<Arc<Mutex<PendingSend<T>>>> = None;
        poll_fn(move |cx| self.poll_send(cx, &mut slot, &mut ticket)).await
    }

    pub(crate) fn poll_receive(&self, cx: &mut Context<'_>) -> Poll<(Option<T>, bool)> {
        let (result, send_waker) = {
            let mut state = self.state.lock();
            let (value, send_waker) = take_value(&mut state);
            match value {
                Some(value) => (Poll::Ready((Some(value), true)), send_waker),
                None if state.closed => (Poll::Ready((None, false)), None),
                None => {
                    push_waker(&mut state.recv_wakers, cx.waker());
                    (Poll::Pending, None)
                }
            }
        };
        if let Some(waker) = send_waker {
            waker.wake();
        }
        result
    }

    pub(crate) fn poll_send(
        &self,
        cx: &mut Context<'_>,
        value: &mut Option<T>,
        ticket: &mut Option<Arc<Mutex<PendingSend<T>>>>,
    ) -> Poll<Result<(), ChannelClosedError>> {
        // Second and later polls watch the parked ticket.
        if let Some(existing) = ticket {
            let mut pending = existing.lock();
            if pending.delivered {
                return Poll::Ready(Ok(()));
            }
            if pending.closed {
                return Poll::Ready(Err(ChannelClosedError(self.name.clone())));
            }
            pending.waker = Some(cx.waker().clone());
            return Poll::Pending;
        }

        let recv_waker = {
            let mut state = self.state.lock();
            if state.closed {
                return Poll::Ready(Err(ChannelClosedError(self.name.clone())));
            }
            if state.buffer.len() < state.capacity {
                state
                    .buffer
                    .push_back(value.take().expect("send polled without value"));
                state.recv_wakers.pop_front()
            } else {
                let pending = Arc::new(Mutex::new(PendingSend {
                    value: value.take(),
                    waker: Some(cx.waker().clone()),
                    delivered: false,
                    closed: false,
                }));
                state.pending_sends.push_back(pending.clone());
                *ticket = Some(pending);
                let waker = state.recv_wakers.pop_front();
                if let Some(waker) = waker {
                    waker.wake();
                }
                return Poll::Pending;
            }
        };
        if let Some(waker) = recv_waker {
            waker.wake();
        }
        Poll::Ready(Ok(()))
    }
}

/// Pop the next deliverable value: buffered values first, then parked
/// senders in arrival order. Returns the parked sender's waker when one was
/// unblocked.
fn take_value<T>(state: &mut ChannelState<T>) -> (Option<T>, Option<Waker>) {
    if let Some(value) = state.buffer.pop_front() {
        // A parked sender can now occupy the freed buffer slot.
        let mut send_waker = None;
        if let Some(pending) = state.pending_sends.pop_front() {
            let mut pending = pending.lock();
            if let Some(v) = pending.value.take() {
                state.buffer.push_back(v);
            }
            pending.delivered = true;
            send_waker = pending.waker.take();
        }
        return (Some(value), send_waker);
    }
    while let Some(pending) = state.pending_sends.pop_front() {
        let mut pending = pending.lock();
        if let Some(value) = pending.value.take() {
            pending.delivered = true;
            return (Some(value), pending.waker.take());
        }
    }
    (None, None)
}

fn push_waker(wakers: &mut VecDeque<Waker>, waker: &Waker) {
    if !wakers.iter().any(|w| w.will_wake(waker)) {
        wakers.push_back(waker.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::scheduler::Scheduler;

    #[test]
    fn test_buffered_send_receive_fifo() {
        let ch: Channel<i32> = Channel::buffered("test", 3);
        assert!(ch.try_send(1).unwrap());
        assert!(ch.try_send(2).unwrap());
        assert!(ch.try_send(3).unwrap());
        assert!(!ch.try_send(4).unwrap());

        assert_eq!(ch.try_receive(), Some(1));
        assert_eq!(ch.try_receive(), Some(2));
        assert_eq!(ch.try_receive(), Some(3));
        assert_eq!(ch.try_receive(), None);
    }

    #[test]
    fn test_send_on_closed_channel_fails() {
        let ch: Channel<i32> = Channel::buffered("test", 1);
        ch.close();
        assert_eq!(ch.try_send(1), Err(ChannelClosedError("test".to_string())));
    }

    #[test]
    fn test_receive_on_closed_empty_returns_no_more() {
        let scheduler = Scheduler::new();
        let ch: Channel<i32> = Channel::buffered("test", 1);
        ch.try_send(7).unwrap();
        ch.close();

        let results = Arc::new(Mutex::new(Vec::new()));
        let out = results.clone();
        let rx = ch.clone();
        scheduler.spawn(Box::pin(async move {
            let first = rx.receive().await;
            out.lock().push(first);
            let second = rx.receive().await;
            out.lock().push(second);
        }));
        scheduler.run_until_blocked().unwrap();

        assert_eq!(*results.lock(), vec![(Some(7), true), (None, false)]);
    }

    #[test]
    fn test_receive_blocks_until_send() {
        let scheduler = Scheduler::new();
        let ch: Channel<String> = Channel::new("rendezvous");
        let received = Arc::new(Mutex::new(None));

        let out = received.clone();
        let rx = ch.clone();
        scheduler.spawn(Box::pin(async move {
            let (value, more) = rx.receive().await;
            *out.lock() = Some((value, more));
        }));
        scheduler.run_until_blocked().unwrap();
        assert!(received.lock().is_none());

        let tx = ch.clone();
        scheduler.spawn(Box::pin(async move {
            tx.send("hello".to_string()).await.unwrap();
        }));
        scheduler.run_until_blocked().unwrap();
        assert_eq!(
            received.lock().clone(),
            Some((Some("hello".to_string()), true))
        );
    }

    #[test]
    fn test_send_blocks_until_receive_on_full_channel() {
        let scheduler = Scheduler::new();
        let ch: Channel<i32> = Channel::buffered("full", 1);
        ch.try_send(1).unwrap();

        let sent = Arc::new(Mutex::new(false));
        let done = sent.clone();
        let tx = ch.clone();
        scheduler.spawn(Box::pin(async move {
            tx.send(2).await.unwrap();
            *done.lock() = true;
        }));
        scheduler.run_until_blocked().unwrap();
        assert!(!*sent.lock());

        // Receiving frees the slot and unblocks the sender.
        assert_eq!(ch.try_receive(), Some(1));
        scheduler.run_until_blocked().unwrap();
        assert!(*sent.lock());
        assert_eq!(ch.try_receive(), Some(2));
    }

    #[test]
    fn test_close_unblocks_parked_receiver() {
        let scheduler = Scheduler::new();
        let ch: Channel<i32> = Channel::new("closing");
        let result = Arc::new(Mutex::new(None));

        let out = result.clone();
        let rx = ch.clone();
        scheduler.spawn(Box::pin(async move {
            *out.lock() = Some(rx.receive().await);
        }));
        scheduler.run_until_blocked().unwrap();
        assert!(result.lock().is_none());

        ch.close();
        scheduler.run_until_blocked().unwrap();
        assert_eq!(result.lock().clone(), Some((None, false)));
    }

    #[test]
    fn test_unbuffered_try_send_without_receiver_fails() {
        let ch: Channel<i32> = Channel::new("unbuffered");
        assert!(!ch.try_send(1).unwrap());
    }
}
