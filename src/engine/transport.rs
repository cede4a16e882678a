//! Work distribution transport
//!
//! Queues used by the multi-process engine to hand entries to workers and
//! results back to the collector. `MessageQueue` is backed by a
//! crossbeam channel; `LocalQueue` is a mutex-guarded deque.

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Outcome of taking an item from a queue
#[derive(Debug, PartialEq, Eq)]
pub enum PopResult<T> {
    Item(T),
    Timeout,
    /// The queue was closed and is drained
    Closed,
}

/// Failure to put an item on a queue; the item is handed back
#[derive(Debug, PartialEq, Eq)]
pub enum PushError<T> {
    Timeout(T),
    Closed(T),
}

/// A queue shared between the producer, workers and the collector
pub trait TaskQueue<T: Send>: Send + Sync {
    /// Puts an item on the queue, waiting up to `timeout` for room
    fn push(&self, item: T, timeout: Duration) -> Result<(), PushError<T>>;

    /// Takes an item from the queue, waiting up to `timeout` for one
    fn pop(&self, timeout: Duration) -> PopResult<T>;

    /// Rejects further pushes; remaining items can still be taken
    fn close(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates a queue for the selected transport
///
/// `capacity` of `None` creates an unbounded queue.
pub fn create_queue<T: Send + 'static>(
    use_message_queue: bool,
    capacity: Option<usize>,
) -> Arc<dyn TaskQueue<T>> {
    if use_message_queue {
        Arc::new(MessageQueue::new(capacity))
    } else {
        Arc::new(LocalQueue::new(capacity))
    }
}

pub struct MessageQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    closed: AtomicBool,
}

impl<T> MessageQueue<T> {
    pub fn new(capacity: Option<usize>) -> Self {
        let (sender, receiver) = match capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };
        Self {
            sender,
            receiver,
            closed: AtomicBool::new(false),
        }
    }
}

impl<T: Send> TaskQueue<T> for MessageQueue<T> {
    fn push(&self, item: T, timeout: Duration) -> Result<(), PushError<T>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PushError::Closed(item));
        }
        self.sender.send_timeout(item, timeout).map_err(|e| match e {
            SendTimeoutError::Timeout(item) => PushError::Timeout(item),
            SendTimeoutError::Disconnected(item) => PushError::Closed(item),
        })
    }

    fn pop(&self, timeout: Duration) -> PopResult<T> {
        if self.closed.load(Ordering::SeqCst) && self.receiver.is_empty() {
            return PopResult::Closed;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(item) => PopResult::Item(item),
            // An item pushed just before close may land after the timeout.
            Err(RecvTimeoutError::Timeout) if self.closed.load(Ordering::SeqCst) => {
                match self.receiver.try_recv() {
                    Ok(item) => PopResult::Item(item),
                    Err(_) => PopResult::Closed,
                }
            }
            Err(RecvTimeoutError::Timeout) => PopResult::Timeout,
            Err(RecvTimeoutError::Disconnected) => PopResult::Closed,
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn len(&self) -> usize {
        self.receiver.len()
    }
}

struct LocalState<T> {
    items: VecDeque<T>,
    closed: bool,
}

pub struct LocalQueue<T> {
    state: Mutex<LocalState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<usize>,
}

impl<T> LocalQueue<T> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(LocalState {
                items: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    fn is_full(&self, state: &LocalState<T>) -> bool {
        self.capacity
            .is_some_and(|capacity| state.items.len() >= capacity)
    }
}

impl<T: Send> TaskQueue<T> for LocalQueue<T> {
    fn push(&self, item: T, timeout: Duration) -> Result<(), PushError<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        loop {
            if state.closed {
                return Err(PushError::Closed(item));
            }
            if !self.is_full(&state) {
                state.items.push_back(item);
                self.not_empty.notify_one();
                return Ok(());
            }
            if self.not_full.wait_until(&mut state, deadline).timed_out() && self.is_full(&state) {
                return Err(PushError::Timeout(item));
            }
        }
    }

    fn pop(&self, timeout: Duration) -> PopResult<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return PopResult::Item(item);
            }
            if state.closed {
                return PopResult::Closed;
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out()
                && state.items.is_empty()
            {
                return if state.closed {
                    PopResult::Closed
                } else {
                    PopResult::Timeout
                };
            }
        }
    }

    fn close(&self) {
        self.state.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    fn len(&self) -> usize {
        self.state.lock().items.len()
    }
}
