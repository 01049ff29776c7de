//! Bounded, thread-safe FIFO for handing constructed instances between threads.
//!
//! Producers `push`, consumers `pop`, and anyone may `close`. Each item is
//! delivered to exactly one consumer. The queue never holds more than its
//! capacity; when it is full, producers either wait or are turned away,
//! depending on the [`Backpressure`] policy chosen at construction.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::config::RegistryConfig;
use crate::error::{ConfigError, PushError, QueueClosedError};

/// What `push` does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Backpressure {
    /// Wait until a consumer makes room or the queue closes
    #[default]
    Block,
    /// Fail immediately with [`PushError::Full`]
    Reject,
}

impl FromStr for Backpressure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Backpressure::Block),
            "reject" => Ok(Backpressure::Reject),
            _ => Err(ConfigError::InvalidValue {
                name: "backpressure",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Backpressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backpressure::Block => "block",
            Backpressure::Reject => "reject",
        })
    }
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Bounded multi-producer, multi-consumer FIFO.
///
/// # Examples
///
/// ```
/// use ferrous_registry::{QueueClosedError, WorkQueue};
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(WorkQueue::new(2));
///
/// let producer = {
///     let queue = queue.clone();
///     thread::spawn(move || {
///         for job in ["a", "b", "c"] {
///             queue.push(job).unwrap();
///         }
///         queue.close();
///     })
/// };
///
/// let mut received = Vec::new();
/// while let Ok(job) = queue.pop() {
///     received.push(job);
/// }
/// producer.join().unwrap();
///
/// assert_eq!(received, ["a", "b", "c"]);
/// assert_eq!(queue.pop(), Err(QueueClosedError));
/// ```
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    backpressure: Backpressure,
}

impl<T> WorkQueue<T> {
    /// Creates a queue holding at most `capacity` items whose producers block
    /// when it is full. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self::with_backpressure(capacity.max(1), Backpressure::Block)
    }

    /// Creates a queue with an explicit backpressure policy. A capacity of
    /// zero is raised to one.
    pub fn with_backpressure(capacity: usize, backpressure: Backpressure) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: capacity.max(1),
            backpressure,
        }
    }

    /// Creates a queue, rejecting a zero capacity.
    pub fn try_new(capacity: usize, backpressure: Backpressure) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self::with_backpressure(capacity, backpressure))
    }

    /// Creates a queue sized and configured from `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        Self::try_new(config.queue_capacity, config.backpressure)
    }

    /// Appends `item`.
    ///
    /// When the queue is full, a [`Backpressure::Block`] queue waits for room
    /// and a [`Backpressure::Reject`] queue returns [`PushError::Full`]. A
    /// closed queue returns [`PushError::Closed`], including when it closes
    /// while the producer is waiting. The item is handed back in both cases.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PushError::Closed(item));
            }
            if state.items.len() < self.capacity {
                break;
            }
            match self.backpressure {
                Backpressure::Reject => return Err(PushError::Full(item)),
                Backpressure::Block => self.not_full.wait(&mut state),
            }
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Appends `item` only if there is room right now, whatever the policy.
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PushError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(PushError::Full(item));
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, waiting while the queue is empty.
    ///
    /// After `close()`, remaining items are still delivered; only an empty,
    /// closed queue returns [`QueueClosedError`].
    pub fn pop(&self) -> Result<T, QueueClosedError> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Ok(item);
            }
            if state.closed {
                return Err(QueueClosedError);
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Removes the oldest item if one is available. `Ok(None)` means empty
    /// but still open.
    pub fn try_pop(&self) -> Result<Option<T>, QueueClosedError> {
        let mut state = self.state.lock();
        match state.items.pop_front() {
            Some(item) => {
                drop(state);
                self.not_full.notify_one();
                Ok(Some(item))
            }
            None if state.closed => Err(QueueClosedError),
            None => Ok(None),
        }
    }

    /// Like [`pop`](Self::pop), but gives up after `timeout` with `Ok(None)`.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<Option<T>, QueueClosedError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Ok(Some(item));
            }
            if state.closed {
                return Err(QueueClosedError);
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                // One last look: an item may have landed as the wait expired.
                return match state.items.pop_front() {
                    Some(item) => {
                        drop(state);
                        self.not_full.notify_one();
                        Ok(Some(item))
                    }
                    None if state.closed => Err(QueueClosedError),
                    None => Ok(None),
                };
            }
        }
    }

    /// Closes the queue. Idempotent.
    ///
    /// Wakes every blocked producer and consumer. Later pushes fail; pops
    /// drain what is left and then fail.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            tracing::debug!(pending = state.items.len(), "work queue closed");
        }
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of items waiting.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn backpressure(&self) -> Backpressure {
        self.backpressure
    }

    /// Iterator that pops until the queue is closed and empty.
    pub fn drain(&self) -> Drain<'_, T> {
        Drain { queue: self }
    }
}

impl<T> fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("WorkQueue")
            .field("len", &state.items.len())
            .field("capacity", &self.capacity)
            .field("backpressure", &self.backpressure)
            .field("closed", &state.closed)
            .finish()
    }
}

/// Blocking iterator returned by [`WorkQueue::drain`].
pub struct Drain<'a, T> {
    queue: &'a WorkQueue<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop().ok()
    }
}
