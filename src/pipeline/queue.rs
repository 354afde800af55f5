//! Bounded single-producer / multi-consumer task queue with drain-on-finish.
//!
//! The queue is open until the producer calls [`TaskQueue::finish`]. Consumers keep
//! popping until it is finished *and* empty, so no task enqueued before `finish` is
//! ever lost.
//!
//! Consumers pop through a [`Consumer`] handle. When the last handle is dropped, on
//! return or while unwinding from a panic, the queue is finished so a producer blocked
//! on a full queue gets its task back instead of waiting forever.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use concurrent_queue::{ConcurrentQueue, PopError, PushError};
use crossbeam_utils::Backoff;

/// Pause once spinning gives up, before polling the queue again
const IDLE_PAUSE: Duration = Duration::from_micros(50);

pub struct TaskQueue<T> {
    inner: ConcurrentQueue<T>,
    consumers: AtomicUsize,
}

impl<T> TaskQueue<T> {
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: ConcurrentQueue::bounded(capacity.max(1)),
            consumers: AtomicUsize::new(0),
        }
    }

    /// Enqueue a task, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Gives the task back if the queue has already been finished.
    pub fn push(&self, mut task: T) -> Result<(), T> {
        let backoff = Backoff::new();
        loop {
            match self.inner.push(task) {
                Ok(()) => return Ok(()),
                Err(PushError::Closed(t)) => return Err(t),
                Err(PushError::Full(t)) => {
                    task = t;
                    wait(&backoff);
                }
            }
        }
    }

    /// Dequeue a task, waiting while the queue is empty but still open.
    ///
    /// Returns `None` only once the queue is finished and fully drained.
    pub fn pop(&self) -> Option<T> {
        let backoff = Backoff::new();
        loop {
            match self.inner.pop() {
                Ok(task) => return Some(task),
                Err(PopError::Closed) => return None,
                Err(PopError::Empty) => wait(&backoff),
            }
        }
    }

    /// Mark the end of production. Queued tasks stay available to consumers.
    pub fn finish(&self) {
        self.inner.close();
    }

    /// Register a consumer. The queue is finished once every registered consumer has
    /// been dropped.
    pub fn consumer(&self) -> Consumer<'_, T> {
        self.consumers.fetch_add(1, Ordering::SeqCst);
        Consumer { queue: self }
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.inner.is_closed()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A registered consumer of a [`TaskQueue`]
pub struct Consumer<'q, T> {
    queue: &'q TaskQueue<T>,
}

impl<T> Consumer<'_, T> {
    /// See [`TaskQueue::pop`].
    pub fn pop(&self) -> Option<T> {
        self.queue.pop()
    }
}

impl<T> Drop for Consumer<'_, T> {
    fn drop(&mut self) {
        if self.queue.consumers.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.queue.finish();
        }
    }
}

fn wait(backoff: &Backoff) {
    if backoff.is_completed() {
        std::thread::sleep(IDLE_PAUSE);
    } else {
        backoff.snooze();
    }
}
