//! Bounded file-parallel pool.
//!
//! One scoped thread per item, with at most `threads` alive at once. A bounded token
//! channel counts the active threads: the dispatcher sends a token before spawning and
//! blocks while the channel is full, each thread takes one token back when it ends.

use crossbeam_channel::Receiver;
use tracing::{debug, error};

use crate::pipeline::PipelineError;

/// Returns a slot token when a worker ends, even by panicking
struct SlotGuard<'a>(&'a Receiver<()>);

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let _ = self.0.recv();
    }
}

/// Apply `work` to every item with at most `threads` workers in flight.
///
/// Results are returned in item order.
///
/// # Errors
///
/// Returns `PipelineError::WorkerPanicked` if any worker panicked.
pub fn run_bounded<T, R, F>(items: &[T], threads: usize, work: F) -> Result<Vec<R>, PipelineError>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let threads = threads.max(1);
    let (token_sender, token_receiver) = crossbeam_channel::bounded::<()>(threads);
    let (result_sender, result_receiver) = crossbeam_channel::unbounded::<(usize, R)>();

    let scoped = crossbeam_utils::thread::scope(|scope| {
        for (index, item) in items.iter().enumerate() {
            // blocks while `threads` workers are running
            if token_sender.send(()).is_err() {
                break;
            }
            debug!("dispatching item {index}, {} workers active", token_sender.len());

            let token_receiver = &token_receiver;
            let result_sender = result_sender.clone();
            let work = &work;
            scope.spawn(move |_| {
                let _slot = SlotGuard(token_receiver);
                let result = work(index, item);
                let _ = result_sender.send((index, result));
            });
        }
    });
    drop(result_sender);

    if scoped.is_err() {
        error!("a worker thread panicked");
        return Err(PipelineError::WorkerPanicked);
    }

    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    for (index, result) in result_receiver {
        slots[index] = Some(result);
    }
    slots
        .into_iter()
        .collect::<Option<Vec<R>>>()
        .ok_or(PipelineError::WorkerPanicked)
}
