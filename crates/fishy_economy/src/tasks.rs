//! # Background Task Queue
//!
//! Side effects of a cast that the response does not wait for (score
//! increments, bait consumption, statistics) are submitted here and run in
//! order on a single worker thread.
//!
//! ## Failure handling
//!
//! A failed task is logged at warn level and counted. It is never retried and
//! never reported to the caller that submitted it.
//!
//! ## Backpressure
//!
//! The queue is bounded. When it is full, [`TaskQueue::submit`] runs the task
//! on the calling thread instead of dropping it.

use crate::error::{FishingError, FishingResult};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() -> FishingResult<()> + Send + 'static>;

enum Message {
    Run { name: &'static str, job: Job },
    Flush(Sender<()>),
}

/// Task queue counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Tasks accepted.
    pub submitted: u64,
    /// Tasks that returned `Ok`.
    pub completed: u64,
    /// Tasks that returned an error.
    pub failed: u64,
    /// Tasks run on the submitting thread because the queue was full.
    pub ran_inline: u64,
}

/// Bounded single-worker queue for fire-and-forget work.
pub struct TaskQueue {
    sender: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
    stats: Arc<Mutex<TaskStats>>,
}

impl TaskQueue {
    /// Starts the worker thread with room for `capacity` pending tasks.
    pub fn start(capacity: usize) -> FishingResult<Self> {
        let (sender, receiver) = bounded(capacity.max(1));
        let stats = Arc::new(Mutex::new(TaskStats::default()));

        let worker_stats = Arc::clone(&stats);
        let worker = thread::Builder::new()
            .name("fishy-tasks".into())
            .spawn(move || Self::worker_loop(&receiver, &worker_stats))
            .map_err(|e| FishingError::Config(format!("failed to spawn task worker: {e}")))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            stats,
        })
    }

    fn worker_loop(receiver: &Receiver<Message>, stats: &Mutex<TaskStats>) {
        // Ends once every sender is gone and the backlog is drained.
        for message in receiver {
            match message {
                Message::Run { name, job } => Self::run(name, job, stats),
                Message::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    }

    fn run(name: &'static str, job: Job, stats: &Mutex<TaskStats>) {
        match job() {
            Ok(()) => stats.lock().completed += 1,
            Err(error) => {
                tracing::warn!(task = name, %error, "background task failed");
                stats.lock().failed += 1;
            }
        }
    }

    /// Queues `job`. Runs it inline if the queue is full.
    pub fn submit<F>(&self, name: &'static str, job: F) -> FishingResult<()>
    where
        F: FnOnce() -> FishingResult<()> + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(FishingError::QueueClosed)?;
        self.stats.lock().submitted += 1;

        match sender.try_send(Message::Run {
            name,
            job: Box::new(job),
        }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(Message::Run { name, job })) => {
                tracing::debug!(task = name, "task queue full, running inline");
                self.stats.lock().ran_inline += 1;
                Self::run(name, job, &self.stats);
                Ok(())
            }
            Err(TrySendError::Full(Message::Flush(_))) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(FishingError::QueueClosed),
        }
    }

    /// Blocks until every task submitted before this call has run.
    pub fn flush(&self) -> FishingResult<()> {
        let sender = self.sender.as_ref().ok_or(FishingError::QueueClosed)?;
        let (done_tx, done_rx) = bounded(1);
        sender
            .send(Message::Flush(done_tx))
            .map_err(|_| FishingError::QueueClosed)?;
        done_rx.recv().map_err(|_| FishingError::QueueClosed)
    }

    /// Tasks waiting for the worker.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    /// Returns current statistics.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        *self.stats.lock()
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .field("stats", &self.stats())
            .finish()
    }
}
