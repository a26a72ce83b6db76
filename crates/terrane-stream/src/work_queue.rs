//! Fixed worker pool with a bounded task queue and a per-tick completion drain.
//!
//! Jobs are keyed. While a key is in flight, further submissions for it are
//! coalesced. When the task channel is full, jobs wait in a backlog owned by
//! the controlling thread and are flushed on the next [`WorkQueue::drain`].
//! Completions are only ever observed on the thread that calls `drain`.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use rustc_hash::FxHashSet;
use tracing::{error, trace, warn};

type Job<R> = Box<dyn FnOnce() -> R + Send + 'static>;

struct Task<K, R> {
    key: K,
    job: Job<R>,
}

/// Why a job produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkError {
    #[error("job panicked: {0}")]
    Panicked(String),
}

/// A finished job, delivered by [`WorkQueue::drain`].
#[derive(Debug)]
pub struct Completion<K, R> {
    pub key: K,
    pub outcome: Result<R, WorkError>,
    /// Time spent running the job, in microseconds.
    pub elapsed_us: u64,
}

/// What [`WorkQueue::submit`] did with a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Handed to the workers.
    Queued,
    /// Held in the backlog until the task channel has room.
    Deferred,
    /// A job with the same key is already in flight; this one was dropped.
    Coalesced,
    /// The pool has shut down.
    Rejected,
}

/// Worker count leaving headroom for the controlling thread: `cpus - 2`, at least 1.
pub fn default_worker_count() -> usize {
    let cpus = num_cpus::get().max(2);
    (cpus - 2).max(1)
}

/// A keyed job queue served by a fixed pool of named worker threads.
pub struct WorkQueue<K, R> {
    task_sender: Option<Sender<Task<K, R>>>,
    completion_receiver: Receiver<Completion<K, R>>,
    workers: Vec<JoinHandle<()>>,
    in_flight: FxHashSet<K>,
    backlog: VecDeque<Task<K, R>>,
    shutdown: Arc<AtomicBool>,
}

impl<K, R> WorkQueue<K, R>
where
    K: Copy + Eq + Hash + Debug + Send + 'static,
    R: Send + 'static,
{
    /// Spawns `worker_count` threads (at least one) reading from a task
    /// channel that holds up to `capacity` jobs.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(worker_count: usize, capacity: usize) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = crossbeam_channel::bounded::<Task<K, R>>(capacity.max(1));
        let (completion_sender, completion_receiver) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count.max(1));
        for index in 0..worker_count.max(1) {
            let rx = task_receiver.clone();
            let tx = completion_sender.clone();
            let shutdown = Arc::clone(&shutdown);
            let handle = std::thread::Builder::new()
                .name(format!("terrane-worker-{index}"))
                .spawn(move || worker_loop(rx, tx, shutdown))?;
            workers.push(handle);
        }

        Ok(Self {
            task_sender: Some(task_sender),
            completion_receiver,
            workers,
            in_flight: FxHashSet::default(),
            backlog: VecDeque::new(),
            shutdown,
        })
    }

    /// Submits `job` under `key`.
    pub fn submit(&mut self, key: K, job: impl FnOnce() -> R + Send + 'static) -> Submission {
        if self.in_flight.contains(&key) {
            trace!(?key, "coalesced duplicate job");
            return Submission::Coalesced;
        }
        let Some(sender) = &self.task_sender else {
            return Submission::Rejected;
        };

        let task = Task {
            key,
            job: Box::new(job),
        };
        // Keep submission order once anything is waiting.
        if !self.backlog.is_empty() {
            self.in_flight.insert(key);
            self.backlog.push_back(task);
            return Submission::Deferred;
        }
        match sender.try_send(task) {
            Ok(()) => {
                self.in_flight.insert(key);
                Submission::Queued
            }
            Err(TrySendError::Full(task)) => {
                self.in_flight.insert(key);
                self.backlog.push_back(task);
                Submission::Deferred
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(?key, "work queue disconnected, job rejected");
                Submission::Rejected
            }
        }
    }

    /// Flushes the backlog and returns every completion present right now.
    ///
    /// Completions that arrive while draining are left for the next call.
    pub fn drain(&mut self) -> Vec<Completion<K, R>> {
        self.flush_backlog();

        let pending = self.completion_receiver.len();
        let mut completions = Vec::with_capacity(pending);
        for _ in 0..pending {
            let Ok(completion) = self.completion_receiver.try_recv() else {
                break;
            };
            self.in_flight.remove(&completion.key);
            completions.push(completion);
        }
        completions
    }

    fn flush_backlog(&mut self) {
        let Some(sender) = &self.task_sender else {
            return;
        };
        while let Some(task) = self.backlog.pop_front() {
            match sender.try_send(task) {
                Ok(()) => {}
                Err(TrySendError::Full(task)) => {
                    self.backlog.push_front(task);
                    break;
                }
                Err(TrySendError::Disconnected(task)) => {
                    self.in_flight.remove(&task.key);
                }
            }
        }
    }

    /// Returns `true` if a job for `key` is queued, deferred or running.
    pub fn is_pending(&self, key: &K) -> bool {
        self.in_flight.contains(key)
    }

    /// Jobs submitted but not yet drained, backlog included.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops the workers and joins them. Queued jobs that have not started are skipped.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.task_sender.take();
        self.backlog.clear();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl<K, R> Drop for WorkQueue<K, R> {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.task_sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop<K: Debug, R>(
    tasks: Receiver<Task<K, R>>,
    completions: Sender<Completion<K, R>>,
    shutdown: Arc<AtomicBool>,
) {
    while let Ok(Task { key, job }) = tasks.recv() {
        if shutdown.load(Ordering::Relaxed) {
            continue;
        }

        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(job)).map_err(|payload| {
            let message = panic_message(payload.as_ref());
            error!(?key, %message, "job panicked");
            WorkError::Panicked(message)
        });
        let elapsed_us = start.elapsed().as_micros() as u64;

        if completions
            .send(Completion {
                key,
                outcome,
                elapsed_us,
            })
            .is_err()
        {
            break;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
