//! Fixed-size background worker pool
//!
//! The pool holds a single pending task slot. Pushing while a task is
//! still unclaimed replaces it, so the last pushed task wins. Dropping the
//! pool wakes every worker and joins them; a running task is never
//! interrupted, it has to return on its own.

use crate::error::Result;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Slot {
    task: Option<Task>,
    exit: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

/// Pool of threads running submitted tasks
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `threads` workers
    pub fn new(threads: usize) -> Result<Self> {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot { task: None, exit: false }),
            wake: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(threads),
        };
        for index in 0..threads {
            let shared = Arc::clone(&pool.shared);
            let worker = thread::Builder::new()
                .name(format!("nibbler-worker-{}", index))
                .spawn(move || Self::worker_loop(index, shared))?;
            pool.workers.push(worker);
        }

        log::debug!("WorkerPool started {} thread(s)", threads);
        Ok(pool)
    }

    /// Submit a task, replacing any task no worker has picked up yet
    pub fn push_task<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.shared.slot.lock();
        if slot.exit {
            log::warn!("WorkerPool is shutting down; task dropped");
            return;
        }
        if slot.task.replace(Box::new(task)).is_some() {
            log::debug!("Replaced a pending task that was not picked up");
        }
        self.shared.wake.notify_one();
    }

    /// Whether a task is waiting for a worker
    pub fn has_pending(&self) -> bool {
        self.shared.slot.lock().task.is_some()
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    fn worker_loop(index: usize, shared: Arc<Shared>) {
        loop {
            let task = {
                let mut slot = shared.slot.lock();
                loop {
                    if slot.exit {
                        log::trace!("Worker {} exiting", index);
                        return;
                    }
                    if let Some(task) = slot.task.take() {
                        break task;
                    }
                    shared.wake.wait(&mut slot);
                }
            };

            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                log::error!("Task panicked on worker {}", index);
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut slot = self.shared.slot.lock();
            slot.exit = true;
            slot.task = None;
            self.shared.wake.notify_all();
        }

        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            if worker.thread().id() == current {
                log::warn!("WorkerPool dropped from its own worker; not joining it");
                continue;
            }
            if worker.join().is_err() {
                log::error!("Worker thread panicked");
            }
        }
        log::debug!("WorkerPool stopped");
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("pending", &self.has_pending())
            .finish()
    }
}
