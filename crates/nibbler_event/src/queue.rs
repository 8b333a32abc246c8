//! Event queue with background fan-out
//!
//! Producers append under a single mutex and wake the delivery thread.
//! The delivery thread swaps the pending events into a private buffer,
//! releases the lock, then hands every event to every subscriber.

use crate::event::Event;
use parking_lot::{Condvar, Mutex, RwLock};
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Subscriber callback, invoked on the delivery thread
pub type EventCallback = Box<dyn Fn(Event) + Send + Sync>;

struct Pending {
    events: Vec<Event>,
    exit: bool,
}

struct Shared {
    pending: Mutex<Pending>,
    cv: Condvar,
    subscribers: RwLock<Vec<EventCallback>>,
}

impl Shared {
    fn push(&self, event: Event) -> bool {
        {
            let mut pending = self.pending.lock();
            if pending.exit {
                log::debug!("Dropping event {} pushed after shutdown", event);
                return false;
            }
            pending.events.push(event);
            log::debug!("Event {}", event);
        }
        self.cv.notify_one();
        true
    }
}

/// Thread-safe FIFO of [`Event`]s with ordered fan-out.
///
/// Subscribers are expected to be registered during setup, before the
/// first event is pushed. A subscriber added while events are in flight
/// only sees batches drained after it was added.
///
/// Dropping the queue stops the delivery thread and joins it. Events still
/// pending at that point are discarded.
pub struct EventQueue {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl EventQueue {
    /// Create a queue and start its delivery thread
    pub fn new() -> io::Result<Self> {
        let shared = Arc::new(Shared {
            pending: Mutex::new(Pending {
                events: Vec::new(),
                exit: false,
            }),
            cv: Condvar::new(),
            subscribers: RwLock::new(Vec::new()),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("nibbler-events".to_string())
            .spawn(move || Self::deliver_loop(worker_shared))?;

        log::info!("EventQueue started");
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Append an event and wake the delivery thread
    pub fn push(&self, event: Event) {
        self.shared.push(event);
    }

    /// Register a subscriber. Notification order is subscription order.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        let mut subscribers = self.shared.subscribers.write();
        subscribers.push(Box::new(callback));
        log::debug!("Subscriber #{} registered", subscribers.len());
    }

    /// Cheap handle producers can keep
    pub fn sender(&self) -> EventSender {
        EventSender {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of events waiting for delivery
    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().events.len()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().len()
    }

    fn deliver_loop(shared: Arc<Shared>) {
        log::debug!("Event delivery thread starting");
        let mut batch = Vec::new();

        loop {
            {
                let mut pending = shared.pending.lock();
                while !pending.exit && pending.events.is_empty() {
                    shared.cv.wait(&mut pending);
                }
                if pending.exit {
                    break;
                }
                std::mem::swap(&mut pending.events, &mut batch);
            }

            log::trace!("Delivering {} events", batch.len());
            for event in batch.drain(..) {
                if shared.pending.lock().exit {
                    break;
                }
                let subscribers = shared.subscribers.read();
                for (index, callback) in subscribers.iter().enumerate() {
                    if panic::catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                        log::error!("Subscriber #{} panicked on event {}", index + 1, event);
                    }
                }
            }
            batch.clear();
        }

        log::debug!("Event delivery thread exiting");
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        {
            let mut pending = self.shared.pending.lock();
            pending.exit = true;
            if !pending.events.is_empty() {
                log::debug!("Discarding {} undelivered events", pending.events.len());
                pending.events.clear();
            }
        }
        self.shared.cv.notify_all();

        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == thread::current().id() {
                log::warn!("EventQueue dropped from its own delivery thread; not joining");
                return;
            }
            if worker.join().is_err() {
                log::error!("Event delivery thread panicked");
            }
        }

        // Subscribers often capture senders of this very queue.
        self.shared.subscribers.write().clear();
        log::info!("EventQueue stopped");
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending_count())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Producer handle for an [`EventQueue`].
///
/// Pushing after the queue has shut down is a no-op.
#[derive(Clone)]
pub struct EventSender {
    shared: Arc<Shared>,
}

impl EventSender {
    /// Append an event; returns `false` if the queue is shut down
    pub fn push(&self, event: Event) -> bool {
        self.shared.push(event)
    }
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender").finish_non_exhaustive()
    }
}
