//! Single-fulfilment signals used by the startup and shutdown handshakes
//!
//! [`completion`] returns a [`Fulfiller`] and a [`Completion`] bound to the
//! same signal. The fulfiller is consumed by [`Fulfiller::fulfill`], so a
//! signal can be fulfilled at most once. Dropping a fulfiller without
//! fulfilling it abandons the handshake and wakes every waiter.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of waiting on a [`Completion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStatus {
    /// The other side fulfilled the signal
    Completed,
    /// The wait ran out of time; the signal may still complete later
    TimedOut,
    /// The fulfiller was dropped without fulfilling
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Completed,
    Abandoned,
}

struct Signal {
    phase: Mutex<Phase>,
    cv: Condvar,
}

impl Signal {
    fn new(phase: Phase) -> Arc<Self> {
        Arc::new(Self {
            phase: Mutex::new(phase),
            cv: Condvar::new(),
        })
    }
}

/// Create a linked fulfiller/completion pair
pub fn completion() -> (Fulfiller, Completion) {
    let signal = Signal::new(Phase::Pending);
    (
        Fulfiller {
            signal: Some(signal.clone()),
        },
        Completion { signal },
    )
}

/// Write side of a handshake signal
pub struct Fulfiller {
    signal: Option<Arc<Signal>>,
}

impl Fulfiller {
    /// Mark the signal as completed and wake all waiters
    pub fn fulfill(mut self) {
        self.finish(Phase::Completed);
    }

    fn finish(&mut self, phase: Phase) {
        if let Some(signal) = self.signal.take() {
            *signal.phase.lock() = phase;
            signal.cv.notify_all();
        }
    }
}

impl Drop for Fulfiller {
    fn drop(&mut self) {
        if self.signal.is_some() {
            log::debug!("Handshake fulfiller dropped before fulfilment");
            self.finish(Phase::Abandoned);
        }
    }
}

impl fmt::Debug for Fulfiller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fulfiller")
            .field("pending", &self.signal.is_some())
            .finish()
    }
}

/// Read side of a handshake signal, cheap to clone
#[derive(Clone)]
pub struct Completion {
    signal: Arc<Signal>,
}

impl Completion {
    /// A completion that is already fulfilled
    pub fn ready() -> Self {
        Self {
            signal: Signal::new(Phase::Completed),
        }
    }

    /// Block until the signal is fulfilled or abandoned
    pub fn wait(&self) -> HandshakeStatus {
        let mut phase = self.signal.phase.lock();
        while *phase == Phase::Pending {
            self.signal.cv.wait(&mut phase);
        }
        Self::status(*phase)
    }

    /// Block for at most `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> HandshakeStatus {
        let deadline = Instant::now() + timeout;
        let mut phase = self.signal.phase.lock();
        while *phase == Phase::Pending {
            if self.signal.cv.wait_until(&mut phase, deadline).timed_out() {
                break;
            }
        }
        Self::status(*phase)
    }

    /// Whether the signal has been fulfilled
    pub fn is_complete(&self) -> bool {
        *self.signal.phase.lock() == Phase::Completed
    }

    fn status(phase: Phase) -> HandshakeStatus {
        match phase {
            Phase::Pending => HandshakeStatus::TimedOut,
            Phase::Completed => HandshakeStatus::Completed,
            Phase::Abandoned => HandshakeStatus::Abandoned,
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("phase", &*self.signal.phase.lock())
            .finish()
    }
}
