//! # nibbler_event - Event Queue
//!
//! Domain events and a multi-producer queue that fans each event out to
//! every subscriber on a dedicated delivery thread:
//! - FIFO delivery, insertion order preserved
//! - Subscribers notified in subscription order
//! - Every subscriber sees an event before the next one is delivered
//! - Producers never wait on subscribers

mod event;
mod queue;

pub use event::Event;
pub use queue::{EventCallback, EventQueue, EventSender};

/// Prelude
pub mod prelude {
    pub use crate::{Event, EventCallback, EventQueue, EventSender};
}
