//! Terminal state

use super::{State, StateKind};
use nibbler_event::Event;

/// Ignores every event; reaching it releases `Context::run`
#[derive(Debug, Default)]
pub struct ExitState;

impl ExitState {
    pub fn new() -> Self {
        log::info!("Exiting");
        Self
    }
}

impl State for ExitState {
    fn kind(&self) -> StateKind {
        StateKind::Exit
    }

    fn handle_event(&mut self, event: Event) -> Option<StateKind> {
        log::trace!("Exit state ignoring event {}", event);
        None
    }
}
