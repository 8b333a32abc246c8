//! Main menu: "Play" or "Exit"

use super::{MenuChoices, State, StateContext, StateKind};
use nibbler_event::Event;

const CHOICES: [(&str, StateKind); 2] = [("Play", StateKind::Playing), ("Exit", StateKind::Exit)];

/// Initial state
pub struct MainMenuState {
    choices: MenuChoices,
}

impl MainMenuState {
    pub fn new(ctx: &StateContext) -> Self {
        Self {
            choices: MenuChoices::new("Main Menu", &CHOICES, ctx.screen.clone()),
        }
    }

    /// Index of the hovered option
    pub fn hover(&self) -> usize {
        self.choices.menu().hover()
    }
}

impl State for MainMenuState {
    fn kind(&self) -> StateKind {
        StateKind::MainMenu
    }

    fn handle_event(&mut self, event: Event) -> Option<StateKind> {
        self.choices.handle_event(event)
    }

    fn redraw(&self) {
        self.choices.show();
    }
}
