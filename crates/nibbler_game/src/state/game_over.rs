//! Menu shown when a run ends

use super::{MenuChoices, State, StateContext, StateKind};
use nibbler_event::Event;

const CHOICES: [(&str, StateKind); 3] = [
    ("Play again", StateKind::Playing),
    ("Main Menu", StateKind::MainMenu),
    ("Exit", StateKind::Exit),
];

/// Entered after a collision or when the board is full
pub struct GameOverState {
    choices: MenuChoices,
}

impl GameOverState {
    pub fn new(ctx: &StateContext) -> Self {
        log::info!("Game over");
        Self {
            choices: MenuChoices::new("Game Over", &CHOICES, ctx.screen.clone()),
        }
    }
}

impl State for GameOverState {
    fn kind(&self) -> StateKind {
        StateKind::GameOver
    }

    fn handle_event(&mut self, event: Event) -> Option<StateKind> {
        self.choices.handle_event(event)
    }

    fn redraw(&self) {
        self.choices.show();
    }
}
