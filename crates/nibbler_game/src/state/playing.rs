//! A running snake game
//!
//! The simulation advances on a worker pool thread every tick while the
//! phase is [`Phase::Running`]. ENTER toggles between running and paused;
//! the game starts paused. When the run ends the tick loop asks the
//! context for the Game Over state.

use super::{State, StateContext, StateKind, TransitionHandle};
use crate::error::Result;
use crate::screen::Screen;
use crate::snake::{Orientation, Snake, StepOutcome};
use nibbler_event::Event;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sub-phase of the Playing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Paused,
    Running,
    Stopped,
}

struct Session {
    snake: Mutex<Snake>,
    orientation: Mutex<Orientation>,
    phase: Mutex<Phase>,
    wake: Condvar,
    tick: Duration,
}

impl Session {
    fn set_phase(&self, phase: Phase) {
        *self.phase.lock() = phase;
        self.wake.notify_all();
    }
}

/// Game in progress
pub struct PlayingState {
    session: Arc<Session>,
    screen: Arc<dyn Screen>,
}

impl PlayingState {
    /// Build the board and hand the tick loop to the worker pool.
    ///
    /// Fails with `SimulationBoundary` when the configured board is too small.
    pub fn new(ctx: &StateContext) -> Result<Self> {
        let snake = Snake::new(ctx.config.width, ctx.config.height)?;
        ctx.screen.show_frame(&snake.frame());

        let session = Arc::new(Session {
            orientation: Mutex::new(snake.heading()),
            snake: Mutex::new(snake),
            phase: Mutex::new(Phase::Paused),
            wake: Condvar::new(),
            tick: ctx.config.tick(),
        });

        let loop_session = Arc::clone(&session);
        let loop_screen = Arc::clone(&ctx.screen);
        let transitions = ctx.transitions();
        ctx.pool
            .push_task(move || Self::tick_loop(loop_session, loop_screen, transitions));

        log::info!("Game ready; press ENTER to start");
        Ok(Self {
            session,
            screen: Arc::clone(&ctx.screen),
        })
    }

    /// Current sub-phase
    pub fn phase(&self) -> Phase {
        *self.session.phase.lock()
    }

    fn tick_loop(session: Arc<Session>, screen: Arc<dyn Screen>, transitions: TransitionHandle) {
        log::debug!("Playing tick loop start");
        loop {
            {
                let mut phase = session.phase.lock();
                while *phase == Phase::Paused {
                    session.wake.wait(&mut phase);
                }
                if *phase == Phase::Stopped {
                    break;
                }
            }

            let orientation = *session.orientation.lock();
            let result = {
                let mut snake = session.snake.lock();
                snake.step(orientation).map(|outcome| (outcome, snake.frame(), snake.len()))
            };

            match result {
                Ok((outcome, frame, length)) => {
                    if outcome == StepOutcome::Ate {
                        log::debug!("Food eaten, length {}", length);
                    }
                    screen.show_frame(&frame);
                }
                Err(e) => {
                    log::info!("Run over: {}", e);
                    let next = if e.ends_run() { StateKind::GameOver } else { StateKind::Exit };
                    transitions.request(next);
                    break;
                }
            }

            let deadline = Instant::now() + session.tick;
            let mut phase = session.phase.lock();
            while *phase != Phase::Stopped && Instant::now() < deadline {
                session.wake.wait_until(&mut phase, deadline);
            }
        }
        log::debug!("Playing tick loop end");
    }
}

impl State for PlayingState {
    fn kind(&self) -> StateKind {
        StateKind::Playing
    }

    fn handle_event(&mut self, event: Event) -> Option<StateKind> {
        let orientation = match event {
            Event::Exit => return Some(StateKind::Exit),
            Event::Up => Orientation::North,
            Event::Down => Orientation::South,
            Event::Left => Orientation::West,
            Event::Right => Orientation::East,
            Event::Enter => {
                let next = match self.phase() {
                    Phase::Paused => Phase::Running,
                    Phase::Running => Phase::Paused,
                    Phase::Stopped => Phase::Stopped,
                };
                log::debug!("Playing phase now {:?}", next);
                self.session.set_phase(next);
                return None;
            }
            Event::SelectPlugin(_) => return None,
        };
        *self.session.orientation.lock() = orientation;
        None
    }

    fn redraw(&self) {
        let frame = self.session.snake.lock().frame();
        self.screen.show_frame(&frame);
    }
}

impl Drop for PlayingState {
    fn drop(&mut self) {
        // Only signal: this may run on the tick loop's own thread.
        self.session.set_phase(Phase::Stopped);
    }
}
