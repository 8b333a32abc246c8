//! Game state machine
//!
//! The [`Context`] owns exactly one live [`State`]. A state reacts to an
//! event by returning the kind of state to move to; the context then drops
//! the old state, builds the new one and fires the callbacks subscribed to
//! the destination kind, all under the state lock and on the calling
//! thread.
//!
//! Background work owned by a state (the simulation tick loop) requests
//! transitions through a [`TransitionHandle`]. The handle carries the
//! generation of the state that created it, so a request arriving after
//! that state was replaced is dropped.

mod exit;
mod game_over;
mod main_menu;
mod playing;

pub use exit::ExitState;
pub use game_over::GameOverState;
pub use main_menu::MainMenuState;
pub use playing::{Phase, PlayingState};

use crate::config::Config;
use crate::error::Result;
use crate::menu::Menu;
use crate::screen::Screen;
use crate::worker::WorkerPool;
use nibbler_event::Event;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Identity of a state, used for transitions and subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    MainMenu,
    Playing,
    GameOver,
    Exit,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainMenu => write!(f, "MainMenu"),
            Self::Playing => write!(f, "Playing"),
            Self::GameOver => write!(f, "GameOver"),
            Self::Exit => write!(f, "Exit"),
        }
    }
}

/// A live game state
pub trait State: Send {
    /// Which kind of state this is
    fn kind(&self) -> StateKind;

    /// React to an event, returning the state to move to
    fn handle_event(&mut self, event: Event) -> Option<StateKind>;

    /// Draw the state again, e.g. after the renderer changed
    fn redraw(&self) {}
}

/// Callback fired on every transition into a given state kind
pub type TransitionCallback = Box<dyn Fn() + Send + Sync>;

/// What a state gets to build itself
pub struct StateContext {
    pub config: Arc<Config>,
    pub screen: Arc<dyn Screen>,
    pub pool: Arc<WorkerPool>,
    transitions: TransitionHandle,
}

impl StateContext {
    /// Handle for requesting transitions from background work
    pub fn transitions(&self) -> TransitionHandle {
        self.transitions.clone()
    }
}

/// Requests a transition on behalf of one specific state instance
#[derive(Clone)]
pub struct TransitionHandle {
    shared: Weak<Shared>,
    generation: u64,
}

impl TransitionHandle {
    /// Move to `kind` if the requesting state is still the live one.
    ///
    /// Returns whether the transition happened.
    pub fn request(&self, kind: StateKind) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };

        let mut active = shared.active.lock();
        if active.generation != self.generation || active.state.is_none() {
            log::debug!("Dropping stale transition request to {}", kind);
            return false;
        }
        shared.change_state(&mut active, kind);
        true
    }
}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHandle")
            .field("generation", &self.generation)
            .finish()
    }
}

struct Active {
    state: Option<Box<dyn State>>,
    generation: u64,
}

struct Shared {
    config: Arc<Config>,
    screen: Arc<dyn Screen>,
    pool: Arc<WorkerPool>,
    active: Mutex<Active>,
    subscribers: RwLock<HashMap<StateKind, Vec<TransitionCallback>>>,
    exited: Mutex<bool>,
    exit_signal: Condvar,
}

impl Shared {
    fn change_state(self: &Arc<Self>, active: &mut Active, kind: StateKind) {
        log::debug!("Changing State({})", kind);

        active.generation += 1;
        active.state = None;

        let ctx = StateContext {
            config: Arc::clone(&self.config),
            screen: Arc::clone(&self.screen),
            pool: Arc::clone(&self.pool),
            transitions: TransitionHandle {
                shared: Arc::downgrade(self),
                generation: active.generation,
            },
        };

        let (state, kind) = match build_state(kind, &ctx) {
            Ok(state) => (state, kind),
            Err(e) => {
                log::error!("Failed to enter {}: {}", kind, e);
                (Box::new(ExitState::new()) as Box<dyn State>, StateKind::Exit)
            }
        };
        active.state = Some(state);

        if let Some(callbacks) = self.subscribers.read().get(&kind) {
            for callback in callbacks {
                callback();
            }
        }

        if kind == StateKind::Exit {
            self.signal_exit();
        }
    }

    fn signal_exit(&self) {
        let mut exited = self.exited.lock();
        *exited = true;
        self.exit_signal.notify_all();
    }
}

fn build_state(kind: StateKind, ctx: &StateContext) -> Result<Box<dyn State>> {
    Ok(match kind {
        StateKind::MainMenu => Box::new(MainMenuState::new(ctx)),
        StateKind::Playing => Box::new(PlayingState::new(ctx)?),
        StateKind::GameOver => Box::new(GameOverState::new(ctx)),
        StateKind::Exit => Box::new(ExitState::new()),
    })
}

/// Owner of the active game state
pub struct Context {
    shared: Arc<Shared>,
}

impl Context {
    /// Create a context in the main menu
    pub fn new(config: Arc<Config>, screen: Arc<dyn Screen>, pool: Arc<WorkerPool>) -> Self {
        let shared = Arc::new(Shared {
            config,
            screen,
            pool,
            active: Mutex::new(Active {
                state: None,
                generation: 0,
            }),
            subscribers: RwLock::new(HashMap::new()),
            exited: Mutex::new(false),
            exit_signal: Condvar::new(),
        });

        {
            let mut active = shared.active.lock();
            shared.change_state(&mut active, StateKind::MainMenu);
        }

        Self { shared }
    }

    /// Call `callback` on every transition into `kind`.
    ///
    /// Callbacks run under the state lock and must not call back into
    /// the context.
    pub fn subscribe<F>(&self, kind: StateKind, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared
            .subscribers
            .write()
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
        log::debug!("Callback subscribed to State({}) transitions", kind);
    }

    /// Dispatch an event to the active state
    pub fn handle_event(&self, event: Event) {
        let mut active = self.shared.active.lock();
        let next = match active.state.as_mut() {
            Some(state) => state.handle_event(event),
            None => return,
        };
        if let Some(kind) = next {
            self.shared.change_state(&mut active, kind);
        }
    }

    /// Kind of the active state, `None` after shutdown
    pub fn current(&self) -> Option<StateKind> {
        self.shared.active.lock().state.as_ref().map(|s| s.kind())
    }

    /// Ask the active state to draw itself again
    pub fn redraw(&self) {
        if let Some(state) = self.shared.active.lock().state.as_ref() {
            state.redraw();
        }
    }

    /// Whether the Exit state has been reached
    pub fn is_exited(&self) -> bool {
        *self.shared.exited.lock()
    }

    /// Block until the Exit state is reached
    pub fn run(&self) {
        let mut exited = self.shared.exited.lock();
        while !*exited {
            self.shared.exit_signal.wait(&mut exited);
        }
        log::info!("Context reached Exit");
    }

    /// Block until Exit or `timeout`; returns whether Exit was reached
    pub fn run_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut exited = self.shared.exited.lock();
        while !*exited {
            if self.shared.exit_signal.wait_until(&mut exited, deadline).timed_out() {
                break;
            }
        }
        *exited
    }

    /// Drop the active state and release `run` callers. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut active = self.shared.active.lock();
            active.generation += 1;
            if active.state.take().is_some() {
                log::debug!("Context dropped its active state");
            }
        }
        self.shared.signal_exit();
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.shutdown();
        self.shared.subscribers.write().clear();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("current", &self.current())
            .field("exited", &self.is_exited())
            .finish()
    }
}

/// Options of a menu state paired with where they lead
pub(crate) struct MenuChoices {
    menu: Menu,
    targets: Vec<StateKind>,
    screen: Arc<dyn Screen>,
}

impl MenuChoices {
    pub(crate) fn new(name: &str, choices: &[(&str, StateKind)], screen: Arc<dyn Screen>) -> Self {
        let choices = Self {
            menu: Menu::new(name, choices.iter().map(|(label, _)| *label)),
            targets: choices.iter().map(|(_, target)| *target).collect(),
            screen,
        };
        choices.show();
        choices
    }

    pub(crate) fn handle_event(&mut self, event: Event) -> Option<StateKind> {
        match event {
            Event::Exit => Some(StateKind::Exit),
            Event::Up => {
                self.menu.up();
                self.show();
                None
            }
            Event::Down => {
                self.menu.down();
                self.show();
                None
            }
            Event::Enter => {
                log::debug!("'{}' selected in {}", self.menu.hovered().unwrap_or_default(), self.menu.name());
                self.targets.get(self.menu.hover()).copied()
            }
            _ => {
                log::trace!("{} ignoring event {}", self.menu.name(), event);
                None
            }
        }
    }

    pub(crate) fn show(&self) {
        self.screen.show_menu(&self.menu.snapshot());
    }

    pub(crate) fn menu(&self) -> &Menu {
        &self.menu
    }
}
