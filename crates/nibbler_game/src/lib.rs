//! # nibbler_game - Snake Game Host
//!
//! Game logic that runs independently of the active renderer plugin:
//!
//! - [`Context`]: owns the single live game state and dispatches events
//! - [`Snake`]: walled-grid simulation producing ARGB frames
//! - [`WorkerPool`]: background threads hosting the simulation tick loop
//! - [`App`]: wires renderer input through the event queue into the
//!   switcher and the state machine
//!
//! ## Example
//!
//! ```ignore
//! use nibbler_game::prelude::*;
//! use nibbler_plugin::NativeLoader;
//! use std::sync::Arc;
//!
//! let app = App::new(Config::load()?, Arc::new(NativeLoader))?;
//! app.run();
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod menu;
pub mod screen;
pub mod snake;
pub mod state;
pub mod worker;

pub use app::{App, DEFAULT_BINDINGS};
pub use config::Config;
pub use error::{GameError, Result};
pub use menu::Menu;
pub use screen::{NullScreen, Screen};
pub use snake::{Cell, Entity, Grid, Orientation, Snake, StepOutcome};
pub use state::{Context, State, StateContext, StateKind, TransitionHandle};
pub use worker::WorkerPool;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::App;
    pub use crate::config::Config;
    pub use crate::error::{GameError, Result};
    pub use crate::screen::Screen;
    pub use crate::state::{Context, StateKind};
}
