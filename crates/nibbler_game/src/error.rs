//! Error types for the game

use nibbler_plugin::PluginError;
use thiserror::Error;

/// Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;

/// Errors raised by the simulation, configuration and app wiring
#[derive(Debug, Error)]
pub enum GameError {
    /// Board too small to place the initial player
    #[error("Board {width}x{height} is smaller than the minimum {min_width}x{min_height}")]
    SimulationBoundary {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },

    /// Player moved into a wall or itself
    #[error("Player hit {0} at ({1}, {2})")]
    SimulationCollision(&'static str, usize, usize),

    /// No empty cell left to spawn food on
    #[error("No empty space left on the board")]
    NoEmptySpace,

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Renderer plugin error
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

impl GameError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        GameError::Config(message.into())
    }

    /// Whether this error ends a run rather than the process
    pub fn ends_run(&self) -> bool {
        matches!(self, GameError::SimulationCollision(..) | GameError::NoEmptySpace)
    }
}
