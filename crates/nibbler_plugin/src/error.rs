//! Error types for the plugin runtime

use std::path::PathBuf;
use thiserror::Error;

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors that can occur while loading or switching renderer plugins
#[derive(Debug, Error)]
pub enum PluginError {
    /// Failed to open the dynamic library
    #[error("Failed to load library '{path}': {message}")]
    ModuleLoad {
        path: PathBuf,
        message: String,
    },

    /// Library does not export a required entry point
    #[error("Symbol '{symbol}' not found in library '{path}'")]
    SymbolResolution {
        path: PathBuf,
        symbol: String,
    },

    /// The `create` entry point returned null
    #[error("Failed to create renderer instance of plugin '{0}'")]
    InstanceCreation(String),

    /// An instance was requested from a module that is not loaded
    #[error("Module of plugin '{0}' is not loaded")]
    ModuleNotLoaded(String),

    /// Switch requested to an unregistered id
    #[error("Plugin '{0}' not registered")]
    UnknownPlugin(String),

    /// Query made while no renderer is active
    #[error("No active plugin")]
    NoActivePlugin,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Create a module load error
    pub fn module_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PluginError::ModuleLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a symbol resolution error
    pub fn symbol_resolution(path: impl Into<PathBuf>, symbol: impl Into<String>) -> Self {
        PluginError::SymbolResolution {
            path: path.into(),
            symbol: symbol.into(),
        }
    }
}
