//! Game Configuration
//!
//! # Configuration Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. Config file: `$NIBBLER_CONFIG`, else `nibbler.toml` in the working directory
//! 3. Environment: `NIBBLER_WIDTH`, `NIBBLER_HEIGHT`, `NIBBLER_TICK_MS`,
//!    `NIBBLER_PLUGIN_PATH` (colon-separated)
//! 4. Positional command-line arguments: plugin libraries or directories
//!
//! # Example Config File
//!
//! ```toml
//! width = 30
//! height = 20
//! tick_ms = 150
//! plugin_paths = ["target/release"]
//! shutdown_timeout_ms = 2000
//! worker_threads = 2
//! ```

use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "nibbler.toml";

/// Read-only game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Board width in cells, walls included
    pub width: usize,
    /// Board height in cells, walls included
    pub height: usize,
    /// Simulation tick interval in milliseconds
    pub tick_ms: u64,
    /// Plugin libraries, or directories to scan for them
    pub plugin_paths: Vec<PathBuf>,
    /// Upper bound on a renderer's shutdown handshake in milliseconds
    pub shutdown_timeout_ms: u64,
    /// Background worker threads
    pub worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            tick_ms: 1000,
            plugin_paths: Vec::new(),
            shutdown_timeout_ms: 1000,
            worker_threads: 2,
        }
    }
}

impl Config {
    /// Load configuration from the process environment and arguments
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok(), std::env::args().skip(1))
    }

    /// Load configuration from explicit sources
    pub fn load_with<E, I, S>(env: E, args: I) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = match env("NIBBLER_CONFIG") {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                log::info!("Loaded config from {}", path);
                config
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                let config = Self::load_from_file(DEFAULT_CONFIG_FILE)?;
                log::info!("Loaded config from {}", DEFAULT_CONFIG_FILE);
                config
            }
            None => Self::default(),
        };

        config.apply_env(env)?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| GameError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GameError::config(e.to_string()))
    }

    /// Override fields from environment variables
    pub fn apply_env<E>(&mut self, env: E) -> Result<()>
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(width) = env("NIBBLER_WIDTH") {
            self.width = parse_var("NIBBLER_WIDTH", &width)?;
        }
        if let Some(height) = env("NIBBLER_HEIGHT") {
            self.height = parse_var("NIBBLER_HEIGHT", &height)?;
        }
        if let Some(tick) = env("NIBBLER_TICK_MS") {
            self.tick_ms = parse_var("NIBBLER_TICK_MS", &tick)?;
        }
        if let Some(paths) = env("NIBBLER_PLUGIN_PATH") {
            let paths: Vec<PathBuf> = paths
                .split(':')
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect();
            if !paths.is_empty() {
                log::info!("Plugin paths from env: {:?}", paths);
                self.plugin_paths = paths;
            }
        }
        Ok(())
    }

    /// Replace plugin paths with positional arguments, if any are given
    pub fn apply_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<PathBuf> = args
            .into_iter()
            .map(Into::into)
            .filter(|arg| !arg.starts_with("--"))
            .map(PathBuf::from)
            .collect();

        if !paths.is_empty() {
            log::info!("Plugin paths from args: {:?}", paths);
            self.plugin_paths = paths;
        }
    }

    /// Reject values nothing can run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(GameError::config("tick_ms must be greater than zero"));
        }
        if self.worker_threads == 0 {
            return Err(GameError::config("worker_threads must be greater than zero"));
        }
        Ok(())
    }

    /// Simulation tick interval
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Renderer shutdown handshake bound
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GameError::config(format!("{} has invalid value '{}'", key, value)))
}
