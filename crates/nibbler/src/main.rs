//! Nibbler
//!
//! Usage: `nibbler [PLUGIN_LIBRARY_OR_DIR]...`
//!
//! Renderer plugins are loaded from the given paths, or from the config
//! file and `NIBBLER_PLUGIN_PATH` when none are given. Keys 1, 2 and 3
//! switch between the first three plugins while the game runs.

use nibbler_event::Event;
use nibbler_game::{App, Config};
use nibbler_plugin::NativeLoader;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Board {}x{}, tick {} ms, plugin paths {:?}",
        config.width,
        config.height,
        config.tick_ms,
        config.plugin_paths
    );

    let app = match App::new(config, Arc::new(NativeLoader)) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(sender) = app.sender() {
        let result = ctrlc::set_handler(move || {
            log::info!("Shutdown signal received...");
            sender.push(Event::Exit);
        });
        if let Err(e) = result {
            log::warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    app.run();
    drop(app);

    log::info!("Goodbye");
    ExitCode::SUCCESS
}
