//! Graceful renderer switch-over
//!
//! Switching from plugin A to plugin B:
//!
//! 1. Ask A to shut down and wait for its completion, bounded by
//!    [`SwitcherConfig::shutdown_timeout`]. A timeout is logged and the
//!    switch continues.
//! 2. Join A's startup thread, bounded by its own
//!    [`SwitcherConfig::startup_join_timeout`] that starts once the shutdown
//!    wait is over. A thread still running after that is detached.
//! 3. Deactivate A, then load and instantiate B.
//! 4. Start B's startup handshake on its own thread, run the setup
//!    callback against B (input bindings), then signal setup completion.

use crate::error::{PluginError, Result};
use crate::registry::PluginRegistry;
use nibbler_event::Event;
use nibbler_plugin_api::{completion, HandshakeStatus, Renderer};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Callback re-run against every newly activated renderer
pub type SetupFn = Box<dyn Fn(&dyn Renderer) + Send + Sync>;

/// Switcher configuration
#[derive(Debug, Clone)]
pub struct SwitcherConfig {
    /// Upper bound on waiting for a renderer's shutdown handshake
    pub shutdown_timeout: Duration,
    /// Upper bound on joining the startup thread once shutdown has been waited on
    pub startup_join_timeout: Duration,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(1),
            startup_join_timeout: Duration::from_millis(500),
        }
    }
}

struct SwitchState {
    registry: PluginRegistry,
    startup: Option<JoinHandle<()>>,
}

/// Coordinates switching the active renderer plugin
pub struct PluginSwitcher {
    state: Mutex<SwitchState>,
    setup: RwLock<Option<SetupFn>>,
    config: SwitcherConfig,
}

impl PluginSwitcher {
    /// Wrap a registry. Nothing is activated yet.
    pub fn new(registry: PluginRegistry, config: SwitcherConfig) -> Self {
        log::info!("PluginSwitcher starting with {} plugin(s)", registry.len());
        Self {
            state: Mutex::new(SwitchState {
                registry,
                startup: None,
            }),
            setup: RwLock::new(None),
            config,
        }
    }

    /// Register the callback run against every activated renderer
    pub fn register_setup<F>(&self, setup: F)
    where
        F: Fn(&dyn Renderer) + Send + Sync + 'static,
    {
        *self.setup.write() = Some(Box::new(setup));
        log::debug!("Registered setup function");
    }

    /// Switch the active renderer to `id`.
    ///
    /// Switching to the active id is a no-op and an unknown id fails
    /// before the active renderer is touched. Loading errors abort the
    /// switch and leave no renderer active.
    pub fn switch_to(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();

        if !state.registry.contains(id) {
            log::error!("PluginSwitcher does not manage Plugin({})", id);
            return Err(PluginError::UnknownPlugin(id.to_string()));
        }

        if state.registry.current_id() == Some(id) && state.registry.current().is_ok() {
            log::debug!("Plugin({}) already active", id);
            return Ok(());
        }

        self.shutdown_active(&mut state);
        state.registry.activate(id)?;
        self.start(&mut state, id)?;

        log::info!("PluginSwitcher successfully switched to Plugin({})", id);
        Ok(())
    }

    /// React to `SelectPlugin` events; everything else is ignored
    pub fn handle_event(&self, event: Event) {
        if let Some(id) = event.plugin_id() {
            if let Err(e) = self.switch_to(&id) {
                log::error!("Failed to switch to Plugin({}): {}", id, e);
            }
        }
    }

    /// Run `f` against the active renderer
    pub fn with_renderer<R>(&self, f: impl FnOnce(&dyn Renderer) -> R) -> Result<R> {
        let state = self.state.lock();
        let renderer = state.registry.current()?;
        Ok(f(&**renderer))
    }

    /// Id of the active plugin
    pub fn active_id(&self) -> Option<String> {
        self.state.lock().registry.current_id().map(str::to_string)
    }

    /// Number of registry entries holding a live renderer
    pub fn live_instances(&self) -> usize {
        self.state.lock().registry.live_instances()
    }

    /// Registered plugin ids
    pub fn plugin_ids(&self) -> Vec<String> {
        self.state.lock().registry.ids().into_iter().map(str::to_string).collect()
    }

    /// Shut down and deactivate the active renderer. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if state.registry.current_id().is_none() && state.startup.is_none() {
            return;
        }
        self.shutdown_active(&mut state);
        log::info!("PluginSwitcher shut down");
    }

    fn shutdown_active(&self, state: &mut SwitchState) {
        if let (Some(id), Ok(renderer)) = (state.registry.current_id(), state.registry.current()) {
            log::info!("Requesting Plugin({}) graceful shutdown", id);
            match renderer.request_shutdown().wait_timeout(self.config.shutdown_timeout) {
                HandshakeStatus::Completed => log::debug!("Plugin({}) shut down cleanly", id),
                HandshakeStatus::TimedOut => log::error!(
                    "Plugin({}) did not shut down within {:?}; the renderer may be left in a bad state",
                    id,
                    self.config.shutdown_timeout
                ),
                HandshakeStatus::Abandoned => {
                    log::warn!("Plugin({}) abandoned its shutdown handshake", id)
                }
            }
        }

        if let Some(startup) = state.startup.take() {
            let deadline = Instant::now() + self.config.startup_join_timeout;
            while !startup.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            if startup.is_finished() {
                if startup.join().is_err() {
                    log::error!("Renderer startup thread panicked");
                }
            } else {
                log::error!("Renderer startup thread still running; detaching it");
            }
        }

        state.registry.deactivate_current();
    }

    fn start(&self, state: &mut SwitchState, id: &str) -> Result<()> {
        let renderer = state.registry.current_shared()?;
        log::info!("Plugin({}) says: {}", id, renderer.greet());

        let (setup_done, setup_signal) = completion();
        let startup_renderer = Arc::clone(&renderer);
        let startup = thread::Builder::new()
            .name(format!("nibbler-plugin-{}", id))
            .spawn(move || {
                startup_renderer.run_startup(setup_signal);
                log::debug!("Renderer startup handshake returned");
            })?;
        state.startup = Some(startup);

        match self.setup.read().as_ref() {
            Some(setup) => {
                log::debug!("Setting up Plugin({})...", id);
                setup(&**renderer);
            }
            None => log::warn!("No setup function registered for Plugin({})", id),
        }
        drop(renderer);

        setup_done.fulfill();
        Ok(())
    }
}

impl Drop for PluginSwitcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for PluginSwitcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSwitcher")
            .field("active", &self.active_id())
            .field("config", &self.config)
            .finish()
    }
}
