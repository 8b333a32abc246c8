//! Application wiring
//!
//! ```text
//! renderer input ──▶ EventSender ──▶ EventQueue ──┬──▶ PluginSwitcher
//!                                                 └──▶ Context ──▶ State
//!                                                                   │
//!                    active renderer ◀── SwitcherScreen ◀───────────┘
//! ```

use crate::config::Config;
use crate::error::{GameError, Result};
use crate::screen::Screen;
use crate::state::Context;
use crate::worker::WorkerPool;
use nibbler_event::{Event, EventQueue, EventSender};
use nibbler_plugin::{discover_plugins, ModuleLoader, PluginError, PluginRegistry, PluginSwitcher, SwitcherConfig};
use nibbler_plugin_api::{Frame, Input, MenuSnapshot};
use std::fmt;
use std::sync::{Arc, Weak};

/// Input bindings installed on every activated renderer
pub const DEFAULT_BINDINGS: [(Input, Event); 13] = [
    (Input::W, Event::Up),
    (Input::A, Event::Left),
    (Input::S, Event::Down),
    (Input::D, Event::Right),
    (Input::ArrowUp, Event::Up),
    (Input::ArrowLeft, Event::Left),
    (Input::ArrowDown, Event::Down),
    (Input::ArrowRight, Event::Right),
    (Input::Enter, Event::Enter),
    (Input::Esc, Event::Exit),
    (Input::One, Event::SelectPlugin(1)),
    (Input::Two, Event::SelectPlugin(2)),
    (Input::Three, Event::SelectPlugin(3)),
];

/// Draws on whichever renderer is active
struct SwitcherScreen {
    switcher: Weak<PluginSwitcher>,
}

impl SwitcherScreen {
    fn draw(&self, what: &str, f: impl FnOnce(&dyn nibbler_plugin_api::Renderer)) {
        let Some(switcher) = self.switcher.upgrade() else {
            return;
        };
        match switcher.with_renderer(f) {
            Ok(()) => {}
            Err(PluginError::NoActivePlugin) => log::debug!("No active renderer for {}", what),
            Err(e) => log::warn!("Failed to draw {}: {}", what, e),
        }
    }
}

impl Screen for SwitcherScreen {
    fn show_menu(&self, menu: &MenuSnapshot) {
        self.draw("menu", |renderer| renderer.display_menu(menu));
    }

    fn show_frame(&self, frame: &Frame) {
        self.draw("frame", |renderer| renderer.display_frame(frame));
    }
}

/// The running game: event queue, renderer switcher, state machine and pool
pub struct App {
    queue: Option<EventQueue>,
    switcher: Arc<PluginSwitcher>,
    context: Arc<Context>,
    pool: Arc<WorkerPool>,
    config: Arc<Config>,
}

impl App {
    /// Wire everything up and activate the first plugin
    pub fn new(config: Config, loader: Arc<dyn ModuleLoader>) -> Result<Self> {
        let config = Arc::new(config);

        let libraries = discover_plugins(&config.plugin_paths);
        if libraries.is_empty() {
            return Err(GameError::config("no renderer plugin found"));
        }
        log::info!("Found {} renderer plugin(s)", libraries.len());

        let registry = PluginRegistry::from_paths(loader, libraries);
        let switcher = Arc::new(PluginSwitcher::new(
            registry,
            SwitcherConfig {
                shutdown_timeout: config.shutdown_timeout(),
                ..SwitcherConfig::default()
            },
        ));

        let queue = EventQueue::new()?;
        let sender = queue.sender();
        switcher.register_setup(move |renderer| {
            for (input, event) in DEFAULT_BINDINGS {
                let sender = sender.clone();
                renderer.register_input(
                    input,
                    Some(Arc::new(move || {
                        sender.push(event);
                    })),
                );
            }
        });

        let first = switcher
            .plugin_ids()
            .into_iter()
            .next()
            .ok_or_else(|| GameError::config("no renderer plugin registered"))?;
        switcher.switch_to(&first)?;

        let pool = Arc::new(WorkerPool::new(config.worker_threads)?);
        let screen: Arc<dyn Screen> = Arc::new(SwitcherScreen {
            switcher: Arc::downgrade(&switcher),
        });
        let context = Arc::new(Context::new(Arc::clone(&config), screen, Arc::clone(&pool)));

        let plugin_switcher = Arc::clone(&switcher);
        let redraw_context = Arc::clone(&context);
        queue.subscribe(move |event| {
            plugin_switcher.handle_event(event);
            if matches!(event, Event::SelectPlugin(_)) {
                redraw_context.redraw();
            }
        });
        let state_context = Arc::clone(&context);
        queue.subscribe(move |event| state_context.handle_event(event));

        log::info!("App ready with Plugin({}) active", first);
        Ok(Self {
            queue: Some(queue),
            switcher,
            context,
            pool,
            config,
        })
    }

    /// Block until the game reaches Exit
    pub fn run(&self) {
        self.context.run();
    }

    /// Handle for pushing events from outside a renderer
    pub fn sender(&self) -> Option<EventSender> {
        self.queue.as_ref().map(EventQueue::sender)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn switcher(&self) -> &PluginSwitcher {
        &self.switcher
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Teardown order: events, renderer, states, workers.
        drop(self.queue.take());
        self.switcher.shutdown();
        self.context.shutdown();
        log::debug!("App torn down ({} worker thread(s) to join)", self.pool.threads());
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("plugin", &self.switcher.active_id())
            .field("state", &self.context.current())
            .finish()
    }
}
