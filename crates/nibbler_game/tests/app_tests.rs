//! End-to-end wiring: renderer input → event queue → switcher and states

use nibbler_game::{App, Config, GameError, StateKind};
use nibbler_plugin::StaticLoader;
use nibbler_plugin_api::{Completion, Frame, Input, InputCallback, MenuSnapshot, Renderer};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// What a test can observe of one renderer instance
#[derive(Default)]
struct Probe {
    callbacks: Mutex<HashMap<Input, InputCallback>>,
    menus: Mutex<Vec<MenuSnapshot>>,
    frames: Mutex<usize>,
}

impl Probe {
    fn press(&self, input: Input) {
        let callback = self.callbacks.lock().get(&input).cloned();
        if let Some(callback) = callback {
            callback();
        }
    }
}

struct ProbeRenderer {
    probe: Arc<Probe>,
}

impl Renderer for ProbeRenderer {
    fn greet(&self) -> String {
        "probe".to_string()
    }

    fn register_input(&self, input: Input, callback: Option<InputCallback>) {
        let mut callbacks = self.probe.callbacks.lock();
        match callback {
            Some(callback) => callbacks.insert(input, callback),
            None => callbacks.remove(&input),
        };
    }

    fn run_startup(&self, setup: Completion) {
        setup.wait();
    }

    fn request_shutdown(&self) -> Completion {
        Completion::ready()
    }

    fn display_menu(&self, menu: &MenuSnapshot) {
        self.probe.menus.lock().push(menu.clone());
    }

    fn display_frame(&self, _frame: &Frame) {
        *self.probe.frames.lock() += 1;
    }
}

fn app_with_probes() -> (App, Arc<Probe>, Arc<Probe>) {
    let (first, second) = (Arc::new(Probe::default()), Arc::new(Probe::default()));
    let (a, b) = (Arc::clone(&first), Arc::clone(&second));
    let loader = StaticLoader::new()
        .with_renderer("builtin://first", move || ProbeRenderer { probe: Arc::clone(&a) })
        .with_renderer("builtin://second", move || ProbeRenderer { probe: Arc::clone(&b) });

    let config = Config {
        plugin_paths: vec![PathBuf::from("builtin://first"), PathBuf::from("builtin://second")],
        ..Config::default()
    };
    let app = App::new(config, Arc::new(loader)).unwrap();
    (app, first, second)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_first_plugin_shows_main_menu() {
    let (app, first, _second) = app_with_probes();
    assert_eq!(app.switcher().active_id().as_deref(), Some("1"));
    assert_eq!(app.context().current(), Some(StateKind::MainMenu));

    assert_eq!(first.callbacks.lock().len(), 13);
    assert_eq!(first.menus.lock().last().unwrap().name, "Main Menu");
}

#[test]
fn test_key_presses_drive_states() {
    let (app, first, _second) = app_with_probes();

    first.press(Input::ArrowDown);
    first.press(Input::Enter);

    assert!(app.context().run_timeout(Duration::from_secs(3)));
    assert_eq!(app.context().current(), Some(StateKind::Exit));
}

#[test]
fn test_escape_exits() {
    let (app, first, _second) = app_with_probes();
    first.press(Input::Esc);
    assert!(app.context().run_timeout(Duration::from_secs(3)));
}

#[test]
fn test_number_key_switches_renderer_and_redraws() {
    let (app, first, second) = app_with_probes();

    first.press(Input::Two);

    assert!(wait_until(|| app.switcher().active_id().as_deref() == Some("2")));
    assert!(wait_until(|| !second.menus.lock().is_empty()));
    assert_eq!(second.callbacks.lock().len(), 13);
    assert_eq!(app.switcher().live_instances(), 1);

    second.press(Input::S);
    assert!(wait_until(|| second.menus.lock().last().map(|m| m.hover) == Some(1)));
}

#[test]
fn test_sender_pushes_exit() {
    let (app, _first, _second) = app_with_probes();
    let sender = app.sender().unwrap();
    assert!(sender.push(nibbler_event::Event::Exit));
    app.run();
    assert!(app.context().is_exited());
}

#[test]
fn test_no_plugins_is_an_error() {
    let result = App::new(Config::default(), Arc::new(StaticLoader::new()));
    assert!(matches!(result, Err(GameError::Config(_))));
}

#[test]
fn test_failing_first_plugin_is_an_error() {
    let config = Config {
        plugin_paths: vec![PathBuf::from("builtin://missing")],
        ..Config::default()
    };
    let result = App::new(config, Arc::new(StaticLoader::new()));
    assert!(matches!(result, Err(GameError::Plugin(_))));
}
