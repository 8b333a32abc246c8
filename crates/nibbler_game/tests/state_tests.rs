//! State machine behavior through the public context API

use nibbler_event::Event;
use nibbler_game::{Config, Context, Screen, StateKind, WorkerPool};
use nibbler_plugin_api::{Frame, MenuSnapshot};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Recording {
    menus: Mutex<Vec<MenuSnapshot>>,
    frames: AtomicUsize,
}

impl Screen for Recording {
    fn show_menu(&self, menu: &MenuSnapshot) {
        self.menus.lock().push(menu.clone());
    }

    fn show_frame(&self, _frame: &Frame) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

fn context_with(config: Config) -> (Context, Arc<Recording>) {
    let screen = Arc::new(Recording::default());
    let pool = Arc::new(WorkerPool::new(2).unwrap());
    let context = Context::new(Arc::new(config), screen.clone(), pool);
    (context, screen)
}

fn fast_config() -> Config {
    Config {
        width: 10,
        height: 10,
        tick_ms: 5,
        ..Config::default()
    }
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
fn test_starts_in_main_menu() {
    let (context, screen) = context_with(Config::default());
    assert_eq!(context.current(), Some(StateKind::MainMenu));
    assert!(!context.is_exited());

    let menus = screen.menus.lock();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].name, "Main Menu");
    assert_eq!(menus[0].options, vec!["Play".to_string(), "Exit".to_string()]);
    assert_eq!(menus[0].hover, 0);
}

#[test]
fn test_down_enter_exits() {
    let (context, _screen) = context_with(Config::default());
    context.handle_event(Event::Down);
    context.handle_event(Event::Enter);

    assert_eq!(context.current(), Some(StateKind::Exit));
    assert!(context.run_timeout(Duration::from_secs(1)));
}

#[test]
fn test_enter_plays() {
    let (context, screen) = context_with(Config::default());
    context.handle_event(Event::Enter);

    assert_eq!(context.current(), Some(StateKind::Playing));
    assert_eq!(screen.frames.load(Ordering::SeqCst), 1);
}

#[test]
fn test_up_wraps_to_exit() {
    let (context, screen) = context_with(Config::default());
    context.handle_event(Event::Up);
    assert_eq!(screen.menus.lock().last().unwrap().hover, 1);

    context.handle_event(Event::Enter);
    assert_eq!(context.current(), Some(StateKind::Exit));
}

#[test]
fn test_small_board_lands_in_exit() {
    let exits = Arc::new(AtomicUsize::new(0));
    let plays = Arc::new(AtomicUsize::new(0));
    let config = Config {
        width: 5,
        height: 5,
        ..Config::default()
    };
    let (context, _screen) = context_with(config);
    let counter = Arc::clone(&exits);
    context.subscribe(StateKind::Exit, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&plays);
    context.subscribe(StateKind::Playing, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    context.handle_event(Event::Enter);

    assert_eq!(context.current(), Some(StateKind::Exit));
    assert!(context.is_exited());
    assert_eq!(exits.load(Ordering::SeqCst), 1);
    assert_eq!(plays.load(Ordering::SeqCst), 0);
}

#[test]
fn test_subscribers_fire_in_order_on_any_entry() {
    let (context, _screen) = context_with(Config::default());
    let calls = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second"] {
        let calls = Arc::clone(&calls);
        context.subscribe(StateKind::Exit, move || calls.lock().push(name));
    }

    context.handle_event(Event::Exit);
    assert_eq!(*calls.lock(), vec!["first", "second"]);

    context.handle_event(Event::Enter);
    assert_eq!(calls.lock().len(), 2);
}

#[test]
fn test_exit_from_playing() {
    let (context, _screen) = context_with(Config::default());
    context.handle_event(Event::Enter);
    context.handle_event(Event::Exit);

    assert_eq!(context.current(), Some(StateKind::Exit));
    assert!(context.is_exited());
}

#[test]
fn test_paused_until_enter() {
    let (context, screen) = context_with(fast_config());
    context.handle_event(Event::Enter);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(screen.frames.load(Ordering::SeqCst), 1);

    context.handle_event(Event::Left);
    context.handle_event(Event::Enter);
    assert!(wait_until(|| screen.frames.load(Ordering::SeqCst) > 1));
}

#[test]
fn test_collision_leads_to_game_over() {
    let (context, screen) = context_with(fast_config());
    let game_overs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&game_overs);
    context.subscribe(StateKind::GameOver, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    context.handle_event(Event::Enter);
    context.handle_event(Event::Enter);

    assert!(wait_until(|| context.current() == Some(StateKind::GameOver)));
    assert_eq!(game_overs.load(Ordering::SeqCst), 1);
    assert_eq!(screen.menus.lock().last().unwrap().name, "Game Over");

    context.handle_event(Event::Down);
    context.handle_event(Event::Enter);
    assert_eq!(context.current(), Some(StateKind::MainMenu));
}

#[test]
fn test_replaced_state_does_not_transition() {
    let (context, _screen) = context_with(fast_config());
    context.handle_event(Event::Enter);
    context.handle_event(Event::Enter);
    context.handle_event(Event::Exit);

    thread::sleep(Duration::from_millis(100));
    assert_eq!(context.current(), Some(StateKind::Exit));
}

#[test]
fn test_shutdown_releases_run() {
    let (context, _screen) = context_with(Config::default());
    let context = Arc::new(context);
    let runner = Arc::clone(&context);
    let waiter = thread::spawn(move || runner.run());

    context.shutdown();
    waiter.join().unwrap();
    assert_eq!(context.current(), None);
}
