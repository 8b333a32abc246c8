//! Terminal renderer plugin
//!
//! Draws menus and frames as text on stdout. While running, the startup
//! thread puts the terminal in raw mode and polls the keyboard, firing the
//! callback bound to each pressed key. Ctrl-C maps to ESC since raw mode
//! swallows the signal.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use nibbler_plugin_api::{
    colors, completion, export_renderer, Argb, Completion, Frame, Fulfiller, Input, InputCallback,
    MenuSnapshot, Renderer,
};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

const CLEAR: &str = "\x1b[2J\x1b[H";

/// How long one keyboard poll blocks before the lifecycle is re-checked
const KEY_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    Stopping,
    Stopped,
}

struct LifecycleState {
    phase: Lifecycle,
    waiting: Vec<Fulfiller>,
}

/// Renderer printing to a text sink
pub struct AsciiRenderer {
    callbacks: Mutex<HashMap<Input, InputCallback>>,
    lifecycle: Mutex<LifecycleState>,
    wake: Condvar,
    out: Mutex<Box<dyn Write + Send>>,
    keyboard: bool,
}

impl AsciiRenderer {
    /// Renderer drawing on stdout and reading the terminal keyboard
    pub fn stdout() -> Self {
        Self {
            keyboard: true,
            ..Self::with_output(Box::new(io::stdout()))
        }
    }

    /// Renderer drawing on any writer, without keyboard input
    pub fn with_output(out: Box<dyn Write + Send>) -> Self {
        Self {
            callbacks: Mutex::new(HashMap::new()),
            lifecycle: Mutex::new(LifecycleState {
                phase: Lifecycle::Idle,
                waiting: Vec::new(),
            }),
            wake: Condvar::new(),
            out: Mutex::new(out),
            keyboard: false,
        }
    }

    /// Number of bound inputs
    pub fn bound_inputs(&self) -> usize {
        self.callbacks.lock().len()
    }

    fn write(&self, text: &str) {
        // Raw mode does not turn '\n' into a carriage return
        let text = if self.keyboard {
            text.replace('\n', "\r\n")
        } else {
            text.to_string()
        };

        let mut out = self.out.lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            log::warn!("ASCII renderer failed to write: {}", e);
        }
    }

    fn is_running(&self) -> bool {
        self.lifecycle.lock().phase == Lifecycle::Running
    }

    /// Fire the callback bound to `key`, if any
    fn press(&self, key: &KeyEvent) {
        let Some(input) = map_key(key) else {
            return;
        };
        let callback = self.callbacks.lock().get(&input).cloned();
        match callback {
            Some(callback) => callback(),
            None => log::trace!("No callback bound to {}", input),
        }
    }

    /// Poll the keyboard in raw mode until shutdown is requested.
    ///
    /// Any terminal error ends the loop; the renderer then keeps drawing
    /// without input.
    fn read_keys(&self) {
        if let Err(e) = terminal::enable_raw_mode() {
            log::warn!("ASCII renderer has no keyboard input: {}", e);
            return;
        }

        while self.is_running() {
            match event::poll(KEY_POLL) {
                Ok(false) => {}
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.press(&key),
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("ASCII renderer failed to read a key: {}", e);
                        break;
                    }
                },
                Err(e) => {
                    log::warn!("ASCII renderer failed to poll the keyboard: {}", e);
                    break;
                }
            }
        }

        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("ASCII renderer failed to restore the terminal: {}", e);
        }
    }
}

/// Input a key press stands for
pub fn map_key(key: &KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Input::Esc),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Enter => Some(Input::Enter),
        KeyCode::Esc => Some(Input::Esc),
        KeyCode::Char('1') => Some(Input::One),
        KeyCode::Char('2') => Some(Input::Two),
        KeyCode::Char('3') => Some(Input::Three),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Input::W),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Input::A),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Input::S),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Input::D),
        KeyCode::Up => Some(Input::ArrowUp),
        KeyCode::Down => Some(Input::ArrowDown),
        KeyCode::Left => Some(Input::ArrowLeft),
        KeyCode::Right => Some(Input::ArrowRight),
        _ => None,
    }
}

/// Character drawn for a pixel color
pub fn glyph(color: Argb) -> char {
    match color & 0x00FF_FFFF {
        colors::BLACK => ' ',
        colors::WHITE => '#',
        colors::RED => '@',
        colors::YELLOW => 'o',
        colors::GREEN => '*',
        _ => '?',
    }
}

/// Text form of a menu, hovered option marked with `>`
pub fn render_menu(menu: &MenuSnapshot) -> String {
    let mut text = format!("== {} ==\n", menu.name);
    for (index, option) in menu.options.iter().enumerate() {
        let marker = if index == menu.hover { '>' } else { ' ' };
        text.push_str(&format!("{} {}\n", marker, option));
    }
    text
}

/// Text form of a frame, one line per row
pub fn render_frame(frame: &Frame) -> String {
    let mut text = String::with_capacity((frame.width + 1) * frame.height);
    for row in frame.rows() {
        text.extend(row.iter().map(|&pixel| glyph(pixel)));
        text.push('\n');
    }
    text
}

impl Renderer for AsciiRenderer {
    fn greet(&self) -> String {
        "Hello from the ASCII terminal renderer".to_string()
    }

    fn register_input(&self, input: Input, callback: Option<InputCallback>) {
        let mut callbacks = self.callbacks.lock();
        match callback {
            Some(callback) => {
                callbacks.insert(input, callback);
            }
            None => {
                callbacks.remove(&input);
            }
        }
    }

    fn run_startup(&self, setup: Completion) {
        {
            let mut state = self.lifecycle.lock();
            if state.phase != Lifecycle::Idle {
                return;
            }
            state.phase = Lifecycle::Running;
        }

        setup.wait();
        self.write(CLEAR);

        if self.keyboard {
            self.read_keys();
        }

        let mut state = self.lifecycle.lock();
        while state.phase == Lifecycle::Running {
            self.wake.wait(&mut state);
        }
        state.phase = Lifecycle::Stopped;
        for done in state.waiting.drain(..) {
            done.fulfill();
        }
    }

    fn request_shutdown(&self) -> Completion {
        let mut state = self.lifecycle.lock();
        match state.phase {
            Lifecycle::Idle | Lifecycle::Stopped => {
                state.phase = Lifecycle::Stopped;
                Completion::ready()
            }
            Lifecycle::Running | Lifecycle::Stopping => {
                let (done, signal) = completion();
                state.waiting.push(done);
                state.phase = Lifecycle::Stopping;
                self.wake.notify_all();
                signal
            }
        }
    }

    fn display_menu(&self, menu: &MenuSnapshot) {
        self.write(&format!("{}{}", CLEAR, render_menu(menu)));
    }

    fn display_frame(&self, frame: &Frame) {
        self.write(&format!("{}{}", CLEAR, render_frame(frame)));
    }
}

export_renderer!(AsciiRenderer::stdout);
