//! Domain events

use std::fmt;

/// Everything the game reacts to.
///
/// Events are small, immutable and copied by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Exit,
    Up,
    Down,
    Left,
    Right,
    Enter,
    /// Switch to the renderer plugin with the given 1-based index
    SelectPlugin(u8),
}

impl Event {
    /// Plugin id targeted by a [`Event::SelectPlugin`]
    pub fn plugin_id(&self) -> Option<String> {
        match self {
            Event::SelectPlugin(index) => Some(index.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Exit => f.write_str("EXIT"),
            Event::Up => f.write_str("UP"),
            Event::Down => f.write_str("DOWN"),
            Event::Left => f.write_str("LEFT"),
            Event::Right => f.write_str("RIGHT"),
            Event::Enter => f.write_str("ENTER"),
            Event::SelectPlugin(index) => write!(f, "SELECT_PLUGIN_{}", index),
        }
    }
}
