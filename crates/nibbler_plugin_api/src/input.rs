//! Keyboard vocabulary shared by every renderer plugin

use std::fmt;

/// Keys a renderer maps from its native input system.
///
/// Each plugin translates whatever its windowing toolkit reports into this
/// closed set; the host binds callbacks per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Input {
    /// Key 'A'
    A,
    /// Key 'S'
    S,
    /// Key 'D'
    D,
    /// Key 'W'
    W,
    /// Key '1'
    One,
    /// Key '2'
    Two,
    /// Key '3'
    Three,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Esc,
}

impl Input {
    /// Every input, in declaration order
    pub const ALL: [Input; 13] = [
        Input::A,
        Input::S,
        Input::D,
        Input::W,
        Input::One,
        Input::Two,
        Input::Three,
        Input::ArrowUp,
        Input::ArrowDown,
        Input::ArrowLeft,
        Input::ArrowRight,
        Input::Enter,
        Input::Esc,
    ];

    /// Stable upper-case name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            Input::A => "A",
            Input::S => "S",
            Input::D => "D",
            Input::W => "W",
            Input::One => "ONE",
            Input::Two => "TWO",
            Input::Three => "THREE",
            Input::ArrowUp => "ARROW_UP",
            Input::ArrowDown => "ARROW_DOWN",
            Input::ArrowLeft => "ARROW_LEFT",
            Input::ArrowRight => "ARROW_RIGHT",
            Input::Enter => "ENTER",
            Input::Esc => "ESC",
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = Input::ALL.iter().map(|i| i.as_str()).collect();
        assert_eq!(names.len(), Input::ALL.len());
    }

    #[test]
    fn test_display() {
        assert_eq!(Input::ArrowLeft.to_string(), "ARROW_LEFT");
        assert_eq!(Input::One.to_string(), "ONE");
    }
}
