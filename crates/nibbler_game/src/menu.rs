//! Menus with a wrapping hover cursor

use nibbler_plugin_api::MenuSnapshot;

/// A titled list of options with one hovered entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    name: String,
    options: Vec<String>,
    hover: usize,
}

impl Menu {
    /// Create a menu hovering its first option
    pub fn new<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            options: options.into_iter().map(Into::into).collect(),
            hover: 0,
        }
    }

    /// Move the hover up, wrapping from the first option to the last
    pub fn up(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.hover = self.hover.checked_sub(1).unwrap_or(self.options.len() - 1);
    }

    /// Move the hover down, wrapping from the last option to the first
    pub fn down(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.hover = (self.hover + 1) % self.options.len();
    }

    /// Menu title
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Option labels
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the hovered option
    pub fn hover(&self) -> usize {
        self.hover
    }

    /// Label of the hovered option
    pub fn hovered(&self) -> Option<&str> {
        self.options.get(self.hover).map(String::as_str)
    }

    /// Copy handed to renderers
    pub fn snapshot(&self) -> MenuSnapshot {
        MenuSnapshot {
            name: self.name.clone(),
            options: self.options.clone(),
            hover: self.hover,
        }
    }
}
