//! Output seam between game states and the active renderer

use nibbler_plugin_api::{Frame, MenuSnapshot};

/// Where states draw menus and frames
pub trait Screen: Send + Sync {
    /// Show a menu
    fn show_menu(&self, menu: &MenuSnapshot);

    /// Show a board frame
    fn show_frame(&self, frame: &Frame);
}

/// Screen that discards everything, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScreen;

impl Screen for NullScreen {
    fn show_menu(&self, menu: &MenuSnapshot) {
        log::trace!("Discarding menu '{}'", menu.name);
    }

    fn show_frame(&self, _frame: &Frame) {}
}
