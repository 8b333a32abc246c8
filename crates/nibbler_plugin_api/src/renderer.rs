//! The capability set every renderer plugin implements

use crate::display::{Frame, MenuSnapshot};
use crate::handshake::Completion;
use crate::input::Input;
use std::sync::Arc;

/// Callback a renderer invokes when a bound input fires
pub type InputCallback = Arc<dyn Fn() + Send + Sync>;

/// A renderer instance produced by a plugin's `create` entry point.
///
/// All methods take `&self`: the host calls into the renderer from its
/// event thread, the simulation thread and the dedicated startup thread,
/// so implementations keep their mutable state behind locks.
///
/// Each instance owns its own input table. Nothing registered on one
/// instance is visible to another.
pub trait Renderer: Send + Sync {
    /// Human readable greeting, logged by the host on activation
    fn greet(&self) -> String;

    /// Bind `callback` to `input`, or unbind it when `None`
    fn register_input(&self, input: Input, callback: Option<InputCallback>);

    /// Run the startup handshake.
    ///
    /// Called on a thread dedicated to the renderer. The implementation may
    /// do host-independent setup right away but must wait on `setup` before
    /// anything that depends on host configuration (such as the input
    /// table). It may then run its own blocking loop; it must return once a
    /// shutdown it acknowledged has completed.
    fn run_startup(&self, setup: Completion);

    /// Ask the renderer to release its resources.
    ///
    /// Must return immediately. The returned completion is fulfilled once
    /// every thread, window and allocation owned by the renderer is gone.
    /// Repeated calls after a finished shutdown must be tolerated.
    fn request_shutdown(&self) -> Completion;

    /// Show a menu
    fn display_menu(&self, menu: &MenuSnapshot);

    /// Show a game frame verbatim
    fn display_frame(&self, frame: &Frame);
}
