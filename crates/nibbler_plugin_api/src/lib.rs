//! # nibbler_plugin_api - Renderer Plugin Contract
//!
//! Types shared between the nibbler host and the renderer plugins it loads
//! at runtime. A renderer plugin is a dynamic library that exports two
//! entry points, `create` and `destroy`, which hand out and reclaim a boxed
//! [`Renderer`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐  create()/destroy()  ┌─────────────────┐
//! │  nibbler host   │─────────────────────▶│ renderer plugin │
//! │                 │                      │  (cdylib)       │
//! │  input table ◀──┼── register_input ────┤                 │
//! │  Completion  ◀──┼── request_shutdown ──┤                 │
//! │  Fulfiller   ───┼── run_startup ──────▶│                 │
//! └─────────────────┘                      └─────────────────┘
//! ```
//!
//! ## Plugin Side
//!
//! ```ignore
//! use nibbler_plugin_api::prelude::*;
//!
//! #[derive(Default)]
//! struct MyRenderer { /* ... */ }
//!
//! impl Renderer for MyRenderer { /* ... */ }
//!
//! nibbler_plugin_api::export_renderer!(MyRenderer::default);
//! ```

mod display;
mod ffi;
mod handshake;
mod input;
mod renderer;

pub use display::{colors, Argb, Frame, MenuSnapshot};
pub use ffi::{CreateFn, DestroyFn, RendererBox, CREATE_SYMBOL, DESTROY_SYMBOL};
pub use handshake::{completion, Completion, Fulfiller, HandshakeStatus};
pub use input::Input;
pub use renderer::{InputCallback, Renderer};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::display::{colors, Argb, Frame, MenuSnapshot};
    pub use crate::handshake::{completion, Completion, Fulfiller, HandshakeStatus};
    pub use crate::input::Input;
    pub use crate::renderer::{InputCallback, Renderer};
}
