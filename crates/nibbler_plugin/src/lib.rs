//! # nibbler_plugin - Renderer Plugin Runtime
//!
//! Loads renderer plugins at runtime and swaps the active one without
//! leaking threads, handles or native resources.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │ PluginSwitcher  │────▶│ PluginRegistry  │   at most one live
//! │ (handshakes)    │     │ id → Plugin     │   RendererInstance
//! └─────────────────┘     └────────┬────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  ModuleLoader   │◀────│  ModuleHandle   │
//! │ Native / Static │     │ load/instantiate│
//! └────────┬────────┘     └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   libloading    │ ◀── create / destroy
//! └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use nibbler_plugin::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = PluginRegistry::from_paths(Arc::new(NativeLoader), ["libascii.so"]);
//! let switcher = PluginSwitcher::new(registry, SwitcherConfig::default());
//! switcher.register_setup(|renderer| { /* bind inputs */ });
//! switcher.switch_to("1")?;
//! ```

mod discovery;
mod error;
mod instance;
mod loader;
mod module;
mod registry;
mod switcher;

pub use discovery::{discover_plugins, is_library_file};
pub use error::{PluginError, Result};
pub use instance::RendererInstance;
pub use loader::{ModuleBackend, ModuleLoader, NativeLoader, NativeModule, RendererFactory, StaticLoader};
pub use module::ModuleHandle;
pub use registry::{Plugin, PluginRegistry};
pub use switcher::{PluginSwitcher, SetupFn, SwitcherConfig};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PluginError, Result};
    pub use crate::loader::{ModuleLoader, NativeLoader, StaticLoader};
    pub use crate::registry::PluginRegistry;
    pub use crate::switcher::{PluginSwitcher, SwitcherConfig};
}
