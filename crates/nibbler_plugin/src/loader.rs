//! Module loaders
//!
//! A [`ModuleLoader`] opens a path and returns a [`ModuleBackend`] able to
//! create and destroy renderers. [`NativeLoader`] opens dynamic libraries
//! and is the only place raw entry points are resolved and called.
//! [`StaticLoader`] serves renderers compiled into the host.

use crate::error::{PluginError, Result};
use crate::instance::RendererInstance;
use libloading::Library;
use nibbler_plugin_api::{CreateFn, DestroyFn, Renderer, RendererBox, CREATE_SYMBOL, DESTROY_SYMBOL};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An opened module. Dropping it closes the module.
pub trait ModuleBackend: Send + Sync {
    /// Invoke the module's `create` entry point; `None` when it yields null
    fn create(&self) -> Option<RendererInstance>;

    /// Hand an instance back to the module's `destroy` entry point
    fn destroy(&self, instance: RendererInstance);
}

/// Opens modules by path
pub trait ModuleLoader: Send + Sync {
    /// Open the module at `path` and resolve its entry points
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleBackend>>;
}

// ========== Native Libraries ==========

/// Loads renderer plugins from dynamic libraries (SO/DLL/DYLIB)
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl ModuleLoader for NativeLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleBackend>> {
        Ok(Box::new(NativeModule::open(path)?))
    }
}

/// A dynamic library with its `create`/`destroy` entry points resolved
pub struct NativeModule {
    path: PathBuf,
    create: CreateFn,
    destroy: DestroyFn,
    /// Entry points above are only valid while this is open
    library: Library,
}

impl NativeModule {
    /// Open a library and resolve both entry points
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let library = unsafe {
            Library::new(path).map_err(|e| PluginError::module_load(path, e.to_string()))?
        };

        let create: CreateFn = unsafe {
            library
                .get::<CreateFn>(CREATE_SYMBOL)
                .map(|symbol| *symbol)
                .map_err(|_| PluginError::symbol_resolution(path, "create"))?
        };

        let destroy: DestroyFn = unsafe {
            library
                .get::<DestroyFn>(DESTROY_SYMBOL)
                .map(|symbol| *symbol)
                .map_err(|_| PluginError::symbol_resolution(path, "destroy"))?
        };

        log::info!("Loaded renderer library '{}'", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            create,
            destroy,
            library,
        })
    }

    /// Library path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModuleBackend for NativeModule {
    fn create(&self) -> Option<RendererInstance> {
        // Safety: `create` was resolved from `library`, which is still open,
        // and returns either null or an owned RendererBox.
        unsafe { RendererInstance::from_raw((self.create)()) }
    }

    fn destroy(&self, instance: RendererInstance) {
        // Safety: the instance came from this module's `create`.
        unsafe { (self.destroy)(instance.into_raw()) }
    }
}

impl Drop for NativeModule {
    fn drop(&mut self) {
        log::debug!("Unloading renderer library '{}'", self.path.display());
        // Library is closed when `library` drops
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("path", &self.path)
            .field("library", &self.library)
            .finish()
    }
}

// ========== Built-in Renderers ==========

/// Factory producing a renderer, `None` to simulate a failing `create`
pub type RendererFactory = Arc<dyn Fn() -> Option<RendererBox> + Send + Sync>;

/// Serves renderers compiled into the host under virtual paths
#[derive(Default)]
pub struct StaticLoader {
    factories: RwLock<HashMap<PathBuf, RendererFactory>>,
}

impl StaticLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer constructor under `path`
    pub fn with_renderer<R, F>(self, path: impl Into<PathBuf>, ctor: F) -> Self
    where
        R: Renderer + 'static,
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.insert(path, Arc::new(move || Some(Box::new(ctor()) as RendererBox)));
        self
    }

    /// Register a raw factory under `path`
    pub fn with_factory(self, path: impl Into<PathBuf>, factory: RendererFactory) -> Self {
        self.insert(path, factory);
        self
    }

    /// Register or replace a factory
    pub fn insert(&self, path: impl Into<PathBuf>, factory: RendererFactory) {
        self.factories.write().insert(path.into(), factory);
    }

    /// Whether a factory is registered under `path`
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.factories.read().contains_key(path.as_ref())
    }
}

impl ModuleLoader for StaticLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleBackend>> {
        let factory = self
            .factories
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| PluginError::module_load(path, "no built-in renderer at this path"))?;

        log::debug!("Opened built-in renderer '{}'", path.display());
        Ok(Box::new(StaticModule { factory }))
    }
}

impl fmt::Debug for StaticLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticLoader")
            .field("paths", &self.factories.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

struct StaticModule {
    factory: RendererFactory,
}

impl ModuleBackend for StaticModule {
    fn create(&self) -> Option<RendererInstance> {
        (self.factory)().map(RendererInstance::new)
    }

    fn destroy(&self, instance: RendererInstance) {
        // Safety: built by RendererInstance::new in `create` above.
        drop(unsafe { instance.into_box() });
    }
}
