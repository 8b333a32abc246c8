//! Per-plugin module handle
//!
//! Tracks whether a plugin's module is open and mediates every
//! create/destroy call so an instance is always destroyed before the
//! module that produced it is closed.

use crate::error::{PluginError, Result};
use crate::instance::RendererInstance;
use crate::loader::{ModuleBackend, ModuleLoader};
use std::fmt;
use std::path::{Path, PathBuf};

/// A plugin's module, loaded or not
pub struct ModuleHandle {
    id: String,
    path: PathBuf,
    backend: Option<Box<dyn ModuleBackend>>,
}

impl ModuleHandle {
    /// Create an unloaded handle
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            backend: None,
        }
    }

    /// Plugin id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Module path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the module is open
    pub fn is_loaded(&self) -> bool {
        self.backend.is_some()
    }

    /// Open the module. Loading an already loaded module is a no-op.
    pub fn load(&mut self, loader: &dyn ModuleLoader) -> Result<()> {
        if self.backend.is_some() {
            log::warn!("Plugin({}) module already loaded", self.id);
            return Ok(());
        }

        match loader.open(&self.path) {
            Ok(backend) => {
                self.backend = Some(backend);
                log::info!("Plugin({}) module loaded from '{}'", self.id, self.path.display());
                Ok(())
            }
            Err(e) => {
                log::error!("Plugin({}) failed to load: {}", self.id, e);
                Err(e)
            }
        }
    }

    /// Create a renderer through the module's `create` entry point
    pub fn instantiate(&self) -> Result<RendererInstance> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| PluginError::ModuleNotLoaded(self.id.clone()))?;

        match backend.create() {
            Some(instance) => {
                log::info!("Plugin({}) instance successfully created", self.id);
                Ok(instance)
            }
            None => {
                log::error!("Plugin({}) create entry point returned null", self.id);
                Err(PluginError::InstanceCreation(self.id.clone()))
            }
        }
    }

    /// Destroy an instance through the module's `destroy` entry point.
    ///
    /// Never fails; `None` is a no-op.
    pub fn release(&self, instance: Option<RendererInstance>) {
        let Some(instance) = instance else {
            return;
        };

        match &self.backend {
            Some(backend) => {
                log::debug!("Destroying Plugin({}) instance", self.id);
                backend.destroy(instance);
            }
            None => {
                log::error!("Plugin({}) instance outlived its module; leaking it", self.id);
                std::mem::forget(instance);
            }
        }
    }

    /// Close the module. Every instance it produced must be released first.
    pub fn unload(&mut self) {
        if self.backend.take().is_some() {
            log::debug!("Plugin({}) module unloaded", self.id);
        }
    }

    /// Forget the module without closing it.
    ///
    /// Used when code from the module may still be running.
    pub fn leak(&mut self) {
        if let Some(backend) = self.backend.take() {
            log::error!("Plugin({}) module kept mapped for the rest of the process", self.id);
            std::mem::forget(backend);
        }
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
