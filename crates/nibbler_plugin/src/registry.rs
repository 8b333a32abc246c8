//! Plugin registry
//!
//! Owns every registered plugin and guarantees that at most one of them
//! has a live renderer instance at any time.

use crate::error::{PluginError, Result};
use crate::instance::RendererInstance;
use crate::loader::ModuleLoader;
use crate::module::ModuleHandle;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A registry entry: a module handle plus its renderer, when active
pub struct Plugin {
    module: ModuleHandle,
    instance: Option<Arc<RendererInstance>>,
}

impl Plugin {
    /// Create an unloaded entry
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            module: ModuleHandle::new(id, path),
            instance: None,
        }
    }

    /// Plugin id
    pub fn id(&self) -> &str {
        self.module.id()
    }

    /// Module path
    pub fn path(&self) -> &Path {
        self.module.path()
    }

    /// Whether the module is open
    pub fn is_loaded(&self) -> bool {
        self.module.is_loaded()
    }

    /// Whether a renderer instance is live
    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    fn load(&mut self, loader: &dyn ModuleLoader) -> Result<()> {
        if self.instance.is_some() {
            log::warn!("Plugin({}) previously loaded...", self.id());
            return Ok(());
        }

        self.module.load(loader)?;
        match self.module.instantiate() {
            Ok(instance) => {
                self.instance = Some(Arc::new(instance));
                log::info!("Plugin({}) successfully loaded", self.id());
                Ok(())
            }
            Err(e) => {
                self.module.unload();
                Err(e)
            }
        }
    }

    /// Destroy the instance, then close the module
    fn clear(&mut self) {
        if let Some(shared) = self.instance.take() {
            match Arc::try_unwrap(shared) {
                Ok(instance) => self.module.release(Some(instance)),
                Err(shared) => {
                    log::error!(
                        "Plugin({}) renderer still in use by {} other owner(s); not destroying it",
                        self.id(),
                        Arc::strong_count(&shared) - 1
                    );
                    std::mem::forget(shared);
                    self.module.leak();
                    return;
                }
            }
        }
        self.module.unload();
    }
}

impl Drop for Plugin {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("module", &self.module)
            .field("instance", &self.instance.is_some())
            .finish()
    }
}

/// Registry of renderer plugins by id
pub struct PluginRegistry {
    loader: Arc<dyn ModuleLoader>,
    plugins: BTreeMap<String, Plugin>,
    current: Option<String>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            plugins: BTreeMap::new(),
            current: None,
        }
    }

    /// Create a registry with ids "1".."N" assigned in path order
    pub fn from_paths<I, P>(loader: Arc<dyn ModuleLoader>, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut registry = Self::new(loader);
        for (index, path) in paths.into_iter().enumerate() {
            registry.register((index + 1).to_string(), path);
        }
        registry
    }

    /// Insert an unloaded plugin.
    ///
    /// A duplicate id is skipped with a warning and `false` is returned.
    pub fn register(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> bool {
        let id = id.into();
        if self.plugins.contains_key(&id) {
            log::warn!("Failed to add Plugin({}) to registry: id already registered", id);
            return false;
        }

        let plugin = Plugin::new(id.clone(), path);
        log::debug!("Added Plugin({}) at '{}'", id, plugin.path().display());
        self.plugins.insert(id, plugin);
        true
    }

    /// Make `id` the single active plugin.
    ///
    /// The previously active plugin, if any, is deactivated first.
    /// Activating the already active plugin is a no-op. An unknown id
    /// fails without touching the active plugin.
    pub fn activate(&mut self, id: &str) -> Result<()> {
        if !self.plugins.contains_key(id) {
            log::error!("Registry does not manage Plugin({})", id);
            return Err(PluginError::UnknownPlugin(id.to_string()));
        }

        if self.current.as_deref() == Some(id) && self.plugins.get(id).is_some_and(Plugin::has_instance) {
            log::debug!("Plugin({}) already active", id);
            return Ok(());
        }

        self.deactivate_current();

        let loader = Arc::clone(&self.loader);
        let plugin = self
            .plugins
            .get_mut(id)
            .ok_or_else(|| PluginError::UnknownPlugin(id.to_string()))?;
        plugin.load(loader.as_ref())?;

        self.current = Some(id.to_string());
        log::info!("Registry switched to Plugin({})", id);
        Ok(())
    }

    /// Destroy the renderer of `id` and close its module. No-op if unloaded.
    pub(crate) fn deactivate(&mut self, id: &str) {
        if let Some(plugin) = self.plugins.get_mut(id) {
            if plugin.is_loaded() || plugin.has_instance() {
                log::debug!("Deactivating Plugin({})", id);
            }
            plugin.clear();
        }
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
    }

    /// Deactivate whichever plugin is active. No-op when none is.
    pub(crate) fn deactivate_current(&mut self) {
        if let Some(id) = self.current.take() {
            self.deactivate(&id);
        }
    }

    /// The active renderer
    pub fn current(&self) -> Result<&RendererInstance> {
        self.current_entry()
            .and_then(|plugin| plugin.instance.as_deref())
            .ok_or(PluginError::NoActivePlugin)
    }

    /// Shared handle to the active renderer, for threads that outlive a call
    pub(crate) fn current_shared(&self) -> Result<Arc<RendererInstance>> {
        self.current_entry()
            .and_then(|plugin| plugin.instance.clone())
            .ok_or(PluginError::NoActivePlugin)
    }

    /// Id of the active plugin
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// Registered entry for `id`
    pub fn plugin(&self, id: &str) -> Option<&Plugin> {
        self.plugins.get(id)
    }

    /// Registered ids
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugin is registered
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Number of entries holding a live renderer
    pub fn live_instances(&self) -> usize {
        self.plugins.values().filter(|p| p.has_instance()).count()
    }

    fn current_entry(&self) -> Option<&Plugin> {
        self.current.as_deref().and_then(|id| self.plugins.get(id))
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        self.deactivate_current();
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticLoader;
    use nibbler_plugin_api::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Renderer for Counted {
        fn greet(&self) -> String {
            "counted".into()
        }
        fn register_input(&self, _input: Input, _callback: Option<InputCallback>) {}
        fn run_startup(&self, _setup: Completion) {}
        fn request_shutdown(&self) -> Completion {
            Completion::ready()
        }
        fn display_menu(&self, _menu: &MenuSnapshot) {}
        fn display_frame(&self, _frame: &Frame) {}
    }

    fn counted_registry(destroyed: &Arc<AtomicUsize>) -> PluginRegistry {
        let (first, second) = (Arc::clone(destroyed), Arc::clone(destroyed));
        let loader = StaticLoader::new()
            .with_renderer("builtin://a", move || Counted(Arc::clone(&first)))
            .with_renderer("builtin://b", move || Counted(Arc::clone(&second)));
        PluginRegistry::from_paths(Arc::new(loader), ["builtin://a", "builtin://b"])
    }

    #[test]
    fn test_registry_creation() {
        let registry = PluginRegistry::new(Arc::new(StaticLoader::new()));
        assert!(registry.is_empty());
        assert_eq!(registry.current_id(), None);
        assert!(matches!(registry.current(), Err(PluginError::NoActivePlugin)));
    }

    #[test]
    fn test_from_paths_assigns_sequential_ids() {
        let registry = PluginRegistry::from_paths(
            Arc::new(StaticLoader::new()),
            ["libfirst.so", "libsecond.so", "libthird.so"],
        );

        assert_eq!(registry.ids(), vec!["1", "2", "3"]);
        assert_eq!(registry.plugin("2").unwrap().path(), Path::new("libsecond.so"));
    }

    #[test]
    fn test_duplicate_registration_is_skipped() {
        let mut registry = PluginRegistry::new(Arc::new(StaticLoader::new()));
        assert!(registry.register("1", "liba.so"));
        assert!(!registry.register("1", "libb.so"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.plugin("1").unwrap().path(), Path::new("liba.so"));
    }

    #[test]
    fn test_deactivate_without_active_plugin_is_noop() {
        let mut registry = PluginRegistry::from_paths(Arc::new(StaticLoader::new()), ["liba.so"]);
        registry.deactivate_current();
        registry.deactivate("1");
        registry.deactivate("missing");
        assert_eq!(registry.live_instances(), 0);
    }

    #[test]
    fn test_activate_unknown_id_keeps_current() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let mut registry = counted_registry(&destroyed);
        registry.activate("1").unwrap();

        let result = registry.activate("9");
        assert!(matches!(result, Err(PluginError::UnknownPlugin(id)) if id == "9"));

        assert_eq!(registry.current_id(), Some("1"));
        assert!(registry.current().is_ok());
        assert_eq!(registry.live_instances(), 1);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_activate_same_id_twice_keeps_one_instance() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let mut registry = counted_registry(&destroyed);

        registry.activate("1").unwrap();
        registry.activate("1").unwrap();

        assert_eq!(registry.current_id(), Some("1"));
        assert_eq!(registry.live_instances(), 1);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_activate_switches_and_destroys_previous() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let mut registry = counted_registry(&destroyed);

        registry.activate("1").unwrap();
        registry.activate("2").unwrap();

        assert_eq!(registry.current_id(), Some("2"));
        assert_eq!(registry.live_instances(), 1);
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert!(!registry.plugin("1").unwrap().is_loaded());
    }

    #[test]
    fn test_deactivate_referenced_renderer_keeps_module_mapped() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let mut registry = counted_registry(&destroyed);
        registry.activate("1").unwrap();

        let held = registry.current_shared().unwrap();
        registry.deactivate_current();

        let plugin = registry.plugin("1").unwrap();
        assert!(!plugin.is_loaded());
        assert!(!plugin.has_instance());
        assert_eq!(registry.current_id(), None);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);

        // The outstanding handle still points at a live renderer
        assert_eq!(held.greet(), "counted");
        drop(held);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }
}
