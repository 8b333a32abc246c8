//! Owned handle to a renderer produced by a module's `create` entry point

use nibbler_plugin_api::{Renderer, RendererBox};
use std::ffi::c_void;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr::NonNull;

/// A live renderer.
///
/// The allocation belongs to the module that created it and goes back to
/// that module through [`ModuleHandle::release`](crate::ModuleHandle::release).
/// Dropping an instance any other way leaks it.
pub struct RendererInstance {
    raw: NonNull<RendererBox>,
}

// Safety: RendererBox is Box<dyn Renderer> and Renderer: Send + Sync.
unsafe impl Send for RendererInstance {}
unsafe impl Sync for RendererInstance {}

impl RendererInstance {
    /// Wrap a renderer allocated by the host
    pub fn new(renderer: RendererBox) -> Self {
        Self {
            raw: NonNull::from(Box::leak(Box::new(renderer))),
        }
    }

    /// Take ownership of a pointer returned by a `create` entry point.
    ///
    /// Returns `None` for null.
    ///
    /// # Safety
    /// `ptr` must be null or point to a live `RendererBox` that nobody else
    /// owns.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr.cast::<RendererBox>()).map(|raw| Self { raw })
    }

    /// Give up ownership, returning the pointer for a `destroy` entry point
    pub fn into_raw(self) -> *mut c_void {
        let this = ManuallyDrop::new(self);
        this.raw.as_ptr().cast()
    }

    /// Reclaim an instance built with [`RendererInstance::new`].
    ///
    /// # Safety
    /// The instance must have been allocated by this process' allocator.
    pub(crate) unsafe fn into_box(self) -> RendererBox {
        *Box::from_raw(self.into_raw().cast::<RendererBox>())
    }
}

impl Deref for RendererInstance {
    type Target = dyn Renderer;

    fn deref(&self) -> &Self::Target {
        // Safety: `raw` stays valid until into_raw/into_box consumes self.
        unsafe { &**self.raw.as_ref() }
    }
}

impl Drop for RendererInstance {
    fn drop(&mut self) {
        log::warn!("Renderer instance dropped without release; leaking it");
    }
}

impl fmt::Debug for RendererInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererInstance")
            .field("raw", &self.raw)
            .finish()
    }
}
