//! Entry points exported by renderer plugins
//!
//! A plugin exports two unmangled C-ABI functions:
//!
//! - `create() -> *mut c_void` hands out an owned pointer to a
//!   [`RendererBox`], or null on failure.
//! - `destroy(*mut c_void)` takes that pointer back. It accepts null.
//!
//! The pointer is thin, the trait object lives behind it, so no fat
//! pointer crosses the C ABI. Host and plugin must be built against the
//! same version of this crate with the same compiler.

use crate::renderer::Renderer;
use std::ffi::c_void;

/// What the `create` pointer points to
pub type RendererBox = Box<dyn Renderer>;

/// Signature of the `create` entry point
pub type CreateFn = unsafe extern "C" fn() -> *mut c_void;

/// Signature of the `destroy` entry point
pub type DestroyFn = unsafe extern "C" fn(*mut c_void);

/// Null-terminated name of the `create` entry point
pub const CREATE_SYMBOL: &[u8] = b"create\0";

/// Null-terminated name of the `destroy` entry point
pub const DESTROY_SYMBOL: &[u8] = b"destroy\0";

/// Export `create`/`destroy` entry points for a renderer constructor.
///
/// `$ctor` is any path or closure callable with no arguments that returns
/// a type implementing [`Renderer`]. A panic inside the constructor turns
/// into a null `create` result instead of unwinding across the ABI.
///
/// ```ignore
/// nibbler_plugin_api::export_renderer!(AsciiRenderer::stdout);
/// ```
#[macro_export]
macro_rules! export_renderer {
    ($ctor:expr) => {
        #[no_mangle]
        pub extern "C" fn create() -> *mut ::std::ffi::c_void {
            let built = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                let renderer: $crate::RendererBox = ::std::boxed::Box::new(($ctor)());
                renderer
            }));
            match built {
                Ok(renderer) => ::std::boxed::Box::into_raw(::std::boxed::Box::new(renderer)).cast(),
                Err(_) => ::std::ptr::null_mut(),
            }
        }

        /// # Safety
        /// `renderer` must be null or a pointer returned by `create` that
        /// has not been destroyed yet.
        #[no_mangle]
        pub unsafe extern "C" fn destroy(renderer: *mut ::std::ffi::c_void) {
            if renderer.is_null() {
                return;
            }
            let renderer = ::std::boxed::Box::from_raw(renderer.cast::<$crate::RendererBox>());
            let _ = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(move || drop(renderer)));
        }
    };
}
