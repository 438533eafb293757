//! The boundary between the runtime and a native windowing + GL layer.
//!
//! Everything here is synchronous and thread-affine: a [`Platform`] is driven
//! from the one thread that owns its contexts, and callbacks registered with it
//! fire synchronously from inside [`Platform::poll_events`] (or from a
//! dedicated poll thread, which is why the callback traits are `Send + Sync`).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::WindowConfig;
use crate::error::PlatformError;
use crate::geometry::Size;

/// Opaque identifier of a native window and its GL context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeWindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    /// Auto-repeat while a key is held.
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const CAPS_LOCK = 0b0001_0000;
        const NUM_LOCK = 0b0010_0000;
    }
}

/// Snapshot of the window-state queries the scheduler needs every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWindowState {
    pub iconified: bool,
    pub focused: bool,
    pub visible: bool,
    pub maximized: bool,
}

impl Default for NativeWindowState {
    fn default() -> Self {
        Self {
            iconified: false,
            focused: true,
            visible: true,
            maximized: false,
        }
    }
}

impl NativeWindowState {
    /// Hidden windows use the hidden frame-rate target.
    pub fn is_hidden(&self) -> bool {
        self.iconified || !self.visible
    }
}

/// Raw input callbacks, in native units.
///
/// Key codes follow the GLFW numbering; cursor positions are in the window's
/// logical (screen) coordinates; scroll offsets are in lines.
pub trait InputCallbacks: Send + Sync {
    fn key(&self, native_key: i32, scancode: i32, action: KeyAction, mods: Modifiers);
    fn character(&self, codepoint: u32);
    fn scroll(&self, x: f64, y: f64);
    fn cursor_position(&self, x: f64, y: f64);
    fn mouse_button(&self, button: i32, action: ButtonAction, mods: Modifiers);
}

/// Window-level callbacks.
#[allow(unused_variables)]
pub trait WindowCallbacks: Send + Sync {
    /// Back-buffer size in pixels changed.
    fn framebuffer_resized(&self, width: u32, height: u32) {}
    /// Logical window size changed.
    fn window_resized(&self, width: u32, height: u32) {}
    fn focus_changed(&self, focused: bool) {}
    fn iconify_changed(&self, iconified: bool) {}
    fn maximize_changed(&self, maximized: bool) {}
    fn close_requested(&self) {}
    fn refresh_requested(&self) {}
    fn files_dropped(&self, paths: Vec<PathBuf>) {}
}

/// Keeps a set of callbacks registered with the native layer.
///
/// Dropping the registration unregisters the callbacks and releases whatever
/// the platform allocated for them.
#[must_use = "dropping the registration unregisters the callbacks"]
pub struct CallbackRegistration {
    window: NativeWindowId,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CallbackRegistration {
    pub fn new(window: NativeWindowId, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            window,
            release: Some(Box::new(release)),
        }
    }

    pub fn window(&self) -> NativeWindowId {
        self.window
    }
}

impl fmt::Debug for CallbackRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistration")
            .field("window", &self.window)
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for CallbackRegistration {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// A native windowing layer with thread-affine GL contexts.
pub trait Platform {
    /// Create a window and its context, optionally sharing object namespaces
    /// with `share_with`. Nothing is left behind on failure.
    fn create_window(
        &mut self,
        config: &WindowConfig,
        share_with: Option<NativeWindowId>,
    ) -> Result<NativeWindowId, PlatformError>;

    fn destroy_window(&mut self, window: NativeWindowId);

    /// Register the input and window callbacks of `window`, replacing any
    /// previous registration.
    fn register_callbacks(
        &mut self,
        window: NativeWindowId,
        input: Arc<dyn InputCallbacks>,
        events: Arc<dyn WindowCallbacks>,
    ) -> Result<CallbackRegistration, PlatformError>;

    /// Deliver all pending native events. Callbacks fire synchronously.
    fn poll_events(&mut self) -> Result<(), PlatformError>;

    fn make_current(&mut self, window: NativeWindowId) -> Result<(), PlatformError>;

    fn swap_buffers(&mut self, window: NativeWindowId);

    fn set_swap_interval(&mut self, interval: u32);

    fn window_state(&self, window: NativeWindowId) -> NativeWindowState;

    /// Logical window size.
    fn window_size(&self, window: NativeWindowId) -> Size<u32>;

    /// Back-buffer size in pixels.
    fn framebuffer_size(&self, window: NativeWindowId) -> Size<u32>;

    fn set_title(&mut self, window: NativeWindowId, title: &str);

    /// Move the cursor, in logical coordinates.
    fn set_cursor_position(&mut self, window: NativeWindowId, x: f64, y: f64);

    fn set_cursor_catched(&mut self, window: NativeWindowId, catched: bool);

    fn is_cursor_catched(&self, window: NativeWindowId) -> bool;
}
