use std::sync::Arc;

use kestrel_core::config::WindowConfig;
use kestrel_core::geometry::Size;
use kestrel_core::native::{InputCallbacks, Modifiers, NativeWindowState, WindowCallbacks};
use parking_lot::Mutex;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::window::{CursorGrabMode, Window as WinitWindow, WindowAttributes};

/// Callbacks currently bound to a window, tagged with the registration that
/// installed them.
pub(crate) struct Bound {
    pub(crate) generation: u64,
    pub(crate) input: Arc<dyn InputCallbacks>,
    pub(crate) events: Arc<dyn WindowCallbacks>,
}

pub(crate) type CallbackSlot = Arc<Mutex<Option<Bound>>>;

/// Window attributes for a kestrel window config.
pub(crate) fn attributes(config: &WindowConfig) -> WindowAttributes {
    let mut attributes = WinitWindow::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
        .with_decorations(config.decorated)
        .with_maximized(config.maximized)
        .with_visible(config.visible);
    if let Some((x, y)) = config.position {
        attributes = attributes.with_position(LogicalPosition::new(x, y));
    }
    attributes
}

/// A winit window plus what the platform tracks about it.
pub(crate) struct NativeWindow {
    pub(crate) window: WinitWindow,
    pub(crate) callbacks: CallbackSlot,
    pub(crate) modifiers: Modifiers,
    pub(crate) occluded: bool,
    pub(crate) maximized: bool,
    pub(crate) cursor_catched: bool,
}

impl NativeWindow {
    pub(crate) fn new(window: WinitWindow) -> Self {
        let maximized = window.is_maximized();
        Self {
            window,
            callbacks: Arc::new(Mutex::new(None)),
            modifiers: Modifiers::empty(),
            occluded: false,
            maximized,
            cursor_catched: false,
        }
    }

    /// The bound callbacks, cloned out so they run without the slot locked.
    pub(crate) fn bound(&self) -> Option<(Arc<dyn InputCallbacks>, Arc<dyn WindowCallbacks>)> {
        self.callbacks
            .lock()
            .as_ref()
            .map(|bound| (bound.input.clone(), bound.events.clone()))
    }

    pub(crate) fn state(&self) -> NativeWindowState {
        NativeWindowState {
            iconified: self.window.is_minimized().unwrap_or(self.occluded),
            focused: self.window.has_focus(),
            visible: self.window.is_visible().unwrap_or(true),
            maximized: self.maximized,
        }
    }

    pub(crate) fn logical_size(&self) -> Size<u32> {
        let size: LogicalSize<u32> = self
            .window
            .inner_size()
            .to_logical(self.window.scale_factor());
        Size::new(size.width, size.height)
    }

    pub(crate) fn framebuffer_size(&self) -> Size<u32> {
        let size = self.window.inner_size();
        Size::new(size.width, size.height)
    }

    pub(crate) fn set_cursor_catched(&mut self, catched: bool) {
        let result = if catched {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        match result {
            Ok(()) => {
                self.window.set_cursor_visible(!catched);
                self.cursor_catched = catched;
            }
            Err(err) => tracing::warn!(catched, "failed to change cursor grab: {err}"),
        }
    }
}
