//! Traits implemented by applications and backends.

use std::path::PathBuf;

use kestrel_core::geometry::Size;
use kestrel_core::native::NativeWindowId;

use crate::context::{WindowContext, WindowHandle};

/// Lifecycle callbacks of the application running in one window.
///
/// All callbacks run on the controller thread with the window's context
/// current. Returning an error (or panicking) is fatal for the window: it is
/// paused and disposed, and the failure goes to the controller's error hook.
#[allow(unused_variables)]
pub trait ApplicationListener: 'static {
    fn create(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()>;

    /// Reported size changed. Also called once right after `create`.
    fn resize(&mut self, ctx: &mut WindowContext<'_>, width: u32, height: u32) -> anyhow::Result<()> {
        Ok(())
    }

    fn render(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()>;

    fn pause(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn resume(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn dispose(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Optional window-level notifications.
#[allow(unused_variables)]
pub trait WindowListener: 'static {
    /// The window finished initializing; `create` already ran.
    fn created(&mut self, window: &WindowHandle) {}

    fn iconified(&mut self, iconified: bool) {}

    fn maximized(&mut self, maximized: bool) {}

    fn focus_lost(&mut self) {}

    fn focus_gained(&mut self) {}

    /// The user asked to close the window. Return `false` to keep it open.
    fn close_requested(&mut self) -> bool {
        true
    }

    fn files_dropped(&mut self, paths: &[PathBuf]) {}

    /// The window contents were damaged and should be redrawn.
    fn refresh_requested(&mut self) {}
}

/// Hook points for embedding the runtime in a particular host.
///
/// A desktop window needs none of these; hosts such as an embedded canvas use
/// them to mirror window changes into their own widget.
#[allow(unused_variables)]
pub trait BackendHooks: 'static {
    fn on_start(&mut self, window: NativeWindowId) {}

    fn on_title_changed(&mut self, window: NativeWindowId, title: &str) {}

    /// Back-buffer resolution changed without the logical size changing,
    /// e.g. after moving to a monitor with a different scale factor.
    fn on_display_mode_changed(&mut self, window: NativeWindowId, backbuffer: Size<u32>) {}

    fn on_resize(&mut self, window: NativeWindowId, logical: Size<u32>, backbuffer: Size<u32>) {}
}

/// Hooks for a plain desktop window.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopHooks;

impl BackendHooks for DesktopHooks {}
