//! What application code gets to see of its window.
//!
//! There is no global "current window": every callback receives a
//! [`WindowContext`] for the window it runs in, and other threads talk to a
//! window through a [`WindowHandle`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::IVec2;
use kestrel_core::WakeSignal;
use kestrel_core::config::WindowConfig;
use kestrel_core::native::{NativeWindowId, Platform, WindowCallbacks};
use kestrel_input::{InputHandle, InputProcessor, RenderRequester};
use parking_lot::Mutex;

use crate::listener::{ApplicationListener, BackendHooks, WindowListener};
use crate::runnable::RunnableSender;
use crate::scheduler::WindowCore;
use crate::time::FrameTime;

/// Window-level native notifications, replayed at the start of the window's
/// next iteration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NativeWindowEvent {
    Focus(bool),
    Iconify(bool),
    Maximize(bool),
    CloseRequested,
    Refresh,
    FilesDropped(Vec<PathBuf>),
}

/// Flags and buffers of a window that other threads may touch.
pub(crate) struct WindowShared {
    dirty: AtomicBool,
    close: AtomicBool,
    events: Mutex<Vec<NativeWindowEvent>>,
    wake: Arc<WakeSignal>,
}

impl WindowShared {
    pub(crate) fn new(wake: Arc<WakeSignal>) -> Self {
        Self {
            // The first iteration always renders.
            dirty: AtomicBool::new(true),
            close: AtomicBool::new(false),
            events: Mutex::new(Vec::new()),
            wake,
        }
    }

    pub(crate) fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub(crate) fn request_close(&self) {
        self.close.store(true, Ordering::Release);
        self.wake.wake();
    }

    pub(crate) fn close_requested(&self) -> bool {
        self.close.load(Ordering::Acquire)
    }

    pub(crate) fn take_events(&self) -> Vec<NativeWindowEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Whether the window should iterate before its next deadline.
    pub(crate) fn has_urgent_work(&self) -> bool {
        self.close_requested() || !self.events.lock().is_empty()
    }

    fn push_event(&self, event: NativeWindowEvent) {
        self.events.lock().push(event);
    }
}

impl RenderRequester for WindowShared {
    fn request_rendering(&self) {
        self.mark_dirty();
    }
}

impl WindowCallbacks for WindowShared {
    fn framebuffer_resized(&self, _width: u32, _height: u32) {
        self.mark_dirty();
    }

    fn window_resized(&self, _width: u32, _height: u32) {
        self.mark_dirty();
    }

    fn focus_changed(&self, focused: bool) {
        self.push_event(NativeWindowEvent::Focus(focused));
    }

    fn iconify_changed(&self, iconified: bool) {
        self.push_event(NativeWindowEvent::Iconify(iconified));
    }

    fn maximize_changed(&self, maximized: bool) {
        self.push_event(NativeWindowEvent::Maximize(maximized));
    }

    fn close_requested(&self) {
        self.push_event(NativeWindowEvent::CloseRequested);
    }

    fn refresh_requested(&self) {
        self.push_event(NativeWindowEvent::Refresh);
        self.mark_dirty();
    }

    fn files_dropped(&self, paths: Vec<PathBuf>) {
        self.push_event(NativeWindowEvent::FilesDropped(paths));
    }
}

/// Thread-safe handle to a window.
#[derive(Clone)]
pub struct WindowHandle {
    label: Arc<str>,
    shared: Arc<WindowShared>,
    runnables: RunnableSender,
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowHandle")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl WindowHandle {
    pub(crate) fn new(label: Arc<str>, shared: Arc<WindowShared>, runnables: RunnableSender) -> Self {
        Self {
            label,
            shared,
            runnables,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run `runnable` on the window's render thread before its next render.
    pub fn post_runnable(&self, runnable: impl FnOnce() + Send + 'static) {
        self.runnables.post(runnable);
    }

    pub fn runnable_sender(&self) -> RunnableSender {
        self.runnables.clone()
    }

    /// Render on the next iteration even without continuous rendering.
    pub fn request_rendering(&self) {
        self.shared.mark_dirty();
        self.shared.wake.wake();
    }

    /// Dispose the window on its next iteration. Window listeners are not
    /// consulted.
    pub fn close(&self) {
        self.shared.request_close();
    }

    pub fn is_closing(&self) -> bool {
        self.shared.close_requested()
    }
}

/// Everything needed to open a window.
pub struct WindowSpec {
    pub(crate) label: String,
    pub(crate) config: WindowConfig,
    pub(crate) listener: Box<dyn ApplicationListener>,
    pub(crate) window_listener: Option<Box<dyn WindowListener>>,
    pub(crate) hooks: Option<Box<dyn BackendHooks>>,
}

impl fmt::Debug for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSpec")
            .field("label", &self.label)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WindowSpec {
    pub fn new(
        label: impl Into<String>,
        config: WindowConfig,
        listener: impl ApplicationListener,
    ) -> Self {
        Self {
            label: label.into(),
            config,
            listener: Box::new(listener),
            window_listener: None,
            hooks: None,
        }
    }

    pub fn with_window_listener(mut self, listener: impl WindowListener) -> Self {
        self.window_listener = Some(Box::new(listener));
        self
    }

    pub fn with_hooks(mut self, hooks: impl BackendHooks) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Requests that only the controller can act on, collected during a scan.
#[derive(Debug, Default)]
pub(crate) struct ControllerRequests {
    pub(crate) exit: bool,
    pub(crate) open: Vec<WindowSpec>,
}

/// The window a callback runs in, with access to the native layer.
pub struct WindowContext<'a> {
    platform: &'a mut dyn Platform,
    core: &'a mut WindowCore,
    requests: &'a mut ControllerRequests,
}

impl<'a> WindowContext<'a> {
    pub(crate) fn new(
        platform: &'a mut dyn Platform,
        core: &'a mut WindowCore,
        requests: &'a mut ControllerRequests,
    ) -> Self {
        Self {
            platform,
            core,
            requests,
        }
    }

    pub fn label(&self) -> &str {
        &self.core.label
    }

    pub fn native_window(&self) -> NativeWindowId {
        self.core.native
    }

    pub fn config(&self) -> &WindowConfig {
        &self.core.config
    }

    pub fn input(&self) -> &InputHandle {
        &self.core.input
    }

    pub fn graphics(&self) -> &FrameTime {
        &self.core.frame_time
    }

    pub fn handle(&self) -> WindowHandle {
        self.core.handle()
    }

    pub fn request_rendering(&self) {
        self.core.shared.mark_dirty();
    }

    pub fn set_continuous_rendering(&mut self, continuous: bool) {
        self.core.continuous = continuous;
    }

    pub fn is_continuous_rendering(&self) -> bool {
        self.core.continuous
    }

    pub fn post_runnable(&self, runnable: impl FnOnce() + Send + 'static) {
        self.core.runnable_sender().post(runnable);
    }

    pub fn runnable_sender(&self) -> RunnableSender {
        self.core.runnable_sender()
    }

    /// Replace the processor that receives this window's drained input.
    pub fn set_input_processor(&mut self, processor: impl InputProcessor + 'static) {
        self.core.processor = Some(Box::new(processor));
    }

    pub fn clear_input_processor(&mut self) {
        self.core.processor = None;
    }

    pub fn set_title(&mut self, title: &str) {
        self.platform.set_title(self.core.native, title);
        self.core.config.title = title.to_string();
        self.core.hooks.on_title_changed(self.core.native, title);
    }

    /// Move the cursor to a position in reported coordinates.
    ///
    /// The move goes through the cursor callback as well, so polled state and
    /// the event stream agree with the native cursor.
    pub fn set_cursor_position(&mut self, x: i32, y: i32) {
        let native = self.core.input.to_native(IVec2::new(x, y));
        self.platform.set_cursor_position(self.core.native, native.x, native.y);
        kestrel_core::native::InputCallbacks::cursor_position(
            self.core.bridge.as_ref(),
            native.x,
            native.y,
        );
    }

    pub fn set_cursor_catched(&mut self, catched: bool) {
        self.platform.set_cursor_catched(self.core.native, catched);
    }

    pub fn is_cursor_catched(&self) -> bool {
        self.platform.is_cursor_catched(self.core.native)
    }

    /// Dispose this window on its next iteration.
    pub fn close_window(&self) {
        self.core.shared.request_close();
    }

    /// Dispose every window at the end of the current controller iteration.
    pub fn exit(&mut self) {
        self.requests.exit = true;
        self.core.shared.wake.wake();
    }

    /// Open another window at the end of the current controller iteration.
    ///
    /// Creation failures are reported through the controller's error hook.
    pub fn open_window(&mut self, spec: WindowSpec) {
        self.requests.open.push(spec);
    }
}
