//! A scriptable in-memory native layer.

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use kestrel_core::PlatformError;
use kestrel_core::config::WindowConfig;
use kestrel_core::geometry::Size;
use kestrel_core::native::{
    ButtonAction, CallbackRegistration, InputCallbacks, KeyAction, Modifiers, NativeWindowId,
    NativeWindowState, Platform, WindowCallbacks,
};
use parking_lot::Mutex;

/// Records a platform call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CreateWindow {
        window: NativeWindowId,
        title: String,
        share_with: Option<NativeWindowId>,
    },
    DestroyWindow(NativeWindowId),
    RegisterCallbacks(NativeWindowId),
    UnregisterCallbacks(NativeWindowId),
    PollEvents,
    MakeCurrent(NativeWindowId),
    SwapBuffers(NativeWindowId),
    SetSwapInterval(u32),
    SetTitle(NativeWindowId, String),
    SetCursorPosition(NativeWindowId, f64, f64),
    SetCursorCatched(NativeWindowId, bool),
}

/// A native event delivered to a window on the next `poll_events`.
///
/// State-changing events (focus, iconify, maximize, resizes) also update what
/// the window-state queries report, before the callback fires.
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    Key {
        native_key: i32,
        action: KeyAction,
    },
    Character(u32),
    Scroll(f64, f64),
    CursorPosition(f64, f64),
    MouseButton {
        button: i32,
        action: ButtonAction,
    },
    FramebufferResized(u32, u32),
    WindowResized(u32, u32),
    Focus(bool),
    Iconify(bool),
    Maximize(bool),
    Visible(bool),
    CloseRequested,
    Refresh,
    FilesDropped(Vec<PathBuf>),
}

struct MockWindow {
    title: String,
    state: NativeWindowState,
    size: Size<u32>,
    framebuffer: Size<u32>,
    cursor_catched: bool,
    callbacks: Option<(u64, Arc<dyn InputCallbacks>, Arc<dyn WindowCallbacks>)>,
}

type PollHook = Box<dyn FnMut(u64, &MockPlatform) + Send>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    next_registration: u64,
    windows: BTreeMap<NativeWindowId, MockWindow>,
    current: Option<NativeWindowId>,
    pending: VecDeque<(NativeWindowId, MockEvent)>,
    calls: Vec<MockCall>,
    polls: u64,
    backing_scale: Option<u32>,
    fail_next_create: Option<String>,
}

/// Mock implementation of [`Platform`] for testing.
///
/// Cloning yields another handle to the same fake display, so a test can keep
/// one handle to script events while the runtime owns the other.
///
/// # Example
///
/// ```rust
/// use kestrel_core::config::WindowConfig;
/// use kestrel_core::native::Platform;
/// use kestrel_test_utils::{MockCall, MockEvent, MockPlatform};
///
/// let mut platform = MockPlatform::new();
/// let window = platform.create_window(&WindowConfig::default(), None).unwrap();
/// platform.queue_event(window, MockEvent::Focus(false));
/// platform.poll_events().unwrap();
///
/// assert!(!platform.window_state(window).focused);
/// assert_eq!(platform.count_calls(|call| matches!(call, MockCall::PollEvents)), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockPlatform {
    inner: Arc<Mutex<Inner>>,
    poll_hook: Arc<Mutex<Option<PollHook>>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back-buffer pixels per logical unit for windows created from now on.
    pub fn set_backing_scale(&self, scale: u32) {
        self.inner.lock().backing_scale = Some(scale);
    }

    /// Make the next `create_window` fail with `reason`.
    pub fn fail_next_create(&self, reason: impl Into<String>) {
        self.inner.lock().fail_next_create = Some(reason.into());
    }

    pub fn queue_event(&self, window: NativeWindowId, event: MockEvent) {
        self.inner.lock().pending.push_back((window, event));
    }

    /// Run `hook` at the start of every `poll_events`, with the poll index
    /// (starting at 0). The hook may queue events for that same poll.
    pub fn on_poll(&self, hook: impl FnMut(u64, &MockPlatform) + Send + 'static) {
        *self.poll_hook.lock() = Some(Box::new(hook));
    }

    /// Overwrite a window's state without firing any callback.
    pub fn set_window_state(&self, window: NativeWindowId, state: NativeWindowState) {
        if let Some(entry) = self.inner.lock().windows.get_mut(&window) {
            entry.state = state;
        }
    }

    pub fn windows(&self) -> Vec<NativeWindowId> {
        self.inner.lock().windows.keys().copied().collect()
    }

    pub fn is_alive(&self, window: NativeWindowId) -> bool {
        self.inner.lock().windows.contains_key(&window)
    }

    pub fn has_callbacks(&self, window: NativeWindowId) -> bool {
        self.inner
            .lock()
            .windows
            .get(&window)
            .is_some_and(|entry| entry.callbacks.is_some())
    }

    pub fn title(&self, window: NativeWindowId) -> Option<String> {
        self.inner
            .lock()
            .windows
            .get(&window)
            .map(|entry| entry.title.clone())
    }

    pub fn current(&self) -> Option<NativeWindowId> {
        self.inner.lock().current
    }

    pub fn poll_count(&self) -> u64 {
        self.inner.lock().polls
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.inner.lock().calls.clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    pub fn swap_count(&self, window: NativeWindowId) -> usize {
        self.count_calls(|call| *call == MockCall::SwapBuffers(window))
    }

    pub fn make_current_count(&self) -> usize {
        self.count_calls(|call| matches!(call, MockCall::MakeCurrent(_)))
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    fn run_poll_hook(&self, poll: u64) {
        let hook = self.poll_hook.lock().take();
        if let Some(mut hook) = hook {
            hook(poll, self);
            let mut slot = self.poll_hook.lock();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }
}

fn deliver(input: &dyn InputCallbacks, events: &dyn WindowCallbacks, event: MockEvent) {
    let mods = Modifiers::empty();
    match event {
        MockEvent::Key { native_key, action } => input.key(native_key, 0, action, mods),
        MockEvent::Character(codepoint) => input.character(codepoint),
        MockEvent::Scroll(x, y) => input.scroll(x, y),
        MockEvent::CursorPosition(x, y) => input.cursor_position(x, y),
        MockEvent::MouseButton { button, action } => input.mouse_button(button, action, mods),
        MockEvent::FramebufferResized(width, height) => events.framebuffer_resized(width, height),
        MockEvent::WindowResized(width, height) => events.window_resized(width, height),
        MockEvent::Focus(focused) => events.focus_changed(focused),
        MockEvent::Iconify(iconified) => events.iconify_changed(iconified),
        MockEvent::Maximize(maximized) => events.maximize_changed(maximized),
        MockEvent::Visible(_) => {}
        MockEvent::CloseRequested => events.close_requested(),
        MockEvent::Refresh => events.refresh_requested(),
        MockEvent::FilesDropped(paths) => events.files_dropped(paths),
    }
}

impl Platform for MockPlatform {
    fn create_window(
        &mut self,
        config: &WindowConfig,
        share_with: Option<NativeWindowId>,
    ) -> Result<NativeWindowId, PlatformError> {
        let mut inner = self.inner.lock();
        if let Some(reason) = inner.fail_next_create.take() {
            return Err(PlatformError::WindowCreation {
                title: config.title.clone(),
                reason,
            });
        }
        if let Some(parent) = share_with
            && !inner.windows.contains_key(&parent)
        {
            return Err(PlatformError::UnknownWindow(parent));
        }

        inner.next_id += 1;
        let window = NativeWindowId(inner.next_id);
        let scale = inner.backing_scale.unwrap_or(1);
        let size = Size::new(config.width, config.height);
        inner.windows.insert(
            window,
            MockWindow {
                title: config.title.clone(),
                state: NativeWindowState {
                    visible: config.visible,
                    maximized: config.maximized,
                    ..NativeWindowState::default()
                },
                size,
                framebuffer: size.scaled(scale),
                cursor_catched: false,
                callbacks: None,
            },
        );
        inner.calls.push(MockCall::CreateWindow {
            window,
            title: config.title.clone(),
            share_with,
        });
        tracing::trace!(?window, "mock window created");
        Ok(window)
    }

    fn destroy_window(&mut self, window: NativeWindowId) {
        let mut inner = self.inner.lock();
        inner.windows.remove(&window);
        inner.pending.retain(|(target, _)| *target != window);
        if inner.current == Some(window) {
            inner.current = None;
        }
        inner.calls.push(MockCall::DestroyWindow(window));
    }

    fn register_callbacks(
        &mut self,
        window: NativeWindowId,
        input: Arc<dyn InputCallbacks>,
        events: Arc<dyn WindowCallbacks>,
    ) -> Result<CallbackRegistration, PlatformError> {
        let mut inner = self.inner.lock();
        inner.next_registration += 1;
        let generation = inner.next_registration;
        let entry = inner
            .windows
            .get_mut(&window)
            .ok_or(PlatformError::UnknownWindow(window))?;
        entry.callbacks = Some((generation, input, events));
        inner.calls.push(MockCall::RegisterCallbacks(window));

        let shared = self.inner.clone();
        Ok(CallbackRegistration::new(window, move || {
            let mut inner = shared.lock();
            if let Some(entry) = inner.windows.get_mut(&window)
                && entry
                    .callbacks
                    .as_ref()
                    .is_some_and(|(registered, _, _)| *registered == generation)
            {
                entry.callbacks = None;
            }
            inner.calls.push(MockCall::UnregisterCallbacks(window));
        }))
    }

    fn poll_events(&mut self) -> Result<(), PlatformError> {
        let poll = {
            let mut inner = self.inner.lock();
            inner.calls.push(MockCall::PollEvents);
            inner.polls += 1;
            inner.polls - 1
        };
        self.run_poll_hook(poll);

        // Callbacks run without the lock held.
        let batch: Vec<_> = {
            let mut inner = self.inner.lock();
            let pending: Vec<_> = inner.pending.drain(..).collect();
            pending
                .into_iter()
                .filter_map(|(window, event)| {
                    let entry = inner.windows.get_mut(&window)?;
                    match &event {
                        MockEvent::Focus(focused) => entry.state.focused = *focused,
                        MockEvent::Iconify(iconified) => entry.state.iconified = *iconified,
                        MockEvent::Maximize(maximized) => entry.state.maximized = *maximized,
                        MockEvent::Visible(visible) => entry.state.visible = *visible,
                        MockEvent::WindowResized(width, height) => {
                            entry.size = Size::new(*width, *height)
                        }
                        MockEvent::FramebufferResized(width, height) => {
                            entry.framebuffer = Size::new(*width, *height)
                        }
                        _ => {}
                    }
                    let (_, input, events) = entry.callbacks.as_ref()?;
                    Some((input.clone(), events.clone(), event))
                })
                .collect()
        };

        for (input, events, event) in batch {
            deliver(input.as_ref(), events.as_ref(), event);
        }
        Ok(())
    }

    fn make_current(&mut self, window: NativeWindowId) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock();
        if !inner.windows.contains_key(&window) {
            return Err(PlatformError::ContextBinding(
                window,
                "window was destroyed".to_string(),
            ));
        }
        inner.current = Some(window);
        inner.calls.push(MockCall::MakeCurrent(window));
        Ok(())
    }

    fn swap_buffers(&mut self, window: NativeWindowId) {
        self.inner.lock().calls.push(MockCall::SwapBuffers(window));
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.inner.lock().calls.push(MockCall::SetSwapInterval(interval));
    }

    fn window_state(&self, window: NativeWindowId) -> NativeWindowState {
        self.inner
            .lock()
            .windows
            .get(&window)
            .map(|entry| entry.state)
            .unwrap_or_default()
    }

    fn window_size(&self, window: NativeWindowId) -> Size<u32> {
        self.inner
            .lock()
            .windows
            .get(&window)
            .map(|entry| entry.size)
            .unwrap_or_default()
    }

    fn framebuffer_size(&self, window: NativeWindowId) -> Size<u32> {
        self.inner
            .lock()
            .windows
            .get(&window)
            .map(|entry| entry.framebuffer)
            .unwrap_or_default()
    }

    fn set_title(&mut self, window: NativeWindowId, title: &str) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.windows.get_mut(&window) {
            entry.title = title.to_string();
        }
        inner.calls.push(MockCall::SetTitle(window, title.to_string()));
    }

    fn set_cursor_position(&mut self, window: NativeWindowId, x: f64, y: f64) {
        self.inner
            .lock()
            .calls
            .push(MockCall::SetCursorPosition(window, x, y));
    }

    fn set_cursor_catched(&mut self, window: NativeWindowId, catched: bool) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.windows.get_mut(&window) {
            entry.cursor_catched = catched;
        }
        inner.calls.push(MockCall::SetCursorCatched(window, catched));
    }

    fn is_cursor_catched(&self, window: NativeWindowId) -> bool {
        self.inner
            .lock()
            .windows
            .get(&window)
            .is_some_and(|entry| entry.cursor_catched)
    }
}
