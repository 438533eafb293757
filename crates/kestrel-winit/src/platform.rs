use std::sync::Arc;
use std::time::Duration;

use kestrel_core::PlatformError;
use kestrel_core::config::WindowConfig;
use kestrel_core::geometry::Size;
use kestrel_core::native::{
    CallbackRegistration, InputCallbacks, NativeWindowId, NativeWindowState, Platform,
    WindowCallbacks,
};
use kestrel_core::profiling::profile_function;
use winit::dpi::LogicalPosition;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};

use crate::app::PumpHandler;
use crate::window::{Bound, NativeWindow, attributes};

/// [`Platform`] over a winit event loop on the calling thread.
///
/// Every `poll_events` pumps the loop once without blocking. winit owns no
/// GL contexts, so `make_current` only tracks which window the renderer is
/// drawing to and `swap_buffers` marks the point where a frame is presented;
/// the actual surface belongs to the application's renderer.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    handler: PumpHandler,
    next_id: u64,
    next_registration: u64,
    current: Option<NativeWindowId>,
    swap_interval: u32,
}

impl WinitPlatform {
    pub fn new() -> Result<Self, PlatformError> {
        let event_loop = EventLoop::new().map_err(|err| PlatformError::EventLoop(err.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        Ok(Self {
            event_loop,
            handler: PumpHandler::default(),
            next_id: 0,
            next_registration: 0,
            current: None,
            swap_interval: 1,
        })
    }

    pub fn current(&self) -> Option<NativeWindowId> {
        self.current
    }

    pub fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    /// The winit window behind `window`, for creating render surfaces.
    pub fn winit_window(&self, window: NativeWindowId) -> Option<&winit::window::Window> {
        self.handler.windows.get(&window).map(|native| &native.window)
    }

    fn pump(&mut self) -> Result<(), PlatformError> {
        match self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler)
        {
            PumpStatus::Continue => Ok(()),
            PumpStatus::Exit(code) => {
                tracing::debug!(code, "winit event loop exited");
                Err(PlatformError::EventLoopClosed)
            }
        }
    }

    fn window(&self, window: NativeWindowId) -> Option<&NativeWindow> {
        self.handler.windows.get(&window)
    }
}

impl Platform for WinitPlatform {
    fn create_window(
        &mut self,
        config: &WindowConfig,
        share_with: Option<NativeWindowId>,
    ) -> Result<NativeWindowId, PlatformError> {
        profile_function!();
        if let Some(parent) = share_with
            && !self.handler.windows.contains_key(&parent)
        {
            return Err(PlatformError::UnknownWindow(parent));
        }

        // Windows can only be created from inside the event loop.
        self.handler.pending_create = Some(attributes(config));
        let pumped = self.pump();
        self.handler.pending_create = None;
        pumped?;

        let window = match self.handler.created.take() {
            Some(Ok(window)) => window,
            Some(Err(err)) => {
                return Err(PlatformError::WindowCreation {
                    title: config.title.clone(),
                    reason: err.to_string(),
                });
            }
            None => {
                return Err(PlatformError::WindowCreation {
                    title: config.title.clone(),
                    reason: "the event loop did not reach a point where windows can be created"
                        .to_string(),
                });
            }
        };

        self.next_id += 1;
        let id = NativeWindowId(self.next_id);
        self.handler.ids.insert(window.id(), id);
        self.handler.windows.insert(id, NativeWindow::new(window));
        tracing::debug!(window = ?id, title = %config.title, "winit window created");
        Ok(id)
    }

    fn destroy_window(&mut self, window: NativeWindowId) {
        let Some(native) = self.handler.windows.remove(&window) else {
            return;
        };
        let winit_id = native.window.id();
        self.handler.ids.remove(&winit_id);
        self.handler.deferred.retain(|(id, _)| *id != winit_id);
        if self.current == Some(window) {
            self.current = None;
        }
        tracing::debug!(?window, "winit window destroyed");
    }

    fn register_callbacks(
        &mut self,
        window: NativeWindowId,
        input: Arc<dyn InputCallbacks>,
        events: Arc<dyn WindowCallbacks>,
    ) -> Result<CallbackRegistration, PlatformError> {
        let native = self
            .handler
            .windows
            .get(&window)
            .ok_or(PlatformError::UnknownWindow(window))?;
        self.next_registration += 1;
        let generation = self.next_registration;
        *native.callbacks.lock() = Some(Bound {
            generation,
            input,
            events,
        });

        let slot = native.callbacks.clone();
        Ok(CallbackRegistration::new(window, move || {
            let mut bound = slot.lock();
            if bound
                .as_ref()
                .is_some_and(|bound| bound.generation == generation)
            {
                *bound = None;
            }
        }))
    }

    fn poll_events(&mut self) -> Result<(), PlatformError> {
        profile_function!();
        self.handler.delivering = true;
        self.handler.flush_deferred();
        let pumped = self.pump();
        self.handler.delivering = false;
        pumped
    }

    fn make_current(&mut self, window: NativeWindowId) -> Result<(), PlatformError> {
        if !self.handler.windows.contains_key(&window) {
            return Err(PlatformError::ContextBinding(
                window,
                "window was destroyed".to_string(),
            ));
        }
        self.current = Some(window);
        Ok(())
    }

    fn swap_buffers(&mut self, window: NativeWindowId) {
        if let Some(native) = self.window(window) {
            native.window.pre_present_notify();
        }
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_interval = interval;
    }

    fn window_state(&self, window: NativeWindowId) -> NativeWindowState {
        self.window(window)
            .map(NativeWindow::state)
            .unwrap_or_default()
    }

    fn window_size(&self, window: NativeWindowId) -> Size<u32> {
        self.window(window)
            .map(NativeWindow::logical_size)
            .unwrap_or_default()
    }

    fn framebuffer_size(&self, window: NativeWindowId) -> Size<u32> {
        self.window(window)
            .map(NativeWindow::framebuffer_size)
            .unwrap_or_default()
    }

    fn set_title(&mut self, window: NativeWindowId, title: &str) {
        if let Some(native) = self.window(window) {
            native.window.set_title(title);
        }
    }

    fn set_cursor_position(&mut self, window: NativeWindowId, x: f64, y: f64) {
        if let Some(native) = self.window(window)
            && let Err(err) = native
                .window
                .set_cursor_position(LogicalPosition::new(x, y))
        {
            tracing::warn!(?window, "failed to move the cursor: {err}");
        }
    }

    fn set_cursor_catched(&mut self, window: NativeWindowId, catched: bool) {
        if let Some(native) = self.handler.windows.get_mut(&window) {
            native.set_cursor_catched(catched);
        }
    }

    fn is_cursor_catched(&self, window: NativeWindowId) -> bool {
        self.window(window).is_some_and(|native| native.cursor_catched)
    }
}
