//! The winit application handler driven by each pump.

use std::collections::{BTreeMap, HashMap};

use kestrel_core::native::NativeWindowId;
use winit::application::ApplicationHandler;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window as WinitWindow, WindowAttributes, WindowId};

use crate::event::{dispatch, sync_maximized};
use crate::window::NativeWindow;

/// Window bookkeeping shared between the platform and the event loop.
///
/// Events are only delivered to callbacks while `delivering` is set, i.e.
/// inside `Platform::poll_events`. Events winit hands out during any other
/// pump (window creation) are buffered until then.
#[derive(Default)]
pub(crate) struct PumpHandler {
    pub(crate) windows: BTreeMap<NativeWindowId, NativeWindow>,
    pub(crate) ids: HashMap<WindowId, NativeWindowId>,
    pub(crate) delivering: bool,
    pub(crate) deferred: Vec<(WindowId, WindowEvent)>,
    pub(crate) pending_create: Option<WindowAttributes>,
    pub(crate) created: Option<Result<WinitWindow, OsError>>,
}

impl PumpHandler {
    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.pending_create.take() {
            self.created = Some(event_loop.create_window(attributes));
        }
    }

    pub(crate) fn deliver(&mut self, id: WindowId, event: WindowEvent) {
        let Some(window) = self
            .ids
            .get(&id)
            .and_then(|native| self.windows.get_mut(native))
        else {
            tracing::trace!(?id, "event for an unknown window");
            return;
        };
        dispatch(window, event);
    }

    /// Replay events that arrived outside `poll_events`.
    pub(crate) fn flush_deferred(&mut self) {
        for (id, event) in std::mem::take(&mut self.deferred) {
            self.deliver(id, event);
        }
    }
}

impl ApplicationHandler for PumpHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.delivering {
            self.deliver(id, event);
        } else {
            self.deferred.push((id, event));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
        if self.delivering {
            for window in self.windows.values_mut() {
                sync_maximized(window);
            }
        }
    }
}
