//! The run loop of a single window.
//!
//! A [`FrameScheduler`] owns one native window and the application running in
//! it. It never sleeps and never switches contexts itself: the
//! [`WindowController`](crate::WindowController) makes its context current and
//! steps it whenever it is due, then sleeps until the earliest deadline of all
//! its windows.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use kestrel_core::config::{FpsTarget, HdpiMode, WindowConfig};
use kestrel_core::geometry::Size;
use kestrel_core::native::{CallbackRegistration, NativeWindowId, NativeWindowState, Platform};
use kestrel_core::profiling::{profile_function, profile_scope};
use kestrel_core::{Clock, WakeSignal};
use kestrel_input::{InputBridge, InputHandle, InputProcessor};

use crate::context::{
    ControllerRequests, NativeWindowEvent, WindowContext, WindowHandle, WindowShared, WindowSpec,
};
use crate::error::{KestrelError, ListenerStage, RunnableFailure, WindowFailure, panic_message};
use crate::limiter::{FrameLimiter, iteration_period};
use crate::listener::{ApplicationListener, BackendHooks, DesktopHooks, WindowListener};
use crate::runnable::{RunnableQueue, RunnableSender};
use crate::time::FrameTime;

/// Lifecycle of a window's application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The native window exists but `create` has not run yet.
    Uninitialized,
    /// `create` and the first `resize` ran; nothing was rendered yet.
    Created,
    Running,
    Paused,
    /// Terminal. `dispose` ran (or was attempted).
    Disposed,
}

impl Lifecycle {
    /// Whether the application is between `create`/`resume` and `pause`.
    pub fn is_active(self) -> bool {
        matches!(self, Lifecycle::Created | Lifecycle::Running)
    }
}

/// Per-window state that callbacks reach through a [`WindowContext`].
pub(crate) struct WindowCore {
    pub(crate) label: Arc<str>,
    pub(crate) native: NativeWindowId,
    pub(crate) config: WindowConfig,
    pub(crate) shared: Arc<WindowShared>,
    pub(crate) input: InputHandle,
    pub(crate) bridge: Arc<InputBridge>,
    pub(crate) runnables: Arc<RunnableQueue>,
    pub(crate) processor: Option<Box<dyn InputProcessor>>,
    pub(crate) frame_time: FrameTime,
    pub(crate) continuous: bool,
    pub(crate) hooks: Box<dyn BackendHooks>,
    wake: Arc<WakeSignal>,
}

impl WindowCore {
    pub(crate) fn runnable_sender(&self) -> RunnableSender {
        RunnableSender::new(self.runnables.clone(), self.wake.clone())
    }

    pub(crate) fn handle(&self) -> WindowHandle {
        WindowHandle::new(self.label.clone(), self.shared.clone(), self.runnable_sender())
    }
}

/// What happened during one [`FrameScheduler`] iteration.
#[derive(Debug, Default)]
pub(crate) struct StepOutcome {
    pub(crate) rendered: bool,
    pub(crate) failure: Option<WindowFailure>,
    pub(crate) runnable_failures: Vec<RunnableFailure>,
}

/// Everything a scheduler needs from its controller when it is opened.
pub(crate) struct SchedulerEnv {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) wake: Arc<WakeSignal>,
    pub(crate) owner: u64,
    pub(crate) share_with: Option<NativeWindowId>,
    pub(crate) error_on_runnable_panic: bool,
}

/// Drives one window: runnables, frame-rate targets, lifecycle edges,
/// rendering and input, in that order, once per iteration.
pub struct FrameScheduler {
    core: WindowCore,
    listener: Box<dyn ApplicationListener>,
    window_listener: Option<Box<dyn WindowListener>>,
    lifecycle: Lifecycle,
    limiter: FrameLimiter,
    registration: Option<CallbackRegistration>,
    owner: u64,
    error_on_runnable_panic: bool,
    last_logical: Option<Size<u32>>,
    last_backbuffer: Option<Size<u32>>,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("label", &self.core.label)
            .field("native", &self.core.native)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

/// Run an application callback, turning a panic into an error.
fn guarded<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

/// Size passed to `resize` under the window's HDPI mode.
fn reported_size(mode: HdpiMode, logical: Size<u32>, backbuffer: Size<u32>) -> Size<u32> {
    match mode {
        HdpiMode::Logical => logical,
        HdpiMode::Pixels => backbuffer,
    }
}

impl FrameScheduler {
    /// Create the native window and bind its callbacks.
    ///
    /// On failure nothing is left behind on the platform.
    pub(crate) fn open(
        platform: &mut dyn Platform,
        spec: WindowSpec,
        env: SchedulerEnv,
    ) -> Result<Self, KestrelError> {
        let native = platform.create_window(&spec.config, env.share_with)?;
        match Self::bind(platform, native, spec, env) {
            Ok(scheduler) => Ok(scheduler),
            Err(err) => {
                platform.destroy_window(native);
                Err(err)
            }
        }
    }

    fn bind(
        platform: &mut dyn Platform,
        native: NativeWindowId,
        spec: WindowSpec,
        env: SchedulerEnv,
    ) -> Result<Self, KestrelError> {
        let WindowSpec {
            label,
            config,
            listener,
            window_listener,
            hooks,
        } = spec;

        let shared = Arc::new(WindowShared::new(env.wake.clone()));
        let (bridge, input) = InputBridge::new(config.hdpi_mode, env.clock, shared.clone());
        let registration = platform.register_callbacks(native, bridge.clone(), shared.clone())?;
        input.reset_polling_states()?;

        tracing::debug!(window = %label, ?native, "window opened");
        Ok(Self {
            core: WindowCore {
                label: Arc::from(label),
                native,
                continuous: config.continuous_rendering,
                config,
                shared,
                input,
                bridge,
                runnables: Arc::new(RunnableQueue::new()),
                processor: None,
                frame_time: FrameTime::new(),
                hooks: hooks.unwrap_or_else(|| Box::new(DesktopHooks)),
                wake: env.wake,
            },
            listener,
            window_listener,
            lifecycle: Lifecycle::Uninitialized,
            limiter: FrameLimiter::new(),
            registration: Some(registration),
            owner: env.owner,
            error_on_runnable_panic: env.error_on_runnable_panic,
            last_logical: None,
            last_backbuffer: None,
        })
    }

    pub fn label(&self) -> &str {
        &self.core.label
    }

    pub fn native_window(&self) -> NativeWindowId {
        self.core.native
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn config(&self) -> &WindowConfig {
        &self.core.config
    }

    pub fn input(&self) -> &InputHandle {
        &self.core.input
    }

    pub fn frame_time(&self) -> &FrameTime {
        &self.core.frame_time
    }

    pub fn handle(&self) -> WindowHandle {
        self.core.handle()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    pub(crate) fn owner(&self) -> u64 {
        self.owner
    }

    /// Whether the window must iterate now rather than at its next deadline.
    fn has_urgent_work(&self) -> bool {
        self.lifecycle == Lifecycle::Uninitialized
            || !self.core.runnables.is_empty()
            || self.core.shared.has_urgent_work()
    }

    pub(crate) fn needs_iteration(&self, now: Duration) -> bool {
        !self.is_disposed() && (self.has_urgent_work() || self.limiter.is_due(now))
    }

    /// When the controller should wake up for this window; `None` means
    /// immediately.
    pub(crate) fn next_wake(&self) -> Option<Duration> {
        if self.has_urgent_work() {
            None
        } else {
            self.limiter.next_deadline()
        }
    }

    fn target_fps(&self, state: &NativeWindowState) -> FpsTarget {
        let config = &self.core.config;
        let raw = if state.is_hidden() {
            config.hidden_fps
        } else if state.focused {
            config.foreground_fps
        } else {
            config.background_fps
        };
        FpsTarget::from_raw(raw)
    }

    fn failure(&self, stage: ListenerStage, error: anyhow::Error) -> WindowFailure {
        WindowFailure {
            window: self.core.label.to_string(),
            stage,
            error,
        }
    }

    fn invoke(
        &mut self,
        platform: &mut dyn Platform,
        requests: &mut ControllerRequests,
        stage: ListenerStage,
        f: impl FnOnce(&mut dyn ApplicationListener, &mut WindowContext<'_>) -> anyhow::Result<()>,
    ) -> Result<(), WindowFailure> {
        let listener = self.listener.as_mut();
        let mut ctx = WindowContext::new(platform, &mut self.core, requests);
        guarded(|| f(listener, &mut ctx)).map_err(|error| self.failure(stage, error))
    }

    fn notify(
        &mut self,
        f: impl FnOnce(&mut dyn WindowListener) -> bool,
    ) -> Result<bool, WindowFailure> {
        let Some(listener) = self.window_listener.as_deref_mut() else {
            return Ok(true);
        };
        guarded(|| Ok(f(listener))).map_err(|error| self.failure(ListenerStage::WindowEvent, error))
    }

    /// Run one iteration. The window's context must be current.
    pub(crate) fn step(
        &mut self,
        platform: &mut dyn Platform,
        requests: &mut ControllerRequests,
        now: Duration,
    ) -> StepOutcome {
        profile_function!();
        let mut outcome = StepOutcome::default();
        if self.is_disposed() {
            return outcome;
        }
        if let Err(failure) = self.iterate(platform, requests, now, &mut outcome) {
            tracing::debug!(window = %self.core.label, stage = %failure.stage, "window failed");
            self.teardown_callbacks(platform, requests, Some(failure.stage));
            outcome.failure = Some(failure);
        }
        outcome
    }

    fn iterate(
        &mut self,
        platform: &mut dyn Platform,
        requests: &mut ControllerRequests,
        now: Duration,
        outcome: &mut StepOutcome,
    ) -> Result<(), WindowFailure> {
        if self.lifecycle == Lifecycle::Uninitialized {
            self.initialize(platform, requests)?;
        }

        let had_window_events = self.process_window_events()?;
        if self.core.shared.close_requested() {
            tracing::debug!(window = %self.core.label, "closing window");
            self.teardown_callbacks(platform, requests, None);
            return Ok(());
        }

        let ran_runnables = {
            profile_scope!("runnables");
            let report = self
                .core
                .runnables
                .drain_and_execute()
                .map_err(|err| self.failure(ListenerStage::Runnable, err.into()))?;
            for (index, message) in &report.panics {
                outcome.runnable_failures.push(RunnableFailure {
                    window: self.core.label.to_string(),
                    index: *index,
                    message: message.clone(),
                });
            }
            if self.error_on_runnable_panic && !report.panics.is_empty() {
                return Err(self.failure(
                    ListenerStage::Runnable,
                    anyhow::anyhow!("{} posted runnable(s) panicked", report.panics.len()),
                ));
            }
            report.ran_any()
        };

        let state = platform.window_state(self.core.native);
        let target = self.target_fps(&state);

        let mut should_render = self.core.shared.take_dirty()
            || self.core.continuous
            || ran_runnables
            || had_window_events;

        if target.is_paused() {
            if self.lifecycle.is_active() {
                self.invoke(platform, requests, ListenerStage::Pause, |l, ctx| l.pause(ctx))?;
                self.lifecycle = Lifecycle::Paused;
                tracing::debug!(window = %self.core.label, "window paused");
            }
        } else {
            if self.lifecycle == Lifecycle::Paused {
                self.invoke(platform, requests, ListenerStage::Resume, |l, ctx| l.resume(ctx))?;
                self.lifecycle = Lifecycle::Running;
                self.core.frame_time.reset_delta();
                should_render = true;
                tracing::debug!(window = %self.core.label, "window resumed");
            }

            self.sync_size(platform, requests)?;

            if should_render {
                profile_scope!("render");
                self.core.frame_time.update(now);
                self.invoke(platform, requests, ListenerStage::Render, |l, ctx| l.render(ctx))?;
                platform.swap_buffers(self.core.native);
                outcome.rendered = true;
                if self.lifecycle == Lifecycle::Created {
                    self.lifecycle = Lifecycle::Running;
                }
            }
        }

        self.drain_input()?;

        let period = iteration_period(target, self.core.config.idle_fps);
        self.limiter.finish_iteration(now, period);
        tracing::trace!(window = %self.core.label, rendered = outcome.rendered, ?target, "iteration finished");
        Ok(())
    }

    fn initialize(
        &mut self,
        platform: &mut dyn Platform,
        requests: &mut ControllerRequests,
    ) -> Result<(), WindowFailure> {
        profile_function!();
        platform.set_swap_interval(u32::from(self.core.config.vsync));

        let reported = self.apply_sizes(platform).unwrap_or_default();
        self.invoke(platform, requests, ListenerStage::Create, |l, ctx| l.create(ctx))?;
        self.invoke(platform, requests, ListenerStage::Resize, |l, ctx| {
            l.resize(ctx, reported.width, reported.height)
        })?;
        self.lifecycle = Lifecycle::Created;

        self.core.hooks.on_start(self.core.native);
        let handle = self.core.handle();
        self.notify(|listener| {
            listener.created(&handle);
            true
        })?;
        tracing::debug!(window = %self.core.label, ?reported, "window created");
        Ok(())
    }

    /// Push the current native sizes into input and frame info.
    ///
    /// Returns the reported size if it changed, `None` otherwise or while the
    /// window has no area.
    fn apply_sizes(&mut self, platform: &dyn Platform) -> Option<Size<u32>> {
        let native = self.core.native;
        let logical = platform.window_size(native);
        let backbuffer = platform.framebuffer_size(native);
        if logical.is_empty() || backbuffer.is_empty() {
            return None;
        }
        if self.last_logical == Some(logical) && self.last_backbuffer == Some(backbuffer) {
            return None;
        }

        let display_mode_only = self.last_logical == Some(logical);
        self.last_logical = Some(logical);
        self.last_backbuffer = Some(backbuffer);

        self.core.input.set_sizes(logical, backbuffer);
        self.core.frame_time.set_sizes(logical, backbuffer);
        self.core.hooks.on_resize(native, logical, backbuffer);
        if display_mode_only {
            self.core.hooks.on_display_mode_changed(native, backbuffer);
        }
        Some(reported_size(self.core.config.hdpi_mode, logical, backbuffer))
    }

    fn sync_size(
        &mut self,
        platform: &mut dyn Platform,
        requests: &mut ControllerRequests,
    ) -> Result<(), WindowFailure> {
        let Some(reported) = self.apply_sizes(platform) else {
            return Ok(());
        };
        tracing::debug!(window = %self.core.label, ?reported, "window resized");
        self.invoke(platform, requests, ListenerStage::Resize, |l, ctx| {
            l.resize(ctx, reported.width, reported.height)
        })
    }

    /// Replay native window notifications. Returns whether there were any.
    fn process_window_events(&mut self) -> Result<bool, WindowFailure> {
        let events = self.core.shared.take_events();
        let had_events = !events.is_empty();
        for event in events {
            match event {
                NativeWindowEvent::Focus(true) => {
                    self.notify(|l| {
                        l.focus_gained();
                        true
                    })?;
                }
                NativeWindowEvent::Focus(false) => {
                    self.notify(|l| {
                        l.focus_lost();
                        true
                    })?;
                }
                NativeWindowEvent::Iconify(iconified) => {
                    self.notify(|l| {
                        l.iconified(iconified);
                        true
                    })?;
                }
                NativeWindowEvent::Maximize(maximized) => {
                    self.notify(|l| {
                        l.maximized(maximized);
                        true
                    })?;
                }
                NativeWindowEvent::CloseRequested => {
                    if self.notify(|l| l.close_requested())? {
                        self.core.shared.request_close();
                    } else {
                        tracing::debug!(window = %self.core.label, "close request cancelled");
                    }
                }
                NativeWindowEvent::Refresh => {
                    self.notify(|l| {
                        l.refresh_requested();
                        true
                    })?;
                }
                NativeWindowEvent::FilesDropped(paths) => {
                    self.notify(|l| {
                        l.files_dropped(&paths);
                        true
                    })?;
                }
            }
        }
        Ok(had_events)
    }

    fn drain_input(&mut self) -> Result<(), WindowFailure> {
        profile_scope!("input");
        let core = &mut self.core;
        let drained = guarded(|| {
            let processor = core
                .processor
                .as_deref_mut()
                .map(|processor| processor as &mut dyn InputProcessor);
            core.input.drain(processor).map_err(anyhow::Error::from)
        });
        drained
            .map(|_| ())
            .map_err(|error| self.failure(ListenerStage::Input, error))
    }

    /// Invoke `pause` (unless already paused) and `dispose`, once each, and
    /// mark the window disposed. `failed_in` skips the callback that failed.
    ///
    /// A window that failed in `create` still gets both; one that never got
    /// to `create` gets neither.
    fn teardown_callbacks(
        &mut self,
        platform: &mut dyn Platform,
        requests: &mut ControllerRequests,
        failed_in: Option<ListenerStage>,
    ) {
        if self.is_disposed() {
            return;
        }
        if self.lifecycle == Lifecycle::Uninitialized && failed_in.is_none() {
            // `create` never ran, so there is nothing to pause or dispose.
            self.lifecycle = Lifecycle::Disposed;
            let dropped = self.core.runnables.discard();
            tracing::debug!(window = %self.core.label, dropped_runnables = dropped, "window disposed before creation");
            return;
        }

        if self.lifecycle != Lifecycle::Paused && failed_in != Some(ListenerStage::Pause) {
            if let Err(failure) =
                self.invoke(platform, requests, ListenerStage::Pause, |l, ctx| l.pause(ctx))
            {
                tracing::warn!("{failure}");
            }
        }
        if failed_in != Some(ListenerStage::Dispose) {
            if let Err(failure) =
                self.invoke(platform, requests, ListenerStage::Dispose, |l, ctx| l.dispose(ctx))
            {
                tracing::warn!("{failure}");
            }
        }

        self.lifecycle = Lifecycle::Disposed;
        let dropped = self.core.runnables.discard();
        tracing::debug!(window = %self.core.label, dropped_runnables = dropped, "window disposed");
    }

    /// Dispose the application now, e.g. on exit. The context must be current.
    pub(crate) fn dispose(&mut self, platform: &mut dyn Platform, requests: &mut ControllerRequests) {
        self.teardown_callbacks(platform, requests, None);
    }

    /// Release the native window. Buffered input and runnables are discarded.
    pub(crate) fn release_native(&mut self, platform: &mut dyn Platform) {
        drop(self.registration.take());
        self.core.runnables.discard();
        if let Err(err) = self.core.input.queue().drain(None) {
            tracing::warn!(window = %self.core.label, "failed to discard input: {err}");
        }
        platform.destroy_window(self.core.native);
        tracing::debug!(window = %self.core.label, "native window destroyed");
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        if self.registration.is_some() {
            tracing::warn!(
                window = %self.core.label,
                native = ?self.core.native,
                "window dropped without being released; its native window leaks"
            );
        }
    }
}
