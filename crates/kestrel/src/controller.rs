//! Cooperative scheduling of several windows on one thread.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use indexmap::IndexMap;
use kestrel_core::config::ApplicationConfig;
use kestrel_core::native::{NativeWindowId, Platform};
use kestrel_core::profiling::{self, profile_function, profile_scope};
use kestrel_core::{Clock, SystemClock, WakeSignal};

use crate::context::{ControllerRequests, WindowHandle, WindowSpec};
use crate::error::{AttachError, FailureReport, KestrelError};
use crate::scheduler::{FrameScheduler, SchedulerEnv, StepOutcome};

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

type ErrorHook = Box<dyn FnMut(&FailureReport<'_>)>;

/// Runs every window of an application on the calling thread.
///
/// Each iteration polls the platform once, then steps every window that is
/// due in registration order, making its context current first. Windows that
/// were disposed during the scan are destroyed after it, and the controller
/// then sleeps until the earliest deadline of the remaining windows.
///
/// # Example
/// ```ignore
/// let mut controller = WindowController::new(platform, ApplicationConfig::default());
/// controller.open_window(WindowSpec::new("main", WindowConfig::default(), Game::default()))?;
/// controller.run()?;
/// ```
pub struct WindowController {
    id: u64,
    platform: Box<dyn Platform>,
    clock: Arc<dyn Clock>,
    wake: Arc<WakeSignal>,
    config: ApplicationConfig,
    windows: IndexMap<String, FrameScheduler>,
    current: Option<NativeWindowId>,
    requests: ControllerRequests,
    error_hook: Option<ErrorHook>,
}

impl fmt::Debug for WindowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowController")
            .field("id", &self.id)
            .field("windows", &self.windows.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl WindowController {
    pub fn new(platform: impl Platform + 'static, config: ApplicationConfig) -> Self {
        Self::with_clock(platform, config, Arc::new(SystemClock::new()))
    }

    /// Build a controller from an application config file on disk.
    pub fn from_config_file(
        platform: impl Platform + 'static,
        path: impl AsRef<Path>,
    ) -> Result<Self, KestrelError> {
        let config = ApplicationConfig::load(path)?;
        Ok(Self::new(platform, config))
    }

    pub fn with_clock(
        platform: impl Platform + 'static,
        config: ApplicationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id: NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed),
            platform: Box::new(platform),
            clock,
            wake: Arc::new(WakeSignal::new()),
            config,
            windows: IndexMap::new(),
            current: None,
            requests: ControllerRequests::default(),
            error_hook: None,
        }
    }

    /// Receive window and runnable failures instead of having them logged.
    pub fn set_error_hook(&mut self, hook: impl FnMut(&FailureReport<'_>) + 'static) {
        self.error_hook = Some(Box::new(hook));
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Signal that cuts the pacing sleep short.
    pub fn wake_signal(&self) -> Arc<WakeSignal> {
        self.wake.clone()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn window(&self, label: &str) -> Option<&FrameScheduler> {
        self.windows.get(label)
    }

    /// Labels in iteration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.windows.keys().map(String::as_str)
    }

    /// Create a native window and register it after the existing ones.
    ///
    /// Fails without registering anything if the label is taken or the
    /// platform cannot create the window. The application's `create` runs
    /// on the window's first iteration.
    pub fn open_window(&mut self, spec: WindowSpec) -> Result<WindowHandle, KestrelError> {
        profile_function!();
        if self.windows.contains_key(spec.label()) {
            return Err(KestrelError::DuplicateWindow(spec.label().to_string()));
        }

        let share_with = if spec.config.share_context {
            self.windows.values().next().map(FrameScheduler::native_window)
        } else {
            None
        };
        let env = SchedulerEnv {
            clock: self.clock.clone(),
            wake: self.wake.clone(),
            owner: self.id,
            share_with,
            error_on_runnable_panic: self.config.error_on_runnable_panic,
        };

        let label = spec.label().to_string();
        let scheduler = FrameScheduler::open(self.platform.as_mut(), spec, env)?;
        let handle = scheduler.handle();
        self.windows.insert(label, scheduler);
        Ok(handle)
    }

    /// Take a window out of the rotation without disposing it.
    ///
    /// The native window stays alive; it can only be attached to this
    /// controller again or disposed with [`WindowController::dispose_detached`].
    #[must_use = "a detached window must be attached or disposed"]
    pub fn detach_window(&mut self, label: &str) -> Option<FrameScheduler> {
        let scheduler = self.windows.shift_remove(label)?;
        if self.current == Some(scheduler.native_window()) {
            self.current = None;
        }
        tracing::debug!(window = label, "window detached");
        Some(scheduler)
    }

    /// Put a detached window back at the end of the rotation.
    ///
    /// A refused window comes back inside the error.
    pub fn attach_window(&mut self, scheduler: FrameScheduler) -> Result<(), AttachError> {
        if let Err(error) = self.check_owned(&scheduler) {
            return Err(AttachError { error, scheduler });
        }
        if self.windows.contains_key(scheduler.label()) {
            let error = KestrelError::DuplicateWindow(scheduler.label().to_string());
            return Err(AttachError { error, scheduler });
        }
        tracing::debug!(window = scheduler.label(), "window attached");
        self.windows.insert(scheduler.label().to_string(), scheduler);
        Ok(())
    }

    /// Dispose a detached window and destroy its native window.
    ///
    /// Only the controller that opened the window can release it.
    pub fn dispose_detached(&mut self, mut scheduler: FrameScheduler) -> Result<(), AttachError> {
        if let Err(error) = self.check_owned(&scheduler) {
            return Err(AttachError { error, scheduler });
        }
        if let Err(err) = self.platform.make_current(scheduler.native_window()) {
            tracing::warn!(window = scheduler.label(), "disposing without a current context: {err}");
        }
        scheduler.dispose(self.platform.as_mut(), &mut self.requests);
        self.release(&mut scheduler);
        Ok(())
    }

    fn check_owned(&self, scheduler: &FrameScheduler) -> Result<(), KestrelError> {
        if scheduler.owner() == self.id {
            Ok(())
        } else {
            Err(KestrelError::WindowAlreadyOwned(scheduler.label().to_string()))
        }
    }

    /// Dispose every window at the end of the next iteration.
    pub fn exit(&mut self) {
        self.requests.exit = true;
        self.wake.wake();
    }

    /// Iterate until every window is closed.
    pub fn run(&mut self) -> Result<(), KestrelError> {
        tracing::info!(windows = self.windows.len(), "window controller started");
        while !self.windows.is_empty() {
            self.iterate()?;
            self.wait_until_due();
        }
        tracing::info!("all windows closed");
        Ok(())
    }

    /// One controller iteration, without the pacing sleep.
    ///
    /// Errors are platform failures that affect every window; failures of a
    /// single window go to the error hook.
    pub fn iterate(&mut self) -> Result<(), KestrelError> {
        profiling::new_frame();
        profile_function!();

        {
            profile_scope!("poll_events");
            self.platform.poll_events()?;
        }

        for scheduler in self.windows.values_mut() {
            let now = self.clock.now();
            if !scheduler.needs_iteration(now) {
                continue;
            }

            let native = scheduler.native_window();
            if self.current != Some(native) {
                self.platform.make_current(native)?;
                self.current = Some(native);
            }

            let outcome = scheduler.step(self.platform.as_mut(), &mut self.requests, now);
            report_outcome(&mut self.error_hook, &outcome);
        }

        if std::mem::take(&mut self.requests.exit) {
            tracing::debug!(windows = self.windows.len(), "exit requested");
            for (label, scheduler) in self.windows.iter_mut() {
                if scheduler.is_disposed() {
                    continue;
                }
                self.current = Some(scheduler.native_window());
                if let Err(err) = self.platform.make_current(scheduler.native_window()) {
                    tracing::warn!(window = %label, "disposing without a current context: {err}");
                }
                scheduler.dispose(self.platform.as_mut(), &mut self.requests);
            }
            let dropped = std::mem::take(&mut self.requests.open);
            if !dropped.is_empty() {
                tracing::debug!(count = dropped.len(), "window requests dropped on exit");
            }
        }

        let disposed: Vec<String> = self
            .windows
            .iter()
            .filter(|(_, scheduler)| scheduler.is_disposed())
            .map(|(label, _)| label.clone())
            .collect();
        for label in disposed {
            if let Some(mut scheduler) = self.windows.shift_remove(&label) {
                self.release(&mut scheduler);
            }
        }

        for spec in std::mem::take(&mut self.requests.open) {
            let label = spec.label().to_string();
            if let Err(error) = self.open_window(spec) {
                let report = FailureReport::OpenWindow {
                    label: &label,
                    error: &error,
                };
                report_failure(&mut self.error_hook, &report);
            }
        }
        Ok(())
    }

    /// Sleep until the earliest window deadline, or until woken.
    ///
    /// Returns immediately when any window has work that cannot wait or runs
    /// unthrottled.
    pub fn wait_until_due(&self) {
        let Some(deadline) = self.next_deadline() else {
            return;
        };
        let now = self.clock.now();
        if deadline > now {
            profile_scope!("pacing");
            let woken = self.clock.sleep(deadline - now, &self.wake);
            tracing::trace!(slept = ?(deadline - now), woken, "controller idle");
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        let mut earliest: Option<Duration> = None;
        for scheduler in self.windows.values() {
            let deadline = scheduler.next_wake()?;
            earliest = Some(earliest.map_or(deadline, |current| current.min(deadline)));
        }
        earliest
    }

    /// Destroy a disposed window with its context current.
    fn release(&mut self, scheduler: &mut FrameScheduler) {
        let native = scheduler.native_window();
        if let Err(err) = self.platform.make_current(native) {
            tracing::warn!(window = scheduler.label(), "destroying without a current context: {err}");
        }
        scheduler.release_native(self.platform.as_mut());
        self.current = None;
    }
}

impl Drop for WindowController {
    fn drop(&mut self) {
        if self.windows.is_empty() {
            return;
        }
        tracing::debug!(windows = self.windows.len(), "disposing remaining windows");
        let windows = std::mem::take(&mut self.windows);
        for (_, mut scheduler) in windows {
            if let Err(err) = self.platform.make_current(scheduler.native_window()) {
                tracing::warn!(window = scheduler.label(), "disposing without a current context: {err}");
            }
            scheduler.dispose(self.platform.as_mut(), &mut self.requests);
            self.release(&mut scheduler);
        }
    }
}

fn report_outcome(hook: &mut Option<ErrorHook>, outcome: &StepOutcome) {
    for failure in &outcome.runnable_failures {
        report_failure(hook, &FailureReport::Runnable(failure));
    }
    if let Some(failure) = &outcome.failure {
        report_failure(hook, &FailureReport::Window(failure));
    }
}

fn report_failure(hook: &mut Option<ErrorHook>, report: &FailureReport<'_>) {
    match hook {
        Some(hook) => hook(report),
        None => tracing::error!("{report}"),
    }
}
