//! Shared fixtures for the scenario tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;
use kestrel::{ListenerStage, WindowController};
use kestrel_core::native::NativeWindowId;
use kestrel_test_utils::{ManualClock, MockPlatform};

/// Lifecycle callbacks as the application saw them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Create,
    Resize(u32, u32),
    Render(Duration),
    Pause,
    Resume,
    Dispose,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.0.borrow().iter().filter(|c| **c == call).count()
    }

    /// Clock time of every render, in order.
    pub fn renders(&self) -> Vec<Duration> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Render(at) => Some(*at),
                _ => None,
            })
            .collect()
    }

    pub fn render_count(&self) -> usize {
        self.renders().len()
    }

    /// Everything except renders.
    pub fn lifecycle(&self) -> Vec<Call> {
        self.0
            .borrow()
            .iter()
            .copied()
            .filter(|call| !matches!(call, Call::Render(_)))
            .collect()
    }
}

type Hook = Box<dyn FnMut(&mut WindowContext<'_>) -> anyhow::Result<()>>;

/// An application that journals its callbacks and runs optional hooks.
pub struct TestApp {
    journal: Journal,
    on_create: Option<Hook>,
    on_render: Option<Hook>,
    on_pause: Option<Hook>,
    on_dispose: Option<Hook>,
}

impl TestApp {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            on_create: None,
            on_render: None,
            on_pause: None,
            on_dispose: None,
        }
    }

    pub fn on_create(
        mut self,
        hook: impl FnMut(&mut WindowContext<'_>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_create = Some(Box::new(hook));
        self
    }

    pub fn on_render(
        mut self,
        hook: impl FnMut(&mut WindowContext<'_>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_render = Some(Box::new(hook));
        self
    }

    pub fn on_pause(
        mut self,
        hook: impl FnMut(&mut WindowContext<'_>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_pause = Some(Box::new(hook));
        self
    }

    pub fn on_dispose(
        mut self,
        hook: impl FnMut(&mut WindowContext<'_>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.on_dispose = Some(Box::new(hook));
        self
    }
}

fn run_hook(hook: &mut Option<Hook>, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
    match hook {
        Some(hook) => hook(ctx),
        None => Ok(()),
    }
}

impl ApplicationListener for TestApp {
    fn create(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        self.journal.push(Call::Create);
        run_hook(&mut self.on_create, ctx)
    }

    fn resize(&mut self, _ctx: &mut WindowContext<'_>, width: u32, height: u32) -> anyhow::Result<()> {
        self.journal.push(Call::Resize(width, height));
        Ok(())
    }

    fn render(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        self.journal.push(Call::Render(ctx.graphics().now()));
        run_hook(&mut self.on_render, ctx)
    }

    fn pause(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        self.journal.push(Call::Pause);
        run_hook(&mut self.on_pause, ctx)
    }

    fn resume(&mut self, _ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        self.journal.push(Call::Resume);
        Ok(())
    }

    fn dispose(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        self.journal.push(Call::Dispose);
        run_hook(&mut self.on_dispose, ctx)
    }
}

/// Input events drained into a window's processor.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<InputEventKind>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<InputEventKind> {
        self.0.borrow().clone()
    }

    fn record(&self, kind: InputEventKind) -> bool {
        self.0.borrow_mut().push(kind);
        true
    }
}

impl InputProcessor for EventLog {
    fn key_down(&mut self, key: Key) -> bool {
        self.record(InputEventKind::KeyDown { key })
    }

    fn key_up(&mut self, key: Key) -> bool {
        self.record(InputEventKind::KeyUp { key })
    }

    fn key_typed(&mut self, character: char) -> bool {
        self.record(InputEventKind::KeyTyped { character })
    }

    fn touch_down(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
        self.record(InputEventKind::TouchDown { x, y, pointer, button })
    }

    fn touch_up(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
        self.record(InputEventKind::TouchUp { x, y, pointer, button })
    }

    fn touch_dragged(&mut self, x: i32, y: i32, pointer: u32) -> bool {
        self.record(InputEventKind::TouchDragged { x, y, pointer })
    }

    fn mouse_moved(&mut self, x: i32, y: i32) -> bool {
        self.record(InputEventKind::MouseMoved { x, y })
    }

    fn scrolled(&mut self, amount_x: f32, amount_y: f32) -> bool {
        self.record(InputEventKind::Scrolled { amount_x, amount_y })
    }
}

/// A failure as received by the error hook.
#[derive(Debug, Clone, PartialEq)]
pub enum Reported {
    Window {
        window: String,
        stage: ListenerStage,
        message: String,
    },
    Runnable {
        window: String,
        index: usize,
        message: String,
    },
    OpenWindow {
        label: String,
    },
}

/// A controller over a mock platform and a manual clock.
pub struct Harness {
    pub platform: MockPlatform,
    pub clock: ManualClock,
    pub controller: WindowController,
    pub reports: Rc<RefCell<Vec<Reported>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ApplicationConfig::default())
    }

    pub fn with_config(config: ApplicationConfig) -> Self {
        Self::with_platform(MockPlatform::new(), config)
    }

    pub fn with_platform(platform: MockPlatform, config: ApplicationConfig) -> Self {
        let clock = ManualClock::new();
        let mut controller =
            WindowController::with_clock(platform.clone(), config, Arc::new(clock.clone()));

        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        controller.set_error_hook(move |report| {
            let reported = match report {
                FailureReport::Window(failure) => Reported::Window {
                    window: failure.window.clone(),
                    stage: failure.stage,
                    message: format!("{:#}", failure.error),
                },
                FailureReport::Runnable(failure) => Reported::Runnable {
                    window: failure.window.clone(),
                    index: failure.index,
                    message: failure.message.clone(),
                },
                FailureReport::OpenWindow { label, .. } => Reported::OpenWindow {
                    label: label.to_string(),
                },
            };
            sink.borrow_mut().push(reported);
        });

        Self {
            platform,
            clock,
            controller,
            reports,
        }
    }

    pub fn open(&mut self, label: &str, config: WindowConfig, app: TestApp) -> WindowHandle {
        self.controller
            .open_window(WindowSpec::new(label, config, app))
            .unwrap()
    }

    pub fn native(&self, label: &str) -> NativeWindowId {
        self.controller.window(label).unwrap().native_window()
    }

    /// One controller iteration followed by its pacing sleep.
    pub fn step(&mut self) {
        self.controller.iterate().unwrap();
        self.controller.wait_until_due();
    }

    pub fn steps(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Step until the clock reaches `until` or every window is gone.
    pub fn run_until(&mut self, until: Duration) {
        while self.clock_now() < until && !self.controller.is_empty() {
            self.step();
        }
    }

    pub fn clock_now(&self) -> Duration {
        use kestrel_core::Clock;
        self.clock.now()
    }

    pub fn reports(&self) -> Vec<Reported> {
        self.reports.borrow().clone()
    }
}

/// A window config with a fixed foreground rate and everything else default.
pub fn window_at(fps: i32) -> WindowConfig {
    WindowConfig {
        foreground_fps: fps,
        background_fps: fps,
        ..WindowConfig::default()
    }
}
