//! Lifecycle edges, failures and teardown of a single window.

mod common;

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use common::{Call, Harness, Journal, Reported, TestApp, window_at};
use kestrel::prelude::*;
use kestrel::{BackendHooks, ListenerStage};
use kestrel_core::geometry::Size;
use kestrel_core::native::NativeWindowId;
use kestrel_test_utils::{MockCall, MockEvent, MockPlatform};

#[test]
fn test_create_resize_then_render() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    harness.open("main", window_at(60).with_size(800, 600), TestApp::new(&journal));

    harness.step();

    assert_eq!(journal.lifecycle(), vec![Call::Create, Call::Resize(800, 600)]);
    assert_eq!(journal.render_count(), 1);
    assert_eq!(
        harness.controller.window("main").unwrap().lifecycle(),
        Lifecycle::Running
    );
}

#[test]
fn test_window_is_uninitialized_until_first_iteration() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    harness.open("main", window_at(60), TestApp::new(&journal));

    assert_eq!(
        harness.controller.window("main").unwrap().lifecycle(),
        Lifecycle::Uninitialized
    );
    assert!(journal.calls().is_empty());
}

#[test]
fn test_native_resize_calls_resize_before_render() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    harness.open("main", window_at(60), TestApp::new(&journal));
    harness.step();

    let native = harness.native("main");
    harness.platform.queue_event(native, MockEvent::WindowResized(1024, 768));
    harness.platform.queue_event(native, MockEvent::FramebufferResized(1024, 768));
    harness.step();

    let calls = journal.calls();
    let resize = calls.iter().position(|c| *c == Call::Resize(1024, 768)).unwrap();
    assert!(matches!(calls[resize + 1], Call::Render(_)));
    let graphics = harness.controller.window("main").unwrap().frame_time();
    assert_eq!(graphics.logical_size(), Size::new(1024, 768));
}

#[test]
fn test_render_error_disposes_window_once() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let mut frames = 0;
    let app = TestApp::new(&journal).on_render(move |_| {
        frames += 1;
        if frames == 3 {
            anyhow::bail!("lost the device");
        }
        Ok(())
    });
    harness.open("main", window_at(60), app);
    let native = harness.native("main");

    harness.steps(10);

    assert_eq!(journal.render_count(), 3);
    assert_eq!(journal.count(Call::Pause), 1);
    assert_eq!(journal.count(Call::Dispose), 1);
    assert!(harness.controller.is_empty());
    assert!(!harness.platform.is_alive(native));
    assert_eq!(
        harness.reports(),
        vec![Reported::Window {
            window: "main".to_string(),
            stage: ListenerStage::Render,
            message: "lost the device".to_string(),
        }]
    );
}

#[test]
fn test_render_panic_is_a_window_failure() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let app = TestApp::new(&journal).on_render(|_| panic!("index out of bounds"));
    harness.open("main", window_at(60), app);

    harness.step();

    assert_eq!(journal.count(Call::Pause), 1);
    assert_eq!(journal.count(Call::Dispose), 1);
    assert!(harness.controller.is_empty());
    match &harness.reports()[..] {
        [Reported::Window { stage, message, .. }] => {
            assert_eq!(*stage, ListenerStage::Render);
            assert!(message.contains("panicked: index out of bounds"), "{message}");
        }
        other => panic!("unexpected reports: {other:?}"),
    }
}

#[test]
fn test_create_failure_still_disposes() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let app = TestApp::new(&journal).on_create(|_| Err(anyhow::anyhow!("missing shader")));
    harness.open("main", window_at(60), app);

    harness.step();

    assert_eq!(journal.lifecycle(), vec![Call::Create, Call::Pause, Call::Dispose]);
    assert_eq!(journal.render_count(), 0);
    assert!(harness.controller.is_empty());
}

#[test]
fn test_pause_failure_skips_second_pause() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let app = TestApp::new(&journal).on_pause(|_| Err(anyhow::anyhow!("save failed")));
    harness.open("main", window_at(60), app);
    harness.step();

    let native = harness.native("main");
    harness.platform.queue_event(native, MockEvent::Iconify(true));
    harness.step();

    assert_eq!(journal.count(Call::Pause), 1);
    assert_eq!(journal.count(Call::Dispose), 1);
    assert!(matches!(
        &harness.reports()[..],
        [Reported::Window { stage: ListenerStage::Pause, .. }]
    ));
}

#[test]
fn test_dispose_failure_is_reported_once() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let app = TestApp::new(&journal).on_dispose(|_| Err(anyhow::anyhow!("leak")));
    let handle = harness.open("main", window_at(60), app);
    harness.step();

    handle.close();
    harness.step();

    // A failing dispose during an orderly close is only logged.
    assert_eq!(journal.count(Call::Dispose), 1);
    assert!(harness.controller.is_empty());
    assert!(harness.reports().is_empty());
}

#[test]
fn test_close_from_handle_disposes_and_destroys() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let handle = harness.open("main", window_at(60), TestApp::new(&journal));
    harness.step();
    let native = harness.native("main");

    assert!(!handle.is_closing());
    handle.close();
    assert!(handle.is_closing());
    harness.step();

    assert_eq!(journal.count(Call::Pause), 1);
    assert_eq!(journal.count(Call::Dispose), 1);
    assert!(harness.controller.is_empty());
    assert!(!harness.platform.is_alive(native));
    assert!(!harness.platform.has_callbacks(native));
}

#[test]
fn test_close_from_paused_window_skips_pause() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let handle = harness.open("main", window_at(60), TestApp::new(&journal));
    harness.step();

    let native = harness.native("main");
    harness.platform.queue_event(native, MockEvent::Iconify(true));
    harness.step();
    handle.close();
    harness.step();

    assert_eq!(journal.count(Call::Pause), 1);
    assert_eq!(journal.count(Call::Dispose), 1);
}

#[derive(Clone, Default)]
struct CloseGuard {
    allow: Rc<Cell<bool>>,
    asked: Rc<Cell<u32>>,
    dropped: Rc<std::cell::RefCell<Vec<PathBuf>>>,
}

impl WindowListener for CloseGuard {
    fn close_requested(&mut self) -> bool {
        self.asked.set(self.asked.get() + 1);
        self.allow.get()
    }

    fn files_dropped(&mut self, paths: &[PathBuf]) {
        self.dropped.borrow_mut().extend_from_slice(paths);
    }
}

#[test]
fn test_window_listener_can_cancel_close() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let guard = CloseGuard::default();
    let spec = WindowSpec::new("main", window_at(60), TestApp::new(&journal))
        .with_window_listener(guard.clone());
    harness.controller.open_window(spec).unwrap();
    harness.step();

    let native = harness.native("main");
    harness.platform.queue_event(native, MockEvent::CloseRequested);
    harness.step();

    assert_eq!(guard.asked.get(), 1);
    assert_eq!(harness.controller.len(), 1);
    assert_eq!(journal.count(Call::Dispose), 0);

    guard.allow.set(true);
    harness.platform.queue_event(native, MockEvent::CloseRequested);
    harness.step();

    assert_eq!(guard.asked.get(), 2);
    assert!(harness.controller.is_empty());
    assert_eq!(journal.count(Call::Dispose), 1);
}

#[test]
fn test_files_dropped_reach_window_listener() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let guard = CloseGuard::default();
    let spec = WindowSpec::new("main", window_at(60), TestApp::new(&journal))
        .with_window_listener(guard.clone());
    harness.controller.open_window(spec).unwrap();
    harness.step();

    let native = harness.native("main");
    let paths = vec![PathBuf::from("level1.map"), PathBuf::from("level2.map")];
    harness.platform.queue_event(native, MockEvent::FilesDropped(paths.clone()));
    harness.step();

    assert_eq!(*guard.dropped.borrow(), paths);
}

#[derive(Clone, Default)]
struct TitleHooks {
    started: Rc<Cell<bool>>,
    titles: Rc<std::cell::RefCell<Vec<String>>>,
}

impl BackendHooks for TitleHooks {
    fn on_start(&mut self, _window: NativeWindowId) {
        self.started.set(true);
    }

    fn on_title_changed(&mut self, _window: NativeWindowId, title: &str) {
        self.titles.borrow_mut().push(title.to_string());
    }
}

#[test]
fn test_set_title_reaches_platform_and_hooks() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let hooks = TitleHooks::default();
    let app = TestApp::new(&journal).on_create(|ctx| {
        ctx.set_title("Level 1");
        Ok(())
    });
    let spec = WindowSpec::new("main", window_at(60), app).with_hooks(hooks.clone());
    harness.controller.open_window(spec).unwrap();
    harness.step();

    let native = harness.native("main");
    assert!(hooks.started.get());
    assert_eq!(*hooks.titles.borrow(), vec!["Level 1".to_string()]);
    assert_eq!(harness.platform.title(native).as_deref(), Some("Level 1"));
    assert_eq!(harness.controller.window("main").unwrap().config().title, "Level 1");
}

#[test]
fn test_exit_disposes_every_window() {
    let mut harness = Harness::new();
    let first = Journal::new();
    let second = Journal::new();
    let mut frames = 0;
    let app = TestApp::new(&first).on_render(move |ctx| {
        frames += 1;
        if frames == 3 {
            ctx.exit();
        }
        Ok(())
    });
    harness.open("first", window_at(60), app);
    harness.open("second", window_at(60), TestApp::new(&second));

    harness.controller.run().unwrap();

    for journal in [&first, &second] {
        assert_eq!(journal.count(Call::Pause), 1);
        assert_eq!(journal.count(Call::Dispose), 1);
    }
    assert!(harness.platform.windows().is_empty());
}

#[test]
fn test_creation_failure_registers_nothing() {
    let platform = MockPlatform::new();
    platform.fail_next_create("no suitable pixel format");
    let mut harness = Harness::with_platform(platform, ApplicationConfig::default());
    let journal = Journal::new();

    let err = harness
        .controller
        .open_window(WindowSpec::new("main", window_at(60), TestApp::new(&journal)))
        .unwrap_err();

    assert!(matches!(err, KestrelError::Platform(_)));
    assert!(err.to_string().contains("no suitable pixel format"));
    assert!(harness.controller.is_empty());
    assert!(harness.platform.windows().is_empty());
    assert!(journal.calls().is_empty());
}

#[test]
fn test_dropping_controller_disposes_windows() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    harness.open("main", window_at(60), TestApp::new(&journal));
    harness.step();
    let platform = harness.platform.clone();

    drop(harness);

    assert_eq!(journal.count(Call::Dispose), 1);
    assert!(platform.windows().is_empty());
}

#[test]
fn test_window_dropped_before_first_iteration_gets_no_callbacks() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    harness.open("main", window_at(60), TestApp::new(&journal));
    let platform = harness.platform.clone();

    drop(harness);

    assert!(journal.lifecycle().is_empty());
    assert!(platform.windows().is_empty());
}

#[test]
fn test_swap_interval_follows_vsync() {
    let mut harness = Harness::new();
    let journal = Journal::new();
    let mut config = window_at(60);
    config.vsync = false;
    harness.open("main", config, TestApp::new(&journal));
    harness.step();

    assert_eq!(
        harness.platform.count_calls(|call| *call == MockCall::SetSwapInterval(0)),
        1
    );
}
