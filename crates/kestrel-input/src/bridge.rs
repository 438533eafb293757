//! Native input callbacks of one window.
//!
//! Each callback updates the [`InputState`] right away, so polling reflects the
//! native state with minimal latency, and appends the matching
//! [`InputEvent`] to the window's [`InputEventQueue`] for the next drain.

use std::sync::Arc;

use glam::{DVec2, IVec2, Vec2};
use kestrel_core::config::HdpiMode;
use kestrel_core::geometry::Size;
use kestrel_core::native::{ButtonAction, InputCallbacks, KeyAction, Modifiers};
use kestrel_core::{Clock, QueueError};
use parking_lot::{Mutex, RwLock};

use crate::event::{InputEvent, InputEventKind};
use crate::key::{Key, MouseButton};
use crate::keymap::key_from_native;
use crate::processor::InputProcessor;
use crate::queue::InputEventQueue;
use crate::state::InputState;
use crate::transform::CoordinateTransform;

/// Asks the owning window to render on its next iteration.
pub trait RenderRequester: Send + Sync {
    fn request_rendering(&self);
}

/// Shared pieces of a window's input pipeline.
#[derive(Clone)]
struct Shared {
    state: Arc<Mutex<InputState>>,
    queue: Arc<InputEventQueue>,
    transform: Arc<RwLock<CoordinateTransform>>,
}

/// The callback half of a window's input pipeline, registered with the
/// native layer.
pub struct InputBridge {
    shared: Shared,
    clock: Arc<dyn Clock>,
    renderer: Arc<dyn RenderRequester>,
}

impl InputBridge {
    pub fn new(
        mode: HdpiMode,
        clock: Arc<dyn Clock>,
        renderer: Arc<dyn RenderRequester>,
    ) -> (Arc<Self>, InputHandle) {
        let shared = Shared {
            state: Arc::new(Mutex::new(InputState::new())),
            queue: Arc::new(InputEventQueue::new()),
            transform: Arc::new(RwLock::new(CoordinateTransform::new(
                mode,
                Size::new(1, 1),
                Size::new(1, 1),
            ))),
        };
        let handle = InputHandle {
            shared: shared.clone(),
        };
        let bridge = Arc::new(Self {
            shared,
            clock,
            renderer,
        });
        (bridge, handle)
    }

    fn push(&self, kind: InputEventKind) {
        self.shared
            .queue
            .push(InputEvent::new(kind, self.clock.now_nanos()));
    }

    fn push_character(&self, state: &mut InputState, character: char) {
        state.set_last_character(Some(character));
        self.push(InputEventKind::KeyTyped { character });
    }
}

impl InputCallbacks for InputBridge {
    fn key(&self, native_key: i32, _scancode: i32, action: KeyAction, _mods: Modifiers) {
        let key = key_from_native(native_key);
        let mut state = self.shared.state.lock();
        match action {
            KeyAction::Press => {
                state.press_key(key);
                state.set_last_character(None);
                self.push(InputEventKind::KeyDown { key });
                if let Some(character) = key.synthetic_character() {
                    self.push_character(&mut state, character);
                }
            }
            KeyAction::Release => {
                state.release_key(key);
                self.push(InputEventKind::KeyUp { key });
            }
            KeyAction::Repeat => {
                if let Some(character) = state.last_character() {
                    self.push(InputEventKind::KeyTyped { character });
                }
            }
        }
        drop(state);
        self.renderer.request_rendering();
    }

    fn character(&self, codepoint: u32) {
        // Function-key pseudo characters from the private use area.
        if codepoint & 0xff00 == 0xf700 {
            return;
        }
        let Some(character) = char::from_u32(codepoint) else {
            tracing::warn!(codepoint, "dropping invalid character code point");
            return;
        };
        let mut state = self.shared.state.lock();
        self.push_character(&mut state, character);
        drop(state);
        self.renderer.request_rendering();
    }

    fn scroll(&self, x: f64, y: f64) {
        let amount = Vec2::new(-x as f32, -y as f32);
        self.shared.state.lock().add_scroll(amount);
        self.push(InputEventKind::Scrolled {
            amount_x: amount.x,
            amount_y: amount.y,
        });
        self.renderer.request_rendering();
    }

    fn cursor_position(&self, x: f64, y: f64) {
        let native = DVec2::new(x, y);
        let transform = *self.shared.transform.read();
        let mut state = self.shared.state.lock();

        let previous = state.logical_pointer().as_ivec2();
        let logical = native.trunc().as_ivec2();
        let delta = transform.delta_to_reported(logical - previous);
        let reported = transform.to_reported(native);
        state.move_pointer(logical.as_vec2(), reported, delta);

        let kind = if state.is_touched() {
            InputEventKind::TouchDragged {
                x: reported.x,
                y: reported.y,
                pointer: 0,
            }
        } else {
            InputEventKind::MouseMoved {
                x: reported.x,
                y: reported.y,
            }
        };
        self.push(kind);
        drop(state);
        self.renderer.request_rendering();
    }

    fn mouse_button(&self, button: i32, action: ButtonAction, _mods: Modifiers) {
        let Some(button) = MouseButton::from_native(button) else {
            tracing::trace!(button, "ignoring untracked mouse button");
            return;
        };
        let mut state = self.shared.state.lock();
        let IVec2 { x, y } = state.pointer();
        match action {
            ButtonAction::Press => {
                state.press_button(button);
                self.push(InputEventKind::TouchDown {
                    x,
                    y,
                    pointer: 0,
                    button,
                });
            }
            ButtonAction::Release => {
                state.release_button(button);
                self.push(InputEventKind::TouchUp {
                    x,
                    y,
                    pointer: 0,
                    button,
                });
            }
        }
        drop(state);
        self.renderer.request_rendering();
    }
}

/// Render-thread view of a window's input: polling, draining and transform
/// updates.
#[derive(Clone)]
pub struct InputHandle {
    shared: Shared,
}

impl InputHandle {
    /// A copy of the current snapshot.
    ///
    /// Use the single-value accessors below when only one value is needed;
    /// they avoid the copy.
    pub fn state(&self) -> InputState {
        self.shared.state.lock().clone()
    }

    fn with_state<T>(&self, f: impl FnOnce(&InputState) -> T) -> T {
        f(&*self.shared.state.lock())
    }

    pub fn x(&self) -> i32 {
        self.with_state(InputState::x)
    }

    pub fn y(&self) -> i32 {
        self.with_state(InputState::y)
    }

    pub fn delta_x(&self) -> i32 {
        self.with_state(InputState::delta_x)
    }

    pub fn delta_y(&self) -> i32 {
        self.with_state(InputState::delta_y)
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.with_state(|state| state.is_key_pressed(key))
    }

    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.with_state(|state| state.is_key_just_pressed(key))
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.with_state(|state| state.is_button_pressed(button))
    }

    pub fn is_touched(&self) -> bool {
        self.with_state(InputState::is_touched)
    }

    pub fn just_touched(&self) -> bool {
        self.with_state(InputState::just_touched)
    }

    pub fn is_any_key_pressed(&self) -> bool {
        self.with_state(InputState::is_any_key_pressed)
    }

    pub fn queue(&self) -> &Arc<InputEventQueue> {
        &self.shared.queue
    }

    /// Timestamp, in nanoseconds, of the event being replayed.
    pub fn current_event_time(&self) -> u64 {
        self.shared.queue.current_event_time()
    }

    pub fn transform(&self) -> CoordinateTransform {
        *self.shared.transform.read()
    }

    pub fn set_sizes(&self, logical: Size<u32>, backbuffer: Size<u32>) {
        self.shared.transform.write().set_sizes(logical, backbuffer);
    }

    /// Replay buffered events into `processor`, then reset the per-frame state.
    pub fn drain(&self, processor: Option<&mut dyn InputProcessor>) -> Result<usize, QueueError> {
        let count = self.shared.queue.drain(processor)?;
        self.shared.state.lock().prepare_next();
        Ok(count)
    }

    /// Drop edge-triggered flags and any buffered events.
    ///
    /// Used when callbacks are (re)bound to a native window.
    pub fn reset_polling_states(&self) -> Result<(), QueueError> {
        self.shared.state.lock().clear_just_states();
        self.shared.queue.drain(None)?;
        Ok(())
    }

    /// Native logical position for a reported position.
    pub fn to_native(&self, reported: IVec2) -> DVec2 {
        self.shared.transform.read().to_native(reported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use kestrel_core::WakeSignal;

    use crate::keymap::native;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> Duration {
            Duration::from_nanos(42)
        }

        fn sleep(&self, _duration: Duration, _wake: &WakeSignal) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct CountRequests(AtomicUsize);

    impl RenderRequester for CountRequests {
        fn request_rendering(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct Record(Vec<InputEventKind>);

    impl InputProcessor for Record {
        fn key_down(&mut self, key: Key) -> bool {
            self.0.push(InputEventKind::KeyDown { key });
            true
        }
        fn key_up(&mut self, key: Key) -> bool {
            self.0.push(InputEventKind::KeyUp { key });
            true
        }
        fn key_typed(&mut self, character: char) -> bool {
            self.0.push(InputEventKind::KeyTyped { character });
            true
        }
        fn touch_down(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
            self.0.push(InputEventKind::TouchDown { x, y, pointer, button });
            true
        }
        fn touch_up(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
            self.0.push(InputEventKind::TouchUp { x, y, pointer, button });
            true
        }
        fn touch_dragged(&mut self, x: i32, y: i32, pointer: u32) -> bool {
            self.0.push(InputEventKind::TouchDragged { x, y, pointer });
            true
        }
        fn mouse_moved(&mut self, x: i32, y: i32) -> bool {
            self.0.push(InputEventKind::MouseMoved { x, y });
            true
        }
        fn scrolled(&mut self, amount_x: f32, amount_y: f32) -> bool {
            self.0.push(InputEventKind::Scrolled { amount_x, amount_y });
            true
        }
    }

    fn bridge(mode: HdpiMode) -> (Arc<InputBridge>, InputHandle, Arc<CountRequests>) {
        let requests = Arc::new(CountRequests::default());
        let (bridge, handle) = InputBridge::new(mode, Arc::new(FixedClock), requests.clone());
        (bridge, handle, requests)
    }

    fn drain(handle: &InputHandle) -> Vec<InputEventKind> {
        let mut record = Record::default();
        handle.drain(Some(&mut record)).unwrap();
        record.0
    }

    #[test]
    fn test_both_super_keys_count_as_held() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.key(native::LEFT_SUPER, 0, KeyAction::Press, Modifiers::SUPER);
        bridge.key(native::RIGHT_SUPER, 0, KeyAction::Press, Modifiers::SUPER);
        bridge.key(native::LEFT_SUPER, 0, KeyAction::Release, Modifiers::SUPER);

        assert!(handle.is_any_key_pressed());
        assert_eq!(handle.state().pressed_key_count(), 1);
        assert_eq!(
            drain(&handle),
            vec![
                InputEventKind::KeyDown { key: Key::Sym },
                InputEventKind::KeyDown { key: Key::Sym },
                InputEventKind::KeyUp { key: Key::Sym },
            ]
        );

        bridge.key(native::RIGHT_SUPER, 0, KeyAction::Release, Modifiers::empty());
        assert!(!handle.is_any_key_pressed());
    }

    #[test]
    fn test_snapshot_does_not_hold_the_lock() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.key(native::A, 0, KeyAction::Press, Modifiers::empty());
        let state = handle.state();
        // Would deadlock if the snapshot were a guard on the live state.
        assert_eq!(state.is_key_pressed(Key::A), handle.is_key_pressed(Key::A));
        bridge.key(native::A, 0, KeyAction::Release, Modifiers::empty());
        assert!(state.is_key_pressed(Key::A));
        assert!(!handle.is_key_pressed(Key::A));
    }

    #[test]
    fn test_enter_synthesizes_newline_and_repeats_it() {
        let (bridge, handle, requests) = bridge(HdpiMode::Logical);
        bridge.key(native::ENTER, 0, KeyAction::Press, Modifiers::empty());
        bridge.key(native::ENTER, 0, KeyAction::Repeat, Modifiers::empty());
        bridge.key(native::ENTER, 0, KeyAction::Release, Modifiers::empty());

        assert_eq!(
            drain(&handle),
            vec![
                InputEventKind::KeyDown { key: Key::Enter },
                InputEventKind::KeyTyped { character: '\n' },
                InputEventKind::KeyTyped { character: '\n' },
                InputEventKind::KeyUp { key: Key::Enter },
            ]
        );
        assert_eq!(requests.0.load(Ordering::SeqCst), 3);
        assert_eq!(handle.current_event_time(), 42);
    }

    #[test]
    fn test_repeat_does_not_touch_press_state() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.key(native::A, 0, KeyAction::Press, Modifiers::empty());
        bridge.character('a' as u32);
        drain(&handle);

        bridge.key(native::A, 0, KeyAction::Repeat, Modifiers::empty());
        assert!(handle.is_key_pressed(Key::A));
        assert!(!handle.is_key_just_pressed(Key::A));
        assert_eq!(drain(&handle), vec![InputEventKind::KeyTyped { character: 'a' }]);
    }

    #[test]
    fn test_press_clears_last_character() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.character('q' as u32);
        bridge.key(native::LEFT_SHIFT, 0, KeyAction::Press, Modifiers::empty());
        bridge.key(native::LEFT_SHIFT, 0, KeyAction::Repeat, Modifiers::empty());
        assert_eq!(
            drain(&handle),
            vec![
                InputEventKind::KeyTyped { character: 'q' },
                InputEventKind::KeyDown { key: Key::ShiftLeft },
            ]
        );
    }

    #[test]
    fn test_private_use_characters_are_dropped() {
        let (bridge, handle, requests) = bridge(HdpiMode::Logical);
        bridge.character(0xf704);
        assert!(drain(&handle).is_empty());
        assert_eq!(requests.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scroll_is_negated() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.scroll(0.0, 1.0);
        assert_eq!(handle.state().scroll(), Vec2::new(0.0, -1.0));
        assert_eq!(
            drain(&handle),
            vec![InputEventKind::Scrolled { amount_x: 0.0, amount_y: -1.0 }]
        );
        assert_eq!(handle.state().scroll(), Vec2::ZERO);
    }

    #[test]
    fn test_drag_versus_move() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.cursor_position(10.0, 10.0);
        bridge.mouse_button(0, ButtonAction::Press, Modifiers::empty());
        bridge.cursor_position(12.0, 11.0);
        bridge.mouse_button(0, ButtonAction::Release, Modifiers::empty());

        assert_eq!(
            drain(&handle),
            vec![
                InputEventKind::MouseMoved { x: 10, y: 10 },
                InputEventKind::TouchDown { x: 10, y: 10, pointer: 0, button: MouseButton::Left },
                InputEventKind::TouchDragged { x: 12, y: 11, pointer: 0 },
                InputEventKind::TouchUp { x: 12, y: 11, pointer: 0, button: MouseButton::Left },
            ]
        );
    }

    #[test]
    fn test_untracked_button_is_ignored() {
        let (bridge, handle, requests) = bridge(HdpiMode::Logical);
        bridge.mouse_button(7, ButtonAction::Press, Modifiers::empty());
        assert!(!handle.is_touched());
        assert!(drain(&handle).is_empty());
        assert_eq!(requests.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_delta_is_sum_of_moves_and_reset_by_drain() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.cursor_position(0.0, 0.0);
        drain(&handle);

        bridge.cursor_position(4.0, 1.0);
        bridge.cursor_position(6.5, -2.0);
        assert_eq!(handle.delta_x(), 6);
        assert_eq!(handle.delta_y(), -2);

        drain(&handle);
        assert_eq!(handle.delta_x(), 0);
        assert_eq!(handle.delta_y(), 0);
    }

    #[test]
    fn test_pixels_mode_reports_backbuffer_coordinates() {
        let (bridge, handle, _) = bridge(HdpiMode::Pixels);
        handle.set_sizes(Size::new(640, 480), Size::new(1280, 960));
        bridge.cursor_position(100.0, 100.0);
        bridge.mouse_button(1, ButtonAction::Press, Modifiers::empty());

        assert_eq!(handle.x(), 200);
        assert_eq!(handle.y(), 200);
        assert_eq!(
            drain(&handle),
            vec![
                InputEventKind::MouseMoved { x: 200, y: 200 },
                InputEventKind::TouchDown { x: 200, y: 200, pointer: 0, button: MouseButton::Right },
            ]
        );
        assert_eq!(handle.to_native(IVec2::new(200, 200)), DVec2::new(100.0, 100.0));
    }

    #[test]
    fn test_reset_polling_states() {
        let (bridge, handle, _) = bridge(HdpiMode::Logical);
        bridge.key(native::A, 0, KeyAction::Press, Modifiers::empty());
        handle.reset_polling_states().unwrap();

        assert!(handle.is_key_pressed(Key::A));
        assert!(!handle.is_key_just_pressed(Key::A));
        assert!(handle.queue().is_empty());
    }
}
