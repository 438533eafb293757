//! Immediate, pollable input state of one window.

use ahash::AHashSet;
use glam::{IVec2, Vec2};

use crate::key::{Key, MouseButton};

/// The "current" input snapshot of a window.
///
/// The input bridge mutates it on every native callback; the frame scheduler
/// calls [`InputState::prepare_next`] once per frame, after the input queue was
/// drained. Edge-triggered sets ("just pressed", "just touched") therefore stay
/// visible to polling code for exactly one full frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pointer: IVec2,
    /// Last position seen by the cursor callback, before any transform.
    logical_pointer: Vec2,
    delta: IVec2,
    scroll: Vec2,

    pressed_keys: AHashSet<Key>,
    just_pressed_keys: AHashSet<Key>,
    /// Native keys held down. Several native keys can share one logical key.
    pressed_key_count: usize,

    pressed_buttons: [bool; MouseButton::COUNT],
    just_pressed_buttons: [bool; MouseButton::COUNT],
    just_touched: bool,

    last_character: Option<char>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(&self) -> i32 {
        self.pointer.x
    }

    pub fn y(&self) -> i32 {
        self.pointer.y
    }

    /// Pointer position in reported coordinates.
    pub fn pointer(&self) -> IVec2 {
        self.pointer
    }

    /// Sum of the pointer movements since the last frame.
    pub fn delta(&self) -> IVec2 {
        self.delta
    }

    pub fn delta_x(&self) -> i32 {
        self.delta.x
    }

    pub fn delta_y(&self) -> i32 {
        self.delta.y
    }

    /// Scroll accumulated since the last frame, already negated.
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    pub fn is_any_key_pressed(&self) -> bool {
        self.pressed_key_count > 0
    }

    /// Whether any key went down this frame.
    pub fn key_just_pressed(&self) -> bool {
        !self.just_pressed_keys.is_empty()
    }

    pub fn pressed_key_count(&self) -> usize {
        self.pressed_key_count
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons[button.index()]
    }

    pub fn is_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed_buttons[button.index()]
    }

    pub fn pressed_button_count(&self) -> usize {
        self.pressed_buttons.iter().filter(|pressed| **pressed).count()
    }

    pub fn is_touched(&self) -> bool {
        self.pressed_buttons.iter().any(|pressed| *pressed)
    }

    pub fn just_touched(&self) -> bool {
        self.just_touched
    }

    pub fn last_character(&self) -> Option<char> {
        self.last_character
    }

    pub(crate) fn logical_pointer(&self) -> Vec2 {
        self.logical_pointer
    }

    /// Record a key press. Returns `true` on a rising edge.
    pub(crate) fn press_key(&mut self, key: Key) -> bool {
        self.pressed_key_count += 1;
        let rising = self.pressed_keys.insert(key);
        if rising {
            self.just_pressed_keys.insert(key);
        }
        rising
    }

    pub(crate) fn release_key(&mut self, key: Key) {
        self.pressed_key_count = self.pressed_key_count.saturating_sub(1);
        self.pressed_keys.remove(&key);
    }

    pub(crate) fn set_last_character(&mut self, character: Option<char>) {
        self.last_character = character;
    }

    /// Record a button press. Returns `true` on a rising edge.
    pub(crate) fn press_button(&mut self, button: MouseButton) -> bool {
        let slot = &mut self.pressed_buttons[button.index()];
        let rising = !*slot;
        *slot = true;
        if rising {
            self.just_pressed_buttons[button.index()] = true;
            self.just_touched = true;
        }
        rising
    }

    pub(crate) fn release_button(&mut self, button: MouseButton) {
        self.pressed_buttons[button.index()] = false;
    }

    /// Move the pointer, adding the movement to this frame's delta.
    pub(crate) fn move_pointer(&mut self, logical: Vec2, reported: IVec2, delta: IVec2) {
        self.logical_pointer = logical;
        self.pointer = reported;
        self.delta += delta;
    }

    pub(crate) fn add_scroll(&mut self, amount: Vec2) {
        self.scroll += amount;
    }

    /// End-of-frame reset: clear the edge-triggered flags and the per-frame
    /// accumulators. Held keys and buttons stay pressed.
    pub fn prepare_next(&mut self) {
        self.just_pressed_keys.clear();
        self.just_pressed_buttons = [false; MouseButton::COUNT];
        self.just_touched = false;
        self.delta = IVec2::ZERO;
        self.scroll = Vec2::ZERO;
    }

    /// Forget the edge-triggered flags without touching held state.
    pub(crate) fn clear_just_states(&mut self) {
        self.just_pressed_keys.clear();
        self.just_pressed_buttons = [false; MouseButton::COUNT];
        self.just_touched = false;
    }
}
