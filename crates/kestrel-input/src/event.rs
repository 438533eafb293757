use crate::key::{Key, MouseButton};
use crate::processor::InputProcessor;

/// What happened, in reported coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEventKind {
    KeyDown { key: Key },
    KeyUp { key: Key },
    KeyTyped { character: char },
    TouchDown { x: i32, y: i32, pointer: u32, button: MouseButton },
    TouchUp { x: i32, y: i32, pointer: u32, button: MouseButton },
    TouchDragged { x: i32, y: i32, pointer: u32 },
    MouseMoved { x: i32, y: i32 },
    Scrolled { amount_x: f32, amount_y: f32 },
}

/// A buffered input event with its monotonic timestamp in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    pub timestamp: u64,
}

impl InputEvent {
    pub const fn new(kind: InputEventKind, timestamp: u64) -> Self {
        Self { kind, timestamp }
    }

    /// Forward the event to the matching processor method.
    pub fn dispatch(&self, processor: &mut dyn InputProcessor) -> bool {
        match self.kind {
            InputEventKind::KeyDown { key } => processor.key_down(key),
            InputEventKind::KeyUp { key } => processor.key_up(key),
            InputEventKind::KeyTyped { character } => processor.key_typed(character),
            InputEventKind::TouchDown { x, y, pointer, button } => {
                processor.touch_down(x, y, pointer, button)
            }
            InputEventKind::TouchUp { x, y, pointer, button } => {
                processor.touch_up(x, y, pointer, button)
            }
            InputEventKind::TouchDragged { x, y, pointer } => processor.touch_dragged(x, y, pointer),
            InputEventKind::MouseMoved { x, y } => processor.mouse_moved(x, y),
            InputEventKind::Scrolled { amount_x, amount_y } => processor.scrolled(amount_x, amount_y),
        }
    }
}
