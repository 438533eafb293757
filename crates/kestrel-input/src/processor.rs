//! Sinks for drained input events.

use crate::key::{Key, MouseButton};

/// Receives input events replayed from an [`InputEventQueue`](crate::InputEventQueue).
///
/// Every method returns whether the event was handled. The queue itself
/// ignores the value; it only matters to composite processors such as
/// [`InputMultiplexer`].
#[allow(unused_variables)]
pub trait InputProcessor {
    fn key_down(&mut self, key: Key) -> bool {
        false
    }

    fn key_up(&mut self, key: Key) -> bool {
        false
    }

    fn key_typed(&mut self, character: char) -> bool {
        false
    }

    fn touch_down(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
        false
    }

    fn touch_up(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
        false
    }

    fn touch_dragged(&mut self, x: i32, y: i32, pointer: u32) -> bool {
        false
    }

    fn mouse_moved(&mut self, x: i32, y: i32) -> bool {
        false
    }

    fn scrolled(&mut self, amount_x: f32, amount_y: f32) -> bool {
        false
    }
}

/// Forwards each event to its processors in order, stopping at the first one
/// that handles it.
#[derive(Default)]
pub struct InputMultiplexer {
    processors: Vec<Box<dyn InputProcessor>>,
}

impl InputMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processor(&mut self, processor: impl InputProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    pub fn insert_processor(&mut self, index: usize, processor: impl InputProcessor + 'static) {
        self.processors.insert(index, Box::new(processor));
    }

    pub fn remove_processor(&mut self, index: usize) -> Option<Box<dyn InputProcessor>> {
        (index < self.processors.len()).then(|| self.processors.remove(index))
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn clear(&mut self) {
        self.processors.clear();
    }

    fn forward(&mut self, mut f: impl FnMut(&mut dyn InputProcessor) -> bool) -> bool {
        self.processors.iter_mut().any(|processor| f(processor.as_mut()))
    }
}

impl InputProcessor for InputMultiplexer {
    fn key_down(&mut self, key: Key) -> bool {
        self.forward(|p| p.key_down(key))
    }

    fn key_up(&mut self, key: Key) -> bool {
        self.forward(|p| p.key_up(key))
    }

    fn key_typed(&mut self, character: char) -> bool {
        self.forward(|p| p.key_typed(character))
    }

    fn touch_down(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
        self.forward(|p| p.touch_down(x, y, pointer, button))
    }

    fn touch_up(&mut self, x: i32, y: i32, pointer: u32, button: MouseButton) -> bool {
        self.forward(|p| p.touch_up(x, y, pointer, button))
    }

    fn touch_dragged(&mut self, x: i32, y: i32, pointer: u32) -> bool {
        self.forward(|p| p.touch_dragged(x, y, pointer))
    }

    fn mouse_moved(&mut self, x: i32, y: i32) -> bool {
        self.forward(|p| p.mouse_moved(x, y))
    }

    fn scrolled(&mut self, amount_x: f32, amount_y: f32) -> bool {
        self.forward(|p| p.scrolled(amount_x, amount_y))
    }
}
