//! Kestrel Input
//!
//! The per-window input pipeline: native callbacks land in an
//! [`InputBridge`], which keeps an [`InputState`] snapshot current and buffers
//! [`InputEvent`]s in an [`InputEventQueue`] until the frame scheduler drains
//! them into the application's [`InputProcessor`].

pub mod bridge;
pub mod event;
pub mod key;
pub mod keymap;
pub mod processor;
pub mod queue;
pub mod state;
pub mod transform;

pub use bridge::{InputBridge, InputHandle, RenderRequester};
pub use event::{InputEvent, InputEventKind};
pub use key::{Key, MouseButton};
pub use keymap::key_from_native;
pub use processor::{InputMultiplexer, InputProcessor};
pub use queue::InputEventQueue;
pub use state::InputState;
pub use transform::CoordinateTransform;
