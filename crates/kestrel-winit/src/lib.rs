//! Kestrel Winit
//!
//! A [`Platform`](kestrel_core::native::Platform) backed by winit. The event
//! loop is pumped once per `poll_events`, so the window controller stays in
//! charge of the thread and of frame pacing.

mod app;
mod event;
pub mod keymap;
mod platform;
mod window;

pub use platform::WinitPlatform;

// Re-export winit for renderers that need the raw window
pub use winit;
