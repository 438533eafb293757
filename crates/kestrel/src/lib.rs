//! Kestrel - desktop windowing and input runtime
//!
//! Kestrel runs one or more application windows on a single thread. Each
//! window is driven by a frame scheduler that:
//!
//! - **Runs posted work**: closures posted from any thread execute on the
//!   render thread before the next frame
//! - **Paces frames**: foreground, background and hidden frame-rate targets
//! - **Tracks lifecycle**: `create`, `resize`, `render`, `pause`, `resume`
//!   and `dispose` run in a fixed order, exactly once where it matters
//! - **Buffers input**: native callbacks are queued and replayed into the
//!   application's input processor once per frame
//!
//! A [`WindowController`] owns the native platform, polls it once per
//! iteration and steps every window that is due.
//!
//! # Quick Start
//!
//! ```ignore
//! use kestrel::prelude::*;
//!
//! struct Game;
//!
//! impl ApplicationListener for Game {
//!     fn create(&mut self, _ctx: &mut WindowContext) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn render(&mut self, ctx: &mut WindowContext) -> anyhow::Result<()> {
//!         if ctx.input().is_key_just_pressed(Key::Escape) {
//!             ctx.exit();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     kestrel::core::logging::init();
//!     kestrel::run_application(ApplicationConfig::default(), Game)?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod controller;
pub mod error;
pub mod limiter;
pub mod listener;
pub mod runnable;
pub mod scheduler;
pub mod time;

// Re-export sub-crates
pub use kestrel_core as core;
pub use kestrel_input as input;

#[cfg(feature = "winit")]
pub use kestrel_winit as winit;

pub use context::{WindowContext, WindowHandle, WindowSpec};
pub use controller::WindowController;
pub use error::{AttachError, FailureReport, KestrelError, ListenerStage, RunnableFailure, WindowFailure};
pub use limiter::FrameLimiter;
pub use listener::{ApplicationListener, BackendHooks, DesktopHooks, WindowListener};
pub use runnable::{DrainReport, RunnableQueue, RunnableSender};
pub use scheduler::{FrameScheduler, Lifecycle};
pub use time::FrameTime;

/// Label of the window opened by [`run_application`].
pub const MAIN_WINDOW: &str = "main";

/// Open one window on the winit backend and run until every window closes.
#[cfg(feature = "winit")]
pub fn run_application(
    config: kestrel_core::config::ApplicationConfig,
    listener: impl ApplicationListener,
) -> Result<(), KestrelError> {
    let platform = kestrel_winit::WinitPlatform::new()?;
    let spec = WindowSpec::new(MAIN_WINDOW, config.window.clone(), listener);
    let mut controller = WindowController::new(platform, config);
    controller.open_window(spec)?;
    controller.run()
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{WindowContext, WindowHandle, WindowSpec};
    pub use crate::controller::WindowController;
    pub use crate::error::{FailureReport, KestrelError};
    pub use crate::listener::{ApplicationListener, WindowListener};
    pub use crate::scheduler::Lifecycle;
    pub use crate::time::FrameTime;

    pub use kestrel_core::config::{ApplicationConfig, HdpiMode, WindowConfig};
    pub use kestrel_input::{InputEvent, InputEventKind, InputProcessor, Key, MouseButton};

    #[cfg(feature = "winit")]
    pub use crate::run_application;
}
