//! Error taxonomy of the runtime.
//!
//! Setup and misuse errors are returned directly as [`KestrelError`]. Failures
//! that happen while windows are running (application callbacks, posted
//! runnables) are reported through the controller's error hook as a
//! [`FailureReport`].

use std::any::Any;
use std::fmt;

use kestrel_core::config::ConfigError;
use kestrel_core::{PlatformError, QueueError};
use thiserror::Error;

use crate::scheduler::FrameScheduler;

#[derive(Debug, Error)]
pub enum KestrelError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("window '{0}' is already owned by another scheduling context")]
    WindowAlreadyOwned(String),

    #[error("a window labelled '{0}' is already registered")]
    DuplicateWindow(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A window the controller refused, handed back so it can still be disposed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AttachError {
    pub error: KestrelError,
    pub scheduler: FrameScheduler,
}

impl AttachError {
    pub fn into_scheduler(self) -> FrameScheduler {
        self.scheduler
    }
}

/// Application callback that was running when a window failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerStage {
    Create,
    Resize,
    Render,
    Pause,
    Resume,
    Dispose,
    /// Replaying buffered input into the input processor.
    Input,
    /// A window listener callback (focus, iconify, close request, ...).
    WindowEvent,
    /// A posted runnable, with `error_on_runnable_panic` enabled.
    Runnable,
}

impl fmt::Display for ListenerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListenerStage::Create => "create",
            ListenerStage::Resize => "resize",
            ListenerStage::Render => "render",
            ListenerStage::Pause => "pause",
            ListenerStage::Resume => "resume",
            ListenerStage::Dispose => "dispose",
            ListenerStage::Input => "input",
            ListenerStage::WindowEvent => "window event",
            ListenerStage::Runnable => "runnable",
        };
        f.write_str(name)
    }
}

/// A window was torn down because one of its callbacks failed.
#[derive(Debug, Error)]
#[error("window '{window}' failed in {stage}: {error:#}")]
pub struct WindowFailure {
    pub window: String,
    pub stage: ListenerStage,
    pub error: anyhow::Error,
}

/// A single posted runnable panicked. The rest of the drain still ran.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("runnable {index} posted to window '{window}' panicked: {message}")]
pub struct RunnableFailure {
    pub window: String,
    /// Position of the runnable within its drain.
    pub index: usize,
    pub message: String,
}

/// What the controller's error hook receives.
#[derive(Debug, Clone, Copy)]
pub enum FailureReport<'a> {
    Window(&'a WindowFailure),
    Runnable(&'a RunnableFailure),
    /// A window requested from a callback could not be opened.
    OpenWindow {
        label: &'a str,
        error: &'a KestrelError,
    },
}

impl fmt::Display for FailureReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReport::Window(failure) => fmt::Display::fmt(failure, f),
            FailureReport::Runnable(failure) => fmt::Display::fmt(failure, f),
            FailureReport::OpenWindow { label, error } => {
                write!(f, "failed to open window '{label}': {error}")
            }
        }
    }
}

/// Best-effort message of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
