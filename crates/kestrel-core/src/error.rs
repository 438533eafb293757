//! Errors raised at the native-layer boundary and by the cross-thread queues.

use std::thread::ThreadId;

use thiserror::Error;

use crate::native::NativeWindowId;

/// Failures reported by a [`Platform`](crate::native::Platform) implementation.
///
/// These are fatal for the operation that raised them: a window whose creation
/// failed is never registered anywhere.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to create native window '{title}': {reason}")]
    WindowCreation { title: String, reason: String },

    #[error("failed to make the context of {0:?} current: {1}")]
    ContextBinding(NativeWindowId, String),

    #[error("unknown native window {0:?}")]
    UnknownWindow(NativeWindowId),

    #[error("failed to start the native event loop: {0}")]
    EventLoop(String),

    #[error("the native event loop has shut down")]
    EventLoopClosed,
}

/// Misuse of a queue whose consumer side is bound to one thread.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("{queue} queue drained from {actual:?}, but it is owned by {owner:?}")]
    WrongThread {
        queue: &'static str,
        owner: ThreadId,
        actual: ThreadId,
    },
}
