use std::sync::OnceLock;
use std::thread::{self, ThreadId};

use crate::error::QueueError;

/// Records the single thread allowed to consume a queue.
///
/// The first thread that calls [`ThreadOwner::check`] (or [`ThreadOwner::bind_current`])
/// becomes the owner; later calls from any other thread fail.
#[derive(Debug, Default)]
pub struct ThreadOwner {
    owner: OnceLock<ThreadId>,
}

impl ThreadOwner {
    pub const fn new() -> Self {
        Self {
            owner: OnceLock::new(),
        }
    }

    /// Claim the calling thread, failing if another thread already owns the queue.
    pub fn bind_current(&self, queue: &'static str) -> Result<(), QueueError> {
        self.check(queue)
    }

    pub fn check(&self, queue: &'static str) -> Result<(), QueueError> {
        let actual = thread::current().id();
        let owner = *self.owner.get_or_init(|| actual);
        if owner == actual {
            Ok(())
        } else {
            Err(QueueError::WrongThread {
                queue,
                owner,
                actual,
            })
        }
    }

    pub fn owner(&self) -> Option<ThreadId> {
        self.owner.get().copied()
    }
}
