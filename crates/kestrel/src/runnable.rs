//! Work posted from any thread, executed on the window's render thread.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use kestrel_core::profiling::profile_function;
use kestrel_core::{QueueError, ThreadOwner, WakeSignal};
use parking_lot::Mutex;

use crate::error::panic_message;

pub type Runnable = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of one [`RunnableQueue::drain_and_execute`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Runnables executed, including those posted during the pass.
    pub executed: usize,
    /// `(index, panic message)` of every runnable that panicked.
    pub panics: Vec<(usize, String)>,
}

impl DrainReport {
    pub fn ran_any(&self) -> bool {
        self.executed > 0
    }
}

/// FIFO of deferred work with a swap-then-execute drain.
#[derive(Default)]
pub struct RunnableQueue {
    pending: Mutex<Vec<Runnable>>,
    owner: ThreadOwner,
}

impl fmt::Debug for RunnableQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableQueue")
            .field("pending", &self.len())
            .field("owner", &self.owner.owner())
            .finish()
    }
}

impl RunnableQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a runnable. Safe from any thread, including from inside a
    /// runnable being executed.
    pub fn post(&self, runnable: impl FnOnce() + Send + 'static) {
        self.pending.lock().push(Box::new(runnable));
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Execute everything pending, in submission order, until nothing is left.
    ///
    /// Runnables posted while the pass is running are executed in the same
    /// pass. A panicking runnable is recorded and the pass moves on.
    pub fn drain_and_execute(&self) -> Result<DrainReport, QueueError> {
        profile_function!();
        self.owner.check("runnable")?;

        let mut report = DrainReport::default();
        loop {
            let batch = std::mem::take(&mut *self.pending.lock());
            if batch.is_empty() {
                break;
            }
            for runnable in batch {
                let index = report.executed;
                report.executed += 1;
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(runnable)) {
                    report.panics.push((index, panic_message(payload.as_ref())));
                }
            }
        }
        Ok(report)
    }

    /// Drop all pending runnables without running them.
    pub fn discard(&self) -> usize {
        let dropped = std::mem::take(&mut *self.pending.lock());
        dropped.len()
    }
}

/// Cloneable, thread-safe handle for posting to a window's queue.
///
/// Posting also wakes the controller, so work submitted from another thread
/// does not wait out a pacing sleep.
#[derive(Clone)]
pub struct RunnableSender {
    queue: Arc<RunnableQueue>,
    wake: Arc<WakeSignal>,
}

impl fmt::Debug for RunnableSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableSender")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl RunnableSender {
    pub fn new(queue: Arc<RunnableQueue>, wake: Arc<WakeSignal>) -> Self {
        Self { queue, wake }
    }

    pub fn post(&self, runnable: impl FnOnce() + Send + 'static) {
        self.queue.post(runnable);
        self.wake.wake();
    }
}
