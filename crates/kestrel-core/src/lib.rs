//! Kestrel Core
//!
//! Leaf utilities shared by every Kestrel crate: geometry, configuration,
//! logging, profiling, the monotonic clock, and the boundary traits the
//! runtime uses to talk to a native windowing layer.

pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod native;
pub mod owner;
pub mod profiling;

pub use clock::{Clock, SystemClock, WakeSignal};
pub use error::{PlatformError, QueueError};
pub use owner::ThreadOwner;
