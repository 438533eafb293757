//! Test utilities for the Kestrel runtime.
//!
//! Frame pacing and multi-window scheduling are timing-sensitive, so tests
//! drive them with fakes instead of a real display:
//!
//! - `MockPlatform` - a scriptable [`Platform`](kestrel_core::native::Platform)
//!   that delivers queued native events on `poll_events` and records every
//!   call made against it (requires `mock` feature)
//! - `ManualClock` - a virtual clock whose `sleep` advances time instantly
//!   (requires `mock` feature)
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use std::time::Duration;
//! use kestrel_core::{Clock, WakeSignal};
//! use kestrel_test_utils::ManualClock;
//!
//! let clock = ManualClock::new();
//! clock.sleep(Duration::from_millis(16), &WakeSignal::new());
//! assert_eq!(clock.now(), Duration::from_millis(16));
//! # }
//! ```
//!
//! Both types are cheap handles around shared state: clone one, hand the clone
//! to the code under test, and keep the original to script or inspect.

#[cfg(feature = "mock")]
pub mod clock;
#[cfg(feature = "mock")]
pub mod platform;

#[cfg(feature = "mock")]
pub use clock::ManualClock;
#[cfg(feature = "mock")]
pub use platform::{MockCall, MockEvent, MockPlatform};
