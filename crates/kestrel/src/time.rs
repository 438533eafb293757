use std::time::Duration;

use kestrel_core::geometry::Size;
use kestrel_core::profiling::profile_function;

/// Timing and size information of one window, as seen by its callbacks
///
/// Updated by the frame scheduler right before every `render` call. Time is
/// taken from the runtime's clock, so it is virtual under a test clock.
///
/// # Example
/// ```ignore
/// fn render(&mut self, ctx: &mut WindowContext) -> anyhow::Result<()> {
///     let dt = ctx.graphics().delta_seconds();
///     self.player_position += self.velocity * dt;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FrameTime {
    /// Time of the most recent render since the clock's epoch
    now: Duration,
    /// Time elapsed between the two most recent renders
    delta: Duration,
    /// Renders so far; the first render sees frame id 0
    frame_id: u64,
    started: bool,
    /// Frames rendered during the last full second
    fps: u32,
    frames_this_second: u32,
    second_start: Option<Duration>,
    last_frame_time: Option<Duration>,
    /// Logical window size
    logical_size: Size<u32>,
    /// Back-buffer size in pixels
    backbuffer_size: Size<u32>,
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            delta: Duration::ZERO,
            frame_id: 0,
            started: false,
            fps: 0,
            frames_this_second: 0,
            second_start: None,
            last_frame_time: None,
            logical_size: Size::default(),
            backbuffer_size: Size::default(),
        }
    }

    /// Advances to a new rendered frame at `now`
    ///
    /// The frames-per-second figure is refreshed once per second.
    pub fn update(&mut self, now: Duration) {
        profile_function!();
        if self.started {
            self.frame_id += 1;
        }
        self.started = true;
        self.delta = self
            .last_frame_time
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_frame_time = Some(now);
        self.now = now;

        let second_start = *self.second_start.get_or_insert(now);
        if now.saturating_sub(second_start) >= Duration::from_secs(1) {
            self.fps = self.frames_this_second;
            self.frames_this_second = 0;
            self.second_start = Some(now);
        }
        self.frames_this_second += 1;
    }

    /// Forgets the previous frame so the next delta starts from zero
    ///
    /// Called when a window resumes after being paused, so that the time spent
    /// paused does not show up as one huge delta.
    pub fn reset_delta(&mut self) {
        self.last_frame_time = None;
        self.second_start = None;
        self.frames_this_second = 0;
    }

    pub(crate) fn set_sizes(&mut self, logical: Size<u32>, backbuffer: Size<u32>) {
        self.logical_size = logical;
        self.backbuffer_size = backbuffer;
    }

    /// Returns the time between the two most recent renders
    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Returns the time between the two most recent renders in seconds (f32)
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Returns the clock time of the current render
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns the id of the current frame
    #[inline]
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Returns the frames rendered during the last full second
    #[inline]
    pub fn frames_per_second(&self) -> u32 {
        self.fps
    }

    #[inline]
    pub fn logical_size(&self) -> Size<u32> {
        self.logical_size
    }

    #[inline]
    pub fn backbuffer_size(&self) -> Size<u32> {
        self.backbuffer_size
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.backbuffer_size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.backbuffer_size.height
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}
