//! Mapping between native (logical) window coordinates and the coordinates
//! reported to the application.

use glam::{DVec2, IVec2};
use kestrel_core::config::HdpiMode;
use kestrel_core::geometry::Size;

/// Converts positions under a window's [`HdpiMode`].
///
/// Native cursor positions arrive in logical window units. Under
/// [`HdpiMode::Pixels`] they are scaled by the back-buffer/window ratio so they
/// line up with the pixels the application renders into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    mode: HdpiMode,
    logical: Size<u32>,
    backbuffer: Size<u32>,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(HdpiMode::Logical, Size::new(1, 1), Size::new(1, 1))
    }
}

impl CoordinateTransform {
    pub fn new(mode: HdpiMode, logical: Size<u32>, backbuffer: Size<u32>) -> Self {
        Self {
            mode,
            logical,
            backbuffer,
        }
    }

    pub fn mode(&self) -> HdpiMode {
        self.mode
    }

    /// Update the sizes after a resize or a scale-factor change.
    pub fn set_sizes(&mut self, logical: Size<u32>, backbuffer: Size<u32>) {
        self.logical = logical;
        self.backbuffer = backbuffer;
    }

    pub fn logical_size(&self) -> Size<u32> {
        self.logical
    }

    pub fn backbuffer_size(&self) -> Size<u32> {
        self.backbuffer
    }

    /// Back-buffer pixels per logical unit on each axis.
    ///
    /// A zero-sized window (minimized on some platforms) reports a scale of 1.
    pub fn scale(&self) -> DVec2 {
        let (x, y) = self.backbuffer.scale_from(self.logical);
        DVec2::new(x, y)
    }

    /// Native position to reported position.
    ///
    /// The native position is truncated to whole logical units before it is
    /// scaled, so that a pointer which did not cross a logical unit boundary
    /// does not produce a movement.
    pub fn to_reported(&self, native: DVec2) -> IVec2 {
        let truncated = native.trunc();
        match self.mode {
            HdpiMode::Logical => truncated.as_ivec2(),
            HdpiMode::Pixels => (truncated * self.scale()).as_ivec2(),
        }
    }

    /// Scale a movement already expressed in whole logical units.
    pub fn delta_to_reported(&self, delta: IVec2) -> IVec2 {
        match self.mode {
            HdpiMode::Logical => delta,
            HdpiMode::Pixels => (delta.as_dvec2() * self.scale()).as_ivec2(),
        }
    }

    /// Reported position back to native logical units.
    pub fn to_native(&self, reported: IVec2) -> DVec2 {
        let reported = reported.as_dvec2();
        match self.mode {
            HdpiMode::Logical => reported,
            HdpiMode::Pixels => reported / self.scale(),
        }
    }
}
