/// Width and height of a window or back buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

impl Size<u32> {
    /// A size with a zero dimension, as reported for minimized windows on some platforms.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Both dimensions multiplied by `factor`, e.g. a logical size at a backing scale.
    pub fn scaled(&self, factor: u32) -> Size<u32> {
        Size::new(self.width * factor, self.height * factor)
    }

    /// Ratio of this size to `logical`, per axis. Zero-sized inputs give 1.
    pub fn scale_from(&self, logical: Size<u32>) -> (f64, f64) {
        let ratio = |pixels: u32, points: u32| {
            if pixels == 0 || points == 0 {
                1.0
            } else {
                f64::from(pixels) / f64::from(points)
            }
        };
        (ratio(self.width, logical.width), ratio(self.height, logical.height))
    }
}
