use super::Vec2;

/// Axis-aligned rectangle in pixels (top-left origin).
///
/// Used for source/destination rects of draws, dirty regions and mask regions.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle at the origin covering `size`.
    #[inline]
    pub const fn from_size(size: Vec2) -> Self {
        Self {
            origin: Vec2::zero(),
            size,
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Moves the rectangle by `offset`.
    #[inline]
    pub fn translated(self, offset: Vec2) -> Self {
        Self::from_origin_size(self.origin + offset, self.size)
    }

    /// Grows the rectangle symmetrically by `pad` on each side.
    #[inline]
    pub fn inflated(self, pad: Vec2) -> Self {
        Self::from_origin_size(self.origin - pad, self.size + pad * 2.0)
    }
}
