use crate::coords::{ColorRgba, Vec2};

/// Fraction of a surface's edge that one unit of blur spreads over.
pub const BLUR_SPREAD: f32 = 0.028;

/// Axis-separable blur.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlurFilter {
    pub blur_x: f32,
    pub blur_y: f32,
}

impl BlurFilter {
    #[inline]
    pub const fn new(blur_x: f32, blur_y: f32) -> Self {
        Self { blur_x, blur_y }
    }

    /// Padding added on each side of a `size` surface so the blur is not clipped.
    #[inline]
    pub fn padding(&self, size: Vec2) -> Vec2 {
        Vec2::new(
            self.blur_x * BLUR_SPREAD * size.x,
            self.blur_y * BLUR_SPREAD * size.y,
        )
    }

    /// Single-axis blur along X.
    #[inline]
    pub const fn x_pass(&self) -> Self {
        Self::new(self.blur_x, 0.0)
    }

    /// Single-axis blur along Y.
    #[inline]
    pub const fn y_pass(&self) -> Self {
        Self::new(0.0, self.blur_y)
    }
}

/// Colored, blurred halo (optionally offset as a drop shadow) drawn under the content.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlowFilter {
    pub color: ColorRgba,
    pub blur_x: f32,
    pub blur_y: f32,
    pub distance: f32,
    /// Degrees.
    pub angle: f32,
    /// Number of additive accumulation passes.
    pub quality: u32,
}

impl GlowFilter {
    pub fn new(color: ColorRgba, blur_x: f32, blur_y: f32) -> Self {
        Self {
            color,
            blur_x,
            blur_y,
            distance: 0.0,
            angle: 0.0,
            quality: 1,
        }
    }

    pub fn with_offset(mut self, distance: f32, angle: f32) -> Self {
        self.distance = distance;
        self.angle = angle;
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    /// Whole-pixel shadow displacement. Zero unless both distance and angle are set.
    pub fn shadow_offset(&self) -> Vec2 {
        if self.distance == 0.0 || self.angle == 0.0 {
            return Vec2::zero();
        }
        let rad = self.angle.to_radians();
        Vec2::new(
            (self.distance * rad.cos()).ceil(),
            (self.distance * rad.sin()).ceil(),
        )
    }

    #[inline]
    pub fn blur(&self) -> BlurFilter {
        BlurFilter::new(self.blur_x, self.blur_y)
    }

    pub fn padding(&self, size: Vec2) -> Vec2 {
        self.blur().padding(size) + self.shadow_offset().abs()
    }

    /// Color matrix that paints every covered pixel in the glow color.
    pub fn silhouette(&self) -> ColorMatrixFilter {
        let ColorRgba { r, g, b, a } = self.color;
        #[rustfmt::skip]
        let matrix = [
            0.0, 0.0, 0.0, 0.0, r,
            0.0, 0.0, 0.0, 0.0, g,
            0.0, 0.0, 0.0, 0.0, b,
            0.0, 0.0, 0.0, 0.0, a,
        ];
        ColorMatrixFilter { matrix }
    }
}

/// 4×5 color transform, row-major. The fifth column is an offset in `[0, 1]` units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorMatrixFilter {
    pub matrix: [f32; 20],
}

impl ColorMatrixFilter {
    #[rustfmt::skip]
    pub const IDENTITY: ColorMatrixFilter = ColorMatrixFilter {
        matrix: [
            1.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ],
    };

    #[inline]
    pub const fn new(matrix: [f32; 20]) -> Self {
        Self { matrix }
    }

    /// Applies the matrix to one straight-alpha color.
    pub fn apply(&self, rgba: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            let m = &self.matrix[row * 5..row * 5 + 5];
            *o = m[0] * rgba[0] + m[1] * rgba[1] + m[2] * rgba[2] + m[3] * rgba[3] + m[4];
        }
        out
    }
}

impl Default for ColorMatrixFilter {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A filter attached to a buffer or to a single command.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Filter {
    Blur(BlurFilter),
    Glow(GlowFilter),
    ColorMatrix(ColorMatrixFilter),
}

impl Filter {
    /// Spatial growth on each side when filtering a `size` surface.
    pub fn padding(&self, size: Vec2) -> Vec2 {
        match self {
            Filter::Blur(blur) => blur.padding(size),
            Filter::Glow(glow) => glow.padding(size),
            Filter::ColorMatrix(_) => Vec2::zero(),
        }
    }

    #[inline]
    pub fn is_glow(&self) -> bool {
        matches!(self, Filter::Glow(_))
    }
}

impl From<BlurFilter> for Filter {
    fn from(f: BlurFilter) -> Self {
        Filter::Blur(f)
    }
}

impl From<GlowFilter> for Filter {
    fn from(f: GlowFilter) -> Self {
        Filter::Glow(f)
    }
}

impl From<ColorMatrixFilter> for Filter {
    fn from(f: ColorMatrixFilter) -> Self {
        Filter::ColorMatrix(f)
    }
}
