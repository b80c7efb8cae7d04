use super::Vec2;

/// 2×3 affine matrix.
///
/// Maps `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    #[inline]
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Vertical mirror mapping `y` to `axis - y`.
    ///
    /// Render targets store rows bottom-up; drawing one into `dest` upright uses
    /// `axis = dest.height + 2 * dest.y`.
    #[inline]
    pub const fn flip_y(axis: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, -1.0, 0.0, axis)
    }

    /// Composes `other` in local space: `other` is applied to points first.
    pub fn append(&mut self, other: Matrix) {
        let Matrix { a: a1, b: b1, c: c1, d: d1, .. } = *self;

        if other.a != 1.0 || other.b != 0.0 || other.c != 0.0 || other.d != 1.0 {
            self.a = other.a * a1 + other.b * c1;
            self.b = other.a * b1 + other.b * d1;
            self.c = other.c * a1 + other.d * c1;
            self.d = other.c * b1 + other.d * d1;
        }
        self.tx += other.tx * a1 + other.ty * c1;
        self.ty += other.tx * b1 + other.ty * d1;
    }

    #[inline]
    pub fn appended(mut self, other: Matrix) -> Self {
        self.append(other);
        self
    }

    /// Translates in parent space (after the current transform).
    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.tx += dx;
        self.ty += dy;
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
