use crate::coords::Matrix;

/// Current transform plus exactly one save slot.
///
/// This is not a stack: a second `save` before `restore` overwrites the slot.
/// Callers pair the two; mismatches trip a debug assertion.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Matrix,
    saved: Matrix,
    pending_save: bool,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: Matrix::IDENTITY,
            saved: Matrix::IDENTITY,
            pending_save: false,
        }
    }
}

impl TransformStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> Matrix {
        self.current
    }

    #[inline]
    pub fn set(&mut self, m: Matrix) {
        self.current = m;
    }

    #[inline]
    pub fn append(&mut self, m: Matrix) {
        self.current.append(m);
    }

    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current.translate(dx, dy);
    }

    pub fn save(&mut self) {
        debug_assert!(!self.pending_save, "save_transform called twice without restore_transform");
        self.saved = self.current;
        self.pending_save = true;
    }

    pub fn restore(&mut self) {
        debug_assert!(self.pending_save, "restore_transform called without save_transform");
        self.current = self.saved;
        self.pending_save = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_is_bit_identical() {
        let mut t = TransformStack::new();
        t.set(Matrix::new(0.3, 0.1, -0.2, 0.7, 11.5, -3.25));
        let before = t.current();

        t.save();
        t.append(Matrix::scale(3.0, 0.5));
        t.translate(1.0e-3, 7.0);
        t.append(Matrix::new(0.9, 0.4, -0.4, 0.9, 2.0, 2.0));
        t.restore();

        let after = t.current();
        assert_eq!(before.a.to_bits(), after.a.to_bits());
        assert_eq!(before.b.to_bits(), after.b.to_bits());
        assert_eq!(before.c.to_bits(), after.c.to_bits());
        assert_eq!(before.d.to_bits(), after.d.to_bits());
        assert_eq!(before.tx.to_bits(), after.tx.to_bits());
        assert_eq!(before.ty.to_bits(), after.ty.to_bits());
    }

    #[test]
    fn set_replaces_current() {
        let mut t = TransformStack::new();
        t.append(Matrix::scale(2.0, 2.0));
        t.set(Matrix::translation(4.0, 5.0));
        assert_eq!(t.current(), Matrix::translation(4.0, 5.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "without save_transform")]
    fn unpaired_restore_asserts() {
        TransformStack::new().restore();
    }
}
