//! Filter descriptors, the per-buffer filter stack and the compositor that
//! renders filtered draws through pooled off-screen buffers.

mod compositor;
mod descriptor;
mod stack;

pub use descriptor::{BLUR_SPREAD, BlurFilter, ColorMatrixFilter, Filter, GlowFilter};
pub use stack::FilterStack;

pub(crate) use compositor::{Pass, PassSource};
