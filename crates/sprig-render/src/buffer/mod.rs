//! The drawing façade: [`RenderBuffer`] and the [`RenderContext`] its calls run against.

mod clip;
mod context;
mod frame;
mod render_buffer;

pub use clip::Mask;
pub use context::RenderContext;
pub use render_buffer::RenderBuffer;
