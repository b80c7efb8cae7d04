//! Off-screen surfaces and the pool that recycles them between filter passes.

mod pool;
mod render_target;

pub use pool::RenderTargetPool;
pub use render_target::RenderTarget;
