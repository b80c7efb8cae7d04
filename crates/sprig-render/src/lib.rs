//! Sprig render crate.
//!
//! Batched immediate-mode 2D rendering: draw calls are recorded into a command
//! list, merged where possible and submitted to a [`gpu::GraphicsContext`] in as
//! few draws as the batch allows. Filters (blur, glow, color matrix) render
//! through pooled off-screen targets before compositing.
//!
//! ```no_run
//! use sprig_render::coords::{Rect, Vec2};
//! use sprig_render::gpu::{HeadlessContext, ImageId, ImageSource};
//! use sprig_render::{RenderBuffer, RenderConfig, RenderContext};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut cx = RenderContext::new(HeadlessContext::new(320, 240), RenderConfig::default())?;
//! let mut stage = RenderBuffer::root(&mut cx, 320, 240)?;
//!
//! stage.begin_clip(&mut cx, &[Rect::new(0.0, 0.0, 320.0, 240.0)], Vec2::zero());
//! let r = Rect::new(0.0, 0.0, 32.0, 32.0);
//! stage.draw_image(&mut cx, ImageSource::Image(ImageId(1)), r, r, r.size);
//! stage.end_clip(&mut cx);
//! stage.flush(&mut cx);
//! stage.on_render_finish(&mut cx);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod coords;
pub mod filter;
pub mod gpu;
pub mod logging;
pub mod target;

mod buffer;
mod config;

pub use buffer::{Mask, RenderBuffer, RenderContext};
pub use config::RenderConfig;
