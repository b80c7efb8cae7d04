//! Coordinate and geometry types shared by the batching engine.
//!
//! Canonical CPU space:
//! - Pixels of the bound render target
//! - Origin top-left
//! - +X right, +Y down

mod color;
mod matrix;
mod rect;
mod vec2;

pub use color::ColorRgba;
pub use matrix::Matrix;
pub use rect::Rect;
pub use vec2::Vec2;
