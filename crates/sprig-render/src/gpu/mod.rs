//! Device-facing types: resource handles, the packed vertex, blend modes and the
//! graphics-context seam the batching engine submits through.

mod blend;
mod context;
mod handle;
mod headless;
mod vertex;

pub use blend::BlendMode;
pub use context::GraphicsContext;
pub use handle::{ImageId, ImageSource, TargetId, TextureId};
pub use headless::{Call, HeadlessContext};
pub use vertex::{Vertex, index_bytes, quad_index_pattern, vertex_bytes};

pub(crate) use vertex::{QUAD_INDICES, QUAD_UVS};
