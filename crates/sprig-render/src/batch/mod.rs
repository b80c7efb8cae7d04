//! Batching primitives: the pending command list, the vertex packer and the
//! transform the packer maps geometry through.

mod cmd;
mod list;
mod packer;
mod transform;

pub use cmd::{DrawCommand, TextureCmd, UvRect};
pub use list::CommandList;
pub use packer::{Mesh, TextureDraw, VertexPacker};
pub use transform::TransformStack;
