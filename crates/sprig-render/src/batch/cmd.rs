use crate::coords::{Rect, Vec2};
use crate::filter::Filter;
use crate::gpu::{BlendMode, TextureId};

/// Normalized texture rectangle (`u0,v0` top-left, `u1,v1` bottom-right).
///
/// Filter shaders sample relative to the source rect, so filtered commands carry it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// UV rect of `src` inside a texture of `texture_size` pixels.
    pub fn from_source(src: Rect, texture_size: Vec2) -> Self {
        let max = src.max();
        Self {
            u0: src.origin.x / texture_size.x,
            v0: src.origin.y / texture_size.y,
            u1: max.x / texture_size.x,
            v1: max.y / texture_size.y,
        }
    }
}

/// A textured run: `count` triangles sampling one texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureCmd {
    pub texture: TextureId,
    /// Triangles covered by this run.
    pub count: u32,
    /// Geometry came from a mesh (indices live in the mesh index buffer).
    pub mesh: bool,
    pub filter: Option<Filter>,
    pub uv: Option<UvRect>,
}

/// One entry of a batch.
///
/// Every geometry-carrying variant counts triangles; the graphics context
/// consumes `count * 3` indices for it.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Texture(TextureCmd),
    /// Untextured rects (erase / stencil geometry).
    Rect { count: u32 },
    PushMask { count: u32 },
    PopMask { count: u32 },
    Blend(BlendMode),
}

impl DrawCommand {
    #[inline]
    pub fn count(&self) -> u32 {
        match self {
            DrawCommand::Texture(cmd) => cmd.count,
            DrawCommand::Rect { count }
            | DrawCommand::PushMask { count }
            | DrawCommand::PopMask { count } => *count,
            DrawCommand::Blend(_) => 0,
        }
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.count() as usize * 3
    }

    /// Produces visible pixels (as opposed to state changes and stencil writes).
    #[inline]
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawCommand::Texture(_) | DrawCommand::Rect { .. })
    }

    pub(crate) fn count_mut(&mut self) -> Option<&mut u32> {
        match self {
            DrawCommand::Texture(cmd) => Some(&mut cmd.count),
            DrawCommand::Rect { count }
            | DrawCommand::PushMask { count }
            | DrawCommand::PopMask { count } => Some(count),
            DrawCommand::Blend(_) => None,
        }
    }
}
