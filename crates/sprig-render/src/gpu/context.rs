use crate::batch::DrawCommand;

use super::{ImageId, TargetId, TextureId, Vertex};

/// The graphics-context collaborator a [`crate::RenderBuffer`] submits to.
///
/// Implementations own the real device state: textures, framebuffers, shader
/// programs and the bound vertex/index buffers. The batching engine only ever
/// talks to the device through this trait, in command order, on one thread.
///
/// Offsets passed to [`GraphicsContext::draw`] are measured in indices into the
/// currently uploaded index buffer.
pub trait GraphicsContext {
    /// `true` while the device is lost. Every drawing call becomes a no-op.
    fn is_context_lost(&self) -> bool;

    /// Resizes the visible surface. With `keep_larger`, neither dimension shrinks.
    fn resize(&mut self, width: u32, height: u32, keep_larger: bool);

    /// Clears the color (and stencil) attachments of whatever is bound.
    fn clear(&mut self);

    fn enable_stencil_test(&mut self);
    fn disable_stencil_test(&mut self);
    fn clear_stencil(&mut self);

    /// Reads back `width * height` RGBA pixels from whatever is bound.
    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8>;

    /// Replaces the contents of the bound vertex buffer.
    fn upload_vertices(&mut self, vertices: &[Vertex]);

    /// Replaces the contents of the bound index buffer.
    fn upload_indices(&mut self, indices: &[u16]);

    /// Issues one batched command starting at `offset` and returns the next offset.
    fn draw(&mut self, command: &DrawCommand, offset: usize) -> usize;

    /// Resolves an engine image to an uploaded texture; `None` while it is not ready.
    fn texture(&mut self, image: ImageId) -> Option<TextureId>;

    /// Snapshot of the visible surface as a texture, if the device supports one.
    fn surface_texture(&mut self) -> Option<TextureId>;

    fn create_render_target(&mut self, width: u32, height: u32) -> TargetId;
    fn resize_render_target(&mut self, target: TargetId, width: u32, height: u32);

    /// Binds `target` for drawing. Without `use_framebuffer` the visible surface is
    /// bound instead of the target's own framebuffer.
    fn bind_render_target(&mut self, target: TargetId, use_framebuffer: bool);

    fn render_target_texture(&self, target: TargetId) -> Option<TextureId>;
    fn destroy_render_target(&mut self, target: TargetId);

    /// Encodes the visible surface (e.g. `"image/png"`); `None` when it cannot.
    fn encode_surface(&self, mime: &str, quality: Option<f32>) -> Option<String>;

    /// Releases every device resource. The context is unusable afterwards.
    fn destroy(&mut self);
}
