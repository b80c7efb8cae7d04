use std::collections::HashMap;

use crate::batch::DrawCommand;

use super::{GraphicsContext, ImageId, TargetId, TextureId, Vertex};

/// One call received by a [`HeadlessContext`], in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Resize { width: u32, height: u32, keep_larger: bool },
    Clear,
    EnableStencil,
    DisableStencil,
    ClearStencil,
    ReadPixels { x: i32, y: i32, width: u32, height: u32 },
    UploadVertices(Vec<Vertex>),
    /// Number of indices uploaded.
    UploadIndices(usize),
    Draw { command: DrawCommand, offset: usize },
    CreateTarget { target: TargetId, width: u32, height: u32 },
    ResizeTarget { target: TargetId, width: u32, height: u32 },
    BindTarget { target: TargetId, use_framebuffer: bool },
    DestroyTarget(TargetId),
    Destroy,
}

#[derive(Debug, Copy, Clone)]
struct HeadlessTarget {
    width: u32,
    height: u32,
    texture: TextureId,
}

/// In-memory [`GraphicsContext`] that records every call instead of touching a device.
///
/// Used by the test suite and by tooling that needs to inspect the batches a frame
/// produces without a GPU.
#[derive(Debug)]
pub struct HeadlessContext {
    surface: (u32, u32),
    lost: bool,
    destroyed: bool,
    next_id: u32,
    surface_texture: TextureId,
    images: HashMap<ImageId, TextureId>,
    targets: HashMap<TargetId, HeadlessTarget>,
    pixels: HashMap<(i32, i32), [u8; 4]>,
    calls: Vec<Call>,
}

impl HeadlessContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: (width, height),
            lost: false,
            destroyed: false,
            next_id: 1,
            surface_texture: TextureId(0),
            images: HashMap::new(),
            targets: HashMap::new(),
            pixels: HashMap::new(),
            calls: Vec::new(),
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Marks `image` as uploaded and returns the texture it resolves to.
    pub fn register_image(&mut self, image: ImageId) -> TextureId {
        let texture = TextureId(self.next_id());
        self.images.insert(image, texture);
        texture
    }

    pub fn set_context_lost(&mut self, lost: bool) {
        self.lost = lost;
    }

    /// Seeds the value `read_pixels` reports at `(x, y)`.
    pub fn set_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        self.pixels.insert((x, y), rgba);
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Only the draw submissions, in order.
    pub fn draws(&self) -> Vec<&DrawCommand> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    pub fn target_size(&self, target: TargetId) -> Option<(u32, u32)> {
        self.targets.get(&target).map(|t| (t.width, t.height))
    }

    /// Number of render targets created and not yet destroyed.
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl GraphicsContext for HeadlessContext {
    fn is_context_lost(&self) -> bool {
        self.lost
    }

    fn resize(&mut self, width: u32, height: u32, keep_larger: bool) {
        self.surface = if keep_larger {
            (self.surface.0.max(width), self.surface.1.max(height))
        } else {
            (width, height)
        };
        self.calls.push(Call::Resize {
            width,
            height,
            keep_larger,
        });
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn enable_stencil_test(&mut self) {
        self.calls.push(Call::EnableStencil);
    }

    fn disable_stencil_test(&mut self) {
        self.calls.push(Call::DisableStencil);
    }

    fn clear_stencil(&mut self) {
        self.calls.push(Call::ClearStencil);
    }

    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        self.calls.push(Call::ReadPixels {
            x,
            y,
            width,
            height,
        });
        let mut out = Vec::with_capacity((width * height * 4) as usize);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let px = self.pixels.get(&(x + col, y + row)).copied().unwrap_or_default();
                out.extend_from_slice(&px);
            }
        }
        out
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.calls.push(Call::UploadVertices(vertices.to_vec()));
    }

    fn upload_indices(&mut self, indices: &[u16]) {
        self.calls.push(Call::UploadIndices(indices.len()));
    }

    fn draw(&mut self, command: &DrawCommand, offset: usize) -> usize {
        self.calls.push(Call::Draw {
            command: command.clone(),
            offset,
        });
        offset + command.index_count()
    }

    fn texture(&mut self, image: ImageId) -> Option<TextureId> {
        self.images.get(&image).copied()
    }

    fn surface_texture(&mut self) -> Option<TextureId> {
        Some(self.surface_texture)
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> TargetId {
        let target = TargetId(self.next_id());
        let texture = TextureId(self.next_id());
        self.targets.insert(
            target,
            HeadlessTarget {
                width,
                height,
                texture,
            },
        );
        self.calls.push(Call::CreateTarget {
            target,
            width,
            height,
        });
        target
    }

    fn resize_render_target(&mut self, target: TargetId, width: u32, height: u32) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.width = width;
            t.height = height;
        }
        self.calls.push(Call::ResizeTarget {
            target,
            width,
            height,
        });
    }

    fn bind_render_target(&mut self, target: TargetId, use_framebuffer: bool) {
        self.calls.push(Call::BindTarget {
            target,
            use_framebuffer,
        });
    }

    fn render_target_texture(&self, target: TargetId) -> Option<TextureId> {
        self.targets.get(&target).map(|t| t.texture)
    }

    fn destroy_render_target(&mut self, target: TargetId) {
        self.targets.remove(&target);
        self.calls.push(Call::DestroyTarget(target));
    }

    fn encode_surface(&self, mime: &str, _quality: Option<f32>) -> Option<String> {
        if self.lost || self.destroyed {
            return None;
        }
        Some(format!("data:{mime};headless,{}x{}", self.surface.0, self.surface.1))
    }

    fn destroy(&mut self) {
        self.targets.clear();
        self.images.clear();
        self.destroyed = true;
        self.calls.push(Call::Destroy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::BlendMode;

    #[test]
    fn keep_larger_never_shrinks() {
        let mut gl = HeadlessContext::new(100, 100);
        gl.resize(50, 200, true);
        assert_eq!(gl.surface_size(), (100, 200));
        gl.resize(50, 60, false);
        assert_eq!(gl.surface_size(), (50, 60));
    }

    #[test]
    fn draw_advances_offset_by_indices() {
        let mut gl = HeadlessContext::new(1, 1);
        assert_eq!(gl.draw(&DrawCommand::Rect { count: 4 }, 6), 18);
        assert_eq!(gl.draw(&DrawCommand::Blend(BlendMode::Lighter), 18), 18);
        assert_eq!(gl.draws().len(), 2);
    }

    #[test]
    fn unregistered_image_has_no_texture() {
        let mut gl = HeadlessContext::new(1, 1);
        assert_eq!(gl.texture(ImageId(7)), None);
        let tex = gl.register_image(ImageId(7));
        assert_eq!(gl.texture(ImageId(7)), Some(tex));
    }

    #[test]
    fn read_pixels_returns_seeded_values() {
        let mut gl = HeadlessContext::new(4, 4);
        gl.set_pixel(1, 2, [1, 2, 3, 4]);
        assert_eq!(gl.read_pixels(1, 2, 1, 1), vec![1, 2, 3, 4]);
        assert_eq!(gl.read_pixels(0, 0, 1, 1), vec![0, 0, 0, 0]);
    }

    #[test]
    fn targets_are_tracked_until_destroyed() {
        let mut gl = HeadlessContext::new(1, 1);
        let t = gl.create_render_target(8, 4);
        assert_eq!(gl.target_size(t), Some((8, 4)));
        gl.resize_render_target(t, 16, 16);
        assert_eq!(gl.target_size(t), Some((16, 16)));
        assert!(gl.render_target_texture(t).is_some());
        gl.destroy_render_target(t);
        assert_eq!(gl.live_targets(), 0);
    }
}
