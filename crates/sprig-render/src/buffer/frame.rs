use crate::RenderBuffer;
use crate::coords::{Matrix, Rect, Vec2};
use crate::filter::{Pass, PassSource};
use crate::gpu::{BlendMode, GraphicsContext, ImageSource};

use super::context::RenderContext;

impl RenderBuffer {
    /// Clears whatever is bound. No-op on a zero-sized target.
    pub fn clear<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        if self.width() != 0 && self.height() != 0 {
            cx.graphics_mut().clear();
        }
    }

    /// Resizes and clears the backing target; the root also resizes the surface.
    ///
    /// With `keep_larger`, neither dimension shrinks. The previously active target
    /// is bound again afterwards.
    pub fn resize<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, width: u32, height: u32, keep_larger: bool) {
        let (mut width, mut height) = (width.max(1), height.max(1));
        if keep_larger {
            width = width.max(self.width());
            height = height.max(self.height());
        }

        self.target.resize(cx.graphics_mut(), width, height);
        if self.root {
            cx.graphics_mut().resize(width, height, keep_larger);
        }

        let gl = cx.graphics_mut();
        gl.bind_render_target(self.target.id(), true);
        gl.clear();
        cx.rebind_current();
    }

    /// Resizes to `width × height` keeping the current content, redrawn at `offset`.
    ///
    /// The content round-trips through a pooled scratch buffer, so anything beyond
    /// the pool's edge limit is lost.
    pub fn resize_to<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        width: u32,
        height: u32,
        offset: Vec2,
    ) {
        if cx.is_context_lost() {
            self.resize(cx, width, height, false);
            return;
        }
        if !self.commands.is_empty() {
            cx.push_buffer(&self.target);
            self.flush(cx);
            cx.pop_buffer();
        }

        let old = self.size_f();
        let mut scratch = cx.acquire_buffer(old.x, old.y);
        scratch.render_pass(
            cx,
            Pass {
                source: PassSource::Target(self.target.id()),
                src: Rect::from_size(old),
                dest: Rect::from_size(old),
                texture_size: old,
                filter: None,
            },
        );

        self.resize(cx, width, height, false);

        let (transform, alpha, blend) = (self.transform.current(), self.alpha, self.blend);
        let size = scratch.size_f();
        self.render_pass(
            cx,
            Pass {
                source: PassSource::Target(scratch.target_id()),
                src: Rect::from_size(size),
                dest: Rect::from_origin_size(offset, size),
                texture_size: size,
                filter: None,
            },
        );
        self.set_transform(transform);
        self.set_global_alpha(alpha);
        self.set_global_composite_operation(blend);

        cx.release_buffer(scratch);
    }

    /// Frame boundary for the root buffer; resets the draw-call counter.
    ///
    /// With the dirty-region policy on, the frame was drawn into the persistent
    /// framebuffer and is copied to the surface. When the policy switches on, the
    /// surface is first copied into the framebuffer so earlier content survives.
    pub fn on_render_finish<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        if self.root {
            if !self.frame_uses_framebuffer && self.dirty_region_policy {
                self.copy_surface_to_framebuffer(cx);
            }
            if self.frame_uses_framebuffer {
                self.copy_framebuffer_to_surface(cx);
            }
            if self.frame_uses_framebuffer != self.dirty_region_policy {
                log::debug!(
                    "dirty region policy {} from next frame",
                    if self.dirty_region_policy { "on" } else { "off" }
                );
            }
            self.frame_uses_framebuffer = self.dirty_region_policy;
        }
        self.draw_calls = 0;
    }

    fn copy_framebuffer_to_surface<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        self.copy_pass(cx, ImageSource::Target(self.target.id()), false, false);
    }

    fn copy_surface_to_framebuffer<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        self.copy_pass(cx, ImageSource::Surface, true, true);
    }

    /// Draws `source` over the whole target with the framebuffer flag set to
    /// `into_framebuffer`, then switches the flag back.
    fn copy_pass<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        source: ImageSource,
        into_framebuffer: bool,
        clear: bool,
    ) {
        self.target.use_framebuffer = into_framebuffer;
        cx.activate(&self.target);
        // Stencil must be off while the framebuffer is swapped.
        cx.graphics_mut().disable_stencil_test();

        self.set_transform(Matrix::IDENTITY);
        self.set_global_alpha(1.0);
        self.set_global_composite_operation(BlendMode::SourceOver);
        if clear {
            self.clear(cx);
        }
        let full = Rect::from_size(self.size_f());
        self.draw_image(cx, source, full, full, full.size);
        self.flush(cx);

        self.target.use_framebuffer = !into_framebuffer;
        cx.activate(&self.target);
        self.restore_stencil(cx);
    }

    /// Reads one RGBA pixel from the framebuffer, then restores the binding.
    pub fn get_pixel<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, x: i32, y: i32) -> [u8; 4] {
        let gl = cx.graphics_mut();
        gl.bind_render_target(self.target.id(), true);
        let bytes = gl.read_pixels(x, y, 1, 1);
        cx.rebind_current();

        let mut pixel = [0; 4];
        if let Some(rgba) = bytes.get(..4) {
            pixel.copy_from_slice(rgba);
        }
        pixel
    }

    /// Encodes the visible surface as a data URL; `None` if the context cannot.
    pub fn to_data_url<C: GraphicsContext>(
        &self,
        cx: &RenderContext<C>,
        mime: &str,
        quality: Option<f32>,
    ) -> Option<String> {
        cx.graphics().encode_surface(mime, quality)
    }

    /// Releases the backing target. Destroying the root tears down the context too.
    pub fn destroy<C: GraphicsContext>(self, cx: &mut RenderContext<C>) {
        cx.destroy_target(self.target.id());
        if self.root {
            cx.drain_pool();
            cx.graphics_mut().destroy();
            cx.release_root();
            log::debug!("root render buffer destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderConfig;
    use crate::batch::DrawCommand;
    use crate::gpu::{Call, HeadlessContext, ImageId};

    fn setup() -> (RenderContext<HeadlessContext>, RenderBuffer) {
        let mut cx = RenderContext::new(HeadlessContext::new(100, 50), RenderConfig::default()).unwrap();
        let buffer = RenderBuffer::root(&mut cx, 100, 50).unwrap();
        cx.graphics_mut().take_calls();
        (cx, buffer)
    }

    fn binds(gl: &HeadlessContext) -> Vec<bool> {
        gl.calls()
            .iter()
            .filter_map(|c| match c {
                Call::BindTarget { use_framebuffer, .. } => Some(*use_framebuffer),
                _ => None,
            })
            .collect()
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn root_resize_resizes_surface_and_clears() {
        let (mut cx, mut buffer) = setup();
        buffer.resize(&mut cx, 300, 200, false);

        assert_eq!(buffer.size(), (300, 200));
        assert_eq!(cx.graphics().surface_size(), (300, 200));
        assert!(cx.graphics().calls().contains(&Call::Clear));
        assert_eq!(cx.current_target(), Some(buffer.target_id()));
    }

    #[test]
    fn keep_larger_never_shrinks() {
        let (mut cx, mut buffer) = setup();
        buffer.resize(&mut cx, 40, 80, true);
        assert_eq!(buffer.size(), (100, 80));
    }

    #[test]
    fn offscreen_resize_rebinds_active_target() {
        let (mut cx, root) = setup();
        let mut other = RenderBuffer::offscreen(&mut cx, 8, 8);
        cx.graphics_mut().take_calls();

        other.resize(&mut cx, 16, 16, false);
        let last = cx.graphics().calls().last().cloned();
        assert_eq!(
            last,
            Some(Call::BindTarget {
                target: root.target_id(),
                use_framebuffer: true
            })
        );
        assert_eq!(cx.graphics().surface_size(), (100, 50));
    }

    #[test]
    fn resize_to_redraws_content_at_offset() {
        let (mut cx, root) = setup();
        let mut other = RenderBuffer::offscreen(&mut cx, 20, 10);
        other.resize_to(&mut cx, 40, 30, Vec2::new(5.0, 6.0));

        assert_eq!(other.size(), (40, 30));
        assert_eq!(cx.pooled_buffers(), 1);
        assert_eq!(cx.current_target(), Some(root.target_id()));

        let uploads: Vec<&Vec<crate::gpu::Vertex>> = cx
            .graphics()
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::UploadVertices(v) => Some(v),
                _ => None,
            })
            .collect();
        let redraw = uploads.last().unwrap();
        let xs: Vec<f32> = redraw.iter().map(|v| v.pos[0]).collect();
        assert_eq!(xs, vec![5.0, 25.0, 25.0, 5.0]);
    }

    // ── frame finish ──────────────────────────────────────────────────────

    #[test]
    fn first_frame_copies_framebuffer_to_surface() {
        let (mut cx, mut buffer) = setup();
        buffer.on_render_finish(&mut cx);

        // surface bound for the copy, then back to the framebuffer
        assert_eq!(binds(cx.graphics()), vec![false, true]);
        let draws = cx.graphics().draws();
        assert!(draws.iter().any(|c| matches!(c, DrawCommand::Texture(_))));
        assert_eq!(cx.current_target(), Some(buffer.target_id()));
    }

    #[test]
    fn policy_off_skips_copies_from_next_frame() {
        let (mut cx, mut buffer) = setup();
        buffer.set_dirty_region_policy(false);
        buffer.on_render_finish(&mut cx);
        cx.graphics_mut().take_calls();

        buffer.on_render_finish(&mut cx);
        assert!(cx.graphics().draws().is_empty());
    }

    #[test]
    fn policy_back_on_restores_surface_first() {
        let (mut cx, mut buffer) = setup();
        buffer.set_dirty_region_policy(false);
        buffer.on_render_finish(&mut cx);
        buffer.set_dirty_region_policy(true);
        cx.graphics_mut().take_calls();

        buffer.on_render_finish(&mut cx);
        // surface -> framebuffer (cleared first), then the usual copy is skipped
        assert_eq!(binds(cx.graphics()), vec![true, false]);
        assert!(cx.graphics().calls().contains(&Call::Clear));
    }

    #[test]
    fn finish_resets_draw_calls() {
        let (mut cx, mut buffer) = setup();
        let tex = cx.graphics_mut().register_image(ImageId(1));
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        buffer.draw_texture(&mut cx, tex, crate::batch::TextureDraw::new(r, r, r.size));
        buffer.flush(&mut cx);
        assert_eq!(buffer.draw_calls(), 1);

        buffer.on_render_finish(&mut cx);
        assert_eq!(buffer.draw_calls(), 0);
    }

    #[test]
    fn finish_with_open_save_keeps_the_slot() {
        let (mut cx, mut buffer) = setup();
        let saved = Matrix::translation(12.0, -3.0);
        buffer.set_transform(saved);
        buffer.save_transform();

        buffer.on_render_finish(&mut cx);
        buffer.restore_transform();
        assert_eq!(buffer.current_transform(), saved);
    }

    #[test]
    fn offscreen_finish_does_not_copy() {
        let (mut cx, _root) = setup();
        let mut other = RenderBuffer::offscreen(&mut cx, 8, 8);
        cx.graphics_mut().take_calls();
        other.on_render_finish(&mut cx);
        assert!(cx.graphics().calls().is_empty());
    }

    // ── pixels, export, teardown ──────────────────────────────────────────

    #[test]
    fn get_pixel_reads_framebuffer_and_rebinds() {
        let (mut cx, mut buffer) = setup();
        buffer.target.use_framebuffer = false;
        cx.activate(buffer.target());
        cx.graphics_mut().set_pixel(3, 4, [9, 8, 7, 6]);
        cx.graphics_mut().take_calls();

        assert_eq!(buffer.get_pixel(&mut cx, 3, 4), [9, 8, 7, 6]);
        assert_eq!(binds(cx.graphics()), vec![true, false]);
    }

    #[test]
    fn data_url_comes_from_surface() {
        let (cx, buffer) = setup();
        let url = buffer.to_data_url(&cx, "image/png", None).unwrap();
        assert!(url.starts_with("data:image/png"));
    }

    #[test]
    fn destroying_root_tears_down_context() {
        let (mut cx, buffer) = setup();
        let pooled = cx.acquire_buffer(8.0, 8.0);
        cx.release_buffer(pooled);

        buffer.destroy(&mut cx);
        assert!(cx.graphics().is_destroyed());
        assert_eq!(cx.current_target(), None);
        assert_eq!(cx.pooled_buffers(), 0);
        assert!(RenderBuffer::root(&mut cx, 10, 10).is_ok());
    }
}
