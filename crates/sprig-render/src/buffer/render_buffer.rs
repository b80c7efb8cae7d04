use anyhow::Result;

use crate::batch::{CommandList, DrawCommand, TextureDraw, TransformStack, VertexPacker};
use crate::coords::{Matrix, Rect, Vec2};
use crate::filter::{Filter, FilterStack};
use crate::gpu::{BlendMode, GraphicsContext, ImageId, ImageSource, TargetId, TextureId};
use crate::target::RenderTarget;

use super::clip::Mask;
use super::context::RenderContext;

/// One logical drawing surface: the visible canvas (root) or an off-screen target.
///
/// Drawing calls record into a pending batch; [`RenderBuffer::flush`] submits it.
/// Every call takes the [`RenderContext`] the buffer was created from. None of the
/// drawing calls fail: a lost context or a texture that is not ready turns them
/// into no-ops.
#[derive(Debug)]
pub struct RenderBuffer {
    pub(crate) target: RenderTarget,
    pub(crate) root: bool,

    pub(crate) transform: TransformStack,
    pub(crate) alpha: f32,
    pub(crate) blend: BlendMode,

    /// Stencil testing as last set on the device.
    pub(crate) stencil_enabled: bool,
    /// Open `PushMask` commands seen by flushes so far.
    pub(crate) stencil_depth: u32,
    pub(crate) masks: Vec<Mask>,
    /// Offset of the mask pushed by `begin_clip`, if any.
    pub(crate) clip: Option<Vec2>,

    pub(crate) commands: CommandList,
    pub(crate) packer: VertexPacker,
    pub(crate) filters: FilterStack,

    /// Requested dirty-region policy; applied at the next `on_render_finish`.
    pub(crate) dirty_region_policy: bool,
    /// Policy in effect for the frame being drawn.
    pub(crate) frame_uses_framebuffer: bool,

    pub(crate) count_draw_calls: bool,
    pub(crate) draw_calls: u32,
}

impl RenderBuffer {
    fn create<C: GraphicsContext>(
        cx: &mut RenderContext<C>,
        width: u32,
        height: u32,
        root: bool,
        count_draw_calls: bool,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let target = RenderTarget::new(cx.graphics_mut(), width, height);

        let mut buffer = Self {
            target,
            root,
            transform: TransformStack::new(),
            alpha: 1.0,
            blend: BlendMode::SourceOver,
            stencil_enabled: false,
            stencil_depth: 0,
            masks: Vec::new(),
            clip: None,
            commands: CommandList::new(),
            packer: VertexPacker::new(cx.config().max_quads),
            filters: FilterStack::new(),
            dirty_region_policy: true,
            // The first frame always lands in the framebuffer.
            frame_uses_framebuffer: true,
            count_draw_calls,
            draw_calls: 0,
        };
        buffer.set_global_composite_operation(BlendMode::SourceOver);
        buffer
    }

    /// Creates the buffer bound to the visible surface and makes it active.
    ///
    /// Fails if the context already has a root buffer.
    pub fn root<C: GraphicsContext>(
        cx: &mut RenderContext<C>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        cx.claim_root()?;
        let count = cx.config().count_draw_calls;
        let buffer = Self::create(cx, width, height, true, count);
        cx.push_buffer(&buffer.target);
        Ok(buffer)
    }

    /// Creates an off-screen buffer. The active target is left unchanged.
    pub fn offscreen<C: GraphicsContext>(cx: &mut RenderContext<C>, width: u32, height: u32) -> Self {
        let count = cx.config().count_draw_calls;
        let buffer = Self::create(cx, width, height, false, count);
        // Creating a target may disturb the device binding.
        cx.rebind_current();
        buffer
    }

    pub(crate) fn pooled<C: GraphicsContext>(cx: &mut RenderContext<C>, width: u32, height: u32) -> Self {
        let buffer = Self::create(cx, width, height, false, false);
        cx.rebind_current();
        buffer
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.target.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.target.height()
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.target.size()
    }

    #[inline]
    pub(crate) fn size_f(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.root
    }

    #[inline]
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    #[inline]
    pub fn target_id(&self) -> TargetId {
        self.target.id()
    }

    /// This buffer as a `draw_image` source for another buffer.
    #[inline]
    pub fn as_source(&self) -> ImageSource {
        ImageSource::Target(self.target.id())
    }

    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        self.commands.commands()
    }

    #[inline]
    pub fn packer(&self) -> &VertexPacker {
        &self.packer
    }

    /// Non-blend commands submitted since the last `on_render_finish`.
    #[inline]
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    #[inline]
    pub fn global_alpha(&self) -> f32 {
        self.alpha
    }

    #[inline]
    pub fn global_composite_operation(&self) -> BlendMode {
        self.blend
    }

    #[inline]
    pub fn stencil_enabled(&self) -> bool {
        self.stencil_enabled
    }

    // ── transform ─────────────────────────────────────────────────────────

    #[inline]
    pub fn current_transform(&self) -> Matrix {
        self.transform.current()
    }

    #[inline]
    pub fn set_transform(&mut self, m: Matrix) {
        self.transform.set(m);
    }

    /// Composes `m` onto the current transform (applied to geometry first).
    #[inline]
    pub fn transform(&mut self, m: Matrix) {
        self.transform.append(m);
    }

    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.translate(dx, dy);
    }

    /// Saves the current transform into the single save slot.
    ///
    /// A second save before `restore_transform` overwrites the slot.
    #[inline]
    pub fn save_transform(&mut self) {
        self.transform.save();
    }

    #[inline]
    pub fn restore_transform(&mut self) {
        self.transform.restore();
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn set_global_composite_operation(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.commands.set_blend(mode);
    }

    pub fn push_filters(&mut self, filters: Vec<Filter>) {
        self.filters.push(filters);
    }

    pub fn pop_filters(&mut self) {
        self.filters.pop();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Active filters flattened into one chain.
    pub fn filters(&self) -> Vec<Filter> {
        self.filters.flatten()
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Draws `src` of `source` into `dest`.
    ///
    /// Render-target sources are stored bottom-up and are flipped on the way in.
    /// The flip leaves the caller's save slot alone.
    pub fn draw_image<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        source: ImageSource,
        src: Rect,
        dest: Rect,
        texture_size: Vec2,
    ) {
        if cx.is_context_lost() {
            return;
        }
        let Some(texture) = cx.resolve_texture(source) else {
            return;
        };

        let draw = TextureDraw::new(src, dest, texture_size);
        if source.is_render_target() {
            let current = self.transform.current();
            self.transform(Matrix::flip_y(dest.size.y + dest.origin.y * 2.0));
            self.draw_texture(cx, texture, draw);
            self.transform.set(current);
        } else {
            self.draw_texture(cx, texture, draw);
        }
    }

    /// Draws a mesh of `image`; see [`TextureDraw::with_mesh`].
    pub fn draw_mesh<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, image: ImageId, draw: TextureDraw<'_>) {
        if cx.is_context_lost() {
            return;
        }
        let Some(texture) = cx.graphics_mut().texture(image) else {
            return;
        };
        self.draw_texture(cx, texture, draw);
    }

    /// Records one textured draw, routing it through the active filters if any.
    pub fn draw_texture<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        texture: TextureId,
        draw: TextureDraw<'_>,
    ) {
        if cx.is_context_lost() {
            return;
        }

        if self.filters.is_active() {
            let filters = self.filters.flatten();
            if !filters.is_empty() {
                self.draw_texture_with_filters(cx, &filters, texture, draw);
                return;
            }
        }

        let matrix = self.transform.current();
        self.draw_quad(cx, texture, draw, &matrix, None);
    }

    /// Packs one draw through `matrix`, attaching `filter` to its command.
    pub(crate) fn draw_quad<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        texture: TextureId,
        draw: TextureDraw<'_>,
        matrix: &Matrix,
        filter: Option<Filter>,
    ) {
        if let Some(filter) = filter {
            self.pack_filtered(cx, texture, draw, matrix, filter, draw.dest.size);
            return;
        }
        if !self.ensure_room(cx, draw.vertex_count(), draw.index_count()) {
            return;
        }
        self.commands
            .push_texture(texture, draw.triangle_count(), draw.mesh.is_some());
        self.packer
            .pack(matrix, self.alpha, draw.src, draw.dest, draw.texture_size, draw.mesh);
    }

    /// Flushes first if `vertices`/`indices` do not fit the current batch.
    ///
    /// Returns `false` if the draw can never fit a batch.
    pub(crate) fn ensure_room<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        vertices: usize,
        indices: usize,
    ) -> bool {
        if self.packer.has_room(vertices, indices) {
            return true;
        }
        if !self.packer.fits_empty(vertices, indices) {
            log::debug!(
                "draw of {} vertices / {} indices exceeds the batch capacity; skipped",
                vertices,
                indices
            );
            return false;
        }
        self.flush(cx);
        true
    }

    // ── flush ─────────────────────────────────────────────────────────────

    /// Submits the pending batch and resets it.
    ///
    /// Uploads only the written vertex prefix, switches to the mesh index buffer
    /// when a mesh was packed, and issues commands in order. A no-op on an empty
    /// batch. On a lost context the batch is dropped.
    pub fn flush<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        if self.commands.is_empty() {
            return;
        }
        if cx.is_context_lost() {
            self.commands.clear();
            self.packer.reset();
            return;
        }

        let has_mesh = self.packer.has_mesh();
        let gl = cx.graphics_mut();
        gl.upload_vertices(self.packer.vertices());
        if has_mesh {
            gl.upload_indices(self.packer.mesh_indices());
        }

        let mut offset = 0;
        let mut submitted = 0u32;
        for cmd in self.commands.commands() {
            if let DrawCommand::PushMask { .. } = cmd {
                if self.stencil_depth == 0 {
                    if !self.stencil_enabled {
                        gl.enable_stencil_test();
                        self.stencil_enabled = true;
                    }
                    gl.clear_stencil();
                }
                self.stencil_depth += 1;
            }

            offset = gl.draw(cmd, offset);

            if let DrawCommand::PopMask { .. } = cmd {
                self.stencil_depth = self.stencil_depth.saturating_sub(1);
                if self.stencil_depth == 0 && self.stencil_enabled {
                    gl.disable_stencil_test();
                    self.stencil_enabled = false;
                }
            }

            if !matches!(cmd, DrawCommand::Blend(_)) {
                submitted += 1;
            }
        }

        if self.count_draw_calls {
            self.draw_calls += submitted;
        }
        if has_mesh {
            cx.restore_quad_indices();
        }

        log::trace!(
            "flushed {} commands ({} draws, {} vertices{})",
            self.commands.len(),
            submitted,
            self.packer.vertex_cursor(),
            if has_mesh { ", mesh" } else { "" }
        );

        self.commands.clear();
        self.packer.reset();
    }
}
