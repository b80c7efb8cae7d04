//! Multi-pass filter rendering.
//!
//! A filtered draw renders its content into pooled off-screen buffers, one pass
//! per filter, then composites the last buffer back onto the calling buffer with
//! the final filter attached. Each pass pads its output so the filter has room to
//! spread; the padding accumulates into an offset the composite subtracts again.

use crate::RenderBuffer;
use crate::batch::{Mesh, TextureCmd, TextureDraw, UvRect};
use crate::buffer::RenderContext;
use crate::coords::{Matrix, Rect, Vec2};
use crate::gpu::{BlendMode, GraphicsContext, TargetId, TextureId};

use super::{BlurFilter, Filter, GlowFilter};

/// What a pass samples from.
#[derive(Debug, Copy, Clone)]
pub(crate) enum PassSource<'m> {
    Texture { texture: TextureId, mesh: Option<Mesh<'m>> },
    /// Another buffer's target (stored bottom-up).
    Target(TargetId),
}

/// One draw into an intermediate buffer.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Pass<'m> {
    pub source: PassSource<'m>,
    pub src: Rect,
    pub dest: Rect,
    pub texture_size: Vec2,
    pub filter: Option<Filter>,
}

/// Renders `input` through `filter` into a freshly acquired, padded buffer.
///
/// Returns the buffer and where `input`'s origin landed inside it. A blur on
/// both axes takes two passes, X then Y.
fn filter_into_intermediate<C: GraphicsContext>(
    cx: &mut RenderContext<C>,
    filter: Filter,
    input: &RenderBuffer,
) -> (RenderBuffer, Vec2) {
    if let Filter::Blur(blur) = filter {
        if blur.blur_x != 0.0 && blur.blur_y != 0.0 {
            let (blurred_x, place_x) = filter_into_intermediate(cx, Filter::Blur(blur.x_pass()), input);
            let (output, place_y) = filter_into_intermediate(cx, Filter::Blur(blur.y_pass()), &blurred_x);
            cx.release_buffer(blurred_x);
            return (output, place_x + place_y);
        }
    }

    let inner = input.size_f();
    let pad = filter.padding(inner);
    let mut output = cx.acquire_buffer(inner.x + pad.x * 2.0, inner.y + pad.y * 2.0);
    let place = (output.size_f() - inner) / 2.0;

    output.render_pass(
        cx,
        Pass {
            source: PassSource::Target(input.target_id()),
            src: Rect::from_size(inner),
            dest: Rect::from_origin_size(place, inner),
            texture_size: inner,
            filter: Some(filter),
        },
    );
    (output, place)
}

/// Final blur handling: an X pass needs its own buffer, a Y pass rides the composite.
fn needs_x_pass(filter: &Filter) -> bool {
    matches!(filter, Filter::Blur(BlurFilter { blur_x, .. }) if *blur_x != 0.0)
}

impl RenderBuffer {
    /// Draws `pass` into this buffer as the active target, then flushes.
    ///
    /// Resets alpha, transform and blend mode; pooled buffers carry no caller state.
    pub(crate) fn render_pass<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, pass: Pass<'_>) {
        cx.push_buffer(&self.target);
        self.set_global_alpha(1.0);
        self.set_transform(Matrix::IDENTITY);
        self.set_global_composite_operation(BlendMode::SourceOver);

        let (texture, mesh, matrix) = match pass.source {
            PassSource::Texture { texture, mesh } => (Some(texture), mesh, Matrix::IDENTITY),
            PassSource::Target(target) => (
                cx.graphics().render_target_texture(target),
                None,
                Matrix::flip_y(pass.dest.size.y + pass.dest.origin.y * 2.0),
            ),
        };

        if let Some(texture) = texture {
            let draw = TextureDraw {
                src: pass.src,
                dest: pass.dest,
                texture_size: pass.texture_size,
                mesh,
                bounds: None,
            };
            self.draw_quad(cx, texture, draw, &matrix, pass.filter);
        }

        self.flush(cx);
        cx.pop_buffer();
    }

    /// Packs `draw` with the filter on its command.
    ///
    /// A blur grows the geometry by its padding, measured against `content`.
    /// Other filters spread only inside their intermediate buffers.
    pub(crate) fn pack_filtered<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        texture: TextureId,
        draw: TextureDraw<'_>,
        matrix: &Matrix,
        filter: Filter,
        content: Vec2,
    ) {
        if !self.ensure_room(cx, draw.vertex_count(), draw.index_count()) {
            return;
        }
        let pad = match filter {
            Filter::Blur(blur) => blur.padding(content),
            _ => Vec2::zero(),
        };
        self.commands.push_filtered(TextureCmd {
            texture,
            count: draw.triangle_count(),
            mesh: draw.mesh.is_some(),
            filter: Some(filter),
            uv: Some(UvRect::from_source(draw.src, draw.texture_size)),
        });
        self.packer.pack(
            matrix,
            self.alpha,
            draw.src.inflated(pad),
            draw.dest.inflated(pad),
            draw.texture_size,
            draw.mesh,
        );
    }

    /// Draws `texture` through `filters` (non-empty, application order).
    pub(crate) fn draw_texture_with_filters<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        filters: &[Filter],
        texture: TextureId,
        draw: TextureDraw<'_>,
    ) {
        let Some((&last, passes)) = filters.split_last() else {
            return;
        };

        // Meshes report their true extent; quads cover their destination.
        let (content, content_offset) = match draw.bounds {
            Some(bounds) => (bounds.size, -bounds.origin),
            None => (draw.dest.size, Vec2::zero()),
        };

        let direct = passes.is_empty() && !last.is_glow() && !needs_x_pass(&last);
        if direct {
            let matrix = self.transform.current();
            self.pack_filtered(cx, texture, draw, &matrix, last, content);
            return;
        }

        let raw = PassSource::Texture {
            texture,
            mesh: draw.mesh,
        };
        let raw_pass = |place: Vec2, filter: Option<Filter>| Pass {
            source: raw,
            src: draw.src,
            dest: Rect::from_origin_size(place + content_offset, draw.dest.size),
            texture_size: draw.texture_size,
            filter,
        };

        let mut offset = Vec2::zero();
        let mut input: Option<RenderBuffer> = None;

        if !passes.is_empty() {
            let mut current = cx.acquire_buffer(content.x, content.y);
            current.render_pass(cx, raw_pass(Vec2::zero(), None));
            offset += content_offset;

            for &filter in passes {
                let (next, place) = filter_into_intermediate(cx, filter, &current);
                cx.release_buffer(current);
                current = next;
                offset += place;
            }
            input = Some(current);
        }

        let final_filter = match last {
            Filter::Blur(blur) if blur.blur_x != 0.0 => {
                let x_pass = Filter::Blur(blur.x_pass());
                let next = match input.take() {
                    Some(current) => {
                        let (next, place) = filter_into_intermediate(cx, x_pass, &current);
                        cx.release_buffer(current);
                        offset += place;
                        next
                    }
                    None => {
                        let pad = x_pass.padding(content);
                        let mut next = cx.acquire_buffer(content.x + pad.x * 2.0, content.y + pad.y * 2.0);
                        let place = (next.size_f() - content) / 2.0;
                        next.render_pass(cx, raw_pass(place, Some(x_pass)));
                        offset += content_offset + place;
                        next
                    }
                };
                input = Some(next);
                (blur.blur_y != 0.0).then(|| Filter::Blur(blur.y_pass()))
            }
            Filter::Glow(glow) => {
                let current = match input.take() {
                    Some(current) => current,
                    None => {
                        let mut current = cx.acquire_buffer(content.x, content.y);
                        current.render_pass(cx, raw_pass(Vec2::zero(), None));
                        offset += content_offset;
                        current
                    }
                };
                self.draw_glow(cx, &glow, &current, draw.dest.origin - offset);
                input = Some(current);
                Some(Filter::Glow(glow))
            }
            other => Some(other),
        };

        let Some(output) = input else {
            return;
        };

        self.draw_buffer(cx, &output, draw.dest.origin - offset, final_filter);

        // The composite samples `output`; submit it before the buffer is recycled.
        self.flush(cx);
        cx.release_buffer(output);
    }

    /// Packs `source`'s whole target upright with its top-left corner at `at`.
    fn draw_buffer<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        source: &RenderBuffer,
        at: Vec2,
        filter: Option<Filter>,
    ) {
        let Some(texture) = cx.graphics().render_target_texture(source.target_id()) else {
            return;
        };
        let size = source.size_f();
        let dest = Rect::from_origin_size(at, size);
        let matrix = self
            .transform
            .current()
            .appended(Matrix::flip_y(dest.size.y + dest.origin.y * 2.0));
        self.draw_quad(cx, texture, TextureDraw::new(Rect::from_size(size), dest, size), &matrix, filter);
    }

    /// Draws the halo of `glow` around `content`, whose origin lands at `origin`.
    ///
    /// The silhouette, its X blur and its XY blur are each drawn with the
    /// current blend mode and flushed before their buffer is recycled. The
    /// final stage is then accumulated `quality` times with `LighterIn`.
    fn draw_glow<C: GraphicsContext>(
        &mut self,
        cx: &mut RenderContext<C>,
        glow: &GlowFilter,
        content: &RenderBuffer,
        origin: Vec2,
    ) {
        let blur = glow.blur();
        let at = origin + glow.shadow_offset();

        let (silhouette, _) = filter_into_intermediate(cx, Filter::ColorMatrix(glow.silhouette()), content);
        self.draw_buffer(cx, &silhouette, at, None);
        self.flush(cx);

        let (blurred_x, place_x) = filter_into_intermediate(cx, Filter::Blur(blur.x_pass()), &silhouette);
        cx.release_buffer(silhouette);
        self.draw_buffer(cx, &blurred_x, at - place_x, None);
        self.flush(cx);

        let (halo, place_y) = filter_into_intermediate(cx, Filter::Blur(blur.y_pass()), &blurred_x);
        cx.release_buffer(blurred_x);
        let at = at - place_x - place_y;
        self.draw_buffer(cx, &halo, at, None);
        self.flush(cx);

        let previous = self.blend;
        self.set_global_composite_operation(BlendMode::LighterIn);
        for _ in 0..glow.quality {
            self.draw_buffer(cx, &halo, at, None);
        }
        self.set_global_composite_operation(previous);

        self.flush(cx);
        cx.release_buffer(halo);
    }
}
