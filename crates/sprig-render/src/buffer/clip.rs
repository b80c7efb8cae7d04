use crate::RenderBuffer;
use crate::coords::{Matrix, Rect, Vec2};
use crate::gpu::{BlendMode, GraphicsContext};

use super::context::RenderContext;

/// Stencil mask geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    Rect(Rect),
    /// Union of dirty regions.
    Regions(Vec<Rect>),
}

impl Mask {
    pub fn rects(&self) -> &[Rect] {
        match self {
            Mask::Rect(rect) => std::slice::from_ref(rect),
            Mask::Regions(rects) => rects,
        }
    }
}

impl RenderBuffer {
    /// Selects whether the root renders into its persistent framebuffer (`true`)
    /// or straight into the visible surface. Applied from the next frame on.
    pub fn set_dirty_region_policy(&mut self, on: bool) {
        self.dirty_region_policy = on;
    }

    /// Clips drawing to `regions`, shifted by `offset`, for the rest of the frame.
    ///
    /// A single region covering the whole target needs no stencil and only clears.
    /// Otherwise every region is erased and then pushed as one stencil mask.
    pub fn begin_clip<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, regions: &[Rect], offset: Vec2) {
        self.target.use_framebuffer = self.frame_uses_framebuffer;
        cx.activate(&self.target);
        if !self.frame_uses_framebuffer {
            self.clear(cx);
        }

        self.set_transform(Matrix::translation(offset.x, offset.y));

        let full = Rect::from_size(self.size_f());
        if let [only] = regions {
            if *only == full {
                self.clip = None;
                if self.target.use_framebuffer {
                    self.clear(cx);
                }
                return;
            }
        }

        for &region in regions {
            self.clear_rect(cx, region);
        }

        if regions.is_empty() {
            self.clip = None;
        } else {
            self.push_mask(cx, Mask::Regions(regions.to_vec()));
            self.clip = Some(offset);
        }
    }

    /// Pops the mask pushed by [`Self::begin_clip`], if it pushed one.
    pub fn end_clip<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        if let Some(offset) = self.clip.take() {
            self.set_transform(Matrix::translation(offset.x, offset.y));
            self.pop_mask(cx);
        }
    }

    pub fn push_mask<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, mask: Mask) {
        if !cx.is_context_lost() {
            self.record_mask(cx, &mask, true);
        }
        self.masks.push(mask);
    }

    pub fn pop_mask<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        let mask = self.masks.pop();
        debug_assert!(mask.is_some(), "pop_mask called without matching push_mask");
        if let Some(mask) = mask {
            if !cx.is_context_lost() {
                self.record_mask(cx, &mask, false);
            }
        }
    }

    /// Records a push/pop command and packs the mask geometry into it.
    fn record_mask<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, mask: &Mask, push: bool) {
        let rects = mask.rects();
        if !self.ensure_room(cx, rects.len() * 4, rects.len() * 6) {
            return;
        }
        if push {
            self.commands.push_mask(0);
        } else {
            self.commands.pop_mask(0);
        }

        let matrix = self.transform.current();
        for &rect in rects {
            self.packer
                .pack(&matrix, self.alpha, Rect::from_size(rect.size), rect, rect.size, None);
            self.commands.grow_last(2);
        }
    }

    /// Masks currently pushed, innermost last.
    #[inline]
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// Erases `rect` to transparent, keeping the current blend mode afterwards.
    pub fn clear_rect<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, rect: Rect) {
        let previous = self.blend;
        self.set_global_composite_operation(BlendMode::DestinationOut);
        self.draw_rect(cx, rect);
        self.set_global_composite_operation(previous);
    }

    /// Untextured rect through the current transform. Consecutive rects share a command.
    pub(crate) fn draw_rect<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>, rect: Rect) {
        if cx.is_context_lost() {
            return;
        }
        if !self.ensure_room(cx, 4, 6) {
            return;
        }
        self.commands.push_rect(2);
        let matrix = self.transform.current();
        self.packer
            .pack(&matrix, self.alpha, Rect::from_size(rect.size), rect, rect.size, None);
    }

    // ── stencil state ─────────────────────────────────────────────────────

    pub fn enable_stencil<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        if !self.stencil_enabled {
            cx.graphics_mut().enable_stencil_test();
            self.stencil_enabled = true;
        }
    }

    pub fn disable_stencil<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        if self.stencil_enabled {
            cx.graphics_mut().disable_stencil_test();
            self.stencil_enabled = false;
        }
    }

    /// Re-applies the tracked stencil state, e.g. after a target switch forced it off.
    pub fn restore_stencil<C: GraphicsContext>(&mut self, cx: &mut RenderContext<C>) {
        if self.stencil_enabled {
            cx.graphics_mut().enable_stencil_test();
        } else {
            cx.graphics_mut().disable_stencil_test();
        }
    }
}
