use anyhow::{Context, Result, ensure};

use crate::RenderBuffer;
use crate::config::RenderConfig;
use crate::gpu::{GraphicsContext, ImageSource, TargetId, TextureId, quad_index_pattern};
use crate::target::{RenderTarget, RenderTargetPool};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Binding {
    target: TargetId,
    use_framebuffer: bool,
}

/// Shared state of every buffer drawing through one graphics context.
///
/// Owns the context itself, the active-target stack (exactly one target is bound
/// at a time; nested filter passes push and pop around their work), the pool of
/// off-screen buffers and the quad index pattern uploaded at creation.
///
/// Buffers do not hold a reference to it; every drawing call takes `&mut RenderContext`.
#[derive(Debug)]
pub struct RenderContext<C: GraphicsContext> {
    gl: C,
    config: RenderConfig,
    quad_indices: Vec<u16>,
    stack: Vec<Binding>,
    pool: RenderTargetPool,
    has_root: bool,
    warned_context_lost: bool,
}

impl<C: GraphicsContext> RenderContext<C> {
    pub fn new(mut gl: C, config: RenderConfig) -> Result<Self> {
        config.validate().context("invalid render config")?;

        let quad_indices = quad_index_pattern(config.max_quads);
        gl.upload_indices(&quad_indices);

        log::debug!(
            "render context ready: {} quads/batch, pooled edge <= {}",
            config.max_quads,
            config.max_target_edge
        );

        Ok(Self {
            gl,
            pool: RenderTargetPool::new(config.max_pooled_buffers),
            config,
            quad_indices,
            stack: Vec::new(),
            has_root: false,
            warned_context_lost: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn graphics(&self) -> &C {
        &self.gl
    }

    #[inline]
    pub fn graphics_mut(&mut self) -> &mut C {
        &mut self.gl
    }

    /// Polls the device; logs the first skipped frame of every loss.
    pub fn is_context_lost(&mut self) -> bool {
        let lost = self.gl.is_context_lost();
        if lost && !self.warned_context_lost {
            log::debug!("graphics context lost; drawing is skipped until it is restored");
            self.warned_context_lost = true;
        } else if !lost {
            self.warned_context_lost = false;
        }
        lost
    }

    // ── active target stack ───────────────────────────────────────────────

    /// Makes `target` the active target until the matching [`Self::pop_buffer`].
    pub fn push_buffer(&mut self, target: &RenderTarget) {
        let binding = Binding {
            target: target.id(),
            use_framebuffer: target.use_framebuffer,
        };
        self.stack.push(binding);
        self.gl.bind_render_target(binding.target, binding.use_framebuffer);
    }

    /// Deactivates the top target and rebinds the one below it.
    pub fn pop_buffer(&mut self) {
        debug_assert!(!self.stack.is_empty(), "pop_buffer called without matching push_buffer");
        self.stack.pop();
        self.rebind_current();
    }

    /// Target currently bound for drawing.
    #[inline]
    pub fn current_target(&self) -> Option<TargetId> {
        self.stack.last().map(|b| b.target)
    }

    /// Binds `target` with its current framebuffer flag.
    ///
    /// If it is the active target, the stack remembers the new flag so later
    /// rebinds restore it.
    pub(crate) fn activate(&mut self, target: &RenderTarget) {
        if let Some(top) = self.stack.last_mut() {
            if top.target == target.id() {
                top.use_framebuffer = target.use_framebuffer;
            }
        }
        self.gl.bind_render_target(target.id(), target.use_framebuffer);
    }

    /// Re-binds the active target after something else touched the binding.
    pub(crate) fn rebind_current(&mut self) {
        if let Some(top) = self.stack.last().copied() {
            self.gl.bind_render_target(top.target, top.use_framebuffer);
        }
    }

    /// Drops every stack entry for `target` (the buffer is going away).
    pub(crate) fn unbind(&mut self, target: TargetId) {
        let before = self.stack.len();
        self.stack.retain(|b| b.target != target);
        if self.stack.len() != before {
            self.rebind_current();
        }
    }

    pub(crate) fn restore_quad_indices(&mut self) {
        self.gl.upload_indices(&self.quad_indices);
    }

    // ── root bookkeeping ──────────────────────────────────────────────────

    pub(crate) fn claim_root(&mut self) -> Result<()> {
        ensure!(!self.has_root, "a root render buffer already exists for this context");
        self.has_root = true;
        Ok(())
    }

    pub(crate) fn release_root(&mut self) {
        self.has_root = false;
    }

    // ── texture resolution ────────────────────────────────────────────────

    pub(crate) fn resolve_texture(&mut self, source: ImageSource) -> Option<TextureId> {
        match source {
            ImageSource::Image(image) => self.gl.texture(image),
            ImageSource::Target(target) => self.gl.render_target_texture(target),
            ImageSource::Surface => self.gl.surface_texture(),
        }
    }

    // ── pool ──────────────────────────────────────────────────────────────

    /// Takes a pooled buffer of `width × height`, or creates one.
    ///
    /// Sizes are rounded up and clamped to `[1, max_target_edge]`.
    pub fn acquire_buffer(&mut self, width: f32, height: f32) -> RenderBuffer {
        let edge = self.config.max_target_edge;
        let clamp = |v: f32| (v.ceil() as u32).min(edge).max(1);
        let (w, h) = (clamp(width), clamp(height));

        match self.pool.take() {
            Some(mut buffer) => {
                buffer.resize(self, w, h, false);
                buffer
            }
            None => {
                log::debug!("render target pool grows: new {}x{} buffer", w, h);
                RenderBuffer::pooled(self, w, h)
            }
        }
    }

    /// Returns a buffer taken with [`Self::acquire_buffer`].
    pub fn release_buffer(&mut self, mut buffer: RenderBuffer) {
        buffer.clear_filters();
        if let Some(evicted) = self.pool.put(buffer) {
            log::debug!("render target pool full; destroying {:?}", evicted.target_id());
            self.destroy_target(evicted.target_id());
        }
    }

    /// Idle buffers currently held by the pool.
    #[inline]
    pub fn pooled_buffers(&self) -> usize {
        self.pool.len()
    }

    pub(crate) fn destroy_target(&mut self, target: TargetId) {
        self.unbind(target);
        self.gl.destroy_render_target(target);
    }

    /// Destroys every idle pooled buffer.
    pub fn drain_pool(&mut self) {
        let ids: Vec<TargetId> = self.pool.drain().map(|b| b.target_id()).collect();
        for id in ids {
            self.destroy_target(id);
        }
    }
}
