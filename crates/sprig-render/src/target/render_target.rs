use crate::gpu::{GraphicsContext, TargetId};

/// GPU surface (texture + framebuffer) backing one [`crate::RenderBuffer`].
///
/// Resized in place; the handle stays stable for the life of the buffer.
#[derive(Debug)]
pub struct RenderTarget {
    id: TargetId,
    width: u32,
    height: u32,
    /// Draw into the target's own framebuffer rather than the visible surface.
    /// Only the root buffer ever turns this off.
    pub(crate) use_framebuffer: bool,
}

impl RenderTarget {
    pub fn new<C: GraphicsContext>(gl: &mut C, width: u32, height: u32) -> Self {
        let id = gl.create_render_target(width, height);
        log::debug!("render target {:?} created ({}x{})", id, width, height);
        Self {
            id,
            width,
            height,
            use_framebuffer: true,
        }
    }

    /// Resizes the backing storage if either dimension differs.
    pub fn resize<C: GraphicsContext>(&mut self, gl: &mut C, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        gl.resize_render_target(self.id, width, height);
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn id(&self) -> TargetId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn uses_framebuffer(&self) -> bool {
        self.use_framebuffer
    }
}
