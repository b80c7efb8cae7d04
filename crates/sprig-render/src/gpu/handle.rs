/// GPU texture handle issued by the graphics context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u32);

/// Off-screen render target (texture + framebuffer) issued by the graphics context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetId(pub u32);

/// Engine-side image (decoded bitmap) that the graphics context uploads on demand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ImageId(pub u32);

/// Source of a `drawImage` call.
///
/// The caller states what it holds; the buffer never inspects a source to find out
/// whether it is a render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ImageSource {
    /// A regular texture-backed image.
    Image(ImageId),
    /// The content of another buffer's render target (stored bottom-up).
    Target(TargetId),
    /// The visible surface, snapshotted as a texture.
    Surface,
}

impl ImageSource {
    #[inline]
    pub fn is_render_target(self) -> bool {
        matches!(self, ImageSource::Target(_))
    }
}
