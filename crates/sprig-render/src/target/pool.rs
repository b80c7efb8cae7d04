use crate::RenderBuffer;

/// Free list of off-screen buffers for filter passes.
///
/// Buffers are taken in LIFO order and resized by the caller. Without a limit the
/// pool only grows, up to the deepest filter chain seen so far.
#[derive(Debug, Default)]
pub struct RenderTargetPool {
    free: Vec<RenderBuffer>,
    limit: Option<usize>,
}

impl RenderTargetPool {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            free: Vec::new(),
            limit,
        }
    }

    #[inline]
    pub fn take(&mut self) -> Option<RenderBuffer> {
        self.free.pop()
    }

    /// Returns `buffer` to the free list, or hands it back if the pool is full.
    #[must_use]
    pub fn put(&mut self, buffer: RenderBuffer) -> Option<RenderBuffer> {
        if self.limit.is_some_and(|limit| self.free.len() >= limit) {
            return Some(buffer);
        }
        self.free.push(buffer);
        None
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, RenderBuffer> {
        self.free.drain(..)
    }
}
