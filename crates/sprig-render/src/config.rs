use anyhow::{Result, ensure};

/// Tunables of a [`crate::RenderContext`].
///
/// Fixed at context creation; every buffer created from the context shares them.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Quads per batch. Sizes the vertex and index buffers of every buffer.
    pub max_quads: usize,

    /// Longest edge of a pooled (filter) render target, in pixels.
    pub max_target_edge: u32,

    /// Upper bound on idle pooled buffers. `None` keeps every released buffer.
    pub max_pooled_buffers: Option<usize>,

    /// Whether non-pooled buffers count their draw calls.
    pub count_draw_calls: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_quads: 2000,
            max_target_edge: 1024,
            max_pooled_buffers: None,
            count_draw_calls: true,
        }
    }
}

impl RenderConfig {
    pub fn with_max_quads(mut self, max_quads: usize) -> Self {
        self.max_quads = max_quads;
        self
    }

    pub fn with_max_target_edge(mut self, edge: u32) -> Self {
        self.max_target_edge = edge;
        self
    }

    pub fn with_max_pooled_buffers(mut self, cap: Option<usize>) -> Self {
        self.max_pooled_buffers = cap;
        self
    }

    pub fn with_draw_call_counting(mut self, on: bool) -> Self {
        self.count_draw_calls = on;
        self
    }

    /// Checks that the batch fits 16-bit indices and targets have a size.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_quads > 0, "max_quads must be at least 1");
        ensure!(
            self.max_quads * 4 <= u16::MAX as usize + 1,
            "max_quads {} exceeds what 16-bit indices can address ({} quads)",
            self.max_quads,
            (u16::MAX as usize + 1) / 4
        );
        ensure!(self.max_target_edge > 0, "max_target_edge must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_quads, 2000);
        assert_eq!(config.max_target_edge, 1024);
    }

    #[test]
    fn index_range_is_enforced() {
        assert!(RenderConfig::default().with_max_quads(16384).validate().is_ok());
        let err = RenderConfig::default()
            .with_max_quads(16385)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("16-bit"));
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(RenderConfig::default().with_max_quads(0).validate().is_err());
        assert!(RenderConfig::default().with_max_target_edge(0).validate().is_err());
    }
}
