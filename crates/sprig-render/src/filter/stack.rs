use super::Filter;

/// Filter layers pushed by nested display objects, outermost first.
#[derive(Debug, Default, Clone)]
pub struct FilterStack {
    layers: Vec<Vec<Filter>>,
}

impl FilterStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, filters: Vec<Filter>) {
        self.layers.push(filters);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Vec<Filter>> {
        self.layers.pop()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// `true` if any layer holds at least one filter.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.layers.iter().any(|layer| !layer.is_empty())
    }

    /// All active filters as one chain, in application order.
    ///
    /// Glow is only honoured as the very last filter of the chain; glow entries
    /// anywhere else are left out.
    pub fn flatten(&self) -> Vec<Filter> {
        let mut chain: Vec<Filter> = self
            .layers
            .iter()
            .flatten()
            .filter(|f| !f.is_glow())
            .copied()
            .collect();

        if let Some(last @ Filter::Glow(_)) = self.layers.iter().rev().find_map(|layer| layer.last()) {
            chain.push(*last);
        }
        chain
    }
}
