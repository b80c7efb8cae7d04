use std::fmt;

/// Composite operation applied to subsequent draws.
///
/// All modes assume premultiplied-alpha sources.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    /// Additive.
    Lighter,
    /// Source-alpha weighted; used to accumulate glow halos.
    LighterIn,
    /// Erases the destination where the source is opaque.
    DestinationOut,
    /// Keeps the destination only where the source is opaque.
    DestinationIn,
}

impl BlendMode {
    /// Parses a canvas-style composite operation name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "source-over" => BlendMode::SourceOver,
            "lighter" => BlendMode::Lighter,
            "lighter-in" => BlendMode::LighterIn,
            "destination-out" => BlendMode::DestinationOut,
            "destination-in" => BlendMode::DestinationIn,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::Lighter => "lighter",
            BlendMode::LighterIn => "lighter-in",
            BlendMode::DestinationOut => "destination-out",
            BlendMode::DestinationIn => "destination-in",
        }
    }

    /// `(src_factor, dst_factor)` for both color and alpha.
    pub const fn factors(self) -> (wgpu::BlendFactor, wgpu::BlendFactor) {
        use wgpu::BlendFactor as F;
        match self {
            BlendMode::SourceOver => (F::One, F::OneMinusSrcAlpha),
            BlendMode::Lighter => (F::One, F::One),
            BlendMode::LighterIn => (F::SrcAlpha, F::OneMinusSrcAlpha),
            BlendMode::DestinationOut => (F::Zero, F::OneMinusSrcAlpha),
            BlendMode::DestinationIn => (F::Zero, F::SrcAlpha),
        }
    }

    /// Pipeline blend state for this mode.
    ///
    /// Consumed by a wgpu-backed [`GraphicsContext`](super::GraphicsContext) when it
    /// builds one pipeline per mode.
    pub fn blend_state(self) -> wgpu::BlendState {
        let (src_factor, dst_factor) = self.factors();
        let component = wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };
        wgpu::BlendState {
            color: component,
            alpha: component,
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_over_is_premultiplied_over() {
        let state = BlendMode::SourceOver.blend_state();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
        assert_eq!(state.alpha, state.color);
    }

    #[test]
    fn destination_out_ignores_source_color() {
        let (src, dst) = BlendMode::DestinationOut.factors();
        assert_eq!(src, wgpu::BlendFactor::Zero);
        assert_eq!(dst, wgpu::BlendFactor::OneMinusSrcAlpha);
    }

    #[test]
    fn names_parse_back() {
        assert_eq!(BlendMode::from_name("lighter-in"), Some(BlendMode::LighterIn));
        assert_eq!(BlendMode::from_name(BlendMode::Lighter.name()), Some(BlendMode::Lighter));
        assert_eq!(BlendMode::from_name("multiply"), None);
    }
}
