use bytemuck::{Pod, Zeroable};

/// Packed vertex: `[x, y, u, v, alpha]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub alpha: f32,
}

impl Vertex {
    /// Floats per vertex.
    pub const STRIDE: usize = 5;

    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32    // alpha
    ];

    /// Vertex buffer layout for a wgpu-backed [`GraphicsContext`](super::GraphicsContext)
    /// building its render pipeline; the headless context never needs it.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Raw bytes of a vertex slice, as uploaded to a vertex buffer.
#[inline]
pub fn vertex_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Raw bytes of an index slice, as uploaded to an index buffer.
#[inline]
pub fn index_bytes(indices: &[u16]) -> &[u8] {
    bytemuck::cast_slice(indices)
}

pub(crate) const QUAD_UVS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

pub(crate) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Index pattern for `max_quads` independent quads (0-1-2, 0-2-3 per quad).
pub fn quad_index_pattern(max_quads: usize) -> Vec<u16> {
    let mut indices = Vec::with_capacity(max_quads * QUAD_INDICES.len());
    for quad in 0..max_quads {
        let base = (quad * 4) as u16;
        indices.extend(QUAD_INDICES.iter().map(|&i| base + i));
    }
    indices
}
