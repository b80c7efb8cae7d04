use crate::coords::{Matrix, Rect, Vec2};
use crate::gpu::{QUAD_INDICES, QUAD_UVS, Vertex};

/// Arbitrary triangle geometry in source-rect space.
///
/// `uvs` and `vertices` are flat `[x0, y0, x1, y1, ...]` lists of equal length;
/// `uvs` are relative to the source rect (0..1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mesh<'a> {
    pub uvs: &'a [f32],
    pub vertices: &'a [f32],
    pub indices: &'a [u16],
}

impl<'a> Mesh<'a> {
    #[inline]
    pub fn new(uvs: &'a [f32], vertices: &'a [f32], indices: &'a [u16]) -> Self {
        debug_assert_eq!(uvs.len(), vertices.len(), "mesh uvs and vertices differ in length");
        Self {
            uvs,
            vertices,
            indices,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.uvs.len() / 2
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }
}

/// Everything needed to place one textured draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureDraw<'m> {
    /// Region of the texture to sample, in texture pixels.
    pub src: Rect,
    /// Where the source region lands, in target pixels (before the transform).
    pub dest: Rect,
    /// Full pixel size of the texture `src` is measured against.
    pub texture_size: Vec2,
    pub mesh: Option<Mesh<'m>>,
    /// True content bounds of a mesh; sizes filter intermediates.
    pub bounds: Option<Rect>,
}

impl<'m> TextureDraw<'m> {
    #[inline]
    pub fn new(src: Rect, dest: Rect, texture_size: Vec2) -> Self {
        Self {
            src,
            dest,
            texture_size,
            mesh: None,
            bounds: None,
        }
    }

    #[inline]
    pub fn with_mesh(mut self, mesh: Mesh<'m>, bounds: Option<Rect>) -> Self {
        self.mesh = Some(mesh);
        self.bounds = bounds;
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.mesh.map_or(4, |m| m.vertex_count())
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.mesh.map_or(QUAD_INDICES.len(), |m| m.indices.len())
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.mesh.map_or(2, |m| m.triangle_count())
    }
}

/// Fixed-capacity vertex storage plus the mesh index buffer for one batch.
///
/// Quads rely on the shared quad index pattern; their indices are still written
/// to the mesh buffer so a batch that mixes quads and meshes can switch to it.
#[derive(Debug)]
pub struct VertexPacker {
    vertices: Vec<Vertex>,
    mesh_indices: Vec<u16>,
    max_vertices: usize,
    max_indices: usize,
    has_mesh: bool,
}

impl VertexPacker {
    pub fn new(max_quads: usize) -> Self {
        let max_vertices = max_quads * 4;
        let max_indices = max_quads * QUAD_INDICES.len();
        Self {
            vertices: Vec::with_capacity(max_vertices),
            mesh_indices: Vec::with_capacity(max_indices),
            max_vertices,
            max_indices,
            has_mesh: false,
        }
    }

    /// `true` if `vertices` more vertices and `indices` more indices fit.
    #[inline]
    pub fn has_room(&self, vertices: usize, indices: usize) -> bool {
        self.vertices.len() + vertices <= self.max_vertices
            && self.mesh_indices.len() + indices <= self.max_indices
    }

    /// `true` if a draw of this size could ever fit in an empty batch.
    #[inline]
    pub fn fits_empty(&self, vertices: usize, indices: usize) -> bool {
        vertices <= self.max_vertices && indices <= self.max_indices
    }

    /// Appends one quad (or mesh) mapped from `src` onto `dest` through `transform`.
    ///
    /// `transform` itself is not modified; the source-to-destination mapping is
    /// composed on a copy.
    pub fn pack(
        &mut self,
        transform: &Matrix,
        alpha: f32,
        src: Rect,
        dest: Rect,
        texture_size: Vec2,
        mesh: Option<Mesh<'_>>,
    ) {
        let (sw, sh) = (src.size.x, src.size.y);
        let (dw, dh) = (dest.size.x, dest.size.y);

        let mut m = *transform;
        if dest.origin.x != 0.0 || dest.origin.y != 0.0 {
            m.append(Matrix::translation(dest.origin.x, dest.origin.y));
        }
        if sw / dw != 1.0 || sh / dh != 1.0 {
            m.append(Matrix::scale(dw / sw, dh / sh));
        }

        let quad_vertices = [0.0, 0.0, sw, 0.0, sw, sh, 0.0, sh];
        let (uvs, positions, indices): (&[f32], &[f32], &[u16]) = match mesh {
            Some(mesh) => (mesh.uvs, mesh.vertices, mesh.indices),
            None => (&QUAD_UVS[..], &quad_vertices[..], &QUAD_INDICES[..]),
        };

        let base = self.vertices.len() as u16;
        for (uv, pos) in uvs.chunks_exact(2).zip(positions.chunks_exact(2)) {
            let p = m.transform_point(Vec2::new(pos[0], pos[1]));
            self.vertices.push(Vertex {
                pos: [p.x, p.y],
                uv: [
                    (src.origin.x + uv[0] * sw) / texture_size.x,
                    (src.origin.y + uv[1] * sh) / texture_size.y,
                ],
                alpha,
            });
        }
        self.mesh_indices.extend(indices.iter().map(|&i| i + base));

        if mesh.is_some() {
            self.has_mesh = true;
        }
    }

    /// Rewinds both write cursors.
    #[inline]
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.mesh_indices.clear();
        self.has_mesh = false;
    }

    /// Packed vertices (the written prefix only).
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn mesh_indices(&self) -> &[u16] {
        &self.mesh_indices
    }

    #[inline]
    pub fn vertex_cursor(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_cursor(&self) -> usize {
        self.mesh_indices.len()
    }

    /// A mesh was packed since the last reset.
    #[inline]
    pub fn has_mesh(&self) -> bool {
        self.has_mesh
    }
}
