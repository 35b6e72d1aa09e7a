//! Grid Mesh
//!
//! Screen-space grid tiles with border overscan. Vertex positions hold the
//! clamped screen UV fed to the projection interpolation; the texcoord
//! channel holds the edge falloff used to blend tile seams.

use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use tidegrid_core::math::{saturate, Aabb, Vec2, Vec3};

use crate::{GridError, GridResult};

/// Fraction of a tile's UV range added on each side as overlap border
pub const BORDER_FRACTION: f32 = 0.1;

/// Name given to every built tile
pub const GRID_MESH_NAME: &str = "Projected Grid Mesh";

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a built grid mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One grid vertex as laid out in the vertex buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GridVertex {
    /// Clamped screen UV in xy, z always 0
    pub position: [f32; 3],
    /// Edge falloff, 0 inside the tile and 1 at the outer border
    pub texcoord: [f32; 2],
}

/// A renderable grid tile
#[derive(Debug, Clone)]
pub struct GridMesh {
    /// Mesh ID
    pub id: MeshId,
    /// Mesh name
    pub name: String,
    /// Vertex buffer
    pub vertices: Vec<GridVertex>,
    /// Triangle list, always 32-bit
    pub indices: Vec<u32>,
    /// Bounding volume; the drawing side may overwrite it every frame
    pub bounds: Aabb,
    /// Vertices per row
    pub verts_x: u32,
    /// Vertices per column
    pub verts_y: u32,
}

impl GridMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex at grid coordinate (x, y)
    pub fn vertex(&self, x: u32, y: u32) -> Option<&GridVertex> {
        if x >= self.verts_x || y >= self.verts_y {
            return None;
        }
        self.vertices.get((x + y * self.verts_x) as usize)
    }

    /// Raw vertex bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Falloff for one overscanned UV component
///
/// Zero inside [0, 1], ramping quadratically to 1 at `-border` or
/// `1 + border`. Capped at 1.
fn edge_falloff(uv: f32, border: f32) -> f32 {
    let distance = if uv < 0.0 {
        -uv
    } else if uv > 1.0 {
        uv - 1.0
    } else {
        0.0
    };
    (distance / border).powi(2).min(1.0)
}

/// Build one grid tile of `verts_x` by `verts_y` vertices
///
/// `origin` and `span` place the tile within the full screen UV square.
/// UVs are then expanded by [`BORDER_FRACTION`] on every side so neighbouring
/// tiles overlap at their seams.
pub fn build_tile(verts_x: u32, verts_y: u32, origin: Vec2, span: Vec2) -> GridResult<GridMesh> {
    if verts_x < 2 || verts_y < 2 {
        return Err(GridError::InvalidArgument(format!(
            "tile needs at least 2x2 vertices, got {verts_x}x{verts_y}"
        )));
    }
    if !(span.x > 0.0 && span.y > 0.0 && span.is_finite()) {
        return Err(GridError::InvalidArgument(format!(
            "tile span must be positive, got ({}, {})",
            span.x, span.y
        )));
    }
    if !origin.is_finite() {
        return Err(GridError::InvalidArgument(format!(
            "tile origin must be finite, got ({}, {})",
            origin.x, origin.y
        )));
    }

    let border = BORDER_FRACTION;
    let step = Vec2::new((verts_x - 1) as f32, (verts_y - 1) as f32);

    let mut vertices = vec![GridVertex::zeroed(); (verts_x * verts_y) as usize];
    for x in 0..verts_x {
        for y in 0..verts_y {
            let t = Vec2::new(x as f32, y as f32) / step;
            let uv = (t * span + origin) * (1.0 + border * 2.0) - border;

            vertices[(x + y * verts_x) as usize] = GridVertex {
                position: [saturate(uv.x), saturate(uv.y), 0.0],
                texcoord: [edge_falloff(uv.x, border), edge_falloff(uv.y, border)],
            };
        }
    }

    let mut indices = Vec::with_capacity(((verts_x - 1) * (verts_y - 1) * 6) as usize);
    for x in 0..verts_x - 1 {
        for y in 0..verts_y - 1 {
            let i0 = x + y * verts_x;
            let i1 = x + (y + 1) * verts_x;
            let i2 = (x + 1) + y * verts_x;
            let i3 = (x + 1) + (y + 1) * verts_x;
            indices.extend_from_slice(&[i0, i1, i2, i1, i3, i2]);
        }
    }

    let mut bounds = Aabb::EMPTY;
    bounds.expand_to_include(Vec3::new(vertices[0].position[0], vertices[0].position[1], 0.0));
    let last = vertices[vertices.len() - 1].position;
    bounds.expand_to_include(Vec3::new(last[0], last[1], 0.0));

    Ok(GridMesh {
        id: MeshId::next(),
        name: GRID_MESH_NAME.to_string(),
        vertices,
        indices,
        bounds,
        verts_x,
        verts_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_tile(verts_x: u32, verts_y: u32) -> GridMesh {
        build_tile(verts_x, verts_y, Vec2::ZERO, Vec2::ONE).unwrap()
    }

    #[test]
    fn test_buffer_sizes() {
        let mesh = full_tile(5, 4);
        assert_eq!(mesh.vertex_count(), 20);
        assert_eq!(mesh.indices.len(), 4 * 3 * 6);
        assert_eq!(mesh.triangle_count(), 24);
        assert_eq!(mesh.name, GRID_MESH_NAME);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_rejects_degenerate_dimensions() {
        assert!(matches!(
            build_tile(1, 4, Vec2::ZERO, Vec2::ONE),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(matches!(
            build_tile(4, 0, Vec2::ZERO, Vec2::ONE),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(build_tile(2, 2, Vec2::ZERO, Vec2::new(0.0, 1.0)).is_err());
        assert!(build_tile(2, 2, Vec2::ZERO, Vec2::new(1.0, f32::NAN)).is_err());
        assert!(build_tile(2, 2, Vec2::new(f32::INFINITY, 0.0), Vec2::ONE).is_err());
    }

    #[test]
    fn test_corner_vertices_are_full_border() {
        let mesh = full_tile(16, 9);
        for (x, y) in [(0, 0), (15, 0), (0, 8), (15, 8)] {
            let v = mesh.vertex(x, y).unwrap();
            assert!((v.texcoord[0] - 1.0).abs() < 1e-5, "falloff x at ({x}, {y})");
            assert!((v.texcoord[1] - 1.0).abs() < 1e-5, "falloff y at ({x}, {y})");
            assert!(v.texcoord[0] <= 1.0 && v.texcoord[1] <= 1.0, "falloff past 1 at ({x}, {y})");
        }
        assert_eq!(mesh.vertex(0, 0).unwrap().position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertex(15, 8).unwrap().position, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_positions_clamped_and_flat() {
        let mesh = full_tile(12, 7);
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.position[0]));
            assert!((0.0..=1.0).contains(&v.position[1]));
            assert_eq!(v.position[2], 0.0);
            assert!((0.0..=1.0).contains(&v.texcoord[0]));
            assert!((0.0..=1.0).contains(&v.texcoord[1]));
        }
    }

    #[test]
    fn test_interior_has_no_falloff() {
        let mesh = full_tile(11, 11);
        let centre = mesh.vertex(5, 5).unwrap();
        assert_eq!(centre.texcoord, [0.0, 0.0]);
        assert!((centre.position[0] - 0.5).abs() < 1e-5);
        assert!((centre.position[1] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_falloff_is_quadratic() {
        // 0.05 past the edge is half the border, so a quarter of the falloff.
        assert!((edge_falloff(-0.05, BORDER_FRACTION) - 0.25).abs() < 1e-5);
        assert!((edge_falloff(1.05, BORDER_FRACTION) - 0.25).abs() < 1e-5);
        assert_eq!(edge_falloff(0.0, BORDER_FRACTION), 0.0);
        assert_eq!(edge_falloff(1.0, BORDER_FRACTION), 0.0);
    }

    #[test]
    fn test_screen_uv_monotonic() {
        let mesh = build_tile(20, 14, Vec2::new(0.25, 0.5), Vec2::new(0.25, 0.5)).unwrap();
        for y in 0..mesh.verts_y {
            for x in 1..mesh.verts_x {
                let prev = mesh.vertex(x - 1, y).unwrap().position[0];
                let cur = mesh.vertex(x, y).unwrap().position[0];
                assert!(cur >= prev);
            }
        }
        for x in 0..mesh.verts_x {
            for y in 1..mesh.verts_y {
                let prev = mesh.vertex(x, y - 1).unwrap().position[1];
                let cur = mesh.vertex(x, y).unwrap().position[1];
                assert!(cur >= prev);
            }
        }
    }

    #[test]
    fn test_consistent_winding() {
        let mesh = full_tile(6, 6);
        let sign = |tri: &[u32]| {
            let p = |i: u32| mesh.vertices[i as usize].position;
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
        };
        // Skip triangles flattened by the clamp at the border.
        let signs: Vec<f32> = mesh
            .indices
            .chunks(3)
            .map(sign)
            .filter(|s| s.abs() > 1e-9)
            .collect();
        assert!(!signs.is_empty());
        assert!(signs.iter().all(|s| s.signum() == signs[0].signum()));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = full_tile(2, 2);
        let b = full_tile(2, 2);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_byte_views() {
        let mesh = full_tile(3, 3);
        assert_eq!(mesh.vertex_bytes().len(), 9 * std::mem::size_of::<GridVertex>());
        assert_eq!(mesh.index_bytes().len(), mesh.indices.len() * 4);
        assert_eq!(std::mem::size_of::<GridVertex>(), 20);
    }

    #[test]
    fn test_initial_bounds_cover_tile() {
        let mesh = full_tile(4, 4);
        assert_eq!(mesh.bounds.min, Vec3::ZERO);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }
}
