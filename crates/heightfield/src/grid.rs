//! Regular-grid heightfield meshes: sampling, triangulation, area-weighted
//! normals, in-place patching, and bilinear height queries.
//!
//! Two update contracts exist. A full build ([`HeightfieldMesh::generate`])
//! replaces every array including topology. A patch ([`HeightfieldMesh::patch`])
//! rewrites only heights and normals; indices and UVs stay untouched.

use glam::{Vec2, Vec3};

use crate::error::{HeightfieldError, Result};
use crate::vertex::Vertex;

/// Accumulated normals shorter than this fall back to straight up.
pub const NORMAL_EPSILON: f32 = 1e-6;

/// What a parameter change or frame step did to a surface's mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshChange {
    /// Nothing to upload.
    Unchanged,
    /// Every array replaced, topology included.
    Rebuilt,
    /// Heights and normals rewritten in place; indices and UVs unchanged.
    Patched,
}

/// Check grid dimensions before anything is allocated.
pub fn validate_grid(resolution: u32, size: f32) -> Result<()> {
    if resolution == 0 {
        return Err(HeightfieldError::ZeroResolution);
    }
    if (resolution as u64 + 1).pow(2) > u32::MAX as u64 {
        return Err(HeightfieldError::ResolutionTooLarge(resolution));
    }
    if !(size.is_finite() && size > 0.0) {
        return Err(HeightfieldError::InvalidSize(size));
    }
    Ok(())
}

/// `(resolution + 1)²` vertices on a uniform lattice over `[-size/2, size/2]²`,
/// stored row-major with x varying fastest, and two triangles per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightfieldMesh {
    resolution: u32,
    size: f32,
    uv_scale: f32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    revision: u64,
}

impl HeightfieldMesh {
    /// Build a mesh with UVs spanning `[0, 1]`.
    pub fn generate(
        resolution: u32,
        size: f32,
        height_fn: impl FnMut(f32, f32) -> f32,
    ) -> Result<Self> {
        Self::generate_with_uv_scale(resolution, size, 1.0, height_fn)
    }

    /// Build a mesh whose UVs span `[0, uv_scale]`, sampling `height_fn(x, z)` at
    /// every vertex, then compute normals.
    pub fn generate_with_uv_scale(
        resolution: u32,
        size: f32,
        uv_scale: f32,
        height_fn: impl FnMut(f32, f32) -> f32,
    ) -> Result<Self> {
        validate_grid(resolution, size)?;
        Ok(Self::build(resolution, size, uv_scale, height_fn))
    }

    fn build(
        resolution: u32,
        size: f32,
        uv_scale: f32,
        mut height_fn: impl FnMut(f32, f32) -> f32,
    ) -> Self {
        let row = resolution as usize + 1;
        let vertex_count = row * row;
        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);

        for z in 0..row {
            for x in 0..row {
                let fx = x as f32 / resolution as f32;
                let fz = z as f32 / resolution as f32;
                let wx = (fx - 0.5) * size;
                let wz = (fz - 0.5) * size;

                positions.push(Vec3::new(wx, height_fn(wx, wz), wz));
                uvs.push(Vec2::new(fx, fz) * uv_scale);
            }
        }

        let mut mesh = Self {
            resolution,
            size,
            uv_scale,
            positions,
            normals: vec![Vec3::Y; vertex_count],
            uvs,
            indices: grid_indices(resolution),
            revision: 0,
        };
        mesh.compute_normals();
        mesh
    }

    /// Full rebuild over the same grid: every array is replaced wholesale.
    pub fn rebuild(&mut self, height_fn: impl FnMut(f32, f32) -> f32) {
        let revision = self.revision + 1;
        *self = Self::build(self.resolution, self.size, self.uv_scale, height_fn);
        self.revision = revision;
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bumped on every rebuild, patch, or filter; a freshly generated mesh
    /// starts at zero.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Interleaved `position, normal, uv` vertices for a GPU upload.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| Vertex::new(p.to_array(), n.to_array(), uv.to_array()))
            .collect()
    }

    /// Area-weighted vertex normals: each triangle adds its unnormalized face
    /// normal to its three corners, then every sum is normalized.
    pub fn compute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[a];
            let face = (self.positions[b] - p0).cross(self.positions[c] - p0);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }

        for (normal, sum) in self.normals.iter_mut().zip(accum) {
            // Rescale by the largest component first so huge sums can't overflow
            // the length. NaN components fail `try_normalize`.
            let largest = sum.abs().max_element();
            *normal = if largest.is_finite() && largest >= NORMAL_EPSILON {
                (sum / largest).try_normalize().unwrap_or(Vec3::Y)
            } else {
                Vec3::Y
            };
        }
    }

    /// Rewrite every vertex height and normal from `sample(x, z) -> (y, normal)`.
    /// Topology and UVs are reused as is.
    pub fn patch(&mut self, mut sample: impl FnMut(f32, f32) -> (f32, Vec3)) {
        for (position, normal) in self.positions.iter_mut().zip(self.normals.iter_mut()) {
            let (y, n) = sample(position.x, position.z);
            position.y = y;
            *normal = n;
        }
        self.revision += 1;
    }

    /// Replace each height by `filter(height, slope)`, slope being the gradient
    /// magnitude from central differences on the grid, then recompute normals.
    pub fn filter_by_slope(&mut self, filter: impl Fn(f32, f32) -> f32) {
        let row = self.resolution as usize + 1;
        let cell = self.size / self.resolution as f32;
        let heights: Vec<f32> = self.positions.iter().map(|p| p.y).collect();
        let at = |x: usize, z: usize| heights[z * row + x];

        for z in 0..row {
            for x in 0..row {
                let (xl, xr) = (x.saturating_sub(1), (x + 1).min(row - 1));
                let (zd, zu) = (z.saturating_sub(1), (z + 1).min(row - 1));
                let sx = (at(xr, z) - at(xl, z)) / ((xr - xl) as f32 * cell);
                let sz = (at(x, zu) - at(x, zd)) / ((zu - zd) as f32 * cell);
                let slope = Vec2::new(sx, sz).length();

                let p = &mut self.positions[z * row + x];
                p.y = filter(p.y, slope);
            }
        }

        self.compute_normals();
        self.revision += 1;
    }

    /// Bilinear height from the built mesh at world `(x, z)`.
    ///
    /// Anything outside the grid's extent (including NaN) reads as `0`.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        let res = self.resolution as f32;
        let gx = (world_x / self.size + 0.5) * res;
        let gz = (world_z / self.size + 0.5) * res;

        if !(0.0..res).contains(&gx) || !(0.0..res).contains(&gz) {
            return 0.0;
        }

        let last = self.resolution as usize;
        let row = last + 1;
        let x0 = (gx.floor() as usize).min(last);
        let z0 = (gz.floor() as usize).min(last);
        let x1 = (x0 + 1).min(last);
        let z1 = (z0 + 1).min(last);
        let fx = gx - x0 as f32;
        let fz = gz - z0 as f32;

        let h = |x: usize, z: usize| self.positions[z * row + x].y;
        let top = h(x0, z0) + (h(x1, z0) - h(x0, z0)) * fx;
        let bottom = h(x0, z1) + (h(x1, z1) - h(x0, z1)) * fx;
        top + (bottom - top) * fz
    }
}

/// Triangle list for a grid: per cell, `(i0, i2, i1)` and `(i1, i2, i3)` with the
/// corners in row-major order, giving upward-facing triangles.
pub fn grid_indices(resolution: u32) -> Vec<u32> {
    let res = resolution as usize;
    let row = resolution + 1;
    let mut indices = Vec::with_capacity(res * res * 6);

    for z in 0..resolution {
        for x in 0..resolution {
            let i0 = z * row + x;
            let i1 = i0 + 1;
            let i2 = i0 + row;
            let i3 = i2 + 1;

            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavy(x: f32, z: f32) -> f32 {
        (x * 0.7).sin() * 2.0 + (z * 0.3).cos() * 3.0
    }

    #[test]
    fn flat_grid_has_up_normals() {
        let mesh = HeightfieldMesh::generate(4, 10.0, |_, _| 0.0).unwrap();
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.indices().len(), 96);
        for n in mesh.normals() {
            assert!((*n - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn topology_invariants_hold() {
        for res in 1..8u32 {
            let mesh = HeightfieldMesh::generate(res, 7.0, wavy).unwrap();
            let count = ((res + 1) * (res + 1)) as usize;
            assert_eq!(mesh.positions().len(), count);
            assert_eq!(mesh.normals().len(), count);
            assert_eq!(mesh.uvs().len(), count);
            assert_eq!(mesh.indices().len(), (6 * res * res) as usize);
            assert!(mesh.indices().iter().all(|&i| (i as usize) < count));
        }
    }

    #[test]
    fn lattice_spans_extent() {
        let mesh = HeightfieldMesh::generate_with_uv_scale(8, 20.0, 10.0, |_, _| 0.0).unwrap();
        let first = mesh.positions()[0];
        let last = *mesh.positions().last().unwrap();
        assert_eq!((first.x, first.z), (-10.0, -10.0));
        assert_eq!((last.x, last.z), (10.0, 10.0));
        assert_eq!(*mesh.uvs().last().unwrap(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn normals_are_unit_and_upward() {
        let mesh = HeightfieldMesh::generate(16, 30.0, wavy).unwrap();
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(n.y > 0.0);
        }
    }

    #[test]
    fn degenerate_geometry_falls_back_to_up() {
        let mut mesh = HeightfieldMesh::generate(3, 5.0, wavy).unwrap();
        mesh.positions.iter_mut().for_each(|p| *p = Vec3::ZERO);
        mesh.compute_normals();
        for n in mesh.normals() {
            assert_eq!(*n, Vec3::Y);
        }
    }

    #[test]
    fn extreme_heights_still_give_unit_normals() {
        let mut mesh = HeightfieldMesh::generate(2, 4.0, |x, z| {
            if x == 0.0 && z == 0.0 {
                1.0e20
            } else {
                0.0
            }
        })
        .unwrap();
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-5, "{:?}", n);
        }

        mesh.positions[4].y = f32::NAN;
        mesh.compute_normals();
        for n in mesh.normals() {
            assert!(n.is_finite());
            assert!((n.length() - 1.0).abs() < 1e-5, "{:?}", n);
        }
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        assert_eq!(
            HeightfieldMesh::generate(0, 1.0, |_, _| 0.0),
            Err(HeightfieldError::ZeroResolution)
        );
        assert_eq!(
            HeightfieldMesh::generate(70_000, 1.0, |_, _| 0.0),
            Err(HeightfieldError::ResolutionTooLarge(70_000))
        );
        assert!(matches!(
            HeightfieldMesh::generate(4, -1.0, |_, _| 0.0),
            Err(HeightfieldError::InvalidSize(_))
        ));
        assert!(matches!(
            HeightfieldMesh::generate(4, f32::NAN, |_, _| 0.0),
            Err(HeightfieldError::InvalidSize(_))
        ));
    }

    #[test]
    fn height_query_outside_extent_is_zero() {
        let mesh = HeightfieldMesh::generate(8, 10.0, |_, _| 4.0).unwrap();
        assert_eq!(mesh.height_at(0.0, 0.0), 4.0);
        assert_eq!(mesh.height_at(-5.01, 0.0), 0.0);
        assert_eq!(mesh.height_at(0.0, 5.01), 0.0);
        assert_eq!(mesh.height_at(5.0, 0.0), 0.0);
        assert_eq!(mesh.height_at(f32::NAN, 0.0), 0.0);
    }

    #[test]
    fn height_query_is_bilinear() {
        let mesh = HeightfieldMesh::generate(4, 4.0, |x, z| x + 2.0 * z).unwrap();
        // Plane is linear, so bilinear interpolation reproduces it exactly.
        for &(x, z) in &[(0.3, -1.2), (-1.9, 1.7), (1.5, 0.5)] {
            assert!((mesh.height_at(x, z) - (x + 2.0 * z)).abs() < 1e-5);
        }
    }

    #[test]
    fn height_query_at_far_edge_stays_in_bounds() {
        let mesh = HeightfieldMesh::generate(5, 10.0, wavy).unwrap();
        let h = mesh.height_at(4.9999, 4.9999);
        assert!(h.is_finite());
    }

    #[test]
    fn flat_mesh_queries_zero_everywhere() {
        let mesh = HeightfieldMesh::generate(6, 12.0, |_, _| 0.0).unwrap();
        for i in 0..30 {
            let v = i as f32 * 0.41 - 6.0;
            assert_eq!(mesh.height_at(v, -v * 0.5), 0.0);
        }
    }

    #[test]
    fn patch_keeps_topology() {
        let mut mesh = HeightfieldMesh::generate(6, 12.0, |_, _| 0.0).unwrap();
        let indices = mesh.indices().to_vec();
        let uvs = mesh.uvs().to_vec();
        mesh.patch(|x, z| (x * 0.1 + z, Vec3::X));
        assert_eq!(mesh.indices(), &indices[..]);
        assert_eq!(mesh.uvs(), &uvs[..]);
        assert_eq!(mesh.revision(), 1);
        let p = mesh.positions()[10];
        assert_eq!(p.y, p.x * 0.1 + p.z);
        assert!(mesh.normals().iter().all(|n| *n == Vec3::X));
    }

    #[test]
    fn slope_filter_leaves_flat_ground_alone() {
        let mut mesh = HeightfieldMesh::generate(4, 8.0, |_, _| 2.0).unwrap();
        mesh.filter_by_slope(crate::shaping::erosion_filter);
        assert!(mesh.positions().iter().all(|p| p.y == 2.0));

        let mut steep = HeightfieldMesh::generate(4, 8.0, |x, _| x * 10.0).unwrap();
        steep.filter_by_slope(crate::shaping::erosion_filter);
        let p = steep.positions()[8];
        assert!((p.y - p.x * 10.0 * 0.7).abs() < 1e-4);
    }

    #[test]
    fn rebuild_replaces_heights_and_bumps_revision() {
        let mut mesh = HeightfieldMesh::generate(4, 8.0, |_, _| 0.0).unwrap();
        mesh.rebuild(|_, _| 3.0);
        assert_eq!(mesh.revision(), 1);
        assert!(mesh.positions().iter().all(|p| p.y == 3.0));
        assert_eq!(mesh.indices(), &grid_indices(4)[..]);
    }

    #[test]
    fn interleaved_vertices_match_arrays() {
        let mesh = HeightfieldMesh::generate(3, 6.0, wavy).unwrap();
        let verts = mesh.vertices();
        assert_eq!(verts.len(), mesh.vertex_count());
        assert_eq!(verts[5].position, mesh.positions()[5].to_array());
        assert_eq!(verts[5].normal, mesh.normals()[5].to_array());
        assert_eq!(verts[5].uv, mesh.uvs()[5].to_array());
    }
}
