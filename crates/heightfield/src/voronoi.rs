//! Seeded point set and the nearest-cell distance field used by the Voronoi
//! terrain type.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Cells scattered over a terrain.
pub const VORONOI_CELL_COUNT: usize = 64;

/// Fixed seed, so re-creating a terrain re-creates the same cells.
pub const VORONOI_SEED: u64 = 0x5eed_ce11;

/// Field falloff radius as a fraction of the surface size.
const FALLOFF_FRACTION: f32 = 0.1;

/// Cell centers in world units, spread over `[-size/2, size/2]` on both axes.
///
/// Built once per terrain and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCellSet {
    cells: Vec<Vec2>,
    size: f32,
}

impl VoronoiCellSet {
    pub fn generate(seed: u64, count: usize, size: f32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = (0..count)
            .map(|_| Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)) * size)
            .collect();
        Self { cells, size }
    }

    pub fn cells(&self) -> &[Vec2] {
        &self.cells
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Euclidean distance to the closest cell center (infinite for an empty set).
    pub fn nearest_distance(&self, point: Vec2) -> f32 {
        self.cells
            .iter()
            .map(|cell| cell.distance(point))
            .fold(f32::INFINITY, f32::min)
    }

    /// `1` at a cell center, falling linearly to `0` at a tenth of the surface size.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let d = self.nearest_distance(Vec2::new(x, y));
        1.0 - (d / (self.size * FALLOFF_FRACTION)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_cells() {
        let a = VoronoiCellSet::generate(VORONOI_SEED, VORONOI_CELL_COUNT, 100.0);
        let b = VoronoiCellSet::generate(VORONOI_SEED, VORONOI_CELL_COUNT, 100.0);
        assert_eq!(a, b);
        assert_eq!(a.cells().len(), VORONOI_CELL_COUNT);
    }

    #[test]
    fn cells_lie_inside_surface() {
        let set = VoronoiCellSet::generate(3, 200, 50.0);
        for c in set.cells() {
            assert!(c.x.abs() <= 25.0 && c.y.abs() <= 25.0);
        }
    }

    #[test]
    fn field_peaks_at_cell_and_fades_out() {
        let set = VoronoiCellSet::generate(9, 16, 100.0);
        let c = set.cells()[0];
        assert_eq!(set.sample(c.x, c.y), 1.0);
        assert_eq!(set.sample(1.0e4, 1.0e4), 0.0);
    }

    #[test]
    fn empty_set_samples_zero() {
        let set = VoronoiCellSet::generate(1, 0, 10.0);
        assert_eq!(set.sample(0.0, 0.0), 0.0);
    }
}
