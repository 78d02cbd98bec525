//! Terrain surface: owns a shaping pipeline and the mesh sampled from it, and
//! rebuilds that mesh whenever a shape parameter actually changes.
//!
//! **Reproducibility:** the Voronoi cells come from a fixed seed, and with a seeded
//! [`NoiseResources`] the permutation table does too, so recreating a terrain from
//! the same config recreates the same mesh.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result};
use crate::grid::{validate_grid, HeightfieldMesh, MeshChange};
use crate::kernel::{NoiseKernel, PermutationTable};
use crate::resources::NoiseResources;
use crate::shaping::{erosion_filter, ShapingMode, TerrainShaper, TerrainType};
use crate::voronoi::{VoronoiCellSet, VORONOI_CELL_COUNT, VORONOI_SEED};

/// Configuration for a terrain surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Grid subdivisions per side. Fixed for the terrain's lifetime.
    pub resolution: u32,
    /// World-space extent of the square. Fixed for the terrain's lifetime.
    pub size: f32,
    /// Peak elevation scale.
    pub height_scale: f32,
    /// Starting frequency of every fBm sum (lower = smoother).
    pub noise_frequency: f32,
    pub terrain_type: TerrainType,
    pub shaping: ShapingMode,
    /// Seed for the Voronoi cell scatter.
    pub voronoi_seed: u64,
    pub voronoi_cells: usize,
    /// Run the slope erosion filter after every rebuild.
    pub erosion: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            size: 1024.0,
            height_scale: 55.0,
            noise_frequency: 1.0,
            terrain_type: TerrainType::Island,
            shaping: ShapingMode::default(),
            voronoi_seed: VORONOI_SEED,
            voronoi_cells: VORONOI_CELL_COUNT,
            erosion: false,
        }
    }
}

/// A shaped terrain and its current mesh.
#[derive(Debug, Clone)]
pub struct Terrain {
    shaper: TerrainShaper,
    mesh: HeightfieldMesh,
    erosion: bool,
}

impl Terrain {
    /// Build a terrain sampling the manager's shared permutation table.
    pub fn new(config: TerrainConfig, resources: &NoiseResources) -> Result<Self> {
        Self::with_table(config, resources.acquire_permutation())
    }

    /// Build a terrain over an explicit permutation table.
    pub fn with_table(config: TerrainConfig, table: Arc<PermutationTable>) -> Result<Self> {
        validate_grid(config.resolution, config.size)?;
        ensure_finite("height scale", config.height_scale)?;
        ensure_finite("noise frequency", config.noise_frequency)?;
        config.shaping.validate()?;

        let shaper = TerrainShaper::new(
            NoiseKernel::new(table, config.noise_frequency),
            VoronoiCellSet::generate(config.voronoi_seed, config.voronoi_cells, config.size),
            config.size,
            config.height_scale,
            config.terrain_type,
            config.shaping,
        );

        let mut mesh = HeightfieldMesh::generate(config.resolution, config.size, |x, z| {
            shaper.final_height(x, z)
        })?;
        if config.erosion {
            mesh.filter_by_slope(erosion_filter);
        }

        log::info!(
            "Generated {} terrain: {}x{} grid over {} m, {} vertices",
            config.terrain_type,
            config.resolution,
            config.resolution,
            config.size,
            mesh.vertex_count()
        );

        Ok(Self {
            shaper,
            mesh,
            erosion: config.erosion,
        })
    }

    pub fn mesh(&self) -> &HeightfieldMesh {
        &self.mesh
    }

    pub fn shaper(&self) -> &TerrainShaper {
        &self.shaper
    }

    pub fn resolution(&self) -> u32 {
        self.mesh.resolution()
    }

    pub fn size(&self) -> f32 {
        self.mesh.size()
    }

    pub fn terrain_type(&self) -> TerrainType {
        self.shaper.terrain_type()
    }

    pub fn height_scale(&self) -> f32 {
        self.shaper.max_height()
    }

    pub fn noise_frequency(&self) -> f32 {
        self.shaper.noise_frequency()
    }

    pub fn shaping_mode(&self) -> ShapingMode {
        self.shaper.mode()
    }

    pub fn erosion(&self) -> bool {
        self.erosion
    }

    /// Analytic elevation at a world coordinate for the current parameters.
    pub fn final_height(&self, x: f32, z: f32) -> f32 {
        self.shaper.final_height(x, z)
    }

    /// Elevation read from the built mesh (bilinear); `0` outside the terrain.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        self.mesh.height_at(world_x, world_z)
    }

    /// Resample the whole grid and recompute normals.
    pub fn regenerate(&mut self) -> MeshChange {
        let shaper = &self.shaper;
        self.mesh.rebuild(|x, z| shaper.final_height(x, z));
        if self.erosion {
            self.mesh.filter_by_slope(erosion_filter);
        }

        log::debug!(
            "Regenerated {} terrain (height {}, frequency {}, revision {})",
            self.shaper.terrain_type(),
            self.shaper.max_height(),
            self.shaper.noise_frequency(),
            self.mesh.revision()
        );
        MeshChange::Rebuilt
    }

    pub fn set_type(&mut self, terrain_type: TerrainType) -> MeshChange {
        if terrain_type == self.shaper.terrain_type() {
            log::debug!("Terrain already {}, skipping rebuild", terrain_type);
            return MeshChange::Unchanged;
        }
        self.shaper.set_terrain_type(terrain_type);
        self.regenerate()
    }

    pub fn set_height_scale(&mut self, height_scale: f32) -> MeshChange {
        if !accept("height scale", height_scale, self.shaper.max_height()) {
            return MeshChange::Unchanged;
        }
        self.shaper.set_max_height(height_scale);
        self.regenerate()
    }

    pub fn set_noise_frequency(&mut self, frequency: f32) -> MeshChange {
        if !accept("noise frequency", frequency, self.shaper.noise_frequency()) {
            return MeshChange::Unchanged;
        }
        self.shaper.set_noise_frequency(frequency);
        self.regenerate()
    }

    pub fn set_shaping_mode(&mut self, mode: ShapingMode) -> MeshChange {
        if let Err(e) = mode.validate() {
            log::warn!("Ignoring shaping mode {:?}: {}", mode, e);
            return MeshChange::Unchanged;
        }
        if mode == self.shaper.mode() {
            return MeshChange::Unchanged;
        }
        self.shaper.set_mode(mode);
        self.regenerate()
    }
}

/// Whether a scalar setter should rebuild: finite and actually different.
fn accept(name: &str, value: f32, current: f32) -> bool {
    if !value.is_finite() {
        log::warn!("Ignoring non-finite {}: {}", name, value);
        return false;
    }
    value != current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeightfieldError;

    fn config() -> TerrainConfig {
        TerrainConfig {
            resolution: 32,
            size: 100.0,
            height_scale: 20.0,
            ..Default::default()
        }
    }

    fn terrain(config: TerrainConfig) -> Terrain {
        Terrain::new(config, &NoiseResources::seeded(1234)).unwrap()
    }

    #[test]
    fn construction_validates_parameters() {
        let resources = NoiseResources::seeded(1);
        let bad_res = TerrainConfig {
            resolution: 0,
            ..config()
        };
        assert!(matches!(
            Terrain::new(bad_res, &resources),
            Err(HeightfieldError::ZeroResolution)
        ));
        let bad_height = TerrainConfig {
            height_scale: f32::INFINITY,
            ..config()
        };
        assert!(matches!(
            Terrain::new(bad_height, &resources),
            Err(HeightfieldError::NonFinite { .. })
        ));
    }

    #[test]
    fn non_finite_falloff_exponent_is_refused() {
        let nan_falloff = ShapingMode::Simple {
            falloff_exponent: f32::NAN,
        };
        let bad = TerrainConfig {
            shaping: nan_falloff,
            ..config()
        };
        assert!(matches!(
            Terrain::new(bad, &NoiseResources::seeded(1)),
            Err(HeightfieldError::NonFinite { .. })
        ));

        let mut t = terrain(config());
        assert_eq!(t.set_shaping_mode(nan_falloff), MeshChange::Unchanged);
        assert_eq!(t.shaping_mode(), ShapingMode::default());
        assert!(t.mesh().positions().iter().all(|p| p.y.is_finite()));
        assert!(t.mesh().normals().iter().all(|n| n.is_finite()));
    }

    #[test]
    fn mesh_vertices_follow_final_height() {
        let t = terrain(config());
        for p in t.mesh().positions().iter().step_by(37) {
            assert_eq!(p.y, t.final_height(p.x, p.z));
        }
    }

    #[test]
    fn same_type_twice_is_a_no_op() {
        let mut t = terrain(config());
        assert_eq!(t.set_type(TerrainType::Ridged), MeshChange::Rebuilt);
        let before = t.mesh().clone();
        assert_eq!(t.set_type(TerrainType::Ridged), MeshChange::Unchanged);
        assert_eq!(t.mesh(), &before);
        assert_eq!(t.mesh().revision(), before.revision());
    }

    #[test]
    fn repeated_scalar_settings_are_no_ops() {
        let mut t = terrain(config());
        assert_eq!(t.set_height_scale(20.0), MeshChange::Unchanged);
        assert_eq!(t.set_noise_frequency(1.0), MeshChange::Unchanged);
        assert_eq!(t.set_height_scale(f32::NAN), MeshChange::Unchanged);
        assert_eq!(t.set_shaping_mode(ShapingMode::default()), MeshChange::Unchanged);
        assert_eq!(t.mesh().revision(), 0);
    }

    #[test]
    fn flat_terrain_queries_zero() {
        let mut t = terrain(TerrainConfig {
            shaping: ShapingMode::LayeredCoastal,
            ..config()
        });
        assert_eq!(t.set_height_scale(0.0), MeshChange::Rebuilt);
        for i in 0..40 {
            let v = i as f32 * 2.3 - 45.0;
            assert_eq!(t.height_at(v, v * 0.7), 0.0);
        }
        assert_eq!(t.height_at(50.5, 0.0), 0.0);
        assert_eq!(t.height_at(0.0, -51.0), 0.0);
    }

    #[test]
    fn query_outside_extent_is_zero() {
        let t = terrain(config());
        assert_eq!(t.height_at(60.0, 0.0), 0.0);
        assert_eq!(t.height_at(0.0, -60.0), 0.0);
        assert_eq!(t.height_at(-1.0e6, 1.0e6), 0.0);
    }

    #[test]
    fn shared_resources_reproduce_terrain() {
        let resources = NoiseResources::seeded(99);
        let a = Terrain::new(config(), &resources).unwrap();
        let b = Terrain::new(config(), &resources).unwrap();
        assert!(Arc::ptr_eq(a.shaper().kernel().table(), b.shaper().kernel().table()));
        assert_eq!(a.mesh(), b.mesh());
    }

    #[test]
    fn dropping_last_terrain_releases_table() {
        let resources = NoiseResources::seeded(7);
        let t = Terrain::new(config(), &resources).unwrap();
        assert_eq!(resources.live_handles(), 1);
        drop(t);
        assert_eq!(resources.live_handles(), 0);
    }

    #[test]
    fn every_type_and_mode_builds_finite_unit_normals() {
        for mode in [ShapingMode::default(), ShapingMode::LayeredCoastal] {
            let mut t = terrain(TerrainConfig {
                shaping: mode,
                ..config()
            });
            for ty in TerrainType::ALL {
                t.set_type(ty);
                assert!(t.mesh().positions().iter().all(|p| p.y.is_finite()));
                for n in t.mesh().normals() {
                    assert!((n.length() - 1.0).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn erosion_lowers_slopes() {
        let plain = terrain(TerrainConfig {
            terrain_type: TerrainType::Ridged,
            ..config()
        });
        let eroded = terrain(TerrainConfig {
            terrain_type: TerrainType::Ridged,
            erosion: true,
            ..config()
        });
        for (a, b) in plain.mesh().positions().iter().zip(eroded.mesh().positions()) {
            assert!(b.y <= a.y + 1e-6);
            assert!(b.y >= a.y * 0.7 - 1e-4);
        }
    }

    #[test]
    fn frequency_change_rebuilds() {
        let mut t = terrain(config());
        assert_eq!(t.set_noise_frequency(2.5), MeshChange::Rebuilt);
        assert_eq!(t.noise_frequency(), 2.5);
        assert_eq!(t.mesh().revision(), 1);
        for p in t.mesh().positions().iter().step_by(53) {
            assert_eq!(p.y, t.final_height(p.x, p.z));
        }
    }
}
