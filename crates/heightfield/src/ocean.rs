//! Ocean surface: a flat grid displaced every frame by the Gerstner wave field.
//!
//! Frame updates are patches. Only heights and normals are rewritten; the index
//! buffer and UVs built at construction are reused for the ocean's lifetime.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result};
use crate::grid::{validate_grid, HeightfieldMesh, MeshChange};
use crate::wave::{WaveComponent, WaveField, WAVE_SEED};

/// Configuration for an ocean surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// World-space extent of the square.
    pub size: f32,
    /// Grid subdivisions per side.
    pub resolution: u32,
    /// Global multiplier on every wave amplitude.
    pub wave_height: f32,
    /// Global multiplier on every wave's travel speed.
    pub wave_speed: f32,
    /// Rate at which frame time advances the wave clock.
    pub wave_frequency: f32,
    /// Seed for the randomized detail waves.
    pub wave_seed: u64,
    /// Texture repeats across the surface.
    pub uv_repeat: f32,
    /// Explicit wave set. `None` uses the default sea state from `wave_seed`.
    pub waves: Option<Vec<WaveComponent>>,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            size: 1024.0,
            resolution: 200,
            wave_height: 0.5,
            wave_speed: 1.0,
            wave_frequency: 1.0,
            wave_seed: WAVE_SEED,
            uv_repeat: 10.0,
            waves: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ocean {
    field: WaveField,
    mesh: HeightfieldMesh,
    wave_frequency: f32,
    time: f32,
}

impl Ocean {
    pub fn new(config: OceanConfig) -> Result<Self> {
        validate_grid(config.resolution, config.size)?;
        ensure_finite("wave height", config.wave_height)?;
        ensure_finite("wave speed", config.wave_speed)?;
        ensure_finite("wave frequency", config.wave_frequency)?;

        let field = match config.waves {
            Some(waves) => WaveField::new(waves, config.wave_speed, config.wave_height)?,
            None => WaveField::seeded(config.wave_seed, config.wave_speed, config.wave_height),
        };
        let mesh = HeightfieldMesh::generate_with_uv_scale(
            config.resolution,
            config.size,
            config.uv_repeat,
            |_, _| 0.0,
        )?;

        log::info!(
            "Created ocean: {}x{} grid over {} m, {} wave components",
            config.resolution,
            config.resolution,
            config.size,
            field.components().len()
        );

        Ok(Self {
            field,
            mesh,
            wave_frequency: config.wave_frequency,
            time: 0.0,
        })
    }

    pub fn mesh(&self) -> &HeightfieldMesh {
        &self.mesh
    }

    pub fn wave_field(&self) -> &WaveField {
        &self.field
    }

    /// Wave clock, advanced by `dt * wave_frequency` per update.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn wave_speed(&self) -> f32 {
        self.field.speed()
    }

    pub fn wave_height(&self) -> f32 {
        self.field.height()
    }

    pub fn wave_frequency(&self) -> f32 {
        self.wave_frequency
    }

    pub fn set_wave_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.field.set_speed(speed);
        } else {
            log::warn!("Ignoring non-finite wave speed: {}", speed);
        }
    }

    pub fn set_wave_height(&mut self, height: f32) {
        if height.is_finite() {
            self.field.set_height(height);
        } else {
            log::warn!("Ignoring non-finite wave height: {}", height);
        }
    }

    pub fn set_wave_frequency(&mut self, frequency: f32) {
        if frequency.is_finite() {
            self.wave_frequency = frequency;
        } else {
            log::warn!("Ignoring non-finite wave frequency: {}", frequency);
        }
    }

    /// Advance the wave clock and patch every vertex height and normal.
    pub fn update(&mut self, dt: f32) -> MeshChange {
        if !dt.is_finite() {
            log::warn!("Ignoring non-finite time step: {}", dt);
            return MeshChange::Unchanged;
        }
        self.time += dt * self.wave_frequency;

        let (field, t) = (&self.field, self.time);
        self.mesh.patch(|x, z| field.sample(x, z, t));

        log::trace!("Ocean patched at t={:.3}", self.time);
        MeshChange::Patched
    }

    /// Analytic wave height at `(x, z)` and an arbitrary time.
    pub fn height_at(&self, world_x: f32, world_z: f32, t: f32) -> f32 {
        self.field.height_at(world_x, world_z, t)
    }

    /// Analytic surface normal at `(x, z)` and an arbitrary time.
    pub fn normal_at(&self, world_x: f32, world_z: f32, t: f32) -> Vec3 {
        self.field.normal_at(world_x, world_z, t)
    }

    /// Height read from the last patched mesh; `0` outside the surface.
    pub fn surface_height_at(&self, world_x: f32, world_z: f32) -> f32 {
        self.mesh.height_at(world_x, world_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeightfieldError;

    fn config() -> OceanConfig {
        OceanConfig {
            size: 120.0,
            resolution: 24,
            wave_height: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn starts_flat() {
        let ocean = Ocean::new(config()).unwrap();
        assert_eq!(ocean.time(), 0.0);
        assert!(ocean.mesh().positions().iter().all(|p| p.y == 0.0));
        for n in ocean.mesh().normals() {
            assert!((*n - Vec3::Y).length() < 1e-6);
        }
        assert_eq!(*ocean.mesh().uvs().last().unwrap(), glam::Vec2::splat(10.0));
    }

    #[test]
    fn identical_seeds_give_identical_waves() {
        let a = Ocean::new(config()).unwrap();
        let b = Ocean::new(config()).unwrap();
        for i in 0..20 {
            let (x, z, t) = (i as f32 * 5.5 - 50.0, i as f32 * 3.1, i as f32 * 0.37);
            assert_eq!(a.height_at(x, z, t).to_bits(), b.height_at(x, z, t).to_bits());
        }
    }

    #[test]
    fn update_patches_heights_and_normals() {
        let mut ocean = Ocean::new(config()).unwrap();
        let indices = ocean.mesh().indices().to_vec();
        assert_eq!(ocean.update(0.25), MeshChange::Patched);
        assert_eq!(ocean.time(), 0.25);
        assert_eq!(ocean.mesh().indices(), &indices[..]);
        assert_eq!(ocean.mesh().revision(), 1);

        let t = ocean.time();
        for (p, n) in ocean.mesh().positions().iter().zip(ocean.mesh().normals()) {
            assert_eq!(p.y, ocean.height_at(p.x, p.z, t));
            assert_eq!(*n, ocean.normal_at(p.x, p.z, t));
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn wave_frequency_scales_the_clock() {
        let mut ocean = Ocean::new(config()).unwrap();
        ocean.set_wave_frequency(2.0);
        ocean.update(0.5);
        assert_eq!(ocean.time(), 1.0);
        assert_eq!(ocean.update(f32::NAN), MeshChange::Unchanged);
        assert_eq!(ocean.time(), 1.0);
    }

    #[test]
    fn surface_query_reads_patched_mesh() {
        let mut ocean = Ocean::new(config()).unwrap();
        ocean.update(1.0);
        let p = ocean.mesh().positions()[30];
        assert!((ocean.surface_height_at(p.x, p.z) - p.y).abs() < 1e-5);
        assert_eq!(ocean.surface_height_at(1000.0, 0.0), 0.0);
    }

    #[test]
    fn custom_wave_set_is_validated() {
        let empty = OceanConfig {
            waves: Some(Vec::new()),
            ..config()
        };
        assert_eq!(
            Ocean::new(empty).unwrap_err(),
            HeightfieldError::NoWaveComponents
        );

        let flat = OceanConfig {
            waves: Some(vec![WaveComponent::new(0.0, 1.0, 1.0, glam::Vec2::X)]),
            ..config()
        };
        assert_eq!(
            Ocean::new(flat).unwrap_err(),
            HeightfieldError::InvalidWavelength(0.0)
        );

        let single = OceanConfig {
            waves: Some(vec![WaveComponent::new(20.0, 0.5, 1.0, glam::Vec2::Y)]),
            ..config()
        };
        assert_eq!(Ocean::new(single).unwrap().wave_field().components().len(), 1);
    }

    #[test]
    fn setters_take_effect_on_next_patch() {
        let mut ocean = Ocean::new(config()).unwrap();
        ocean.update(0.3);
        let before = ocean.mesh().positions()[40].y;
        ocean.set_wave_height(2.0);
        assert_eq!(ocean.mesh().positions()[40].y, before);
        ocean.update(0.0);
        assert!((ocean.mesh().positions()[40].y - 2.0 * before).abs() < 1e-4);
    }
}
