//! The island scene: one terrain, one ocean, and the uploads they produce.

use anyhow::{Context, Result};
use heightfield::{MeshChange, NoiseResources, Ocean, Terrain};

use crate::config::DemoConfig;
use crate::script::Command;
use crate::upload::UploadStats;

pub struct Scene {
    pub terrain: Terrain,
    pub ocean: Ocean,
    pub terrain_uploads: UploadStats,
    pub ocean_uploads: UploadStats,
}

impl Scene {
    pub fn new(config: &DemoConfig, resources: &NoiseResources) -> Result<Self> {
        let terrain = Terrain::new(config.terrain.clone(), resources)
            .context("Failed to build terrain")?;
        let ocean = Ocean::new(config.ocean.clone()).context("Failed to build ocean")?;

        let mut terrain_uploads = UploadStats::default();
        terrain_uploads.upload(terrain.mesh(), MeshChange::Rebuilt);
        let mut ocean_uploads = UploadStats::default();
        ocean_uploads.upload(ocean.mesh(), MeshChange::Rebuilt);

        Ok(Self {
            terrain,
            ocean,
            terrain_uploads,
            ocean_uploads,
        })
    }

    /// Apply one input command, uploading whatever it changed.
    pub fn apply(&mut self, command: Command) {
        let change = match command {
            Command::SetTerrainType(t) => {
                log::info!("Terrain: {}", t);
                self.terrain.set_type(t)
            }
            Command::SetHeightScale(h) => self.terrain.set_height_scale(h),
            Command::SetNoiseFrequency(f) => self.terrain.set_noise_frequency(f),
            Command::SetShapingMode(mode) => {
                log::info!("Shaping mode: {:?}", mode);
                self.terrain.set_shaping_mode(mode)
            }
            Command::Regenerate => self.terrain.regenerate(),
            Command::RaiseWaveHeight(delta) => {
                self.ocean.set_wave_height(self.ocean.wave_height() + delta);
                log::info!("Wave height: {}", self.ocean.wave_height());
                MeshChange::Unchanged
            }
            Command::SetWaveSpeed(speed) => {
                self.ocean.set_wave_speed(speed);
                log::info!("Wave speed: {}", speed);
                MeshChange::Unchanged
            }
            Command::SetWaveFrequency(freq) => {
                self.ocean.set_wave_frequency(freq);
                MeshChange::Unchanged
            }
            Command::ProbeHeight { x, z } => {
                log::info!(
                    "Probe ({}, {}): terrain {:.3} m, ocean {:.3} m",
                    x,
                    z,
                    self.terrain.height_at(x, z),
                    self.ocean.surface_height_at(x, z)
                );
                MeshChange::Unchanged
            }
        };
        self.terrain_uploads.upload(self.terrain.mesh(), change);
    }

    /// Per-frame work: only the ocean animates.
    pub fn update(&mut self, dt: f32) {
        let change = self.ocean.update(dt);
        self.ocean_uploads.upload(self.ocean.mesh(), change);
    }

    pub fn terrain_summary(&self) -> TerrainSummary {
        TerrainSummary::measure(&self.terrain)
    }
}

/// Elevation statistics over the terrain mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSummary {
    pub min_height: f32,
    pub max_height: f32,
    /// Fraction of vertices above sea level.
    pub land_fraction: f32,
}

impl TerrainSummary {
    pub fn measure(terrain: &Terrain) -> Self {
        let positions = terrain.mesh().positions();
        let (min_height, max_height) = positions
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let land = positions.iter().filter(|p| p.y > 0.0).count();
        Self {
            min_height,
            max_height,
            land_fraction: land as f32 / positions.len().max(1) as f32,
        }
    }
}
