//! Terrain shaping: turns noise into a single elevation per world `(x, z)`.
//!
//! A [`TerrainType`] picks the base noise, a [`ShapingMode`] decides how that noise
//! becomes an island. Simple mode multiplies by a radial falloff. Layered coastal
//! mode builds a full island profile with an ocean floor, shelf, beaches or cliffs,
//! and summit peaks or craters.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ensure_finite;
use crate::kernel::{NoiseKernel, DEFAULT_OCTAVES};
use crate::voronoi::VoronoiCellSet;

/// Base noise family for a terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainType {
    /// Rolling fBm hills.
    #[default]
    Island,
    /// Sharp ridged mountains.
    Ridged,
    /// Cone-shaped bumps around scattered cell centers.
    Voronoi,
    /// fBm cut by sinuous parallel channels.
    Canyon,
    /// Stepped mesas.
    Plateaus,
}

impl TerrainType {
    pub const ALL: [TerrainType; 5] = [
        TerrainType::Island,
        TerrainType::Ridged,
        TerrainType::Voronoi,
        TerrainType::Canyon,
        TerrainType::Plateaus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TerrainType::Island => "island",
            TerrainType::Ridged => "ridged",
            TerrainType::Voronoi => "voronoi",
            TerrainType::Canyon => "canyon",
            TerrainType::Plateaus => "plateaus",
        }
    }

    /// Raw base noise at a world coordinate.
    pub fn base_height(
        self,
        kernel: &NoiseKernel,
        voronoi: &VoronoiCellSet,
        x: f32,
        y: f32,
    ) -> f32 {
        match self {
            TerrainType::Island => kernel.fbm(x * 0.05, y * 0.05, DEFAULT_OCTAVES),
            TerrainType::Ridged => kernel.ridged(x * 0.03, y * 0.03),
            TerrainType::Voronoi => voronoi.sample(x, y),
            TerrainType::Canyon => canyon(kernel, x, y),
            TerrainType::Plateaus => plateaus(kernel, x, y),
        }
    }

    /// Map raw base noise into `[0, 1]`.
    pub fn normalize(self, raw: f32) -> f32 {
        match self {
            // fBm is centered on zero with a practical spread of about ±0.5.
            TerrainType::Island => (raw + 0.5).clamp(0.0, 1.0),
            TerrainType::Ridged
            | TerrainType::Voronoi
            | TerrainType::Canyon
            | TerrainType::Plateaus => raw.clamp(0.0, 1.0),
        }
    }
}

impl std::fmt::Display for TerrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TerrainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TerrainType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown terrain type '{}'", s))
    }
}

/// How base noise is turned into an island.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapingMode {
    /// `max(noise, 0)^1.5 * radial_mask * max_height`. Never below sea level.
    Simple {
        /// Radial falloff exponent, meant to stay within `[2.5, 3]`.
        falloff_exponent: f32,
    },
    /// Five elevation bands keyed by an organic island mask, including terrain
    /// below sea level.
    LayeredCoastal,
}

impl ShapingMode {
    /// A non-finite falloff exponent would turn every height into NaN.
    pub fn validate(self) -> crate::error::Result<()> {
        if let ShapingMode::Simple { falloff_exponent } = self {
            ensure_finite("falloff exponent", falloff_exponent)?;
        }
        Ok(())
    }
}

impl Default for ShapingMode {
    fn default() -> Self {
        ShapingMode::Simple {
            falloff_exponent: 3.0,
        }
    }
}

/// Canyon base: low-frequency fBm plus detail, pulled down along channels that
/// run roughly parallel to the z axis.
pub fn canyon(kernel: &NoiseKernel, x: f32, y: f32) -> f32 {
    let base = kernel.fbm(x * 0.02, y * 0.02, 4);
    let detail = kernel.fbm(x * 0.08, y * 0.08, 3);
    let channel = ((x * 0.05 + detail * 2.0).sin() * 0.5 + 0.5).powi(3);
    (base + detail * 0.35 + 0.3) * (1.0 - 0.85 * channel)
}

/// Plateau steps per unit of height.
pub const PLATEAU_STEPS: f32 = 6.0;

/// Plateaus base: 5-octave fBm quantized into flat steps, with a little surface
/// detail on top.
pub fn plateaus(kernel: &NoiseKernel, x: f32, y: f32) -> f32 {
    let h = kernel.fbm(x * 0.03, y * 0.03, 5) * 0.5 + 0.5;
    terrace(h, PLATEAU_STEPS) + kernel.fbm(x * 0.2, y * 0.2, 2) * 0.03
}

/// Quantize to `steps` levels per unit, rounding down.
#[inline]
pub fn terrace(h: f32, steps: f32) -> f32 {
    (h * steps).floor() / steps
}

/// Radial falloff used by simple mode: `clamp(1 - (dist/size)^p, 0, 1)`.
pub fn radial_island_mask(x: f32, y: f32, size: f32, exponent: f32) -> f32 {
    let d = Vec2::new(x / size, y / size).length();
    (1.0 - d.powf(exponent)).clamp(0.0, 1.0)
}

/// Slope-dependent attenuation: up to 30% lower on slopes of 0.5 and steeper.
#[inline]
pub fn erosion_filter(height: f32, slope: f32) -> f32 {
    height * (1.0 - (slope * 2.0).clamp(0.0, 1.0) * 0.3)
}

// Layered coastal bands, by island-mask value.
pub const DEEP_OCEAN_MASK: f32 = 0.05;
pub const SHELF_MASK: f32 = 0.25;
pub const COAST_MASK: f32 = 0.40;
pub const SUMMIT_MASK: f32 = 0.85;

// Profile heights as fractions of max height.
pub const OCEAN_FLOOR: f32 = -0.35;
const BEACH_TOP: f32 = 0.03;
const CLIFF_TOP: f32 = 0.12;
const INLAND_RISE: f32 = 0.85;
const PEAK_BOOST: f32 = 0.35;
const CRATER_DEPTH: f32 = 0.25;
const RIPPLE_AMPLITUDE: f32 = 0.004;
const ROCK_AMPLITUDE: f32 = 0.015;

/// Inputs to the layered profile at one point, all precomputed from noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoastalSample {
    /// Organic island mask, `1` at the center and `0` in open ocean.
    pub mask: f32,
    /// Normalized base noise in `[0, 1]`.
    pub noise: f32,
    /// Angular coastline noise in `[0, 1]`; low is beach, high is cliff.
    pub coastline: f32,
    /// Beach ripple phase term in `[-1, 1]`.
    pub ripple: f32,
    /// Cliff rock detail in `[-1, 1]`.
    pub rock: f32,
}

/// Elevation (in units of max height) of the layered coastal profile.
///
/// Continuous across every band edge: ripple and rock terms vanish at both
/// ends of the coastline band, and the summit perturbation starts at zero.
pub fn coastal_profile(s: CoastalSample) -> f32 {
    let m = s.mask;

    if m < DEEP_OCEAN_MASK {
        return OCEAN_FLOOR;
    }

    if m < SHELF_MASK {
        let t = (m - DEEP_OCEAN_MASK) / (SHELF_MASK - DEEP_OCEAN_MASK);
        return OCEAN_FLOOR * (1.0 - t).powf(1.8);
    }

    let cliff_weight = smoothstep(0.45, 0.55, s.coastline);
    let coast_top = lerp(BEACH_TOP, CLIFF_TOP, cliff_weight);

    if m < COAST_MASK {
        let t = (m - SHELF_MASK) / (COAST_MASK - SHELF_MASK);
        let bell = 4.0 * t * (1.0 - t);
        let beach = BEACH_TOP * t + RIPPLE_AMPLITUDE * s.ripple * bell;
        let cliff = CLIFF_TOP * t.sqrt() + ROCK_AMPLITUDE * s.rock * bell;
        return lerp(beach, cliff, cliff_weight);
    }

    let t = ((m - COAST_MASK) / (1.0 - COAST_MASK)).min(1.0);
    let mut h = coast_top + t.powf(1.2) * (0.25 + 0.75 * s.noise) * INLAND_RISE;

    if m > SUMMIT_MASK {
        let p = ((m - SUMMIT_MASK) / (1.0 - SUMMIT_MASK)).min(1.0);
        if s.noise > 0.5 {
            h += p * p * (s.noise - 0.5) * 2.0 * PEAK_BOOST;
        } else {
            h -= p * p * (0.5 - s.noise) * 2.0 * CRATER_DEPTH;
        }
    }

    h
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// The full shaping pipeline for one terrain: noise sources plus the current
/// shape parameters.
#[derive(Debug, Clone)]
pub struct TerrainShaper {
    kernel: NoiseKernel,
    voronoi: VoronoiCellSet,
    size: f32,
    max_height: f32,
    terrain_type: TerrainType,
    mode: ShapingMode,
}

impl TerrainShaper {
    pub fn new(
        kernel: NoiseKernel,
        voronoi: VoronoiCellSet,
        size: f32,
        max_height: f32,
        terrain_type: TerrainType,
        mode: ShapingMode,
    ) -> Self {
        Self {
            kernel,
            voronoi,
            size,
            max_height,
            terrain_type,
            mode,
        }
    }

    pub fn kernel(&self) -> &NoiseKernel {
        &self.kernel
    }

    pub fn voronoi(&self) -> &VoronoiCellSet {
        &self.voronoi
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn terrain_type(&self) -> TerrainType {
        self.terrain_type
    }

    pub fn mode(&self) -> ShapingMode {
        self.mode
    }

    pub fn noise_frequency(&self) -> f32 {
        self.kernel.frequency()
    }

    pub fn set_max_height(&mut self, max_height: f32) {
        self.max_height = max_height;
    }

    pub fn set_terrain_type(&mut self, terrain_type: TerrainType) {
        self.terrain_type = terrain_type;
    }

    pub fn set_mode(&mut self, mode: ShapingMode) {
        self.mode = mode;
    }

    pub fn set_noise_frequency(&mut self, frequency: f32) {
        self.kernel.set_frequency(frequency);
    }

    /// Elevation at world `(x, y)` for the current parameters.
    pub fn final_height(&self, x: f32, y: f32) -> f32 {
        let raw = self
            .terrain_type
            .base_height(&self.kernel, &self.voronoi, x, y);

        match self.mode {
            ShapingMode::Simple { falloff_exponent } => {
                let shaped = raw.max(0.0).powf(1.5);
                shaped * radial_island_mask(x, y, self.size, falloff_exponent) * self.max_height
            }
            ShapingMode::LayeredCoastal => {
                let sample = CoastalSample {
                    mask: self.organic_island_mask(x, y),
                    noise: self.terrain_type.normalize(raw),
                    coastline: self.coastline_variation(x, y),
                    ripple: self.beach_ripple(x, y, raw),
                    rock: self.kernel.perlin(x * 0.15, y * 0.15),
                };
                coastal_profile(sample) * self.max_height
            }
        }
    }

    /// Radial falloff over the half-extent with its radius wobbled by
    /// low-frequency noise sampled around the unit circle, so the outline is
    /// not a circle but still closes on itself.
    pub fn organic_island_mask(&self, x: f32, y: f32) -> f32 {
        let (s, c) = y.atan2(x).sin_cos();
        let wobble = 0.65 * self.kernel.perlin(c * 1.5 + 17.0, s * 1.5 + 17.0)
            + 0.35 * self.kernel.perlin(c * 3.0 + 41.0, s * 3.0 + 41.0);
        let r = Vec2::new(x, y).length() / (self.size * 0.5) * (1.0 + 0.3 * wobble);
        (1.0 - r * r).clamp(0.0, 1.0)
    }

    /// Angular noise in `[0, 1]` choosing beach (low) or cliff (high) coastline.
    pub fn coastline_variation(&self, x: f32, y: f32) -> f32 {
        let (s, c) = y.atan2(x).sin_cos();
        ((self.kernel.perlin(c * 2.5 + 91.0, s * 2.5 + 91.0) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    fn beach_ripple(&self, x: f32, y: f32, raw: f32) -> f32 {
        let r = Vec2::new(x, y).length() / (self.size * 0.5);
        (r * 60.0 + raw * 8.0).sin()
    }
}
