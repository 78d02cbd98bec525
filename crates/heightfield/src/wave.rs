//! Gerstner-style ocean waves: a fixed set of directional sinusoids summed into a
//! height, with the surface normal derived analytically from the same sum.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, HeightfieldError, Result};

/// Seed for the randomized detail waves, fixed so every ocean looks the same.
pub const WAVE_SEED: u64 = 42;

/// One directional wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveComponent {
    pub wavelength: f32,
    pub amplitude: f32,
    pub speed: f32,
    /// Unit travel direction in the xz plane.
    pub direction: Vec2,
}

impl WaveComponent {
    /// Direction is normalized; a zero direction falls back to +x.
    pub fn new(wavelength: f32, amplitude: f32, speed: f32, direction: Vec2) -> Self {
        Self {
            wavelength,
            amplitude,
            speed,
            direction: direction.try_normalize().unwrap_or(Vec2::X),
        }
    }

    /// `k = 2π / wavelength`.
    #[inline]
    pub fn wavenumber(&self) -> f32 {
        TAU / self.wavelength
    }

    /// `k * (dir · (x, z) - w * t)` with `w = speed * global_speed`.
    #[inline]
    pub fn phase(&self, x: f32, z: f32, t: f32, global_speed: f32) -> f32 {
        let w = self.speed * global_speed;
        self.wavenumber() * (self.direction.dot(Vec2::new(x, z)) - w * t)
    }

    /// Reject wavelengths that would make the wavenumber infinite or NaN, and
    /// non-finite amplitude or speed.
    pub fn validate(&self) -> Result<()> {
        if !(self.wavelength.is_finite() && self.wavelength > 0.0) {
            return Err(HeightfieldError::InvalidWavelength(self.wavelength));
        }
        ensure_finite("wave amplitude", self.amplitude)?;
        ensure_finite("wave speed", self.speed)?;
        Ok(())
    }

    /// Time for the phase at a fixed point to advance by one full turn.
    pub fn period(&self, global_speed: f32) -> f32 {
        TAU / (self.wavenumber() * self.speed * global_speed)
    }
}

/// The default sea state: two large swells, two medium waves, and four small
/// detail waves headed in seeded random directions.
pub fn default_components(seed: u64) -> Vec<WaveComponent> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut waves = vec![
        // Large
        WaveComponent::new(30.0, 1.5, 1.0, Vec2::new(1.0, 0.3)),
        WaveComponent::new(25.0, 1.2, 0.9, Vec2::new(0.5, 1.0)),
        // Medium
        WaveComponent::new(15.0, 0.8, 1.2, Vec2::new(-0.7, 0.6)),
        WaveComponent::new(12.0, 0.6, 1.1, Vec2::new(0.8, -0.4)),
    ];

    // Small
    for i in 0..4 {
        let angle: f32 = rng.gen_range(0.0..TAU);
        let i = i as f32;
        waves.push(WaveComponent::new(
            5.0 + i * 2.0,
            0.3 - i * 0.05,
            1.3 + i * 0.1,
            Vec2::new(angle.cos(), angle.sin()),
        ));
    }

    waves
}

/// A wave set plus the global speed and height multipliers applied to it.
///
/// The component list is immutable after construction; only the multipliers move.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveField {
    components: Vec<WaveComponent>,
    speed: f32,
    height: f32,
}

impl WaveField {
    /// Field over an explicit wave set. Every component is validated.
    pub fn new(components: Vec<WaveComponent>, speed: f32, height: f32) -> Result<Self> {
        if components.is_empty() {
            return Err(HeightfieldError::NoWaveComponents);
        }
        for c in &components {
            c.validate()?;
        }
        Ok(Self {
            components,
            speed,
            height,
        })
    }

    /// Field over [`default_components`].
    pub fn seeded(seed: u64, speed: f32, height: f32) -> Self {
        Self {
            components: default_components(seed),
            speed,
            height,
        }
    }

    pub fn components(&self) -> &[WaveComponent] {
        &self.components
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    /// Sum of `amplitude * height * sin(phase)` over all components.
    pub fn height_at(&self, x: f32, z: f32, t: f32) -> f32 {
        self.components
            .iter()
            .map(|c| c.amplitude * self.height * c.phase(x, z, t, self.speed).sin())
            .sum()
    }

    /// Unit surface normal: `(-∂h/∂x, 1, -∂h/∂z)` normalized, with the partials
    /// taken analytically from the same sum as [`Self::height_at`].
    pub fn normal_at(&self, x: f32, z: f32, t: f32) -> Vec3 {
        let mut normal = Vec3::Y;

        for c in &self.components {
            let slope = c.wavenumber()
                * c.amplitude
                * self.height
                * c.phase(x, z, t, self.speed).cos();
            normal.x -= slope * c.direction.x;
            normal.z -= slope * c.direction.y;
        }

        normal.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Height and normal in one call.
    pub fn sample(&self, x: f32, z: f32, t: f32) -> (f32, Vec3) {
        (self.height_at(x, z, t), self.normal_at(x, z, t))
    }
}
