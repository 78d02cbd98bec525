//! Classic 2D Perlin gradient noise over a shuffled permutation table, and the
//! fractal sums (fBm, ridged) the terrain shapes are built from.
//!
//! The table is the only source of randomness. Build it from a seed and every
//! terrain sampled through it is reproducible; build it from entropy and it is not.

use std::sync::Arc;

use noise::NoiseFn;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Number of distinct lattice hashes; lattice coordinates wrap at this period.
pub const PERMUTATION_PERIOD: usize = 256;

/// Octave count used by terrain shapes that don't ask for a specific one.
pub const DEFAULT_OCTAVES: u32 = 5;

/// A shuffled arrangement of `0..256`, stored twice back to back so corner hashes
/// can index `perm[perm[x] + y + 1]` without wrapping.
///
/// Immutable once built. Share it behind an `Arc` (see [`crate::NoiseResources`]).
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; PERMUTATION_PERIOD * 2],
    seed: Option<u64>,
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl PermutationTable {
    /// Deterministic table: the same seed always yields the same shuffle.
    pub fn from_seed(seed: u64) -> Self {
        Self::shuffled(&mut StdRng::seed_from_u64(seed), Some(seed))
    }

    /// Non-reproducible table shuffled from OS entropy.
    pub fn from_entropy() -> Self {
        Self::shuffled(&mut StdRng::from_entropy(), None)
    }

    fn shuffled(rng: &mut StdRng, seed: Option<u64>) -> Self {
        let mut base: Vec<u8> = (0..=u8::MAX).collect();
        base.shuffle(rng);

        let mut perm = [0u8; PERMUTATION_PERIOD * 2];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i % PERMUTATION_PERIOD];
        }

        Self { perm, seed }
    }

    /// Seed the table was built from, `None` for entropy tables.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    fn hash(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    /// Sample classic Perlin noise at `(x, y)`. Roughly in `[-1, 1]`, exactly zero
    /// on integer lattice points.
    pub fn perlin(&self, x: f32, y: f32) -> f32 {
        let xf = x.floor();
        let yf = y.floor();
        let xi = (xf as i32 & 255) as usize;
        let yi = (yf as i32 & 255) as usize;

        let x = x - xf;
        let y = y - yf;
        let u = fade(x);
        let v = fade(y);

        let a = self.hash(xi) + yi;
        let b = self.hash(xi + 1) + yi;

        let aa = self.hash(a);
        let ab = self.hash(a + 1);
        let ba = self.hash(b);
        let bb = self.hash(b + 1);

        lerp(
            v,
            lerp(u, grad(aa, x, y), grad(ba, x - 1.0, y)),
            lerp(u, grad(ab, x, y - 1.0), grad(bb, x - 1.0, y - 1.0)),
        )
    }
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

/// Dot product of the offset with one of eight gradient directions picked by
/// the low three hash bits.
#[inline]
fn grad(hash: usize, x: f32, y: f32) -> f32 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

/// Perlin sampling plus the fractal sums, parameterized by the entity's base
/// noise frequency.
#[derive(Debug, Clone)]
pub struct NoiseKernel {
    table: Arc<PermutationTable>,
    frequency: f32,
}

impl NoiseKernel {
    pub fn new(table: Arc<PermutationTable>, frequency: f32) -> Self {
        Self { table, frequency }
    }

    pub fn table(&self) -> &Arc<PermutationTable> {
        &self.table
    }

    /// Starting frequency of every fBm sum.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    #[inline]
    pub fn perlin(&self, x: f32, y: f32) -> f32 {
        self.table.perlin(x, y)
    }

    /// Fractal Brownian motion: `octaves` layers of Perlin starting at amplitude 0.5
    /// and the kernel frequency, doubling frequency and halving amplitude per layer.
    /// Not clamped.
    pub fn fbm(&self, x: f32, y: f32, octaves: u32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = self.frequency;

        for _ in 0..octaves {
            value += amplitude * self.perlin(x * frequency, y * frequency);
            frequency *= 2.0;
            amplitude *= 0.5;
        }

        value
    }

    /// Squared inverted 6-octave fBm; peaks sharply where the fBm crosses zero.
    pub fn ridged(&self, x: f32, y: f32) -> f32 {
        let h = 1.0 - self.fbm(x, y, 6).abs();
        h * h
    }
}

/// Raw Perlin field (kernel frequency not applied), so the kernel can feed the
/// `noise` crate's modifiers and combiners.
impl NoiseFn<f64, 2> for NoiseKernel {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.perlin(point[0] as f32, point[1] as f32) as f64
    }
}
