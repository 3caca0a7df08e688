//! # Coherent Noise
//!
//! The displacement operator samples noise through [`NoiseEvaluator`], so a
//! host can plug in any implementation. [`GradientNoise`] is the bundled
//! default: classic 3D gradient noise over a seeded permutation table.

use config::constants::{DEFAULT_NOISE_SEED, NOISE_TABLE_SIZE};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A deterministic scalar noise field.
pub trait NoiseEvaluator {
    /// Samples the field at `(x, y, z)`, summing `octaves` layers whose
    /// frequency grows by `lacunarity` and amplitude by `gain`.
    ///
    /// Results stay within `[-1, 1]`.
    fn evaluate(&self, x: f64, y: f64, z: f64, octaves: u32, lacunarity: f64, gain: f64) -> f64;
}

/// How octaves are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accumulation {
    /// Signed sum of octaves
    #[default]
    Fbm,
    /// Sum of absolute octave values, remapped to `[-1, 1]`
    Turbulence,
}

/// Seeded 3D gradient noise.
///
/// # Example
///
/// ```rust
/// use mesh_kernel::noise::{GradientNoise, NoiseEvaluator};
///
/// let a = GradientNoise::new(7);
/// let b = GradientNoise::new(7);
/// assert_eq!(a.evaluate(0.3, 1.7, 2.2, 3, 2.0, 0.5), b.evaluate(0.3, 1.7, 2.2, 3, 2.0, 0.5));
/// ```
#[derive(Debug, Clone)]
pub struct GradientNoise {
    perm: Vec<usize>,
    accumulation: Accumulation,
}

impl GradientNoise {
    /// Builds the permutation table from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut table: Vec<usize> = (0..NOISE_TABLE_SIZE).collect();
        table.shuffle(&mut rng);
        // Doubled so lookups never need a modulo
        let perm = table.iter().chain(table.iter()).copied().collect();
        Self {
            perm,
            accumulation: Accumulation::Fbm,
        }
    }

    /// Switches the octave combination mode.
    pub fn with_accumulation(mut self, accumulation: Accumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    /// Single-octave noise value.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let mask = NOISE_TABLE_SIZE - 1;
        let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
        let xi = (fx as i64).rem_euclid(NOISE_TABLE_SIZE as i64) as usize & mask;
        let yi = (fy as i64).rem_euclid(NOISE_TABLE_SIZE as i64) as usize & mask;
        let zi = (fz as i64).rem_euclid(NOISE_TABLE_SIZE as i64) as usize & mask;
        let (x, y, z) = (x - fx, y - fy, z - fz);
        let (u, v, w) = (fade(x), fade(y), fade(z));

        let p = &self.perm;
        let a = p[xi] + yi;
        let aa = p[a] + zi;
        let ab = p[a + 1] + zi;
        let b = p[xi + 1] + yi;
        let ba = p[b] + zi;
        let bb = p[b + 1] + zi;

        let value = lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z)),
                lerp(u, grad(p[ab], x, y - 1.0, z), grad(p[bb], x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(u, grad(p[aa + 1], x, y, z - 1.0), grad(p[ba + 1], x - 1.0, y, z - 1.0)),
                lerp(
                    u,
                    grad(p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );
        value.clamp(-1.0, 1.0)
    }
}

impl Default for GradientNoise {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

impl NoiseEvaluator for GradientNoise {
    fn evaluate(&self, x: f64, y: f64, z: f64, octaves: u32, lacunarity: f64, gain: f64) -> f64 {
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut norm = 0.0;

        for _ in 0..octaves.max(1) {
            let n = self.sample(x * frequency, y * frequency, z * frequency);
            total += match self.accumulation {
                Accumulation::Fbm => amplitude * n,
                Accumulation::Turbulence => amplitude * n.abs(),
            };
            norm += amplitude;
            frequency *= lacunarity;
            amplitude *= gain;
        }

        if norm <= 0.0 {
            return 0.0;
        }
        let value = total / norm;
        match self.accumulation {
            Accumulation::Fbm => value.clamp(-1.0, 1.0),
            Accumulation::Turbulence => (value * 2.0 - 1.0).clamp(-1.0, 1.0),
        }
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of twelve edge gradients picked by `hash`.
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}
