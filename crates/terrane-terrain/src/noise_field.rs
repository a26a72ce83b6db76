//! Seeded multi-octave fractal noise sampled into 2D grids.
//!
//! Composites several octaves of Perlin noise, each at a higher frequency and
//! lower amplitude than the last, then normalizes the block into `[0, 1]`.

use glam::DVec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::seed::octave_offsets;

/// Scale substituted for non-positive (or NaN) scales so sampling never divides by zero.
pub const MIN_NOISE_SCALE: f64 = 1.0e-4;

/// Divisor applied to the theoretical amplitude sum under [`NormalizeMode::Global`].
///
/// Summed octaves practically never reach their theoretical peak, so the
/// estimated range is tightened to recover contrast; values that overshoot
/// are clamped.
pub const GLOBAL_AMPLITUDE_DIVISOR: f64 = 1.5;

/// How a sampled block is rescaled into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Rescale by the block's own min/max. Exact `[0, 1]` coverage, but
    /// neighbouring blocks disagree along shared edges.
    Local,
    /// Rescale by an estimate derived from the octave amplitudes. Identical
    /// world positions map to identical values in every block.
    #[default]
    Global,
}

/// Configuration of a single noise field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Seed for the permutation table and per-octave offsets.
    pub seed: u64,
    /// World units per noise unit. Values `<= 0` are replaced by [`MIN_NOISE_SCALE`].
    pub scale: f64,
    /// Number of octaves composited. Treated as at least 1.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves, typically in `[0, 1]`.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves, typically `>= 1`.
    pub lacunarity: f64,
    /// Constant world-space offset added to every sample position.
    pub offset: DVec2,
    /// Normalization applied to each sampled block.
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: DVec2::ZERO,
            normalize_mode: NormalizeMode::Global,
        }
    }
}

/// A deterministic fractal noise sampler.
///
/// Identical parameters and sample origins always produce bit-identical grids.
pub struct NoiseField {
    perlin: Perlin,
    params: NoiseParams,
    scale: f64,
    octave_offsets: Vec<DVec2>,
    max_amplitude: f64,
}

impl NoiseField {
    /// Creates a field, precomputing the per-octave offsets from the seed.
    pub fn new(params: NoiseParams) -> Self {
        let octaves = params.octaves.max(1);
        let scale = if params.scale > 0.0 {
            params.scale
        } else {
            MIN_NOISE_SCALE
        };

        let mut max_amplitude = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..octaves {
            max_amplitude += amplitude;
            amplitude *= params.persistence;
        }

        Self {
            perlin: Perlin::new(params.seed as u32),
            octave_offsets: octave_offsets(params.seed, octaves),
            scale,
            max_amplitude,
            params,
        }
    }

    /// Parameters this field was built from.
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Scale actually used for sampling after clamping.
    pub fn effective_scale(&self) -> f64 {
        self.scale
    }

    /// Theoretical maximum absolute value of [`raw_at`](Self::raw_at):
    /// the sum of all octave amplitudes.
    pub fn max_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    /// Un-normalized fractal value at a world-space position.
    pub fn raw_at(&self, world: DVec2) -> f64 {
        let base = (world + self.params.offset) / self.scale;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total = 0.0;

        for offset in &self.octave_offsets {
            let p = base * frequency + *offset;
            total += self.perlin.get([p.x, p.y]) * amplitude;

            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }

        total
    }

    /// Samples a `width x height` block centred on `origin`.
    ///
    /// Cell `(x, y)` is evaluated at world position
    /// `origin + (x - (width - 1) / 2, y - (height - 1) / 2)`, so adjacent
    /// blocks whose origins differ by their spacing share edge samples exactly.
    pub fn sample(&self, width: usize, height: usize, origin: DVec2) -> Grid<f32> {
        let half = DVec2::new((width as f64 - 1.0) * 0.5, (height as f64 - 1.0) * 0.5);

        let raw = Grid::from_fn(width, height, |x, y| {
            let local = DVec2::new(x as f64, y as f64) - half;
            self.raw_at(origin + local)
        });

        match self.params.normalize_mode {
            NormalizeMode::Local => normalize_local(&raw),
            NormalizeMode::Global => {
                let estimated = self.max_amplitude / GLOBAL_AMPLITUDE_DIVISOR;
                raw.map(|&v| ((v / estimated + 1.0) * 0.5).clamp(0.0, 1.0) as f32)
            }
        }
    }
}

/// Inverse-lerps every cell between the block's own min and max.
///
/// A constant block maps to all zeros.
fn normalize_local(raw: &Grid<f64>) -> Grid<f32> {
    let (lo, hi) = raw
        .as_slice()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if range.is_nan() || range <= 0.0 {
        return raw.map(|_| 0.0);
    }
    raw.map(|&v| ((v - lo) / range) as f32)
}
