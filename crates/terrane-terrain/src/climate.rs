//! Per-chunk climate sampling: height, heat and humidity.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::noise_field::{NoiseField, NoiseParams};
use crate::seed::{HEAT_SEED_OFFSET, HUMIDITY_SEED_OFFSET, derive_field_seed};

/// Width of the halo ring around every sampled climate block.
pub const HALO: usize = 1;

/// Noise parameters for the three climate fields.
///
/// The heat and humidity seeds are offset from their configured values by
/// [`HEAT_SEED_OFFSET`] and [`HUMIDITY_SEED_OFFSET`], so the three fields stay
/// independent even when configured with the same seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    pub height: NoiseParams,
    pub heat: NoiseParams,
    pub humidity: NoiseParams,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            height: NoiseParams::default(),
            heat: NoiseParams {
                scale: 400.0,
                octaves: 2,
                ..NoiseParams::default()
            },
            humidity: NoiseParams {
                scale: 300.0,
                octaves: 2,
                ..NoiseParams::default()
            },
        }
    }
}

impl ClimateParams {
    /// Sets the same base seed on all three fields.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.height.seed = seed;
        self.heat.seed = seed;
        self.humidity.seed = seed;
        self
    }
}

/// Three co-registered climate grids of identical shape, each cell in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClimateSample {
    pub height: Grid<f32>,
    pub heat: Grid<f32>,
    pub humidity: Grid<f32>,
}

impl ClimateSample {
    /// Side length of the grids, halo included.
    pub fn bordered_size(&self) -> usize {
        self.height.width()
    }
}

/// Samples climate blocks from three seed-linked noise fields.
pub struct ClimateSampler {
    height: NoiseField,
    heat: NoiseField,
    humidity: NoiseField,
}

impl ClimateSampler {
    /// Builds the three fields, applying the heat and humidity seed offsets.
    pub fn new(params: &ClimateParams) -> Self {
        let heat = NoiseParams {
            seed: derive_field_seed(params.heat.seed, HEAT_SEED_OFFSET),
            ..params.heat.clone()
        };
        let humidity = NoiseParams {
            seed: derive_field_seed(params.humidity.seed, HUMIDITY_SEED_OFFSET),
            ..params.humidity.clone()
        };
        Self {
            height: NoiseField::new(params.height.clone()),
            heat: NoiseField::new(heat),
            humidity: NoiseField::new(humidity),
        }
    }

    /// Samples a chunk of `chunk_cells` visible cells per side centred on `center`.
    ///
    /// The returned grids are `(chunk_cells + 2)` on a side: one halo cell on
    /// each border for normal estimation.
    pub fn sample(&self, chunk_cells: usize, center: DVec2) -> ClimateSample {
        let size = chunk_cells + 2 * HALO;
        ClimateSample {
            height: self.height.sample(size, size, center),
            heat: self.heat.sample(size, size, center),
            humidity: self.humidity.sample(size, size, center),
        }
    }
}
