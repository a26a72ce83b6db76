//! Procedural terrain data: seeded fractal noise, climate sampling, biome
//! classification and coloring, and deterministic decoration placement.

mod climate;
mod fauna;
mod grid;
mod map;
mod noise_field;

pub mod biome;
pub mod seed;

pub use biome::{
    BiomeClassifier, BiomeDef, BiomeIndex, BiomeKey, BiomeTable, BiomeTableError, ColorRamp,
    ColorStop,
};
pub use climate::{ClimateParams, ClimateSample, ClimateSampler, HALO};
pub use fauna::{FaunaParams, FaunaPlacement, FaunaPlacer};
pub use grid::{Grid, GridError};
pub use map::{TerrainMap, TerrainMapGenerator};
pub use noise_field::{
    GLOBAL_AMPLITUDE_DIVISOR, MIN_NOISE_SCALE, NoiseField, NoiseParams, NormalizeMode,
};
