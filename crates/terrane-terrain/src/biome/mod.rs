//! Biome definitions, the biome table, and climate classification.

mod classifier;
mod def;
mod ramp;
mod table;

pub use classifier::{BiomeClassifier, DEFAULT_FALLBACK_COLOR};
pub use def::{BiomeDef, BiomeKey, CLASSIFY_THRESHOLD};
pub use ramp::{ColorRamp, ColorStop, inverse_lerp};
pub use table::{BiomeIndex, BiomeTable, BiomeTableError};
