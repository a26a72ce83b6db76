//! Configuration for terrane.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line, and are validated before any generator is built from them.

mod biomes;
mod cli;
mod config;
mod error;

pub use biomes::default_biomes;
pub use cli::CliArgs;
pub use config::{
    BiomesConfig, CONFIG_FILE_NAME, Config, DebugConfig, FLAT_CHUNK_CELLS, SMOOTH_CHUNK_CELLS,
    StreamingConfig, TerrainConfig,
};
pub use error::ConfigError;
