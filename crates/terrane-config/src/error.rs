//! Configuration error types.

use terrane_lod::LodTableError;
use terrane_mesh::HeightCurveError;
use terrane_terrain::BiomeTableError;

/// Errors that can occur when loading, saving, parsing, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    #[error("invalid biome table: {0}")]
    Biome(#[from] BiomeTableError),

    #[error("invalid LOD table: {0}")]
    Lod(#[from] LodTableError),

    #[error("invalid height curve: {0}")]
    Curve(#[from] HeightCurveError),

    /// A scalar setting is outside its allowed range.
    #[error("{field} {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },
}
