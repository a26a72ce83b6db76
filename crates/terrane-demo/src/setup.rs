//! Builds a [`TerrainStreamer`] from validated configuration.

use terrane_config::{Config, ConfigError};
use terrane_mesh::MeshBuilder;
use terrane_stream::{StreamError, StreamerSettings, TerrainStreamer};
use terrane_terrain::{BiomeClassifier, FaunaPlacer, TerrainMapGenerator};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

pub fn streamer_settings(config: &Config) -> StreamerSettings {
    StreamerSettings {
        uniform_scale: config.terrain.uniform_scale,
        move_threshold: config.streaming.move_threshold,
        worker_threads: config.streaming.worker_threads,
        queue_capacity: config.streaming.queue_capacity,
        evict_after_passes: config.streaming.evict_after_passes,
    }
}

/// Validates `config` and wires the generators into a running streamer.
pub fn build_streamer(config: &Config) -> Result<TerrainStreamer, SetupError> {
    config.validate()?;

    let table = config.biomes.table().map_err(ConfigError::from)?;
    if !table.is_complete() {
        let missing: Vec<_> = table.missing_keys().collect();
        tracing::warn!(?missing, "biome table has gaps; those cells use the fallback color");
    }
    let classifier = BiomeClassifier::new(table, config.biomes.fallback_color);
    let generator =
        TerrainMapGenerator::new(&config.noise, classifier, config.terrain.chunk_cells());

    let curve = config.terrain.curve().map_err(ConfigError::from)?;
    let mesher = MeshBuilder::new(config.terrain.height_multiplier, curve, config.terrain.shading());

    let fauna = FaunaPlacer::new(config.fauna.clone(), config.terrain.uniform_scale);

    let streamer = TerrainStreamer::new(
        streamer_settings(config),
        generator,
        mesher,
        config.lod_table()?,
        fauna,
    )?;
    Ok(streamer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_lod::LodLevel;

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.terrain.uniform_scale = 3.0;
        config.streaming.evict_after_passes = Some(2);
        let settings = streamer_settings(&config);
        assert_eq!(settings.uniform_scale, 3.0);
        assert_eq!(settings.move_threshold, 25.0);
        assert_eq!(settings.evict_after_passes, Some(2));
    }

    #[test]
    fn test_build_from_defaults() {
        let mut config = Config::default();
        config.streaming.worker_threads = 2;
        let streamer = build_streamer(&config).unwrap();
        assert_eq!(streamer.chunk_size(), 238.0);
        assert_eq!(streamer.lod_table().len(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.lods = vec![LodLevel::new(0, 100.0, false)];
        assert!(matches!(
            build_streamer(&config),
            Err(SetupError::Config(ConfigError::Lod(_)))
        ));
    }
}
