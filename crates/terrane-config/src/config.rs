//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};
use terrane_lod::{LodLevel, LodTable};
use terrane_mesh::{CurveKey, HeightCurve, HeightCurveError, Shading};
use terrane_terrain::biome::DEFAULT_FALLBACK_COLOR;
use terrane_terrain::{BiomeDef, BiomeTable, BiomeTableError, ClimateParams, FaunaParams};

use crate::biomes::default_biomes;
use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Cells per chunk side with smooth shading.
pub const SMOOTH_CHUNK_CELLS: usize = 239;
/// Cells per chunk side with flat shading, which triples the vertex count.
pub const FLAT_CHUNK_CELLS: usize = 95;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Mesh shape and world scale.
    pub terrain: TerrainConfig,
    /// Height, heat and humidity noise fields.
    pub noise: ClimateParams,
    /// LOD rows, finest first.
    pub lods: Vec<LodLevel>,
    /// Chunk streaming and worker pool.
    pub streaming: StreamingConfig,
    /// Biome definitions and classification policy.
    pub biomes: BiomesConfig,
    /// Decoration placement.
    pub fauna: FaunaParams,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain shape configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// World units per chunk-space unit.
    pub uniform_scale: f32,
    /// Use faceted normals with unshared vertices.
    pub flat_shading: bool,
    /// Vertical scale applied after the height curve.
    pub height_multiplier: f32,
    /// Monotonic remapping of normalized height, as piecewise-linear keys.
    pub height_curve: Vec<CurveKey>,
}

/// Streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunk-space distance the observer travels before visibility is re-evaluated.
    pub move_threshold: f32,
    /// Background worker threads (0 = derive from CPU count).
    pub worker_threads: usize,
    /// Capacity of the bounded task queue.
    pub queue_capacity: usize,
    /// Evict chunks hidden for more than this many visibility passes.
    pub evict_after_passes: Option<u64>,
}

/// Biome configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomesConfig {
    /// Reject tables that leave any climate key unclassified.
    pub require_complete: bool,
    /// Color of cells whose climate matches no biome.
    pub fallback_color: Vec4,
    /// Biome definitions.
    pub defs: Vec<BiomeDef>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            noise: ClimateParams::default(),
            lods: default_lods(),
            streaming: StreamingConfig::default(),
            biomes: BiomesConfig::default(),
            fauna: FaunaParams::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            uniform_scale: 2.0,
            flat_shading: false,
            height_multiplier: 30.0,
            height_curve: vec![
                CurveKey::new(0.0, 0.0),
                CurveKey::new(0.3, 0.02),
                CurveKey::new(1.0, 1.0),
            ],
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            move_threshold: 25.0,
            worker_threads: 0,
            queue_capacity: 64,
            evict_after_passes: None,
        }
    }
}

impl Default for BiomesConfig {
    fn default() -> Self {
        Self {
            require_complete: true,
            fallback_color: DEFAULT_FALLBACK_COLOR,
            defs: default_biomes(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

fn default_lods() -> Vec<LodLevel> {
    vec![
        LodLevel::new(0, 300.0, true),
        LodLevel::new(1, 450.0, false),
        LodLevel::new(2, 600.0, false),
    ]
}

// --- Derived values ---

impl TerrainConfig {
    /// Cells per chunk side, smaller under flat shading.
    pub fn chunk_cells(&self) -> usize {
        if self.flat_shading {
            FLAT_CHUNK_CELLS
        } else {
            SMOOTH_CHUNK_CELLS
        }
    }

    pub fn shading(&self) -> Shading {
        if self.flat_shading {
            Shading::Flat
        } else {
            Shading::Smooth
        }
    }

    /// Validated height curve.
    pub fn curve(&self) -> Result<HeightCurve, HeightCurveError> {
        HeightCurve::new(self.height_curve.clone())
    }

    /// World-space `(min, max)` height of generated terrain.
    pub fn height_range(&self) -> Result<(f32, f32), HeightCurveError> {
        let curve = self.curve()?;
        let scale = self.uniform_scale * self.height_multiplier;
        Ok((scale * curve.evaluate(0.0), scale * curve.evaluate(1.0)))
    }
}

impl BiomesConfig {
    /// Builds the biome table, enforcing completeness when required.
    pub fn table(&self) -> Result<BiomeTable, BiomeTableError> {
        if self.require_complete {
            BiomeTable::new_complete(self.defs.clone())
        } else {
            BiomeTable::new(self.defs.clone())
        }
    }
}

impl Config {
    pub fn lod_table(&self) -> Result<LodTable, ConfigError> {
        Ok(LodTable::new(self.lods.clone())?)
    }

    /// Checks every load-time invariant the generators rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.terrain.uniform_scale;
        if scale.is_nan() || scale <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "terrain.uniform_scale",
                reason: "must be positive",
            });
        }
        if !self.terrain.height_multiplier.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "terrain.height_multiplier",
                reason: "must be finite",
            });
        }
        let threshold = self.streaming.move_threshold;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "streaming.move_threshold",
                reason: "must not be negative",
            });
        }
        if self.streaming.queue_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                field: "streaming.queue_capacity",
                reason: "must be at least 1",
            });
        }
        for (field, params) in [
            ("noise.height", &self.noise.height),
            ("noise.heat", &self.noise.heat),
            ("noise.humidity", &self.noise.humidity),
        ] {
            let finite = params.scale.is_finite()
                && params.persistence.is_finite()
                && params.lacunarity.is_finite()
                && params.offset.is_finite();
            if !finite {
                return Err(ConfigError::OutOfRange {
                    field,
                    reason: "scale, persistence, lacunarity and offset must be finite",
                });
            }
        }
        if self.fauna.vertex_stride == 0 {
            return Err(ConfigError::OutOfRange {
                field: "fauna.vertex_stride",
                reason: "must be at least 1",
            });
        }
        self.terrain.curve()?;
        self.lod_table()?;
        self.biomes.table()?;
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// A loaded file is validated before it is returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        log::debug!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(config_path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(config_path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }
}
