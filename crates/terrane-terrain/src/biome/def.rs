//! Biome definition: classification key, color ramp, and decoration prototypes.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use super::ramp::{ColorRamp, inverse_lerp};

/// Value each climate channel is compared against when classifying.
pub const CLASSIFY_THRESHOLD: f32 = 0.5;

/// Three-bit classification key of a biome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BiomeKey {
    /// Height above [`CLASSIFY_THRESHOLD`].
    pub high: bool,
    /// Heat above [`CLASSIFY_THRESHOLD`].
    pub hot: bool,
    /// Humidity above [`CLASSIFY_THRESHOLD`].
    pub dry: bool,
}

impl BiomeKey {
    /// All eight keys, ordered by [`bits`](Self::bits).
    pub const ALL: [BiomeKey; 8] = [
        BiomeKey::new(false, false, false),
        BiomeKey::new(false, false, true),
        BiomeKey::new(false, true, false),
        BiomeKey::new(false, true, true),
        BiomeKey::new(true, false, false),
        BiomeKey::new(true, false, true),
        BiomeKey::new(true, true, false),
        BiomeKey::new(true, true, true),
    ];

    /// Creates a key from its three flags.
    pub const fn new(high: bool, hot: bool, dry: bool) -> Self {
        Self { high, hot, dry }
    }

    /// Thresholds a climate triple. Values exactly at the threshold count as low.
    pub fn from_climate(height: f32, heat: f32, humidity: f32) -> Self {
        Self {
            high: height > CLASSIFY_THRESHOLD,
            hot: heat > CLASSIFY_THRESHOLD,
            dry: humidity > CLASSIFY_THRESHOLD,
        }
    }

    /// Packs the key as `high << 2 | hot << 1 | dry`.
    pub fn bits(self) -> u8 {
        ((self.high as u8) << 2) | ((self.hot as u8) << 1) | (self.dry as u8)
    }
}

/// Full descriptor for a biome type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeDef {
    /// Human-readable biome name (e.g., "savanna").
    pub name: String,
    /// Classification key this biome answers to.
    pub key: BiomeKey,
    /// Colors by height within the biome's height window.
    pub ramp: ColorRamp,
    /// Names of decorative entity prototypes that may be placed in this biome.
    #[serde(default)]
    pub prototypes: Vec<String>,
}

impl BiomeDef {
    /// Color for a normalized terrain height.
    ///
    /// High biomes map the upper half of the height range onto their ramp,
    /// all others the lower half, so elevated variants of a family band
    /// differently from their lowland counterparts.
    pub fn color_at(&self, height: f32) -> Vec4 {
        let (min, max) = if self.key.high { (0.5, 1.0) } else { (0.0, 0.5) };
        self.ramp.color_at(inverse_lerp(min, max, height))
    }
}
