//! Climate-to-biome classification and per-cell coloring.

use glam::Vec4;

use super::{BiomeIndex, BiomeKey, BiomeTable};

/// Color used for cells whose climate matches no biome.
pub const DEFAULT_FALLBACK_COLOR: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);

/// Maps climate triples onto a [`BiomeTable`].
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    table: BiomeTable,
    fallback_color: Vec4,
}

impl BiomeClassifier {
    /// Creates a classifier over `table`; unmatched cells are drawn with `fallback_color`.
    pub fn new(table: BiomeTable, fallback_color: Vec4) -> Self {
        Self {
            table,
            fallback_color,
        }
    }

    /// The underlying biome table.
    pub fn table(&self) -> &BiomeTable {
        &self.table
    }

    /// Color for cells no biome matched.
    pub fn fallback_color(&self) -> Vec4 {
        self.fallback_color
    }

    /// Classifies a climate triple. `None` means no biome answers to its key.
    pub fn classify(&self, height: f32, heat: f32, humidity: f32) -> Option<BiomeIndex> {
        self.table.find(BiomeKey::from_climate(height, heat, humidity))
    }

    /// Color of `biome` at a normalized height, or the fallback color when
    /// the biome is unmatched or unknown.
    pub fn color_at(&self, biome: Option<BiomeIndex>, height: f32) -> Vec4 {
        biome
            .and_then(|index| self.table.get(index))
            .map_or(self.fallback_color, |def| def.color_at(height))
    }
}
