//! Full per-chunk terrain map: climate grids plus derived colors and biomes.

use glam::{DVec2, Vec4};

use crate::biome::{BiomeClassifier, BiomeIndex};
use crate::climate::{ClimateParams, ClimateSample, ClimateSampler};
use crate::grid::Grid;

/// Everything the mesher and decorator need for one chunk.
///
/// All grids share the bordered `(chunk_cells + 2)` shape of the climate sample.
#[derive(Clone, Debug)]
pub struct TerrainMap {
    pub climate: ClimateSample,
    /// Biome color per cell, fallback color where unclassified.
    pub colors: Grid<Vec4>,
    /// Biome per cell, `None` where no biome matched.
    pub biomes: Grid<Option<BiomeIndex>>,
}

impl TerrainMap {
    /// Normalized height grid.
    pub fn heights(&self) -> &Grid<f32> {
        &self.climate.height
    }

    /// Number of cells with no matching biome.
    pub fn unclassified_cells(&self) -> usize {
        self.biomes.as_slice().iter().filter(|b| b.is_none()).count()
    }
}

/// Generates [`TerrainMap`]s. Shared read-only across worker threads.
pub struct TerrainMapGenerator {
    sampler: ClimateSampler,
    classifier: BiomeClassifier,
    chunk_cells: usize,
}

impl TerrainMapGenerator {
    pub fn new(climate: &ClimateParams, classifier: BiomeClassifier, chunk_cells: usize) -> Self {
        Self {
            sampler: ClimateSampler::new(climate),
            classifier,
            chunk_cells,
        }
    }

    /// Visible cells per chunk side.
    pub fn chunk_cells(&self) -> usize {
        self.chunk_cells
    }

    pub fn classifier(&self) -> &BiomeClassifier {
        &self.classifier
    }

    /// Samples climate around `center` and classifies every cell.
    pub fn generate(&self, center: DVec2) -> TerrainMap {
        let climate = self.sampler.sample(self.chunk_cells, center);
        let size = climate.bordered_size();

        let biomes = Grid::from_fn(size, size, |x, y| {
            self.classifier.classify(
                *climate.height.get(x, y),
                *climate.heat.get(x, y),
                *climate.humidity.get(x, y),
            )
        });
        let colors = Grid::from_fn(size, size, |x, y| {
            self.classifier.color_at(*biomes.get(x, y), *climate.height.get(x, y))
        });

        TerrainMap {
            climate,
            colors,
            biomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeDef, BiomeKey, BiomeTable, ColorRamp, ColorStop};

    fn solid_table(keys: &[BiomeKey]) -> BiomeTable {
        let defs = keys
            .iter()
            .enumerate()
            .map(|(i, key)| BiomeDef {
                name: format!("b{i}"),
                key: *key,
                ramp: ColorRamp::new(vec![ColorStop {
                    color: Vec4::new(i as f32 / 8.0, 0.0, 0.0, 1.0),
                    start_height: 0.0,
                    blend: 0.0,
                }]),
                prototypes: Vec::new(),
            })
            .collect();
        BiomeTable::new(defs).unwrap()
    }

    #[test]
    fn test_complete_table_classifies_every_cell() {
        let classifier = BiomeClassifier::new(solid_table(&BiomeKey::ALL), Vec4::ONE);
        let generator = TerrainMapGenerator::new(&ClimateParams::default().with_seed(1), classifier, 23);
        let map = generator.generate(DVec2::new(22.0, 0.0));

        assert_eq!(map.heights().width(), 25);
        assert!(map.colors.same_shape(map.heights()));
        assert_eq!(map.unclassified_cells(), 0);
    }

    #[test]
    fn test_gaps_fall_back() {
        let fallback = Vec4::new(1.0, 0.0, 1.0, 1.0);
        let classifier = BiomeClassifier::new(solid_table(&[]), fallback);
        let generator = TerrainMapGenerator::new(&ClimateParams::default(), classifier, 7);
        let map = generator.generate(DVec2::ZERO);

        assert_eq!(map.unclassified_cells(), 81);
        assert!(map.colors.as_slice().iter().all(|c| *c == fallback));
    }
}
