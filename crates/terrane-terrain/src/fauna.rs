//! Deterministic decoration scattering over finished chunk meshes.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::biome::{BiomeIndex, BiomeTable};
use crate::seed::vertex_rng;

/// Placement rules for decorative entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaunaParams {
    /// Every `vertex_stride`-th vertex is a placement candidate.
    pub vertex_stride: usize,
    /// Multiplied with the vertex index to seed each candidate's RNG.
    pub seed_multiplier: u64,
    /// Entity scale as a fraction of the terrain's uniform scale.
    pub scale_factor: f32,
}

impl Default for FaunaParams {
    fn default() -> Self {
        Self {
            vertex_stride: 120,
            seed_multiplier: 132_456,
            scale_factor: 0.5,
        }
    }
}

/// One decorative entity to instantiate.
#[derive(Clone, Debug, PartialEq)]
pub struct FaunaPlacement {
    /// World-space anchor position.
    pub position: Vec3,
    /// Uniform scale of the entity.
    pub scale: f32,
    /// Prototype name from the biome definition.
    pub prototype: String,
    pub biome: BiomeIndex,
    /// Mesh vertex the entity was seeded from.
    pub vertex_index: usize,
}

/// Picks biome prototypes for a strided subset of mesh vertices.
#[derive(Clone, Debug)]
pub struct FaunaPlacer {
    params: FaunaParams,
    uniform_scale: f32,
}

impl FaunaPlacer {
    pub fn new(params: FaunaParams, uniform_scale: f32) -> Self {
        Self {
            params,
            uniform_scale,
        }
    }

    pub fn params(&self) -> &FaunaParams {
        &self.params
    }

    /// Places entities over a chunk's vertices.
    ///
    /// `positions` are chunk-local mesh vertices and `biomes` their parallel
    /// biome ids. Vertices `0, stride, 2 * stride, ...` are considered;
    /// unclassified vertices and biomes without prototypes are skipped. The
    /// prototype at each vertex depends only on the vertex index and its
    /// biome, so regenerating a chunk reproduces the same placements.
    pub fn place(
        &self,
        table: &BiomeTable,
        origin: Vec3,
        positions: &[Vec3],
        biomes: &[Option<BiomeIndex>],
    ) -> Vec<FaunaPlacement> {
        let stride = self.params.vertex_stride.max(1);
        let count = positions.len().min(biomes.len()) / stride;
        let scale = self.uniform_scale * self.params.scale_factor;

        let placements: Vec<_> = (0..count)
            .map(|i| i * stride)
            .filter_map(|vertex_index| {
                let biome = biomes[vertex_index]?;
                let def = table.get(biome)?;
                if def.prototypes.is_empty() {
                    return None;
                }
                let mut rng = vertex_rng(vertex_index, self.params.seed_multiplier);
                let choice = rng.random_range(0..def.prototypes.len());
                Some(FaunaPlacement {
                    position: origin + positions[vertex_index] * self.uniform_scale,
                    scale,
                    prototype: def.prototypes[choice].clone(),
                    biome,
                    vertex_index,
                })
            })
            .collect();

        trace!(candidates = count, placed = placements.len(), "fauna placed");
        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeDef, BiomeKey, ColorRamp, ColorStop};
    use glam::Vec4;

    fn table() -> BiomeTable {
        let def = |name: &str, key, prototypes: &[&str]| BiomeDef {
            name: name.into(),
            key,
            ramp: ColorRamp::new(vec![ColorStop {
                color: Vec4::ONE,
                start_height: 0.0,
                blend: 0.0,
            }]),
            prototypes: prototypes.iter().map(|p| p.to_string()).collect(),
        };
        BiomeTable::new(vec![
            def("forest", BiomeKey::new(false, false, false), &["oak", "birch", "pine"]),
            def("rock", BiomeKey::new(true, false, false), &[]),
        ])
        .unwrap()
    }

    fn grid_vertices(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(i as f32, 1.0, 0.0)).collect()
    }

    #[test]
    fn test_strided_candidates() {
        let placer = FaunaPlacer::new(FaunaParams::default(), 1.0);
        let biomes = vec![Some(BiomeIndex(0)); 600];
        let placed = placer.place(&table(), Vec3::ZERO, &grid_vertices(600), &biomes);
        let indices: Vec<_> = placed.iter().map(|p| p.vertex_index).collect();
        assert_eq!(indices, vec![0, 120, 240, 360, 480]);
    }

    #[test]
    fn test_placement_is_reproducible() {
        let placer = FaunaPlacer::new(FaunaParams::default(), 2.0);
        let biomes = vec![Some(BiomeIndex(0)); 1200];
        let a = placer.place(&table(), Vec3::ZERO, &grid_vertices(1200), &biomes);
        let b = placer.place(&table(), Vec3::ZERO, &grid_vertices(1200), &biomes);
        assert_eq!(a, b);
    }

    #[test]
    fn test_choice_depends_only_on_vertex_index() {
        let params = FaunaParams {
            vertex_stride: 10,
            ..FaunaParams::default()
        };
        let placer = FaunaPlacer::new(params, 1.0);
        let short = placer.place(&table(), Vec3::ZERO, &grid_vertices(100), &[Some(BiomeIndex(0)); 100]);
        let long = placer.place(&table(), Vec3::ZERO, &grid_vertices(300), &[Some(BiomeIndex(0)); 300]);
        assert_eq!(short[..], long[..short.len()]);
    }

    #[test]
    fn test_skips_unclassified_and_barren_biomes() {
        let placer = FaunaPlacer::new(FaunaParams::default(), 1.0);
        let mut biomes = vec![Some(BiomeIndex(1)); 360];
        biomes[0] = None;
        biomes[240] = Some(BiomeIndex(0));
        let placed = placer.place(&table(), Vec3::ZERO, &grid_vertices(360), &biomes);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].vertex_index, 240);
    }

    #[test]
    fn test_positions_scaled_from_origin() {
        let placer = FaunaPlacer::new(FaunaParams::default(), 3.0);
        let origin = Vec3::new(714.0, 0.0, -714.0);
        let placed = placer.place(&table(), origin, &grid_vertices(121), &[Some(BiomeIndex(0)); 121]);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].position, origin + Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(placed[0].scale, 1.5);
    }
}
