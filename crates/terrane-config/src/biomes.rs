//! Built-in biome set covering every classification key.

use glam::Vec4;
use terrane_terrain::{BiomeDef, BiomeKey, ColorRamp, ColorStop};

fn stop(rgb: [f32; 3], start_height: f32, blend: f32) -> ColorStop {
    ColorStop {
        color: Vec4::new(rgb[0], rgb[1], rgb[2], 1.0),
        start_height,
        blend,
    }
}

fn biome(name: &str, key: BiomeKey, stops: Vec<ColorStop>, prototypes: &[&str]) -> BiomeDef {
    BiomeDef {
        name: name.to_string(),
        key,
        ramp: ColorRamp::new(stops),
        prototypes: prototypes.iter().map(|p| p.to_string()).collect(),
    }
}

/// Eight biomes, one per [`BiomeKey`], in key order.
pub fn default_biomes() -> Vec<BiomeDef> {
    vec![
        biome(
            "temperate_forest",
            BiomeKey::new(false, false, false),
            vec![
                stop([0.16, 0.32, 0.62], 0.0, 0.0),
                stop([0.82, 0.78, 0.55], 0.3, 0.05),
                stop([0.22, 0.45, 0.18], 0.4, 0.1),
            ],
            &["oak", "birch", "fern"],
        ),
        biome(
            "steppe",
            BiomeKey::new(false, false, true),
            vec![
                stop([0.20, 0.35, 0.60], 0.0, 0.0),
                stop([0.70, 0.68, 0.45], 0.3, 0.05),
                stop([0.55, 0.58, 0.30], 0.45, 0.15),
            ],
            &["dry_grass", "shrub"],
        ),
        biome(
            "rainforest",
            BiomeKey::new(false, true, false),
            vec![
                stop([0.10, 0.40, 0.55], 0.0, 0.0),
                stop([0.85, 0.80, 0.50], 0.3, 0.05),
                stop([0.08, 0.38, 0.12], 0.38, 0.08),
            ],
            &["palm", "kapok", "fern"],
        ),
        biome(
            "desert",
            BiomeKey::new(false, true, true),
            vec![
                stop([0.25, 0.45, 0.60], 0.0, 0.0),
                stop([0.93, 0.83, 0.55], 0.25, 0.05),
                stop([0.85, 0.65, 0.40], 0.7, 0.2),
            ],
            &["cactus", "dry_shrub"],
        ),
        biome(
            "alpine_meadow",
            BiomeKey::new(true, false, false),
            vec![
                stop([0.30, 0.50, 0.25], 0.0, 0.0),
                stop([0.45, 0.42, 0.38], 0.5, 0.1),
                stop([0.95, 0.95, 0.97], 0.8, 0.1),
            ],
            &["pine", "boulder"],
        ),
        biome(
            "tundra",
            BiomeKey::new(true, false, true),
            vec![
                stop([0.55, 0.55, 0.48], 0.0, 0.0),
                stop([0.60, 0.60, 0.62], 0.4, 0.1),
                stop([0.92, 0.93, 0.96], 0.7, 0.15),
            ],
            &["lichen_rock"],
        ),
        biome(
            "cloud_forest",
            BiomeKey::new(true, true, false),
            vec![
                stop([0.12, 0.35, 0.15], 0.0, 0.0),
                stop([0.28, 0.40, 0.30], 0.5, 0.2),
                stop([0.50, 0.48, 0.45], 0.85, 0.1),
            ],
            &["tree_fern", "moss_rock"],
        ),
        biome(
            "mesa",
            BiomeKey::new(true, true, true),
            vec![
                stop([0.78, 0.45, 0.25], 0.0, 0.0),
                stop([0.70, 0.35, 0.20], 0.4, 0.05),
                stop([0.88, 0.70, 0.50], 0.75, 0.05),
            ],
            &["dead_tree", "boulder"],
        ),
    ]
}
