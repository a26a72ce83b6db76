//! Distance-based LOD selection over a validated LOD table.

use serde::{Deserialize, Serialize};

/// One row of the LOD table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    /// Mesh detail level; 0 is the finest.
    pub lod: u8,
    /// Largest observer distance at which this row applies.
    pub visible_distance: f32,
    /// Whether this row's mesh doubles as the chunk's collision mesh.
    #[serde(default)]
    pub use_for_collider: bool,
}

impl LodLevel {
    pub const fn new(lod: u8, visible_distance: f32, use_for_collider: bool) -> Self {
        Self {
            lod,
            visible_distance,
            use_for_collider,
        }
    }
}

/// Errors that can occur when validating a LOD table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodTableError {
    #[error("LOD table is empty")]
    Empty,
    #[error("LOD row {index} has a non-positive visible distance")]
    NonPositive { index: usize },
    #[error("LOD row {index} is not farther than the row before it")]
    NotIncreasing { index: usize },
    /// Exactly one row must provide the collision mesh.
    #[error("expected exactly one collider LOD, found {count}")]
    ColliderCount { count: usize },
    #[error("LOD row {index} is finer than the row before it")]
    LodLevelOrder { index: usize },
}

/// Ordered LOD rows with strictly increasing distances.
#[derive(Clone, Debug, PartialEq)]
pub struct LodTable {
    levels: Vec<LodLevel>,
    collider_index: usize,
}

impl LodTable {
    /// Validates and wraps `levels`.
    ///
    /// # Errors
    ///
    /// Returns the first [`LodTableError`] found.
    pub fn new(levels: Vec<LodLevel>) -> Result<Self, LodTableError> {
        if levels.is_empty() {
            return Err(LodTableError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            if level.visible_distance.is_nan() || level.visible_distance <= 0.0 {
                return Err(LodTableError::NonPositive { index });
            }
            if index > 0 {
                let prev = &levels[index - 1];
                if level.visible_distance <= prev.visible_distance {
                    return Err(LodTableError::NotIncreasing { index });
                }
                if level.lod < prev.lod {
                    return Err(LodTableError::LodLevelOrder { index });
                }
            }
        }

        let colliders: Vec<usize> = levels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.use_for_collider)
            .map(|(i, _)| i)
            .collect();
        let [collider_index] = colliders[..] else {
            return Err(LodTableError::ColliderCount {
                count: colliders.len(),
            });
        };

        Ok(Self {
            levels,
            collider_index,
        })
    }

    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LodLevel> {
        self.levels.get(index)
    }

    /// Index of the row whose mesh is used for collision.
    pub fn collider_index(&self) -> usize {
        self.collider_index
    }

    /// Distance of the last row; chunks farther away are hidden.
    pub fn max_view_distance(&self) -> f32 {
        self.levels[self.levels.len() - 1].visible_distance
    }
}

/// Selects a LOD row from the distance between observer and chunk.
#[derive(Clone, Debug)]
pub struct LodSelector {
    table: LodTable,
}

impl LodSelector {
    pub fn new(table: LodTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LodTable {
        &self.table
    }

    /// Whether a chunk at `distance` is drawn at all.
    pub fn is_visible(&self, distance: f32) -> bool {
        distance <= self.table.max_view_distance()
    }

    /// Row index for a chunk at `distance`.
    ///
    /// Advances to a finer row only while strictly inside its distance, so a
    /// distance exactly on a boundary selects the coarser row. Distances past
    /// every boundary select the last row.
    pub fn select_index(&self, distance: f32) -> usize {
        let last = self.table.len() - 1;
        self.table.levels[..last]
            .iter()
            .position(|level| distance < level.visible_distance)
            .unwrap_or(last)
    }

    /// Row index, or `None` when the chunk is out of view.
    pub fn select(&self, distance: f32) -> Option<usize> {
        self.is_visible(distance).then(|| self.select_index(distance))
    }
}
