//! Level-of-detail policy: LOD table validation and distance-based selection.

mod selector;

pub use selector::{LodLevel, LodSelector, LodTable, LodTableError};
