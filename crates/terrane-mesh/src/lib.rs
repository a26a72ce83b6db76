//! Terrain meshing: height curves, LOD mesh construction, and mesh buffers.

mod builder;
mod height_curve;
mod mesh_buffer;

pub use builder::{MeshBuilder, MeshError, Shading, lod_stride};
pub use height_curve::{CurveKey, HeightCurve, HeightCurveError};
pub use mesh_buffer::{MeshBuffer, NO_BIOME, TerrainVertex};
