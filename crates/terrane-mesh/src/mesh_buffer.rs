//! Terrain mesh buffers and their interleaved upload format.

use glam::{Vec2, Vec3, Vec4};
use terrane_terrain::BiomeIndex;

/// Biome id written into [`TerrainVertex::biome`] for unclassified vertices.
pub const NO_BIOME: u32 = u32::MAX;

/// A finished terrain mesh for one chunk at one LOD.
///
/// All per-vertex arrays are parallel. Positions are chunk-local, centred
/// on the chunk, with `y` up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffer {
    /// LOD level the mesh was built at.
    pub lod: u8,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub colors: Vec<Vec4>,
    /// Biome per vertex, used for decoration seeding.
    pub biomes: Vec<Option<BiomeIndex>>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Smallest and largest vertex height, or `None` for an empty mesh.
    pub fn height_bounds(&self) -> Option<(f32, f32)> {
        let mut iter = self.positions.iter().map(|p| p.y);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Interleaves the per-vertex arrays for GPU upload.
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        (0..self.vertex_count())
            .map(|i| TerrainVertex {
                position: self.positions[i].to_array(),
                normal: self.normals[i].to_array(),
                uv: self.uvs[i].to_array(),
                color: self.colors[i].to_array(),
                biome: self.biomes[i].map_or(NO_BIOME, |b| u32::from(b.0)),
            })
            .collect()
    }

    /// Bytes a renderer uploads for this mesh: interleaved vertices plus indices.
    pub fn upload_bytes(&self) -> usize {
        let vertices = self.interleaved();
        bytemuck::cast_slice::<TerrainVertex, u8>(&vertices).len()
            + bytemuck::cast_slice::<u32, u8>(&self.indices).len()
    }
}

/// One interleaved vertex, 52 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    /// Biome index, or [`NO_BIOME`].
    pub biome: u32,
}
