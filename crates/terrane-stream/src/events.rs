//! Signals the streamer emits for display, physics and decoration consumers.

use std::sync::Arc;

use terrane_mesh::MeshBuffer;
use terrane_terrain::FaunaPlacement;

use crate::coord::ChunkCoord;

/// One change to the streamed terrain, in the order it happened during a tick.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    /// The chunk should be shown or hidden.
    VisibilityChanged { coord: ChunkCoord, visible: bool },
    /// The chunk's displayed mesh changed.
    MeshSwapped {
        coord: ChunkCoord,
        /// Row of the LOD table.
        lod_index: usize,
        /// Mesh detail level of that row.
        lod: u8,
        mesh: Arc<MeshBuffer>,
    },
    /// Collision was enabled with `mesh`, or disabled when `None`.
    ColliderChanged {
        coord: ChunkCoord,
        mesh: Option<Arc<MeshBuffer>>,
    },
    /// Decorations were generated for the chunk; they start active.
    FaunaPlaced {
        coord: ChunkCoord,
        placements: Arc<[FaunaPlacement]>,
    },
    /// Previously placed decorations were shown or hidden.
    FaunaActiveChanged { coord: ChunkCoord, active: bool },
    /// The chunk and all its cached data were dropped.
    ChunkEvicted { coord: ChunkCoord },
}

impl StreamEvent {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            Self::VisibilityChanged { coord, .. }
            | Self::MeshSwapped { coord, .. }
            | Self::ColliderChanged { coord, .. }
            | Self::FaunaPlaced { coord, .. }
            | Self::FaunaActiveChanged { coord, .. }
            | Self::ChunkEvicted { coord } => *coord,
        }
    }
}
