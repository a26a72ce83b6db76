use crate::coord::ChunkCoord;

/// Errors returned by [`TerrainStreamer`](crate::TerrainStreamer).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("no chunk at {0:?}")]
    UnknownChunk(ChunkCoord),
    #[error("LOD index {index} out of range (table has {len} rows)")]
    LodOutOfRange { index: usize, len: usize },
    /// Meshes are built from the chunk's terrain map, which has not arrived yet.
    #[error("terrain map for {0:?} is not ready")]
    MapNotReady(ChunkCoord),
    #[error("failed to start worker threads: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
