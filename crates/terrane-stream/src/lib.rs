//! Viewer-driven terrain streaming: chunk bookkeeping, LOD swapping, and a
//! bounded worker pool for background generation.

mod chunk;
mod coord;
mod error;
mod events;
mod streamer;
mod work_queue;

pub use chunk::{FaunaState, Slot, TerrainChunk};
pub use coord::{ChunkBounds, ChunkCoord};
pub use error::StreamError;
pub use events::StreamEvent;
pub use streamer::{MeshRequest, Observer, StreamStats, StreamerSettings, TerrainStreamer};
pub use work_queue::{Completion, Submission, WorkError, WorkQueue, default_worker_count};
