//! Observer-driven chunk streaming.
//!
//! [`TerrainStreamer::tick`] is called once per frame from the controlling
//! thread. It re-evaluates the visible window when the observer has moved far
//! enough, drains finished generation jobs, and reports every resulting change
//! as a [`StreamEvent`]. Terrain maps and meshes are built on the worker pool.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use terrane_lod::{LodSelector, LodTable};
use terrane_mesh::{MeshBuffer, MeshBuilder, MeshError};
use terrane_terrain::{FaunaPlacer, TerrainMap, TerrainMapGenerator};
use tracing::{debug, info, trace, warn};

use crate::chunk::{Slot, TerrainChunk};
use crate::coord::ChunkCoord;
use crate::error::StreamError;
use crate::events::StreamEvent;
use crate::work_queue::{Completion, Submission, WorkError, WorkQueue, default_worker_count};

/// Tuning knobs for [`TerrainStreamer`].
#[derive(Clone, Debug, PartialEq)]
pub struct StreamerSettings {
    /// World units per chunk-space unit.
    pub uniform_scale: f32,
    /// Chunk-space distance the observer must travel before the visible
    /// window is re-evaluated.
    pub move_threshold: f32,
    /// Worker threads; 0 picks a count from the CPU count.
    pub worker_threads: usize,
    /// Capacity of the bounded task channel.
    pub queue_capacity: usize,
    /// Drop chunks that stayed outside the window for more than this many
    /// visibility passes. `None` keeps every chunk for the session.
    pub evict_after_passes: Option<u64>,
}

impl Default for StreamerSettings {
    fn default() -> Self {
        Self {
            uniform_scale: 1.0,
            move_threshold: 25.0,
            worker_threads: 0,
            queue_capacity: 64,
            evict_after_passes: None,
        }
    }
}

/// Per-tick observer context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Observer {
    /// World-space position; `x` and `z` span the terrain plane.
    pub position: Vec3,
}

impl Observer {
    pub const fn at(position: Vec3) -> Self {
        Self { position }
    }
}

/// Result of [`TerrainStreamer::request_mesh`].
#[derive(Clone, Debug)]
pub enum MeshRequest {
    /// The mesh was already built; this is the cached buffer.
    Cached(Arc<MeshBuffer>),
    /// A build is already in flight.
    Pending,
    /// A build was started.
    Issued,
}

/// Running counters, refreshed every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub chunks: usize,
    pub visible_chunks: usize,
    pub map_requests: u64,
    pub mesh_requests: u64,
    pub completions: u64,
    /// Completions for chunks that were evicted before the result arrived.
    pub stale_completions: u64,
    pub failed_jobs: u64,
    pub coalesced: u64,
    pub deferred: u64,
    pub visibility_passes: u64,
    pub evicted: u64,
    /// Map cells that matched no biome, summed over completed maps.
    pub unclassified_cells: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum JobKey {
    Map(ChunkCoord),
    Mesh(ChunkCoord, usize),
}

impl JobKey {
    fn coord(self) -> ChunkCoord {
        match self {
            Self::Map(coord) | Self::Mesh(coord, _) => coord,
        }
    }
}

enum JobOutput {
    Map(TerrainMap),
    Mesh(Result<MeshBuffer, MeshError>),
}

/// Owns every live chunk and drives their generation.
pub struct TerrainStreamer {
    settings: StreamerSettings,
    chunk_size: f32,
    generator: Arc<TerrainMapGenerator>,
    mesher: Arc<MeshBuilder>,
    selector: LodSelector,
    fauna: FaunaPlacer,
    queue: WorkQueue<JobKey, JobOutput>,
    chunks: FxHashMap<ChunkCoord, TerrainChunk>,
    observer: Vec2,
    last_pass_observer: Option<Vec2>,
    pass: u64,
    stats: StreamStats,
}

impl TerrainStreamer {
    /// Creates a streamer and starts its worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::WorkerSpawn`] if a worker thread cannot start.
    pub fn new(
        settings: StreamerSettings,
        generator: TerrainMapGenerator,
        mesher: MeshBuilder,
        lods: LodTable,
        fauna: FaunaPlacer,
    ) -> Result<Self, StreamError> {
        let workers = match settings.worker_threads {
            0 => default_worker_count(),
            n => n,
        };
        let queue = WorkQueue::new(workers, settings.queue_capacity)?;
        let chunk_size = generator.chunk_cells().saturating_sub(1).max(1) as f32;

        info!(
            workers,
            chunk_size,
            lod_rows = lods.len(),
            max_view_distance = lods.max_view_distance(),
            "terrain streamer started"
        );

        Ok(Self {
            settings,
            chunk_size,
            generator: Arc::new(generator),
            mesher: Arc::new(mesher),
            selector: LodSelector::new(lods),
            fauna,
            queue,
            chunks: FxHashMap::default(),
            observer: Vec2::ZERO,
            last_pass_observer: None,
            pass: 0,
            stats: StreamStats::default(),
        })
    }

    /// Advances streaming by one frame.
    pub fn tick(&mut self, observer: &Observer) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.observer =
            Vec2::new(observer.position.x, observer.position.z) / self.settings.uniform_scale;

        let threshold_sq = self.settings.move_threshold * self.settings.move_threshold;
        let moved = self
            .last_pass_observer
            .is_none_or(|old| old.distance_squared(self.observer) >= threshold_sq);
        if moved {
            self.last_pass_observer = Some(self.observer);
            self.update_visible_chunks(&mut events);
        }

        self.apply_completions(&mut events);

        self.stats.chunks = self.chunks.len();
        self.stats.visible_chunks = self.chunks.values().filter(|c| c.is_visible()).count();
        events
    }

    /// Returns the cached mesh of `coord` at LOD row `lod_index`, building it
    /// if needed.
    ///
    /// # Errors
    ///
    /// Fails if the chunk does not exist, the row is out of range, or the
    /// chunk's terrain map has not arrived.
    pub fn request_mesh(
        &mut self,
        coord: ChunkCoord,
        lod_index: usize,
    ) -> Result<MeshRequest, StreamError> {
        let len = self.selector.table().len();
        let chunk = self.chunks.get(&coord).ok_or(StreamError::UnknownChunk(coord))?;
        match chunk.mesh(lod_index) {
            None => return Err(StreamError::LodOutOfRange { index: lod_index, len }),
            Some(Slot::Ready(mesh)) => return Ok(MeshRequest::Cached(Arc::clone(mesh))),
            Some(Slot::Pending) => return Ok(MeshRequest::Pending),
            Some(Slot::Empty) => {}
        }
        if chunk.map().ready().is_none() {
            return Err(StreamError::MapNotReady(coord));
        }
        self.request_lod_mesh(coord, lod_index);
        Ok(MeshRequest::Issued)
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values()
    }

    /// Side length of a chunk in chunk space.
    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Observer position in chunk space as of the last tick.
    pub fn observer(&self) -> Vec2 {
        self.observer
    }

    pub fn lod_table(&self) -> &LodTable {
        self.selector.table()
    }

    /// Jobs submitted and not yet applied.
    pub fn jobs_in_flight(&self) -> usize {
        self.queue.in_flight_count()
    }

    /// Chunks within `round(max_view_distance / chunk_size)` of the observer's
    /// chunk are created or updated; visible chunks outside that window are
    /// hidden.
    fn update_visible_chunks(&mut self, events: &mut Vec<StreamEvent>) {
        self.pass += 1;
        self.stats.visibility_passes += 1;

        let center = ChunkCoord::containing(self.observer, self.chunk_size);
        let radius = (self.selector.table().max_view_distance() / self.chunk_size).round() as i32;
        let window: FxHashSet<ChunkCoord> = center.window(radius).collect();
        debug!(?center, radius, pass = self.pass, "visibility pass");

        for chunk in self.chunks.values_mut() {
            if chunk.is_visible() && !window.contains(&chunk.coord()) {
                chunk.hide(events);
            }
        }

        for coord in center.window(radius) {
            match self.chunks.get_mut(&coord) {
                Some(chunk) => {
                    chunk.last_seen_pass = self.pass;
                    self.update_chunk(coord, events);
                }
                None => {
                    debug!(?coord, "chunk created");
                    let lod_rows = self.selector.table().len();
                    self.chunks
                        .insert(coord, TerrainChunk::new(coord, self.chunk_size, lod_rows, self.pass));
                    self.request_map(coord);
                }
            }
        }

        if let Some(limit) = self.settings.evict_after_passes {
            self.evict_stale(limit, events);
        }
    }

    fn evict_stale(&mut self, limit: u64, events: &mut Vec<StreamEvent>) {
        let pass = self.pass;
        let stale: Vec<ChunkCoord> = self
            .chunks
            .values()
            .filter(|c| pass - c.last_seen_pass > limit)
            .map(TerrainChunk::coord)
            .collect();
        for coord in stale {
            if let Some(mut chunk) = self.chunks.remove(&coord) {
                chunk.hide(events);
                debug!(?coord, "chunk evicted");
                self.stats.evicted += 1;
                events.push(StreamEvent::ChunkEvicted { coord });
            }
        }
    }

    fn update_chunk(&mut self, coord: ChunkCoord, events: &mut Vec<StreamEvent>) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let outcome = chunk.update(self.observer, &self.selector, events);
        if outcome.request_map {
            self.request_map(coord);
        }
        for lod_index in outcome.mesh_requests {
            self.request_lod_mesh(coord, lod_index);
        }
        if outcome.place_fauna {
            self.place_fauna(coord, events);
        }
    }

    fn request_map(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let generator = Arc::clone(&self.generator);
        let center = coord.center(self.chunk_size);
        let submission = self
            .queue
            .submit(JobKey::Map(coord), move || JobOutput::Map(generator.generate(center)));
        if record_submission(&mut self.stats, submission) {
            chunk.map = Slot::Pending;
            self.stats.map_requests += 1;
            trace!(?coord, ?submission, "terrain map requested");
        }
    }

    fn request_lod_mesh(&mut self, coord: ChunkCoord, lod_index: usize) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let Some(map) = chunk.map.ready().cloned() else {
            return;
        };
        let Some(level) = self.selector.table().get(lod_index) else {
            return;
        };
        let lod = level.lod;
        let mesher = Arc::clone(&self.mesher);
        let submission = self.queue.submit(JobKey::Mesh(coord, lod_index), move || {
            JobOutput::Mesh(mesher.build_map(&map, lod))
        });
        if record_submission(&mut self.stats, submission) {
            chunk.meshes[lod_index] = Slot::Pending;
            self.stats.mesh_requests += 1;
            trace!(?coord, lod_index, lod, ?submission, "mesh requested");
        }
    }

    fn place_fauna(&mut self, coord: ChunkCoord, events: &mut Vec<StreamEvent>) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let Some(mesh) = chunk.meshes.first().and_then(|slot| slot.ready()).cloned() else {
            return;
        };
        let origin = coord.world_origin(self.chunk_size, self.settings.uniform_scale);
        let table = self.generator.classifier().table();
        let placements = self.fauna.place(table, origin, &mesh.positions, &mesh.biomes);
        debug!(?coord, count = placements.len(), "fauna placed");
        chunk.place_fauna(placements, events);
    }

    fn apply_completions(&mut self, events: &mut Vec<StreamEvent>) {
        for Completion {
            key,
            outcome,
            elapsed_us,
        } in self.queue.drain()
        {
            self.stats.completions += 1;
            let coord = key.coord();
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                debug!(?key, "discarding result for evicted chunk");
                self.stats.stale_completions += 1;
                continue;
            };
            trace!(?key, elapsed_us, "job completed");

            match (key, outcome) {
                (JobKey::Map(_), Ok(JobOutput::Map(map))) => {
                    let unclassified = map.unclassified_cells();
                    if unclassified > 0 {
                        debug!(?coord, unclassified, "map has cells outside every biome");
                        self.stats.unclassified_cells += unclassified as u64;
                    }
                    chunk.map = Slot::Ready(Arc::new(map));
                }
                (JobKey::Mesh(_, index), Ok(JobOutput::Mesh(Ok(mesh)))) => {
                    chunk.meshes[index] = Slot::Ready(Arc::new(mesh));
                }
                (JobKey::Mesh(_, index), Ok(JobOutput::Mesh(Err(err)))) => {
                    warn!(?coord, index, %err, "mesh build failed");
                    chunk.meshes[index] = Slot::Empty;
                    self.stats.failed_jobs += 1;
                }
                (key, Err(WorkError::Panicked(message))) => {
                    warn!(?key, %message, "generation job failed, will retry");
                    match key {
                        JobKey::Map(_) => chunk.map = Slot::Empty,
                        JobKey::Mesh(_, index) => chunk.meshes[index] = Slot::Empty,
                    }
                    self.stats.failed_jobs += 1;
                }
                (key, Ok(_)) => {
                    warn!(?key, "job produced mismatched output");
                    self.stats.failed_jobs += 1;
                    continue;
                }
            }

            self.update_chunk(coord, events);
        }
    }
}

/// Counts coalesced and deferred submissions. Returns `true` if the job is
/// now in flight.
fn record_submission(stats: &mut StreamStats, submission: Submission) -> bool {
    match submission {
        Submission::Queued => true,
        Submission::Deferred => {
            stats.deferred += 1;
            true
        }
        Submission::Coalesced => {
            stats.coalesced += 1;
            true
        }
        Submission::Rejected => false,
    }
}
