//! Per-chunk streaming state.

use std::sync::Arc;

use glam::Vec2;
use terrane_lod::LodSelector;
use terrane_mesh::MeshBuffer;
use terrane_terrain::{FaunaPlacement, TerrainMap};

use crate::coord::{ChunkBounds, ChunkCoord};
use crate::events::StreamEvent;

/// Cached result of one generation job.
#[derive(Debug)]
pub enum Slot<T> {
    /// Not requested, or the last request failed.
    Empty,
    Pending,
    Ready(Arc<T>),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Pending => Self::Pending,
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
        }
    }
}

impl<T> Slot<T> {
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Decoration state of a chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FaunaState {
    #[default]
    Unplaced,
    Placed {
        placements: Arc<[FaunaPlacement]>,
        active: bool,
    },
}

/// Work a chunk asks the streamer to do after an update.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct UpdateOutcome {
    pub request_map: bool,
    /// LOD rows whose meshes should be requested.
    pub mesh_requests: Vec<usize>,
    /// The finest mesh is ready and decorations have never been placed.
    pub place_fauna: bool,
}

/// One square of terrain and everything cached for it.
#[derive(Debug)]
pub struct TerrainChunk {
    coord: ChunkCoord,
    bounds: ChunkBounds,
    pub(crate) map: Slot<TerrainMap>,
    pub(crate) meshes: Vec<Slot<MeshBuffer>>,
    visible: bool,
    current_lod: Option<usize>,
    collider_enabled: bool,
    fauna: FaunaState,
    pub(crate) last_seen_pass: u64,
}

impl TerrainChunk {
    pub(crate) fn new(coord: ChunkCoord, chunk_size: f32, lod_rows: usize, pass: u64) -> Self {
        Self {
            coord,
            bounds: ChunkBounds::new(coord, chunk_size),
            map: Slot::Empty,
            meshes: (0..lod_rows).map(|_| Slot::Empty).collect(),
            visible: false,
            current_lod: None,
            collider_enabled: false,
            fauna: FaunaState::Unplaced,
            last_seen_pass: pass,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> &ChunkBounds {
        &self.bounds
    }

    pub fn map(&self) -> &Slot<TerrainMap> {
        &self.map
    }

    /// Mesh slot of LOD row `index`.
    pub fn mesh(&self, index: usize) -> Option<&Slot<MeshBuffer>> {
        self.meshes.get(index)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// LOD row currently displayed.
    pub fn current_lod(&self) -> Option<usize> {
        self.current_lod
    }

    pub fn collider_enabled(&self) -> bool {
        self.collider_enabled
    }

    pub fn fauna(&self) -> &FaunaState {
        &self.fauna
    }

    /// Re-evaluates visibility, LOD, collider and decorations for an observer
    /// at `observer` (chunk space).
    ///
    /// Nothing is shown until the terrain map has arrived. Missing meshes are
    /// reported back as requests rather than issued here.
    pub(crate) fn update(
        &mut self,
        observer: Vec2,
        selector: &LodSelector,
        events: &mut Vec<StreamEvent>,
    ) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        if self.map.ready().is_none() {
            outcome.request_map = self.map.is_empty();
            return outcome;
        }

        let distance = self.bounds.distance_to(observer);
        let Some(lod_index) = selector.select(distance) else {
            self.hide(events);
            return outcome;
        };

        if self.current_lod != Some(lod_index) {
            match &self.meshes[lod_index] {
                Slot::Ready(mesh) => {
                    self.current_lod = Some(lod_index);
                    events.push(StreamEvent::MeshSwapped {
                        coord: self.coord,
                        lod_index,
                        lod: selector.table().levels()[lod_index].lod,
                        mesh: Arc::clone(mesh),
                    });
                }
                Slot::Empty => outcome.mesh_requests.push(lod_index),
                Slot::Pending => {}
            }
        }

        if lod_index == 0 {
            let collider = selector.table().collider_index();
            match self.meshes[collider].clone() {
                Slot::Ready(mesh) => {
                    if !self.collider_enabled {
                        self.collider_enabled = true;
                        events.push(StreamEvent::ColliderChanged {
                            coord: self.coord,
                            mesh: Some(mesh),
                        });
                    }
                    outcome.place_fauna = self.load_fauna(events);
                }
                Slot::Empty if !outcome.mesh_requests.contains(&collider) => {
                    outcome.mesh_requests.push(collider);
                }
                _ => {}
            }
        } else {
            self.set_fauna_active(false, events);
        }

        if !self.visible {
            self.visible = true;
            events.push(StreamEvent::VisibilityChanged {
                coord: self.coord,
                visible: true,
            });
        }
        outcome
    }

    /// Hides the chunk, disabling its collider and decorations.
    pub(crate) fn hide(&mut self, events: &mut Vec<StreamEvent>) {
        if !self.visible {
            return;
        }
        self.visible = false;
        if self.collider_enabled {
            self.collider_enabled = false;
            events.push(StreamEvent::ColliderChanged {
                coord: self.coord,
                mesh: None,
            });
        }
        self.set_fauna_active(false, events);
        events.push(StreamEvent::VisibilityChanged {
            coord: self.coord,
            visible: false,
        });
    }

    /// Reactivates existing decorations. Returns `true` if none exist yet and
    /// the finest mesh is available to place them on.
    fn load_fauna(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        match self.fauna {
            FaunaState::Unplaced => self.meshes[0].ready().is_some(),
            FaunaState::Placed { .. } => {
                self.set_fauna_active(true, events);
                false
            }
        }
    }

    fn set_fauna_active(&mut self, active: bool, events: &mut Vec<StreamEvent>) {
        if let FaunaState::Placed {
            active: current, ..
        } = &mut self.fauna
            && *current != active
        {
            *current = active;
            events.push(StreamEvent::FaunaActiveChanged {
                coord: self.coord,
                active,
            });
        }
    }

    /// Records freshly generated decorations as active.
    pub(crate) fn place_fauna(&mut self, placements: Vec<FaunaPlacement>, events: &mut Vec<StreamEvent>) {
        let placements: Arc<[FaunaPlacement]> = placements.into();
        self.fauna = FaunaState::Placed {
            placements: Arc::clone(&placements),
            active: true,
        };
        events.push(StreamEvent::FaunaPlaced {
            coord: self.coord,
            placements,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_lod::{LodLevel, LodTable};
    use terrane_terrain::{ClimateSample, Grid};

    const SIZE: f32 = 10.0;

    fn selector() -> LodSelector {
        LodSelector::new(
            LodTable::new(vec![
                LodLevel::new(0, 10.0, true),
                LodLevel::new(1, 20.0, false),
                LodLevel::new(2, 30.0, false),
            ])
            .unwrap(),
        )
    }

    fn empty_map() -> Arc<TerrainMap> {
        let g = Grid::filled(1, 1, 0.0);
        Arc::new(TerrainMap {
            climate: ClimateSample {
                height: g.clone(),
                heat: g.clone(),
                humidity: g,
            },
            colors: Grid::filled(1, 1, glam::Vec4::ZERO),
            biomes: Grid::filled(1, 1, None),
        })
    }

    fn mesh(lod: u8) -> Slot<MeshBuffer> {
        Slot::Ready(Arc::new(MeshBuffer {
            lod,
            ..MeshBuffer::default()
        }))
    }

    fn loaded_chunk() -> TerrainChunk {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), SIZE, 3, 0);
        chunk.map = Slot::Ready(empty_map());
        chunk
    }

    #[test]
    fn test_invisible_until_map_arrives() {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), SIZE, 3, 0);
        let mut events = Vec::new();
        let outcome = chunk.update(Vec2::ZERO, &selector(), &mut events);
        assert!(outcome.request_map);
        assert!(events.is_empty());
        assert!(!chunk.is_visible());

        chunk.map = Slot::Pending;
        let outcome = chunk.update(Vec2::ZERO, &selector(), &mut events);
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[test]
    fn test_requests_finest_mesh_once_near() {
        let mut chunk = loaded_chunk();
        let mut events = Vec::new();
        let outcome = chunk.update(Vec2::ZERO, &selector(), &mut events);
        assert_eq!(outcome.mesh_requests, vec![0]);
        assert!(chunk.is_visible());

        chunk.meshes[0] = Slot::Pending;
        let outcome = chunk.update(Vec2::ZERO, &selector(), &mut events);
        assert!(outcome.mesh_requests.is_empty());
    }

    #[test]
    fn test_ready_mesh_swaps_and_enables_collider() {
        let mut chunk = loaded_chunk();
        chunk.meshes[0] = mesh(0);
        let mut events = Vec::new();
        let outcome = chunk.update(Vec2::ZERO, &selector(), &mut events);

        assert!(outcome.place_fauna);
        assert_eq!(chunk.current_lod(), Some(0));
        assert!(chunk.collider_enabled());
        assert!(matches!(events[0], StreamEvent::MeshSwapped { lod_index: 0, .. }));
        assert!(matches!(events[1], StreamEvent::ColliderChanged { mesh: Some(_), .. }));
        assert!(matches!(events[2], StreamEvent::VisibilityChanged { visible: true, .. }));
    }

    #[test]
    fn test_coarse_lod_requests_collider_only_when_finest() {
        let mut chunk = loaded_chunk();
        let mut events = Vec::new();
        // 15 units from the footprint edge selects row 1.
        let outcome = chunk.update(Vec2::new(20.0, 0.0), &selector(), &mut events);
        assert_eq!(outcome.mesh_requests, vec![1]);
        assert!(!outcome.place_fauna);
    }

    #[test]
    fn test_fauna_toggles_with_lod() {
        let mut chunk = loaded_chunk();
        chunk.meshes[0] = mesh(0);
        chunk.meshes[1] = mesh(1);
        let mut events = Vec::new();
        chunk.update(Vec2::ZERO, &selector(), &mut events);
        chunk.place_fauna(Vec::new(), &mut events);

        events.clear();
        chunk.update(Vec2::new(20.0, 0.0), &selector(), &mut events);
        assert!(events.iter().any(|e| matches!(e, StreamEvent::FaunaActiveChanged { active: false, .. })));

        events.clear();
        let outcome = chunk.update(Vec2::ZERO, &selector(), &mut events);
        assert!(!outcome.place_fauna);
        assert!(events.iter().any(|e| matches!(e, StreamEvent::FaunaActiveChanged { active: true, .. })));
    }

    #[test]
    fn test_out_of_range_hides_and_disables() {
        let mut chunk = loaded_chunk();
        chunk.meshes[0] = mesh(0);
        let mut events = Vec::new();
        chunk.update(Vec2::ZERO, &selector(), &mut events);
        chunk.place_fauna(Vec::new(), &mut events);

        events.clear();
        chunk.update(Vec2::new(100.0, 0.0), &selector(), &mut events);
        assert!(!chunk.is_visible());
        assert!(!chunk.collider_enabled());
        assert!(matches!(events[0], StreamEvent::ColliderChanged { mesh: None, .. }));
        assert!(matches!(events[1], StreamEvent::FaunaActiveChanged { active: false, .. }));
        assert!(matches!(events[2], StreamEvent::VisibilityChanged { visible: false, .. }));
        assert_eq!(chunk.fauna(), &FaunaState::Placed { placements: Arc::from(Vec::new()), active: false });
    }
}
