//! Headless stand-in for the display, physics and decoration consumers.

use rustc_hash::FxHashMap;
use terrane_stream::{ChunkCoord, StreamEvent};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkView {
    pub visible: bool,
    pub lod: Option<u8>,
    pub triangles: usize,
    /// Size of the last uploaded mesh.
    pub upload_bytes: usize,
    pub height_bounds: Option<(f32, f32)>,
    pub collider: bool,
    pub fauna: usize,
    pub fauna_active: bool,
}

/// Mirrors streamed terrain state by applying [`StreamEvent`]s in order.
#[derive(Debug, Default)]
pub struct Scene {
    chunks: FxHashMap<ChunkCoord, ChunkView>,
    mesh_swaps: u64,
}

impl Scene {
    pub fn apply(&mut self, event: &StreamEvent) {
        if let StreamEvent::ChunkEvicted { coord } = event {
            self.chunks.remove(coord);
            return;
        }
        let view = self.chunks.entry(event.coord()).or_default();
        match event {
            StreamEvent::VisibilityChanged { visible, .. } => view.visible = *visible,
            StreamEvent::MeshSwapped { lod, mesh, .. } => {
                view.lod = Some(*lod);
                view.triangles = mesh.triangle_count();
                view.upload_bytes = mesh.upload_bytes();
                view.height_bounds = mesh.height_bounds();
                self.mesh_swaps += 1;
            }
            StreamEvent::ColliderChanged { mesh, .. } => view.collider = mesh.is_some(),
            StreamEvent::FaunaPlaced { placements, .. } => {
                view.fauna = placements.len();
                view.fauna_active = true;
            }
            StreamEvent::FaunaActiveChanged { active, .. } => view.fauna_active = *active,
            StreamEvent::ChunkEvicted { .. } => {}
        }
    }

    pub fn apply_all(&mut self, events: &[StreamEvent]) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkView> {
        self.chunks.get(&coord)
    }

    pub fn visible_chunks(&self) -> usize {
        self.chunks.values().filter(|c| c.visible).count()
    }

    pub fn visible_triangles(&self) -> usize {
        self.chunks
            .values()
            .filter(|c| c.visible)
            .map(|c| c.triangles)
            .sum()
    }

    /// Resident mesh memory across all chunks, visible or not.
    pub fn uploaded_bytes(&self) -> usize {
        self.chunks.values().map(|c| c.upload_bytes).sum()
    }

    /// Lowest and highest vertex over the visible chunks.
    pub fn visible_height_span(&self) -> Option<(f32, f32)> {
        self.chunks
            .values()
            .filter(|c| c.visible)
            .filter_map(|c| c.height_bounds)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }

    pub fn colliders(&self) -> usize {
        self.chunks.values().filter(|c| c.collider).count()
    }

    pub fn active_fauna(&self) -> usize {
        self.chunks
            .values()
            .filter(|c| c.fauna_active)
            .map(|c| c.fauna)
            .sum()
    }

    pub fn mesh_swaps(&self) -> u64 {
        self.mesh_swaps
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use terrane_mesh::MeshBuffer;

    use super::*;

    fn mesh(triangles: usize) -> Arc<MeshBuffer> {
        Arc::new(MeshBuffer {
            indices: vec![0; triangles * 3],
            ..Default::default()
        })
    }

    #[test]
    fn test_events_update_views() {
        let coord = ChunkCoord::new(1, -2);
        let mut scene = Scene::default();
        scene.apply_all(&[
            StreamEvent::VisibilityChanged {
                coord,
                visible: true,
            },
            StreamEvent::MeshSwapped {
                coord,
                lod_index: 0,
                lod: 0,
                mesh: mesh(8),
            },
            StreamEvent::ColliderChanged {
                coord,
                mesh: Some(mesh(8)),
            },
            StreamEvent::FaunaPlaced {
                coord,
                placements: Arc::from(Vec::new()),
            },
        ]);
        let view = scene.chunk(coord).unwrap();
        assert!(view.visible && view.collider && view.fauna_active);
        assert_eq!(view.lod, Some(0));
        assert_eq!(scene.visible_triangles(), 8);
        assert_eq!(scene.mesh_swaps(), 1);
        assert_eq!(scene.colliders(), 1);
    }

    #[test]
    fn test_hidden_chunks_excluded_from_totals() {
        let coord = ChunkCoord::new(0, 0);
        let mut scene = Scene::default();
        scene.apply(&StreamEvent::MeshSwapped {
            coord,
            lod_index: 1,
            lod: 1,
            mesh: mesh(4),
        });
        assert_eq!(scene.visible_chunks(), 0);
        assert_eq!(scene.visible_triangles(), 0);

        scene.apply(&StreamEvent::VisibilityChanged {
            coord,
            visible: true,
        });
        assert_eq!(scene.visible_triangles(), 4);
    }

    fn raised_mesh(heights: &[f32]) -> Arc<MeshBuffer> {
        let n = heights.len();
        Arc::new(MeshBuffer {
            positions: heights.iter().map(|&y| Vec3::new(0.0, y, 0.0)).collect(),
            normals: vec![Vec3::Y; n],
            uvs: vec![glam::Vec2::ZERO; n],
            colors: vec![glam::Vec4::ONE; n],
            biomes: vec![None; n],
            indices: vec![0, 1, 2],
            ..Default::default()
        })
    }

    #[test]
    fn test_upload_size_and_height_span() {
        let near = ChunkCoord::new(0, 0);
        let far = ChunkCoord::new(5, 0);
        let mut scene = Scene::default();
        scene.apply_all(&[
            StreamEvent::MeshSwapped {
                coord: near,
                lod_index: 0,
                lod: 0,
                mesh: raised_mesh(&[1.0, 4.0, 2.0]),
            },
            StreamEvent::MeshSwapped {
                coord: far,
                lod_index: 2,
                lod: 4,
                mesh: raised_mesh(&[-3.0, 9.0, 0.0]),
            },
            StreamEvent::VisibilityChanged {
                coord: near,
                visible: true,
            },
        ]);
        assert_eq!(scene.uploaded_bytes(), 2 * (3 * 52 + 3 * 4));
        assert_eq!(scene.visible_height_span(), Some((1.0, 4.0)));

        scene.apply(&StreamEvent::ChunkEvicted { coord: far });
        assert_eq!(scene.uploaded_bytes(), 3 * 52 + 3 * 4);
    }

    #[test]
    fn test_eviction_forgets_chunk() {
        let coord = ChunkCoord::new(3, 3);
        let mut scene = Scene::default();
        scene.apply(&StreamEvent::VisibilityChanged {
            coord,
            visible: false,
        });
        assert!(scene.chunk(coord).is_some());
        scene.apply(&StreamEvent::ChunkEvicted { coord });
        assert!(scene.chunk(coord).is_none());
    }
}
