//! Height-grid to LOD mesh conversion.
//!
//! Input grids carry a one-cell halo on every side. The halo is sampled into
//! the lattice so border normals see their true neighbours, but halo points
//! never become vertices.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use terrane_terrain::{BiomeIndex, Grid, TerrainMap};
use tracing::trace;

use crate::height_curve::HeightCurve;
use crate::mesh_buffer::MeshBuffer;

/// Errors produced by [`MeshBuilder::build`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// A bordered grid needs at least two visible cells per side.
    #[error("grid of {width}x{height} is too small to mesh")]
    GridTooSmall { width: usize, height: usize },
    #[error("color or biome grid shape does not match the height grid")]
    GridShapeMismatch,
}

/// Sample step for a LOD level: 1 at LOD 0, `2 * lod` otherwise.
pub fn lod_stride(lod: u8) -> usize {
    if lod == 0 { 1 } else { 2 * lod as usize }
}

/// Shading style of generated meshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shading {
    /// Shared vertices with area-weighted averaged normals.
    #[default]
    Smooth,
    /// Unshared vertices per triangle with face normals.
    Flat,
}

/// Builds [`MeshBuffer`]s from terrain grids.
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    height_multiplier: f32,
    height_curve: HeightCurve,
    shading: Shading,
}

impl MeshBuilder {
    pub fn new(height_multiplier: f32, height_curve: HeightCurve, shading: Shading) -> Self {
        Self {
            height_multiplier,
            height_curve,
            shading,
        }
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    /// Vertex height for a normalized grid value.
    #[inline]
    pub fn vertex_height(&self, value: f32) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(value)
    }

    /// Builds the mesh of a generated terrain map.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_map(&self, map: &TerrainMap, lod: u8) -> Result<MeshBuffer, MeshError> {
        self.build(map.heights(), &map.colors, &map.biomes, lod)
    }

    /// Builds a mesh at `lod` from bordered grids of identical shape.
    ///
    /// Visible samples are taken every [`lod_stride`] cells starting at the
    /// first visible cell, and the last visible cell is always included, so
    /// every LOD shares the chunk's border positions with its neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::GridShapeMismatch`] if the grids differ in shape
    /// and [`MeshError::GridTooSmall`] if a side has fewer than two visible
    /// cells.
    pub fn build(
        &self,
        heights: &Grid<f32>,
        colors: &Grid<Vec4>,
        biomes: &Grid<Option<BiomeIndex>>,
        lod: u8,
    ) -> Result<MeshBuffer, MeshError> {
        if !heights.same_shape(colors) || !heights.same_shape(biomes) {
            return Err(MeshError::GridShapeMismatch);
        }
        if heights.width() < 4 || heights.height() < 4 {
            return Err(MeshError::GridTooSmall {
                width: heights.width(),
                height: heights.height(),
            });
        }

        let visible_x = heights.width() - 2;
        let visible_z = heights.height() - 2;
        let stride = lod_stride(lod);
        let xs = lattice(visible_x, stride);
        let zs = lattice(visible_z, stride);
        let half_x = (visible_x - 1) as f32 * 0.5;
        let half_z = (visible_z - 1) as f32 * 0.5;

        // Positions of every lattice point, halo included.
        let lattice_w = xs.len();
        let mut points = Vec::with_capacity(xs.len() * zs.len());
        for &kz in &zs {
            for &kx in &xs {
                let h = *heights.get(bordered(kx), bordered(kz));
                points.push(Vec3::new(
                    kx as f32 - half_x,
                    self.vertex_height(h),
                    kz as f32 - half_z,
                ));
            }
        }
        let point = |lx: usize, lz: usize| lz * lattice_w + lx;

        // Interior lattice points become vertices.
        let inner_w = lattice_w - 2;
        let inner_h = zs.len() - 2;
        let vertex = |lx: usize, lz: usize| ((lz - 1) * inner_w + (lx - 1)) as u32;

        let mut mesh = MeshBuffer {
            lod,
            ..MeshBuffer::default()
        };
        for lz in 1..=inner_h {
            for lx in 1..=inner_w {
                let (kx, kz) = (xs[lx], zs[lz]);
                let (bx, bz) = (bordered(kx), bordered(kz));
                mesh.positions.push(points[point(lx, lz)]);
                mesh.uvs.push(Vec2::new(
                    kx as f32 / (visible_x - 1) as f32,
                    kz as f32 / (visible_z - 1) as f32,
                ));
                mesh.colors.push(*colors.get(bx, bz));
                mesh.biomes.push(*biomes.get(bx, bz));
            }
        }

        // Quads whose four corners are all interior.
        for lz in 1..inner_h {
            for lx in 1..inner_w {
                let a = vertex(lx, lz);
                let b = vertex(lx + 1, lz);
                let c = vertex(lx, lz + 1);
                let d = vertex(lx + 1, lz + 1);
                mesh.indices.extend_from_slice(&[a, c, d, a, d, b]);
            }
        }

        match self.shading {
            Shading::Smooth => {
                mesh.normals = smooth_normals(&points, lattice_w, zs.len())
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| {
                        let (lx, lz) = (i % lattice_w, i / lattice_w);
                        (1..=inner_w).contains(&lx) && (1..=inner_h).contains(&lz)
                    })
                    .map(|(_, n)| n)
                    .collect();
            }
            Shading::Flat => flatten(&mut mesh),
        }

        trace!(
            lod,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "mesh built"
        );
        Ok(mesh)
    }
}

/// Visible sample indices along one axis, bracketed by the two halo indices.
///
/// Yields `-1, 0, s, 2s, ..., visible - 1, visible`.
fn lattice(visible: usize, stride: usize) -> Vec<isize> {
    let last = visible as isize - 1;
    let mut ks = vec![-1];
    ks.extend((0..last).step_by(stride));
    ks.push(last);
    ks.push(visible as isize);
    ks
}

/// Grid coordinate of a visible sample index.
#[inline]
fn bordered(k: isize) -> usize {
    (k + 1) as usize
}

/// Area-weighted vertex normals over the full lattice.
fn smooth_normals(points: &[Vec3], width: usize, height: usize) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; points.len()];
    for lz in 0..height - 1 {
        for lx in 0..width - 1 {
            let a = lz * width + lx;
            let b = a + 1;
            let c = a + width;
            let d = c + 1;
            for [i, j, k] in [[a, c, d], [a, d, b]] {
                let n = face_normal(points[i], points[j], points[k]);
                normals[i] += n;
                normals[j] += n;
                normals[k] += n;
            }
        }
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y))
        .collect()
}

/// Unnormalized normal of triangle `(p0, p1, p2)`; its length is twice the area.
#[inline]
fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0)
}

/// Unshares every triangle's vertices and assigns face normals.
fn flatten(mesh: &mut MeshBuffer) {
    let shared = std::mem::take(mesh);
    mesh.lod = shared.lod;
    for tri in shared.indices.chunks_exact(3) {
        let [p0, p1, p2] = [0, 1, 2].map(|i| shared.positions[tri[i] as usize]);
        let normal = face_normal(p0, p1, p2).normalize_or(Vec3::Y);
        for &index in tri {
            let i = index as usize;
            mesh.indices.push(mesh.positions.len() as u32);
            mesh.positions.push(shared.positions[i]);
            mesh.normals.push(normal);
            mesh.uvs.push(shared.uvs[i]);
            mesh.colors.push(shared.colors[i]);
            mesh.biomes.push(shared.biomes[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use terrane_terrain::{BiomeClassifier, BiomeTable, ClimateParams, TerrainMapGenerator};

    use crate::height_curve::CurveKey;

    fn builder(shading: Shading) -> MeshBuilder {
        MeshBuilder::new(10.0, HeightCurve::linear(), shading)
    }

    fn flat_inputs(size: usize, h: f32) -> (Grid<f32>, Grid<Vec4>, Grid<Option<BiomeIndex>>) {
        (
            Grid::filled(size, size, h),
            Grid::filled(size, size, Vec4::ONE),
            Grid::filled(size, size, Some(BiomeIndex(3))),
        )
    }

    #[test]
    fn test_lod_stride() {
        assert_eq!(lod_stride(0), 1);
        assert_eq!(lod_stride(1), 2);
        assert_eq!(lod_stride(3), 6);
    }

    /// Coarse lattices always end on the chunk border so neighbours stitch.
    #[test]
    fn test_lattice_keeps_last_visible_sample() {
        assert_eq!(lattice(5, 1), vec![-1, 0, 1, 2, 3, 4, 5]);
        assert_eq!(lattice(5, 2), vec![-1, 0, 2, 4, 5]);
        assert_eq!(lattice(8, 4), vec![-1, 0, 4, 7, 8]);
        assert_eq!(lattice(239, 4).last(), Some(&239));
        assert_eq!(lattice(239, 4)[lattice(239, 4).len() - 2], 238);
    }

    /// The halo ring feeds normals but never becomes vertices.
    #[test]
    fn test_lod0_counts_exclude_halo() {
        let (h, c, b) = flat_inputs(7, 0.5);
        let mesh = builder(Shading::Smooth).build(&h, &c, &b, 0).unwrap();
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.triangle_count(), 32);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.normals.len(), 25);
        assert_eq!(mesh.biomes, vec![Some(BiomeIndex(3)); 25]);
    }

    /// Corrupt heights flatten to the curve's floor instead of panicking the mesh job.
    #[test]
    fn test_nan_heights_build_at_curve_floor() {
        let curve =
            HeightCurve::new(vec![CurveKey::new(0.1, 0.2), CurveKey::new(1.0, 1.0)]).unwrap();
        let builder = MeshBuilder::new(10.0, curve, Shading::Smooth);
        let (h, c, b) = flat_inputs(7, f32::NAN);
        let mesh = builder.build(&h, &c, &b, 0).unwrap();
        assert_eq!(mesh.vertex_count(), 25);
        assert!(mesh.positions.iter().all(|p| (p.y - 2.0).abs() < 1e-6));
    }

    #[test]
    fn test_coarser_lod_reduces_vertices() {
        let (h, c, b) = flat_inputs(7, 0.5);
        let mesh = builder(Shading::Smooth).build(&h, &c, &b, 1).unwrap();
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.lod, 1);
    }

    /// Positions are centred on the chunk and heights scaled by the multiplier.
    #[test]
    fn test_positions_centred_and_scaled() {
        let (h, c, b) = flat_inputs(7, 0.5);
        let mesh = builder(Shading::Smooth).build(&h, &c, &b, 0).unwrap();
        assert_eq!(mesh.positions[0], Vec3::new(-2.0, 5.0, -2.0));
        assert_eq!(mesh.positions[24], Vec3::new(2.0, 5.0, 2.0));
        assert_eq!(mesh.uvs[0], Vec2::ZERO);
        assert_eq!(mesh.uvs[24], Vec2::ONE);
    }

    #[test]
    fn test_flat_terrain_normals_point_up() {
        let (h, c, b) = flat_inputs(9, 0.3);
        for shading in [Shading::Smooth, Shading::Flat] {
            let mesh = builder(shading).build(&h, &c, &b, 0).unwrap();
            assert!(mesh.normals.iter().all(|n| (*n - Vec3::Y).length() < 1e-6));
        }
    }

    /// Border normals on a slope match interior ones because the halo supplies the missing neighbours.
    #[test]
    fn test_border_normals_use_halo() {
        // Height rises along x; the halo carries the slope past the border.
        let size = 8;
        let heights = Grid::from_fn(size, size, |x, _| x as f32 * 0.1);
        let colors = Grid::filled(size, size, Vec4::ONE);
        let biomes = Grid::filled(size, size, None);
        let mesh = builder(Shading::Smooth).build(&heights, &colors, &biomes, 0).unwrap();

        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        for n in &mesh.normals {
            assert!((*n - expected).length() < 1e-5, "{n:?}");
        }
    }

    #[test]
    fn test_flat_shading_unshares_vertices() {
        let (h, c, b) = flat_inputs(7, 0.5);
        let mesh = builder(Shading::Flat).build(&h, &c, &b, 0).unwrap();
        assert_eq!(mesh.vertex_count(), 3 * 32);
        assert_eq!(mesh.indices, (0..96).collect::<Vec<u32>>());
        assert_eq!(mesh.biomes.len(), 96);
    }

    #[test]
    fn test_rejects_bad_grids() {
        let (h, c, b) = flat_inputs(3, 0.5);
        assert!(matches!(
            builder(Shading::Smooth).build(&h, &c, &b, 0),
            Err(MeshError::GridTooSmall { .. })
        ));

        let (h, _, b) = flat_inputs(6, 0.5);
        let colors = Grid::filled(5, 6, Vec4::ONE);
        assert_eq!(
            builder(Shading::Smooth).build(&h, &colors, &b, 0),
            Err(MeshError::GridShapeMismatch)
        );
    }

    /// A fine chunk and its coarser neighbour agree on every shared edge vertex.
    #[test]
    fn test_adjacent_chunks_share_border_across_lods() {
        let cells = 23;
        let chunk_size = (cells - 1) as f64;
        let generator = TerrainMapGenerator::new(
            &ClimateParams::default().with_seed(1),
            BiomeClassifier::new(BiomeTable::default(), Vec4::ONE),
            cells,
        );
        let west = generator.generate(DVec2::new(0.0, 0.0));
        let east = generator.generate(DVec2::new(chunk_size, 0.0));

        let mesher = MeshBuilder::new(40.0, HeightCurve::linear(), Shading::Smooth);
        let fine = mesher.build_map(&west, 0).unwrap();
        let coarse = mesher.build_map(&east, 1).unwrap();

        let half = (cells - 1) as f32 * 0.5;
        let east_edge: Vec<_> = coarse.positions.iter().filter(|p| p.x == -half).collect();
        assert_eq!(east_edge.len(), 12);
        for p in east_edge {
            let matching = fine
                .positions
                .iter()
                .find(|q| q.x == half && q.z == p.z)
                .unwrap();
            assert_eq!(matching.y, p.y, "crack at z = {}", p.z);
        }
    }
}
