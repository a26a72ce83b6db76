//! Chunk grid coordinates and chunk-space bounds.
//!
//! Chunk space is world space divided by the terrain's uniform scale, so one
//! unit equals one grid cell.

use glam::{DVec2, Vec2, Vec3};

/// Integer position of a chunk in the chunk grid. `y` runs along world `z`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk whose centre is nearest to `position` (chunk space).
    pub fn containing(position: Vec2, chunk_size: f32) -> Self {
        Self {
            x: (position.x / chunk_size).round() as i32,
            y: (position.y / chunk_size).round() as i32,
        }
    }

    /// Chunk-space centre, in `f64` for exact noise sampling.
    pub fn center(self, chunk_size: f32) -> DVec2 {
        DVec2::new(self.x as f64, self.y as f64) * chunk_size as f64
    }

    /// World-space origin of the chunk's mesh.
    pub fn world_origin(self, chunk_size: f32, uniform_scale: f32) -> Vec3 {
        let c = self.center(chunk_size).as_vec2() * uniform_scale;
        Vec3::new(c.x, 0.0, c.y)
    }

    /// Coordinates within `radius` chunks on both axes, row by row.
    pub fn window(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| ChunkCoord::new(self.x + dx, self.y + dy)))
    }
}

/// Square chunk footprint in chunk space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub center: Vec2,
    pub half_extent: f32,
}

impl ChunkBounds {
    pub fn new(coord: ChunkCoord, chunk_size: f32) -> Self {
        Self {
            center: coord.center(chunk_size).as_vec2(),
            half_extent: chunk_size * 0.5,
        }
    }

    /// Distance from `point` to the nearest point of the footprint; 0 inside.
    pub fn distance_to(&self, point: Vec2) -> f32 {
        let d = ((point - self.center).abs() - Vec2::splat(self.half_extent)).max(Vec2::ZERO);
        d.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containing_rounds_to_nearest() {
        assert_eq!(ChunkCoord::containing(Vec2::new(118.0, -120.0), 238.0), ChunkCoord::new(0, -1));
        assert_eq!(ChunkCoord::containing(Vec2::new(500.0, 0.0), 238.0), ChunkCoord::new(2, 0));
    }

    #[test]
    fn test_world_origin_applies_scale() {
        let origin = ChunkCoord::new(1, -2).world_origin(238.0, 2.0);
        assert_eq!(origin, Vec3::new(476.0, 0.0, -952.0));
    }

    #[test]
    fn test_window_covers_square() {
        let coords: Vec<_> = ChunkCoord::new(5, 5).window(1).collect();
        assert_eq!(coords.len(), 9);
        assert_eq!(coords[0], ChunkCoord::new(4, 4));
        assert_eq!(coords[8], ChunkCoord::new(6, 6));
        assert_eq!(ChunkCoord::default().window(0).count(), 1);
    }

    #[test]
    fn test_distance_to_bounds() {
        let bounds = ChunkBounds::new(ChunkCoord::new(0, 0), 238.0);
        assert_eq!(bounds.distance_to(Vec2::ZERO), 0.0);
        assert_eq!(bounds.distance_to(Vec2::new(119.0, 0.0)), 0.0);
        assert_eq!(bounds.distance_to(Vec2::new(419.0, 0.0)), 300.0);
        assert!((bounds.distance_to(Vec2::new(122.0, 123.0)) - 5.0).abs() < 1e-4);
    }
}
