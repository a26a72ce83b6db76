//! Deterministic seeded generation utilities.
//!
//! Every random quantity in terrain generation is derived from an explicit
//! seed through [`ChaCha8Rng`], whose output stream is identical on every
//! platform and thread. Regenerating a chunk therefore reproduces the same
//! noise, colors and fauna.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Half-width of the window each octave's sub-offset is drawn from.
///
/// Large enough that octaves sample unrelated regions of the noise lattice,
/// small enough to keep `f64` precision well below a cell.
pub const OCTAVE_OFFSET_RANGE: f64 = 100_000.0;

/// Seed offset applied to the base seed for the heat field.
pub const HEAT_SEED_OFFSET: u64 = 1;

/// Seed offset applied to the base seed for the humidity field.
pub const HUMIDITY_SEED_OFFSET: u64 = 2;

/// Derives a sibling seed from `base` by a fixed offset.
///
/// Fields sharing a base seed stay reproducible from that one value while
/// sampling independent noise.
#[inline]
pub fn derive_field_seed(base: u64, offset: u64) -> u64 {
    base.wrapping_add(offset)
}

/// Draws one sub-offset per octave from `seed`.
///
/// The same `(seed, octaves)` pair always yields the same offsets, so the
/// octaves of a field decorrelate from each other deterministically.
pub fn octave_offsets(seed: u64, octaves: u32) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..octaves)
        .map(|_| {
            DVec2::new(
                rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
            )
        })
        .collect()
}

/// RNG for decorating the vertex at `vertex_index`.
///
/// Seeded from `vertex_index * multiplier` only, so the choice made at a
/// vertex never depends on what was generated before it.
pub fn vertex_rng(vertex_index: usize, multiplier: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64((vertex_index as u64).wrapping_mul(multiplier))
}
