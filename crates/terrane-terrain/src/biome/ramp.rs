//! Height-driven color ramps.

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// One stop of a [`ColorRamp`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Linear RGBA color.
    pub color: Vec4,
    /// Height fraction in `[0, 1]` at which this stop is half blended in.
    pub start_height: f32,
    /// Width of the blend band centred on `start_height`. Zero gives a hard edge.
    pub blend: f32,
}

/// Ordered list of color stops composited bottom to top.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    /// Stops in compositing order.
    pub stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Creates a ramp from stops in compositing order.
    pub fn new(stops: Vec<ColorStop>) -> Self {
        Self { stops }
    }

    /// Color at `height_fraction` in `[0, 1]`.
    ///
    /// Starts from black and, for each stop in order, blends toward the stop's
    /// color by its draw strength: 0 below `start_height - blend / 2`, 1 above
    /// `start_height + blend / 2`, linear in between. Exactly at
    /// `start_height` the result is an even mix of the previous color and the
    /// stop's color.
    pub fn color_at(&self, height_fraction: f32) -> Vec4 {
        self.stops.iter().fold(Vec4::ZERO, |color, stop| {
            let strength = draw_strength(height_fraction - stop.start_height, stop.blend * 0.5);
            color * (1.0 - strength) + stop.color * strength
        })
    }
}

/// Clamped inverse lerp of `delta` across `[-half_width, half_width]`.
fn draw_strength(delta: f32, half_width: f32) -> f32 {
    if half_width <= 0.0 {
        return if delta >= 0.0 { 1.0 } else { 0.0 };
    }
    inverse_lerp(-half_width, half_width, delta)
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns 0 when `a == b`.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
