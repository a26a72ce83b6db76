//! Two-axis input sources.
//!
//! A source exposes a primary axis (turn on X, climb on Y) and a secondary
//! axis (strafe on X, forward on Y). Each component is expected in `[-1, 1]`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Anything that can report the two locomotion axes for the current frame.
pub trait AxisSource {
    /// Turn (X) and climb (Y).
    fn read_primary_axis(&self) -> Vec2;
    /// Strafe (X) and forward (Y).
    fn read_secondary_axis(&self) -> Vec2;
}

/// A source that always reports the same values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstantAxes {
    pub primary: Vec2,
    pub secondary: Vec2,
}

impl ConstantAxes {
    pub const IDLE: Self = Self {
        primary: Vec2::ZERO,
        secondary: Vec2::ZERO,
    };

    pub fn new(primary: Vec2, secondary: Vec2) -> Self {
        Self { primary, secondary }
    }

    /// Straight ahead at the given throttle.
    pub fn forward(throttle: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(0.0, throttle))
    }
}

impl AxisSource for ConstantAxes {
    fn read_primary_axis(&self) -> Vec2 {
        self.primary
    }

    fn read_secondary_axis(&self) -> Vec2 {
        self.secondary
    }
}

/// One held input of a [`ScriptedAxes`] sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisKeyframe {
    /// Seconds the values are held.
    pub duration: f32,
    pub primary: Vec2,
    pub secondary: Vec2,
}

impl AxisKeyframe {
    pub fn new(duration: f32, primary: Vec2, secondary: Vec2) -> Self {
        Self {
            duration,
            primary,
            secondary,
        }
    }
}

/// Replays a fixed sequence of held inputs as time advances.
///
/// Values step from one keyframe to the next without blending. After the
/// last keyframe the sequence either wraps around or reports idle axes.
#[derive(Clone, Debug, Default)]
pub struct ScriptedAxes {
    keyframes: Vec<AxisKeyframe>,
    looping: bool,
    elapsed: f32,
}

impl ScriptedAxes {
    pub fn new(keyframes: Vec<AxisKeyframe>, looping: bool) -> Self {
        Self {
            keyframes,
            looping,
            elapsed: 0.0,
        }
    }

    /// Advance script time by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        let total = self.total_duration();
        if self.looping && total > 0.0 && self.elapsed >= total {
            self.elapsed %= total;
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn total_duration(&self) -> f32 {
        self.keyframes.iter().map(|k| k.duration.max(0.0)).sum()
    }

    /// True once a non-looping script has played every keyframe.
    pub fn is_finished(&self) -> bool {
        !self.looping && self.elapsed >= self.total_duration()
    }

    /// The keyframe active at the current script time.
    pub fn current(&self) -> Option<&AxisKeyframe> {
        let mut start = 0.0;
        for keyframe in &self.keyframes {
            let end = start + keyframe.duration.max(0.0);
            if self.elapsed < end {
                return Some(keyframe);
            }
            start = end;
        }
        None
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

impl AxisSource for ScriptedAxes {
    fn read_primary_axis(&self) -> Vec2 {
        self.current().map_or(Vec2::ZERO, |k| k.primary)
    }

    fn read_secondary_axis(&self) -> Vec2 {
        self.current().map_or(Vec2::ZERO, |k| k.secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(looping: bool) -> ScriptedAxes {
        ScriptedAxes::new(
            vec![
                AxisKeyframe::new(1.0, Vec2::ZERO, Vec2::Y),
                AxisKeyframe::new(0.5, Vec2::X, Vec2::ZERO),
            ],
            looping,
        )
    }

    #[test]
    fn test_constant_axes_report_fixed_values() {
        let axes = ConstantAxes::forward(0.5);
        assert_eq!(axes.read_primary_axis(), Vec2::ZERO);
        assert_eq!(axes.read_secondary_axis(), Vec2::new(0.0, 0.5));
        assert_eq!(ConstantAxes::IDLE.read_secondary_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_script_steps_through_keyframes() {
        let mut axes = script(false);
        assert_eq!(axes.read_secondary_axis(), Vec2::Y);
        axes.advance(0.99);
        assert_eq!(axes.read_secondary_axis(), Vec2::Y);
        axes.advance(0.02);
        assert_eq!(axes.read_primary_axis(), Vec2::X);
        assert_eq!(axes.read_secondary_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_finished_script_reports_idle() {
        let mut axes = script(false);
        axes.advance(2.0);
        assert!(axes.is_finished());
        assert!(axes.current().is_none());
        assert_eq!(axes.read_primary_axis(), Vec2::ZERO);
        assert_eq!(axes.read_secondary_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_looping_script_wraps() {
        let mut axes = script(true);
        axes.advance(1.75);
        assert!(!axes.is_finished());
        assert!((axes.elapsed() - 0.25).abs() < 1e-5);
        assert_eq!(axes.read_secondary_axis(), Vec2::Y);
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut axes = script(false);
        axes.advance(-1.0);
        assert_eq!(axes.elapsed(), 0.0);
    }

    #[test]
    fn test_empty_script_is_idle() {
        let mut axes = ScriptedAxes::new(Vec::new(), true);
        axes.advance(1.0);
        assert_eq!(axes.total_duration(), 0.0);
        assert_eq!(axes.read_secondary_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_keyframes_parse_from_ron() {
        let text = "[(duration: 2.0, primary: (0.0, 1.0), secondary: (0.0, 0.0))]";
        let keyframes: Vec<AxisKeyframe> = ron::from_str(text).unwrap();
        assert_eq!(keyframes[0].duration, 2.0);
        assert_eq!(keyframes[0].primary, Vec2::Y);
    }
}
