//! Flight rig: integrates two-axis input into observer position and heading.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::axis::AxisSource;

/// Tuning for [`FlightRig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightSettings {
    /// Degrees per second of clockwise yaw at full turn input.
    pub turn_speed: f32,
    /// World units per second at full forward input.
    pub move_speed: f32,
    /// Whether the secondary X axis moves sideways.
    pub enable_strafe: bool,
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self {
            turn_speed: 60.0,
            move_speed: 1.0,
            enable_strafe: true,
        }
    }
}

/// A free-flying observer rig. Y is up; yaw 0 faces +Z and positive yaw
/// turns clockwise seen from above.
#[derive(Clone, Debug)]
pub struct FlightRig {
    pub settings: FlightSettings,
    pub position: Vec3,
    /// Heading in degrees.
    pub yaw: f32,
}

impl FlightRig {
    pub fn new(settings: FlightSettings, position: Vec3) -> Self {
        Self {
            settings,
            position,
            yaw: 0.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(sin, 0.0, cos)
    }

    pub fn right(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(cos, 0.0, -sin)
    }

    /// Degrees to turn this frame for the given primary input.
    ///
    /// Only input pointing mostly sideways turns the rig; mostly vertical
    /// input is left for climbing.
    pub fn turn_amount(&self, primary: Vec2, dt: f32) -> f32 {
        if primary == Vec2::ZERO || primary.x.abs() <= primary.y.abs() {
            return 0.0;
        }
        primary.length() * primary.x.signum() * self.settings.turn_speed * dt
    }

    /// World-space translation for this frame, using the current heading.
    pub fn desired_move(&self, primary: Vec2, secondary: Vec2, dt: f32) -> Vec3 {
        if primary == Vec2::ZERO && secondary == Vec2::ZERO {
            return Vec3::ZERO;
        }
        let step = self.settings.move_speed * dt;
        let strafe = if self.settings.enable_strafe {
            secondary.x
        } else {
            0.0
        };
        // Clamp rather than normalize so diagonals are not faster but analog input still crawls.
        let planar = Vec2::new(strafe, secondary.y).clamp_length_max(1.0);
        let horizontal = (self.right() * planar.x + self.forward() * planar.y) * step;
        let climb = primary.normalize_or_zero().y * step;
        horizontal + Vec3::Y * climb
    }

    /// Read both axes, turn, then move. Returns the translation applied.
    pub fn update(&mut self, source: &impl AxisSource, dt: f32) -> Vec3 {
        let primary = source.read_primary_axis();
        let turn = self.turn_amount(primary, dt);
        if turn != 0.0 {
            self.yaw = (self.yaw + turn).rem_euclid(360.0);
        }
        let secondary = source.read_secondary_axis();
        let motion = self.desired_move(primary, secondary, dt);
        self.position += motion;
        tracing::trace!(?primary, ?secondary, yaw = self.yaw, "flight rig update");
        motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::ConstantAxes;

    fn rig() -> FlightRig {
        FlightRig::new(
            FlightSettings {
                move_speed: 10.0,
                ..Default::default()
            },
            Vec3::ZERO,
        )
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_idle_input_does_not_move() {
        let mut rig = rig();
        let moved = rig.update(&ConstantAxes::IDLE, 1.0);
        assert_eq!(moved, Vec3::ZERO);
        assert_eq!(rig.yaw, 0.0);
    }

    #[test]
    fn test_forward_moves_along_positive_z() {
        let mut rig = rig();
        rig.update(&ConstantAxes::forward(1.0), 0.5);
        assert!(approx(rig.position, Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_turn_rate_is_degrees_per_second() {
        let mut rig = rig();
        let axes = ConstantAxes::new(Vec2::X, Vec2::ZERO);
        rig.update(&axes, 1.0);
        assert!((rig.yaw - 60.0).abs() < 1e-4);
        let axes = ConstantAxes::new(Vec2::NEG_X, Vec2::ZERO);
        rig.update(&axes, 2.0);
        assert!((rig.yaw - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_mostly_vertical_primary_climbs_without_turning() {
        let mut rig = rig();
        let axes = ConstantAxes::new(Vec2::new(0.2, 0.8), Vec2::ZERO);
        rig.update(&axes, 1.0);
        assert_eq!(rig.yaw, 0.0);
        let expected_climb = Vec2::new(0.2, 0.8).normalize().y * 10.0;
        assert!((rig.position.y - expected_climb).abs() < 1e-4);
    }

    #[test]
    fn test_heading_rotates_forward_motion() {
        let mut rig = rig();
        rig.yaw = 90.0;
        rig.update(&ConstantAxes::forward(1.0), 1.0);
        assert!(approx(rig.position, Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_diagonal_is_clamped() {
        let rig = rig();
        let motion = rig.desired_move(Vec2::ZERO, Vec2::ONE, 1.0);
        assert!((motion.length() - 10.0).abs() < 1e-4);
        let slow = rig.desired_move(Vec2::ZERO, Vec2::new(0.0, 0.25), 1.0);
        assert!((slow.length() - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_strafe_can_be_disabled() {
        let mut rig = rig();
        rig.settings.enable_strafe = false;
        let motion = rig.desired_move(Vec2::ZERO, Vec2::X, 1.0);
        assert_eq!(motion, Vec3::ZERO);
    }

    #[test]
    fn test_right_is_perpendicular_to_forward() {
        let mut rig = rig();
        rig.yaw = 37.0;
        assert!(rig.forward().dot(rig.right()).abs() < 1e-6);
        rig.yaw = 0.0;
        assert!(approx(rig.right(), Vec3::X));
    }
}
