//! Observer locomotion: two-axis input sources and a flight rig that turns them into motion.

mod axis;
mod flight;

pub use axis::{AxisKeyframe, AxisSource, ConstantAxes, ScriptedAxes};
pub use flight::{FlightRig, FlightSettings};
