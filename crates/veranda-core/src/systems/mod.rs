//! Per-tick systems operating on the agent world.

pub mod behavior;
pub mod movement;

pub use behavior::{behavior_system, sample_target, Anchors, BehaviorConfig};
pub use movement::movement_system;
