//! Hotel floor simulation engine.
//!
//! A [`HotelEngine`](engine::HotelEngine) owns a generated floor plan, a
//! fixed population of agents stored in a hecs world, the single-holder
//! conversation lock, and the in-simulation clock. The presentation layer
//! drives it with `tick()` on a fast cadence and reads back immutable
//! [`WorldSnapshot`](snapshot::WorldSnapshot)s; the dialogue pipeline in
//! `veranda-voice` feeds results back through
//! [`apply_dialogue_update`](engine::HotelEngine::apply_dialogue_update).

pub mod components;
pub mod conversation;
pub mod engine;
pub mod generation;
pub mod snapshot;
pub mod systems;

pub use engine::{Atmosphere, HotelEngine, SimConfig};
