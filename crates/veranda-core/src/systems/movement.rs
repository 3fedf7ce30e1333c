//! Movement system — commits one randomized step toward each target.
//!
//! An agent with a live target steps onto one of up to three candidate
//! neighbor cells (horizontal, vertical, diagonal), chosen uniformly among
//! the walkable ones. A fully blocked step clears the target so the
//! behavior system re-selects on the next tick.

use hecs::World;
use rand::Rng;

use veranda_logic::grid::Grid;
use veranda_logic::movement::step_candidates;

use crate::components::{Behavior, BehaviorState, Position, PrevPosition};

/// Advance every non-conversing agent one step toward its target.
pub fn movement_system(world: &mut World, grid: &Grid, rng: &mut impl Rng) {
    for (_entity, (pos, prev, behavior)) in
        world.query_mut::<(&mut Position, &mut PrevPosition, &mut Behavior)>()
    {
        if behavior.state == BehaviorState::Conversing {
            continue;
        }
        let Some(target) = behavior.target else {
            continue;
        };
        if target == pos.0 {
            continue;
        }

        let walkable: Vec<_> = step_candidates(pos.0, target)
            .into_iter()
            .filter(|c| grid.is_walkable(c.x, c.y))
            .collect();

        if walkable.is_empty() {
            // Dead end: force target re-selection next tick, stay put.
            behavior.target = None;
        } else {
            prev.0 = pos.0;
            pos.0 = walkable[rng.gen_range(0..walkable.len())];
        }
    }
}
