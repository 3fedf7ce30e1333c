//! Behavior system — the per-tick state machine for every agent.
//!
//! Conversing agents are frozen in place until a probabilistic release.
//! Everyone else alternates between idling and walking toward a freshly
//! sampled target drawn from a role-dependent spatial bias.

use hecs::World;
use rand::Rng;

use veranda_logic::grid::{Cell, CellPos, Grid};

use crate::components::{AgentId, Behavior, BehaviorState, Position, Role};

/// Tunables for the state machine. Lives inside
/// [`SimConfig`](crate::engine::SimConfig).
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Chance per tick that an idle-or-arrived agent idles instead of
    /// picking a new target.
    pub pause_chance: f32,
    /// Chance per tick that a conversing agent drifts back to pausing.
    pub converse_release_chance: f32,
    /// Chance that idling takes a role-flavored form (observing,
    /// servicing, charging, socializing) instead of plain pausing.
    pub idle_flavor_chance: f32,
    /// Retry budget for the target sampler.
    pub target_attempts: u32,
    /// Half-width of the square the sampler draws candidates from.
    pub target_radius: i32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            pause_chance: 0.3,
            converse_release_chance: 0.02,
            idle_flavor_chance: 0.25,
            target_attempts: 15,
            target_radius: 9,
        }
    }
}

/// Anchor points the sampler biases toward.
#[derive(Debug, Clone, Copy)]
pub struct Anchors {
    pub atrium: CellPos,
    pub reception: CellPos,
}

/// Advance every agent's behavioral state for one tick. Returns the ids of
/// agents whose conversation freeze ended this tick; the engine releases
/// the conversation lock for them so the lock holder is always conversing.
pub fn behavior_system(
    world: &mut World,
    grid: &Grid,
    anchors: Anchors,
    config: &BehaviorConfig,
    rng: &mut impl Rng,
) -> Vec<AgentId> {
    // Positions snapshot for the company check below; taken up front so the
    // mutable pass stays borrow-clean.
    let positions: Vec<CellPos> = world.query::<&Position>().iter().map(|(_, p)| p.0).collect();

    let mut released = Vec::new();

    for (_entity, (id, role, pos, behavior)) in
        world.query_mut::<(&AgentId, &Role, &Position, &mut Behavior)>()
    {
        if behavior.state == BehaviorState::Conversing {
            // Frozen mid-conversation: pin the target, maybe drift out.
            behavior.target = Some(pos.0);
            if rng.gen::<f32>() < config.converse_release_chance {
                behavior.state = BehaviorState::Pausing;
                released.push(id.clone());
            }
            continue;
        }

        let arrived = behavior.target.map_or(true, |t| t == pos.0);
        if !arrived {
            continue;
        }

        if rng.gen::<f32>() < config.pause_chance {
            behavior.state = idle_state(*role, pos.0, &positions, grid, config, rng);
            behavior.target = Some(pos.0);
        } else {
            behavior.state = BehaviorState::Walking;
            let anchor = match role {
                Role::RobotConcierge => anchors.reception,
                _ => anchors.atrium,
            };
            behavior.target = Some(sample_target(
                grid,
                anchor,
                pos.0,
                config.target_attempts,
                config.target_radius,
                rng,
            ));
        }
    }

    released
}

/// Sample a walkable target near `anchor`. Falls back to `current` when the
/// retry budget is exhausted — the agent stays put this tick, which is a
/// documented degenerate case and self-heals on the next tick.
pub fn sample_target(
    grid: &Grid,
    anchor: CellPos,
    current: CellPos,
    attempts: u32,
    radius: i32,
    rng: &mut impl Rng,
) -> CellPos {
    for _ in 0..attempts {
        let candidate = CellPos::new(
            anchor.x + rng.gen_range(-radius..=radius),
            anchor.y + rng.gen_range(-radius..=radius),
        );
        if grid.is_walkable(candidate.x, candidate.y) {
            return candidate;
        }
    }
    current
}

/// Pick the idle state an agent settles into. Mostly plain pausing; with a
/// configured chance, a role-flavored variant.
fn idle_state(
    role: Role,
    pos: CellPos,
    positions: &[CellPos],
    grid: &Grid,
    config: &BehaviorConfig,
    rng: &mut impl Rng,
) -> BehaviorState {
    if rng.gen::<f32>() >= config.idle_flavor_chance {
        return BehaviorState::Pausing;
    }
    if role.is_robot() && grid.get(pos.x, pos.y) == Some(Cell::ServiceHub) {
        return BehaviorState::Charging;
    }
    match role {
        Role::Guest | Role::Staff => {
            let company = positions.iter().filter(|p| p.chebyshev(&pos) <= 2).count() > 1;
            if company {
                BehaviorState::Socializing
            } else {
                BehaviorState::Observing
            }
        }
        Role::RobotWaiter | Role::RobotConcierge | Role::RobotGardener => BehaviorState::Servicing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_grid() -> Grid {
        let mut grid = Grid::new(20, 20);
        grid.fill_rect(0, 0, 19, 19, Cell::LobbyFloor);
        grid
    }

    fn anchors() -> Anchors {
        Anchors {
            atrium: CellPos::new(10, 10),
            reception: CellPos::new(5, 5),
        }
    }

    #[test]
    fn sampler_returns_walkable_candidate() {
        let grid = open_grid();
        let mut rng = StdRng::seed_from_u64(5);
        let target = sample_target(&grid, CellPos::new(10, 10), CellPos::new(0, 0), 15, 5, &mut rng);
        assert!(grid.is_walkable(target.x, target.y));
    }

    #[test]
    fn exhausted_sampler_falls_back_to_current() {
        // Only the agent's own cell is walkable; every sampled candidate
        // around the distant anchor misses.
        let mut grid = Grid::new(40, 40);
        grid.set(2, 2, Cell::LobbyFloor);
        let mut rng = StdRng::seed_from_u64(5);
        let current = CellPos::new(2, 2);
        let target = sample_target(&grid, CellPos::new(30, 30), current, 15, 3, &mut rng);
        assert_eq!(target, current);
    }

    #[test]
    fn conversing_agent_stays_pinned() {
        let grid = open_grid();
        let mut world = World::new();
        let entity = world.spawn((
            AgentId::new("G-1"),
            Role::Guest,
            Position(CellPos::new(4, 4)),
            Behavior {
                state: BehaviorState::Conversing,
                target: None,
            },
        ));

        let config = BehaviorConfig {
            converse_release_chance: 0.0,
            ..BehaviorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let released = behavior_system(&mut world, &grid, anchors(), &config, &mut rng);

        assert!(released.is_empty());
        let behavior = world.get::<&Behavior>(entity).unwrap();
        assert_eq!(behavior.state, BehaviorState::Conversing);
        assert_eq!(behavior.target, Some(CellPos::new(4, 4)));
    }

    #[test]
    fn conversing_agent_eventually_released() {
        let grid = open_grid();
        let mut world = World::new();
        let entity = world.spawn((
            AgentId::new("G-1"),
            Role::Guest,
            Position(CellPos::new(4, 4)),
            Behavior {
                state: BehaviorState::Conversing,
                target: None,
            },
        ));

        let config = BehaviorConfig {
            converse_release_chance: 1.0,
            ..BehaviorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let released = behavior_system(&mut world, &grid, anchors(), &config, &mut rng);

        assert_eq!(released, vec![AgentId::new("G-1")]);
        let behavior = world.get::<&Behavior>(entity).unwrap();
        assert_eq!(behavior.state, BehaviorState::Pausing);
    }

    #[test]
    fn arrived_agent_walks_or_pauses() {
        let grid = open_grid();
        let mut world = World::new();
        let entity = world.spawn((
            AgentId::new("G-1"),
            Role::Guest,
            Position(CellPos::new(4, 4)),
            Behavior::idle(),
        ));

        // pause_chance 0 forces a retarget.
        let config = BehaviorConfig {
            pause_chance: 0.0,
            ..BehaviorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        behavior_system(&mut world, &grid, anchors(), &config, &mut rng);

        let behavior = world.get::<&Behavior>(entity).unwrap();
        assert_eq!(behavior.state, BehaviorState::Walking);
        let target = behavior.target.unwrap();
        assert!(grid.is_walkable(target.x, target.y));
    }

    #[test]
    fn walking_agent_with_pending_target_is_left_alone() {
        let grid = open_grid();
        let mut world = World::new();
        let target = CellPos::new(12, 12);
        let entity = world.spawn((
            AgentId::new("G-1"),
            Role::Guest,
            Position(CellPos::new(4, 4)),
            Behavior {
                state: BehaviorState::Walking,
                target: Some(target),
            },
        ));

        let mut rng = StdRng::seed_from_u64(1);
        behavior_system(&mut world, &grid, anchors(), &BehaviorConfig::default(), &mut rng);

        let behavior = world.get::<&Behavior>(entity).unwrap();
        assert_eq!(behavior.state, BehaviorState::Walking);
        assert_eq!(behavior.target, Some(target));
    }
}
