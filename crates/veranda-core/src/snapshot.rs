//! Read-only views of the world, refreshed every fast tick.
//!
//! Snapshots are what the presentation layer renders and what the dialogue
//! pipeline reads at drain time; neither ever touches the live world.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use veranda_logic::grid::CellPos;
use veranda_logic::movement;

use crate::components::{AgentId, BehaviorState, Role};
use crate::engine::Atmosphere;

/// Per-agent view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub role: Role,
    pub pos: CellPos,
    pub prev: CellPos,
    pub state: BehaviorState,
    pub target: Option<CellPos>,
    pub mood: String,
    pub line: Option<String>,
    pub has_audio: bool,
    pub generating: bool,
    #[serde(skip)]
    pub last_generated: Option<Instant>,
}

impl AgentSnapshot {
    /// Unit facing vector derived from the previous cell.
    pub fn facing(&self) -> (i32, i32) {
        movement::facing(self.prev, self.pos)
    }
}

/// Whole-world view: the agent roster in creation order plus clock and
/// ambience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub hour_of_day: f32,
    pub atmosphere: Atmosphere,
    pub agents: Vec<AgentSnapshot>,
}

impl WorldSnapshot {
    pub fn agent(&self, id: &AgentId) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| &a.id == id)
    }

    /// Other agents within `radius` (Chebyshev) of the given agent.
    pub fn neighbors_of(&self, id: &AgentId, radius: i32) -> Vec<&AgentSnapshot> {
        let Some(center) = self.agent(id) else {
            return Vec::new();
        };
        self.agents
            .iter()
            .filter(|a| &a.id != id && a.pos.chebyshev(&center.pos) <= radius)
            .collect()
    }
}
