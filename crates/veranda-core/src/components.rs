//! Agent components: identity, role, position, behavior, mood, dialogue.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use veranda_logic::grid::CellPos;

/// Stable identifier for an agent (`"G-3"`, `"R-1"`, …). Unique for the
/// agent's lifetime; agents are never destroyed during a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an agent is. Drives target sampling bias, dialogue eligibility and
/// voice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Guest,
    Staff,
    RobotWaiter,
    RobotConcierge,
    RobotGardener,
}

impl Role {
    /// Roles that can be placed into conversation and picked up by the
    /// ambient dialogue sweep.
    pub fn speaks(&self) -> bool {
        matches!(self, Role::Guest | Role::RobotWaiter)
    }

    pub fn is_robot(&self) -> bool {
        matches!(
            self,
            Role::RobotWaiter | Role::RobotConcierge | Role::RobotGardener
        )
    }

    /// Short label used in prompts and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Staff => "staff member",
            Role::RobotWaiter => "robot waiter",
            Role::RobotConcierge => "robot concierge",
            Role::RobotGardener => "robot gardener",
        }
    }
}

/// Behavioral state advanced by the fast tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    Walking,
    Pausing,
    Observing,
    Servicing,
    Charging,
    Socializing,
    Conversing,
}

impl BehaviorState {
    /// States in which the periodic sweep may pick an agent up for ambient
    /// dialogue.
    pub fn accepts_ambient_dialogue(&self) -> bool {
        matches!(
            self,
            BehaviorState::Pausing
                | BehaviorState::Socializing
                | BehaviorState::Observing
                | BehaviorState::Servicing
                | BehaviorState::Conversing
        )
    }
}

/// Current cell of an agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position(pub CellPos);

/// Cell occupied before the last committed movement step. Used only to
/// derive a facing direction for rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PrevPosition(pub CellPos);

/// Behavior state plus the cell the agent is walking toward. A `None`
/// target forces re-selection on the next tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Behavior {
    pub state: BehaviorState,
    pub target: Option<CellPos>,
}

impl Behavior {
    pub fn idle() -> Self {
        Self {
            state: BehaviorState::Pausing,
            target: None,
        }
    }
}

/// Free-text mood label fed into dialogue prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mood(pub String);

/// Opaque handle to synthesized speech audio. Cheap to clone; playback is
/// the presentation layer's concern.
#[derive(Debug, Clone)]
pub struct AudioHandle(Arc<Vec<u8>>);

impl AudioHandle {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dialogue bookkeeping, written back by the pipeline via
/// [`DialogueUpdate`].
#[derive(Debug, Clone, Default)]
pub struct Dialogue {
    /// Last generated spoken line.
    pub line: Option<String>,
    /// Last synthesized audio for that line.
    pub audio: Option<AudioHandle>,
    /// When the last line was generated; gates the periodic sweep.
    pub last_generated: Option<Instant>,
    /// Transient flag: a generation job for this agent is queued or in
    /// flight.
    pub generating: bool,
}

/// Result of one dialogue job, reported back to the engine. A `None` line
/// means the job failed or produced nothing usable; the update must still
/// be applied so the in-progress flag clears.
#[derive(Debug, Clone)]
pub struct DialogueUpdate {
    pub agent_id: AgentId,
    pub line: Option<String>,
    pub audio: Option<AudioHandle>,
    pub generated_at: Instant,
}
