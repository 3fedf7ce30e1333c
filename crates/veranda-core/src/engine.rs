//! Simulation engine — main entry point for running the hotel floor.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use veranda_logic::grid::{CellPos, Grid, Room};

use crate::components::{
    AgentId, Behavior, BehaviorState, Dialogue, DialogueUpdate, Mood, Position, PrevPosition, Role,
};
use crate::conversation::ConversationLock;
use crate::generation::{self, GenerationError};
use crate::snapshot::{AgentSnapshot, WorldSnapshot};
use crate::systems::{behavior_system, movement_system, Anchors, BehaviorConfig};

/// Ambience flavor. Affects only dialogue prompts and the presentation
/// layer, never movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Atmosphere {
    #[default]
    Calm,
    Lively,
    Festive,
    Stormy,
}

impl Atmosphere {
    pub fn label(&self) -> &'static str {
        match self {
            Atmosphere::Calm => "calm and unhurried",
            Atmosphere::Lively => "lively, with a pleasant buzz",
            Atmosphere::Festive => "festive, decorated for an occasion",
            Atmosphere::Stormy => "hushed while a storm rattles the glass roof",
        }
    }
}

/// Configuration for a simulation instance.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub width: i32,
    pub height: i32,
    pub guests: u32,
    pub robots: u32,
    /// Seed for all randomness (generation decor and per-tick rolls).
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
    /// In-simulation hours advanced per fast tick.
    pub hours_per_tick: f32,
    /// Hour of day the simulation opens at.
    pub start_hour: f32,
    pub behavior: BehaviorConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: generation::DEFAULT_WIDTH,
            height: generation::DEFAULT_HEIGHT,
            guests: 10,
            robots: 5,
            seed: None,
            hours_per_tick: 0.005,
            start_hour: 8.0,
            behavior: BehaviorConfig::default(),
        }
    }
}

/// A tick-stamped entry in the append-only event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub tick: u64,
    pub message: String,
}

/// Append-only event log owned by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    fn push(&mut self, tick: u64, message: String) {
        self.entries.push(LogEntry { tick, message });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

/// The simulation engine. Owns the world, the generated floor, the
/// conversation lock and the clock; one instance per simulation, with no
/// process-wide state.
pub struct HotelEngine {
    world: World,
    grid: Grid,
    rooms: Vec<Room>,
    anchors: Anchors,
    lock: ConversationLock,
    index: HashMap<AgentId, Entity>,
    roster: Vec<AgentId>,
    tick: u64,
    hour_of_day: f32,
    atmosphere: Atmosphere,
    log: EventLog,
    rng: StdRng,
    config: SimConfig,
}

impl HotelEngine {
    /// Generate the floor and spawn the population. Fails fast only on
    /// degenerate bounds.
    pub fn new(config: SimConfig) -> Result<Self, GenerationError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let plan = generation::generate_floor(config.width, config.height, &mut rng)?;
        let mut world = World::new();
        let spawned = generation::spawn_agents(&mut world, &plan, config.guests, config.robots, &mut rng);

        let mut index = HashMap::new();
        let mut roster = Vec::with_capacity(spawned.len());
        for (id, entity) in spawned {
            index.insert(id.clone(), entity);
            roster.push(id);
        }

        let mut log = EventLog::default();
        log.push(0, format!("floor generated: {} rooms, {} agents", plan.rooms.len(), roster.len()));

        Ok(Self {
            world,
            grid: plan.grid,
            rooms: plan.rooms,
            anchors: Anchors {
                atrium: plan.atrium_center,
                reception: plan.reception_center,
            },
            lock: ConversationLock::new(),
            index,
            roster,
            tick: 0,
            hour_of_day: config.start_hour % 24.0,
            atmosphere: Atmosphere::default(),
            log,
            rng,
            config,
        })
    }

    /// Advance one fast tick: clock, behavior state machine, movement.
    pub fn tick(&mut self) {
        self.tick += 1;
        self.hour_of_day = (self.hour_of_day + self.config.hours_per_tick) % 24.0;

        let released = behavior_system(
            &mut self.world,
            &self.grid,
            self.anchors,
            &self.config.behavior,
            &mut self.rng,
        );
        // The state machine only ends the movement freeze; the lock is
        // released here so its holder is always conversing.
        for id in released {
            self.lock.release(&id);
            self.log.push(self.tick, format!("{id} drifted out of conversation"));
        }

        movement_system(&mut self.world, &self.grid, &mut self.rng);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Current hour of day (wrapping 0–24).
    pub fn hour_of_day(&self) -> f32 {
        self.hour_of_day
    }

    pub fn atmosphere(&self) -> Atmosphere {
        self.atmosphere
    }

    pub fn set_atmosphere(&mut self, atmosphere: Atmosphere) {
        if self.atmosphere != atmosphere {
            self.atmosphere = atmosphere;
            self.log.push(self.tick, format!("atmosphere shifted to {atmosphere:?}"));
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn agent_count(&self) -> usize {
        self.roster.len()
    }

    pub fn conversing_agent(&self) -> Option<&AgentId> {
        self.lock.holder()
    }

    /// The room containing `pos`, most specific first.
    pub fn room_at(&self, pos: CellPos) -> Option<&Room> {
        veranda_logic::grid::room_at(&self.rooms, pos)
    }

    /// Ids of agents currently inside the given room.
    pub fn agents_in_room(&self, room_id: u32) -> Vec<AgentId> {
        let Some(room) = self.rooms.iter().find(|r| r.id == room_id) else {
            return Vec::new();
        };
        self.world
            .query::<(&AgentId, &Position)>()
            .iter()
            .filter(|(_, (_, pos))| room.contains(pos.0))
            .map(|(_, (id, _))| id.clone())
            .collect()
    }

    /// Build the read-only view consumed by the presentation layer and the
    /// dialogue pipeline. Agents appear in creation order.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut agents = Vec::with_capacity(self.roster.len());
        for id in &self.roster {
            let Some(&entity) = self.index.get(id) else {
                continue;
            };
            let Ok(mut query) = self
                .world
                .query_one::<(&Role, &Position, &PrevPosition, &Behavior, &Mood, &Dialogue)>(entity)
            else {
                continue;
            };
            if let Some((role, pos, prev, behavior, mood, dialogue)) = query.get() {
                agents.push(AgentSnapshot {
                    id: id.clone(),
                    role: *role,
                    pos: pos.0,
                    prev: prev.0,
                    state: behavior.state,
                    target: behavior.target,
                    mood: mood.0.clone(),
                    line: dialogue.line.clone(),
                    has_audio: dialogue.audio.is_some(),
                    generating: dialogue.generating,
                    last_generated: dialogue.last_generated,
                });
            }
        }
        WorldSnapshot {
            tick: self.tick,
            hour_of_day: self.hour_of_day,
            atmosphere: self.atmosphere,
            agents,
        }
    }

    /// Place an agent into conversation, returning whoever previously held
    /// the lock. Only guests and robot waiters are eligible; for any other
    /// role (or an unknown id) this is a no-op returning `None`.
    ///
    /// In one logical update: the previous holder is settled back to
    /// pausing, the new holder becomes conversing with its target pinned,
    /// and its dialogue-in-progress flag is raised.
    pub fn enter_conversation(&mut self, id: &AgentId) -> Option<AgentId> {
        let Some(&entity) = self.index.get(id) else {
            return None;
        };
        let eligible = self
            .world
            .get::<&Role>(entity)
            .map(|role| role.speaks())
            .unwrap_or(false);
        if !eligible {
            return None;
        }

        let previous = self.lock.acquire(id.clone());
        if let Some(prev_id) = previous.as_ref().filter(|p| *p != id) {
            if let Some(&prev_entity) = self.index.get(prev_id) {
                if let Ok(mut behavior) = self.world.get::<&mut Behavior>(prev_entity) {
                    if behavior.state == BehaviorState::Conversing {
                        behavior.state = BehaviorState::Pausing;
                    }
                }
            }
        }

        if let Ok(mut behavior) = self.world.get::<&mut Behavior>(entity) {
            let pinned = self.world.get::<&Position>(entity).map(|p| p.0).ok();
            behavior.state = BehaviorState::Conversing;
            behavior.target = pinned.or(behavior.target);
        }
        if let Ok(mut dialogue) = self.world.get::<&mut Dialogue>(entity) {
            dialogue.generating = true;
        }
        self.log.push(self.tick, format!("{id} entered conversation"));
        previous
    }

    /// End an agent's conversation. Idempotent; stale callers are safe.
    pub fn exit_conversation(&mut self, id: &AgentId) {
        let was_holder = self.lock.holder() == Some(id);
        self.lock.release(id);
        if !was_holder {
            return;
        }
        if let Some(&entity) = self.index.get(id) {
            if let Ok(mut behavior) = self.world.get::<&mut Behavior>(entity) {
                if behavior.state == BehaviorState::Conversing {
                    behavior.state = BehaviorState::Pausing;
                }
            }
        }
        self.log.push(self.tick, format!("{id} left conversation"));
    }

    /// Apply a completed dialogue job. A stale or unknown agent id is a
    /// safe no-op. The in-progress flag always clears; a job that produced
    /// nothing reverts a still-conversing holder to pausing so no agent is
    /// ever stuck "loading".
    pub fn apply_dialogue_update(&mut self, update: DialogueUpdate) {
        let DialogueUpdate {
            agent_id,
            line,
            audio,
            generated_at,
        } = update;
        let Some(&entity) = self.index.get(&agent_id) else {
            return;
        };

        let produced_line = line.is_some();
        if let Some(line) = &line {
            self.log.push(self.tick, format!("{agent_id} says: {line}"));
        }
        if let Ok(mut dialogue) = self.world.get::<&mut Dialogue>(entity) {
            dialogue.generating = false;
            if produced_line {
                dialogue.line = line;
                dialogue.audio = audio;
                dialogue.last_generated = Some(generated_at);
            }
        }

        if !produced_line && self.lock.holder() == Some(&agent_id) {
            // A failed immediate request must not leave the holder frozen.
            self.exit_conversation(&agent_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HotelEngine {
        HotelEngine::new(SimConfig {
            seed: Some(42),
            ..SimConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn engine_generation_counts() {
        let engine = engine();
        assert_eq!(engine.agent_count(), 15);
        assert!(engine.rooms().len() > 10);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn degenerate_bounds_fail_fast() {
        let result = HotelEngine::new(SimConfig {
            width: 20,
            height: 20,
            ..SimConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn clock_wraps_at_midnight() {
        let mut engine = HotelEngine::new(SimConfig {
            seed: Some(1),
            start_hour: 23.9,
            hours_per_tick: 0.05,
            ..SimConfig::default()
        })
        .unwrap();
        for _ in 0..4 {
            engine.tick();
        }
        assert!(engine.hour_of_day() < 23.9);
    }

    #[test]
    fn snapshot_is_stable_and_complete() {
        let mut engine = engine();
        engine.tick();
        let a = engine.snapshot();
        let b = engine.snapshot();
        assert_eq!(a.agents.len(), 15);
        let ids_a: Vec<_> = a.agents.iter().map(|s| s.id.clone()).collect();
        let ids_b: Vec<_> = b.agents.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn stale_dialogue_update_is_noop() {
        let mut engine = engine();
        engine.apply_dialogue_update(DialogueUpdate {
            agent_id: AgentId::new("G-99"),
            line: Some("Hello.".to_string()),
            audio: None,
            generated_at: std::time::Instant::now(),
        });
        // Nothing changed; no agent picked up the line.
        assert!(engine.snapshot().agents.iter().all(|a| a.line.is_none()));
    }

    #[test]
    fn successful_update_writes_dialogue_state() {
        let mut engine = engine();
        let id = AgentId::new("G-1");
        engine.apply_dialogue_update(DialogueUpdate {
            agent_id: id.clone(),
            line: Some("The garden is lovely.".to_string()),
            audio: None,
            generated_at: std::time::Instant::now(),
        });
        let snapshot = engine.snapshot();
        let agent = snapshot.agent(&id).unwrap();
        assert_eq!(agent.line.as_deref(), Some("The garden is lovely."));
        assert!(agent.last_generated.is_some());
        assert!(!agent.generating);
    }

    #[test]
    fn failed_update_unfreezes_conversing_holder() {
        let mut engine = engine();
        let id = AgentId::new("G-2");
        engine.enter_conversation(&id);
        assert_eq!(engine.conversing_agent(), Some(&id));

        engine.apply_dialogue_update(DialogueUpdate {
            agent_id: id.clone(),
            line: None,
            audio: None,
            generated_at: std::time::Instant::now(),
        });

        assert_eq!(engine.conversing_agent(), None);
        let snapshot = engine.snapshot();
        let agent = snapshot.agent(&id).unwrap();
        assert_eq!(agent.state, BehaviorState::Pausing);
        assert!(!agent.generating);
    }

    #[test]
    fn ineligible_roles_reject_conversation() {
        let mut engine = engine();
        // R-2 is a concierge; only guests and robot waiters may converse.
        let id = AgentId::new("R-2");
        assert_eq!(engine.enter_conversation(&id), None);
        assert_eq!(engine.conversing_agent(), None);
    }
}
