//! Queue-level behavior of the dialogue pipeline, driven without any
//! credentials: every external call fails softly, but every job must still
//! settle into exactly one update, strictly one at a time, in order.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

use veranda_core::components::{AgentId, BehaviorState, Role};
use veranda_core::snapshot::{AgentSnapshot, WorldSnapshot};
use veranda_core::Atmosphere;
use veranda_logic::grid::CellPos;
use veranda_voice::config::{PipelineConfig, SpeechConfig, TextConfig};
use veranda_voice::pipeline::DialoguePipeline;
use veranda_voice::speech::SpeechClient;
use veranda_voice::text::TextClient;

fn agent(id: &str, role: Role, state: BehaviorState, last: Option<Instant>) -> AgentSnapshot {
    AgentSnapshot {
        id: AgentId::new(id),
        role,
        pos: CellPos::new(10, 10),
        prev: CellPos::new(10, 10),
        state,
        target: None,
        mood: "content".to_string(),
        line: None,
        has_audio: false,
        generating: false,
        last_generated: last,
    }
}

fn world(agents: Vec<AgentSnapshot>) -> WorldSnapshot {
    WorldSnapshot {
        tick: 1,
        hour_of_day: 14.0,
        atmosphere: Atmosphere::Calm,
        agents,
    }
}

fn quick_config() -> PipelineConfig {
    PipelineConfig {
        inter_job_delay: Duration::ZERO,
        sweep_chance: 1.0,
        ..PipelineConfig::default()
    }
}

fn spawn_pipeline(
    snapshot: WorldSnapshot,
    config: PipelineConfig,
) -> (
    DialoguePipeline,
    tokio::sync::mpsc::UnboundedReceiver<veranda_core::components::DialogueUpdate>,
    watch::Sender<WorldSnapshot>,
) {
    let (snap_tx, snap_rx) = watch::channel(snapshot);
    let (pipeline, updates) = DialoguePipeline::spawn(
        TextClient::new(TextConfig::disabled()),
        SpeechClient::new(SpeechConfig::disabled()),
        Vec::new(),
        snap_rx,
        config,
    );
    (pipeline, updates, snap_tx)
}

#[tokio::test]
async fn immediate_jobs_drain_in_fifo_order() {
    let snapshot = world(vec![
        agent("G-1", Role::Guest, BehaviorState::Pausing, None),
        agent("G-2", Role::Guest, BehaviorState::Pausing, None),
        agent("R-1", Role::RobotWaiter, BehaviorState::Servicing, None),
    ]);
    let (pipeline, mut updates, _snap_tx) = spawn_pipeline(snapshot, quick_config());

    for id in ["G-1", "G-2", "R-1", "G-1"] {
        assert!(pipeline.request_immediate(AgentId::new(id)));
    }

    let mut drained = Vec::new();
    for _ in 0..4 {
        let update = updates.recv().await.expect("worker dropped");
        // Without credentials no dialogue is produced, but the job settles.
        assert!(update.line.is_none());
        assert!(update.audio.is_none());
        drained.push(update.agent_id.as_str().to_string());
    }
    assert_eq!(drained, vec!["G-1", "G-2", "R-1", "G-1"]);
}

#[tokio::test]
async fn drained_updates_match_enqueued_jobs() {
    let snapshot = world(vec![agent("G-1", Role::Guest, BehaviorState::Pausing, None)]);
    let (pipeline, mut updates, _snap_tx) = spawn_pipeline(snapshot, quick_config());

    let enqueued = 12;
    for _ in 0..enqueued {
        pipeline.request_immediate(AgentId::new("G-1"));
    }

    for _ in 0..enqueued {
        updates.recv().await.expect("missing update for a queued job");
    }
    // No spurious extra updates.
    let extra = tokio::time::timeout(Duration::from_millis(100), updates.recv()).await;
    assert!(extra.is_err(), "got more updates than jobs");
}

#[tokio::test]
async fn sweep_respects_cooldown_and_immediate_bypasses_it() {
    let now = Instant::now();
    let fresh = agent("G-1", Role::Guest, BehaviorState::Pausing, Some(now));
    let stale = agent("G-2", Role::Guest, BehaviorState::Pausing, None);
    let snapshot = world(vec![fresh, stale]);
    let (pipeline, mut updates, _snap_tx) = spawn_pipeline(snapshot.clone(), quick_config());

    let mut rng = StdRng::seed_from_u64(1);
    let queued = pipeline.sweep(&snapshot, now, &mut rng);
    assert_eq!(queued, 1, "agent within cooldown must not be re-queued");

    let first = updates.recv().await.unwrap();
    assert_eq!(first.agent_id.as_str(), "G-2");

    // The immediate path ignores the cooldown entirely.
    assert!(pipeline.request_immediate(AgentId::new("G-1")));
    let second = updates.recv().await.unwrap();
    assert_eq!(second.agent_id.as_str(), "G-1");
}

#[tokio::test]
async fn sweep_filters_roles_states_and_inflight_jobs() {
    let now = Instant::now();
    let mut in_flight = agent("G-9", Role::Guest, BehaviorState::Pausing, None);
    in_flight.generating = true;

    let snapshot = world(vec![
        agent("S-1", Role::Staff, BehaviorState::Pausing, None),
        agent("R-2", Role::RobotConcierge, BehaviorState::Pausing, None),
        agent("G-1", Role::Guest, BehaviorState::Walking, None),
        in_flight,
        agent("G-2", Role::Guest, BehaviorState::Observing, None),
        agent("R-1", Role::RobotWaiter, BehaviorState::Conversing, None),
    ]);
    let (pipeline, mut updates, _snap_tx) = spawn_pipeline(snapshot.clone(), quick_config());

    let mut rng = StdRng::seed_from_u64(2);
    let queued = pipeline.sweep(&snapshot, now, &mut rng);
    assert_eq!(queued, 2, "only G-2 and R-1 pass every gate");

    let mut drained = Vec::new();
    for _ in 0..queued {
        drained.push(updates.recv().await.unwrap().agent_id.as_str().to_string());
    }
    assert_eq!(drained, vec!["G-2", "R-1"]);
}

#[tokio::test]
async fn job_for_unknown_agent_still_settles() {
    let snapshot = world(vec![agent("G-1", Role::Guest, BehaviorState::Pausing, None)]);
    let (pipeline, mut updates, _snap_tx) = spawn_pipeline(snapshot, quick_config());

    pipeline.request_immediate(AgentId::new("G-99"));
    let update = updates.recv().await.unwrap();
    assert_eq!(update.agent_id.as_str(), "G-99");
    assert!(update.line.is_none());
}

#[tokio::test]
async fn jobs_read_the_latest_snapshot_at_drain_time() {
    // Queue a job for an agent that only appears in a later snapshot: the
    // worker must see the refreshed world, not the one at enqueue time.
    let empty = world(Vec::new());
    let (pipeline, mut updates, snap_tx) = spawn_pipeline(empty, quick_config());

    let refreshed = world(vec![agent("G-5", Role::Guest, BehaviorState::Pausing, None)]);
    snap_tx.send(refreshed).unwrap();

    pipeline.request_immediate(AgentId::new("G-5"));
    let update = updates.recv().await.unwrap();
    assert_eq!(update.agent_id.as_str(), "G-5");
}
