//! Veranda Headless Simulation Harness
//!
//! Drives the engine and a credential-less dialogue pipeline end to end —
//! no rendering, no network credentials, no external timers. Used to
//! validate the core invariants before the presentation layer gets
//! anywhere near the simulation.
//!
//! Usage:
//!   cargo run -p veranda-simtest
//!   cargo run -p veranda-simtest -- --verbose

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

use veranda_core::components::{AgentId, BehaviorState};
use veranda_core::{HotelEngine, SimConfig};
use veranda_voice::config::{PipelineConfig, SpeechConfig, TextConfig};
use veranda_voice::pipeline::DialoguePipeline;
use veranda_voice::speech::SpeechClient;
use veranda_voice::text::TextClient;

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(results: &mut Vec<TestResult>, name: &str, passed: bool, detail: String) {
    results.push(TestResult {
        name: name.to_string(),
        passed,
        detail,
    });
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Veranda Simulation Harness ===\n");

    let mut results = Vec::new();

    validate_generation(&mut results);
    validate_movement(&mut results);
    validate_conversation(&mut results);
    validate_dialogue_pipeline(&mut results).await;

    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Floor generation ─────────────────────────────────────────────────

fn validate_generation(results: &mut Vec<TestResult>) {
    println!("--- Floor generation ---");

    let engine = match HotelEngine::new(SimConfig {
        seed: Some(2024),
        ..SimConfig::default()
    }) {
        Ok(e) => e,
        Err(e) => {
            check(results, "generation", false, format!("failed: {e}"));
            return;
        }
    };

    check(
        results,
        "population",
        engine.agent_count() == 15,
        format!("{} agents", engine.agent_count()),
    );

    let suites = engine
        .rooms()
        .iter()
        .filter(|r| r.kind == veranda_logic::grid::RoomKind::Suite)
        .count();
    check(results, "suites", suites >= 10, format!("{suites} suites"));

    let walkable = engine
        .grid()
        .count_cells(veranda_logic::grid::Cell::is_walkable);
    check(
        results,
        "walkable_area",
        walkable > 500,
        format!("{walkable} walkable cells"),
    );

    let degenerate = HotelEngine::new(SimConfig {
        width: 12,
        height: 12,
        ..SimConfig::default()
    });
    check(
        results,
        "degenerate_bounds_rejected",
        degenerate.is_err(),
        "12x12 floor rejected".to_string(),
    );
}

// ── 2. Movement invariants ──────────────────────────────────────────────

fn validate_movement(results: &mut Vec<TestResult>) {
    println!("--- Movement ---");

    let mut engine = HotelEngine::new(SimConfig {
        seed: Some(7),
        ..SimConfig::default()
    })
    .expect("default bounds generate");

    let mut off_grid = 0usize;
    let mut moves = 0usize;
    for _ in 0..1000 {
        let before = engine.snapshot();
        engine.tick();
        let after = engine.snapshot();
        for (a, b) in before.agents.iter().zip(after.agents.iter()) {
            if a.pos != b.pos {
                moves += 1;
            }
            if !engine.grid().is_walkable(b.pos.x, b.pos.y) {
                off_grid += 1;
            }
        }
    }

    check(
        results,
        "always_walkable",
        off_grid == 0,
        format!("{off_grid} off-grid positions over 1000 ticks"),
    );
    check(
        results,
        "agents_actually_move",
        moves > 1000,
        format!("{moves} position changes"),
    );
}

// ── 3. Conversation lock ────────────────────────────────────────────────

fn validate_conversation(results: &mut Vec<TestResult>) {
    println!("--- Conversation lock ---");

    let mut engine = HotelEngine::new(SimConfig {
        seed: Some(99),
        ..SimConfig::default()
    })
    .expect("default bounds generate");

    let first = AgentId::new("R-1");
    let second = AgentId::new("G-3");
    engine.enter_conversation(&first);
    let previous = engine.enter_conversation(&second);
    check(
        results,
        "handoff_returns_previous",
        previous == Some(first.clone()),
        format!("previous = {previous:?}"),
    );

    let snapshot = engine.snapshot();
    let settled = snapshot.agent(&first).map(|a| a.state) == Some(BehaviorState::Pausing)
        && snapshot.agent(&second).map(|a| a.state) == Some(BehaviorState::Conversing);
    check(results, "handoff_settles_states", settled, "R-1 pausing, G-3 conversing".to_string());

    let mut max_conversing = 0usize;
    for round in 0..200u64 {
        if round % 9 == 0 {
            let id = AgentId::new(format!("G-{}", 1 + (round % 10)));
            engine.enter_conversation(&id);
        }
        engine.tick();
        let conversing = engine
            .snapshot()
            .agents
            .iter()
            .filter(|a| a.state == BehaviorState::Conversing)
            .count();
        max_conversing = max_conversing.max(conversing);
    }
    check(
        results,
        "single_holder",
        max_conversing <= 1,
        format!("max {max_conversing} conversing at once"),
    );
}

// ── 4. Dialogue pipeline ────────────────────────────────────────────────

async fn validate_dialogue_pipeline(results: &mut Vec<TestResult>) {
    println!("--- Dialogue pipeline ---");

    let mut engine = HotelEngine::new(SimConfig {
        seed: Some(5),
        ..SimConfig::default()
    })
    .expect("default bounds generate");

    let (snap_tx, snap_rx) = watch::channel(engine.snapshot());
    let config = PipelineConfig {
        inter_job_delay: Duration::ZERO,
        sweep_chance: 1.0,
        ..PipelineConfig::default()
    };
    let (pipeline, mut updates) = DialoguePipeline::spawn(
        TextClient::new(TextConfig::disabled()),
        SpeechClient::new(SpeechConfig::disabled()),
        engine.rooms().to_vec(),
        snap_rx,
        config,
    );

    // Run the drivers by hand: fast ticks publish snapshots, a slow tick
    // runs the sweep, and completed jobs feed back into the engine.
    let mut rng = StdRng::seed_from_u64(1);
    let mut enqueued = 0usize;
    for tick in 0..60 {
        engine.tick();
        let snapshot = engine.snapshot();
        let _ = snap_tx.send(snapshot.clone());
        if tick % 20 == 10 {
            enqueued += pipeline.sweep(&snapshot, Instant::now(), &mut rng);
        }
    }
    let target = AgentId::new("G-1");
    engine.enter_conversation(&target);
    let _ = snap_tx.send(engine.snapshot());
    pipeline.request_immediate(target.clone());
    enqueued += 1;

    let mut drained = 0usize;
    while drained < enqueued {
        match tokio::time::timeout(Duration::from_secs(2), updates.recv()).await {
            Ok(Some(update)) => {
                engine.apply_dialogue_update(update);
                drained += 1;
            }
            _ => break,
        }
    }
    check(
        results,
        "queue_conservation",
        drained == enqueued,
        format!("{drained}/{enqueued} jobs settled"),
    );

    // No credentials: the failed immediate request must have unfrozen G-1.
    let snapshot = engine.snapshot();
    let unfrozen = engine.conversing_agent().is_none()
        && snapshot.agent(&target).map(|a| a.generating) == Some(false);
    check(
        results,
        "failed_job_unfreezes_agent",
        unfrozen,
        "no agent left loading".to_string(),
    );
}
