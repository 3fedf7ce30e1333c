//! The serialized dialogue job queue.
//!
//! Both entry points — the periodic eligibility sweep and the immediate
//! per-agent request — push onto one FIFO channel. A single worker task
//! drains it job by job with a throttle delay between drains, so no two
//! jobs' external calls are ever in flight together and the external
//! services never see bursts.
//!
//! A job always resolves to exactly one [`DialogueUpdate`], even when every
//! external call fails, so the engine can drop the agent's in-progress flag
//! and nobody is left permanently "loading".

use std::time::Instant;

use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, warn};

use veranda_core::components::{AgentId, AudioHandle, DialogueUpdate};
use veranda_core::snapshot::WorldSnapshot;
use veranda_logic::dialogue::clean_generated_line;
use veranda_logic::grid::{room_at, Room};

use crate::config::PipelineConfig;
use crate::error::SynthesisError;
use crate::prompt::build_prompt;
use crate::speech::{voice_profile, SpeechClient};
use crate::text::TextClient;

/// How a job entered the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Queued by the periodic eligibility sweep.
    Sweep,
    /// Queued directly (e.g. the user selected the agent). Bypasses the
    /// cooldown, the coin flip and the state gate, but not the queue.
    Immediate,
}

/// One unit of work: generate a spoken line, then optionally audio, for a
/// single agent.
#[derive(Debug, Clone)]
pub struct DialogueJob {
    pub agent_id: AgentId,
    pub kind: JobKind,
}

/// Handle to the running pipeline. Cloneable enqueue side; the single
/// worker holds the drain side.
pub struct DialoguePipeline {
    jobs: mpsc::UnboundedSender<DialogueJob>,
    cooldown: std::time::Duration,
    sweep_chance: f64,
}

impl DialoguePipeline {
    /// Spawn the worker task. Returns the pipeline handle and the channel
    /// on which one [`DialogueUpdate`] arrives per enqueued job.
    ///
    /// `snapshots` should be refreshed by the tick driver every fast tick;
    /// each job re-reads it at drain time so prompts reflect where the
    /// agent actually is, not where it was when queued.
    pub fn spawn(
        text: TextClient,
        speech: SpeechClient,
        rooms: Vec<Room>,
        snapshots: watch::Receiver<WorldSnapshot>,
        config: PipelineConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DialogueUpdate>) {
        let (jobs_tx, mut jobs_rx) = mpsc::unbounded_channel::<DialogueJob>();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        let handle = Self {
            jobs: jobs_tx,
            cooldown: config.cooldown,
            sweep_chance: config.sweep_chance,
        };

        tokio::spawn(async move {
            while let Some(job) = jobs_rx.recv().await {
                let update = process_job(&text, &speech, &rooms, &snapshots, &config, &job).await;
                if updates_tx.send(update).is_err() {
                    debug!("update receiver dropped, stopping dialogue worker");
                    break;
                }
                tokio::time::sleep(config.inter_job_delay).await;
            }
        });

        (handle, updates_rx)
    }

    /// Queue a job for `agent_id` right now. Returns `false` if the worker
    /// has shut down.
    pub fn request_immediate(&self, agent_id: AgentId) -> bool {
        self.jobs
            .send(DialogueJob {
                agent_id,
                kind: JobKind::Immediate,
            })
            .is_ok()
    }

    /// Run the periodic eligibility sweep over a world snapshot, queueing
    /// a job for every agent that passes all gates: speaking role, a state
    /// that accepts ambient dialogue, no job already in flight, cooldown
    /// elapsed, and the coin flip. Returns how many jobs were queued.
    pub fn sweep(&self, world: &WorldSnapshot, now: Instant, rng: &mut impl Rng) -> usize {
        let mut queued = 0;
        for agent in &world.agents {
            if !agent.role.speaks() {
                continue;
            }
            if !agent.state.accepts_ambient_dialogue() {
                continue;
            }
            if agent.generating {
                continue;
            }
            let cooled = agent
                .last_generated
                .map_or(true, |t| now.saturating_duration_since(t) >= self.cooldown);
            if !cooled {
                continue;
            }
            if !rng.gen_bool(self.sweep_chance) {
                continue;
            }
            let job = DialogueJob {
                agent_id: agent.id.clone(),
                kind: JobKind::Sweep,
            };
            if self.jobs.send(job).is_ok() {
                queued += 1;
            }
        }
        queued
    }
}

/// Drain one job: read the freshest snapshot, derive the prompt, call the
/// two capabilities under per-call deadlines, and fold the outcomes into
/// an update. Never fails; failures become a `None` line or `None` audio.
async fn process_job(
    text: &TextClient,
    speech: &SpeechClient,
    rooms: &[Room],
    snapshots: &watch::Receiver<WorldSnapshot>,
    config: &PipelineConfig,
    job: &DialogueJob,
) -> DialogueUpdate {
    let world = snapshots.borrow().clone();
    let Some(agent) = world.agent(&job.agent_id) else {
        warn!(agent = %job.agent_id, "dialogue job for unknown agent, resolving empty");
        return empty_update(job.agent_id.clone());
    };

    let neighbors = world.neighbors_of(&agent.id, config.neighbor_radius);
    let room_name = room_at(rooms, agent.pos).map(|r| r.name.as_str());
    let prompt = build_prompt(agent, room_name, &neighbors, world.hour_of_day, world.atmosphere);
    debug!(agent = %agent.id, kind = ?job.kind, "draining dialogue job");

    let raw = match timeout(config.request_timeout, text.generate(&prompt, &config.params)).await {
        Ok(Ok(raw)) => Some(raw),
        Ok(Err(e)) => {
            warn!(agent = %agent.id, stage = "text", error = %e, "text generation failed");
            None
        }
        Err(_) => {
            warn!(agent = %agent.id, stage = "text", "text generation timed out");
            None
        }
    };

    let line = raw.as_deref().and_then(clean_generated_line);
    let synthesis = match &line {
        Some(line_text) => {
            let (voice, settings) = voice_profile(agent.role, speech.config());
            match timeout(
                config.request_timeout,
                speech.synthesize(line_text, &voice, &settings),
            )
            .await
            {
                Ok(result) => Some(result),
                Err(_) => Some(Err(SynthesisError::Timeout)),
            }
        }
        None => None,
    };

    settle_job(job.agent_id.clone(), line, synthesis)
}

/// Fold the two capability outcomes into the reported update. A synthesis
/// failure never suppresses the text: the agent still "says" the line,
/// just without audio.
fn settle_job(
    agent_id: AgentId,
    line: Option<String>,
    synthesis: Option<Result<AudioHandle, SynthesisError>>,
) -> DialogueUpdate {
    let audio = match synthesis {
        Some(Ok(handle)) => Some(handle),
        Some(Err(e)) => {
            warn!(agent = %agent_id, stage = "speech", error = %e, "speech synthesis failed");
            None
        }
        None => None,
    };
    DialogueUpdate {
        agent_id,
        line,
        audio,
        generated_at: Instant::now(),
    }
}

fn empty_update(agent_id: AgentId) -> DialogueUpdate {
    DialogueUpdate {
        agent_id,
        line: None,
        audio: None,
        generated_at: Instant::now(),
    }
}
