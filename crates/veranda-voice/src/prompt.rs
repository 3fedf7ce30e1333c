//! Prompt derivation for one-sentence ambient dialogue.
//!
//! The prompt is assembled from the agent's role, state, mood, location,
//! the hour, the floor's atmosphere, and whoever is standing nearby. The
//! model is asked for exactly one spoken sentence; cleanup of whatever it
//! actually returns happens downstream.

use veranda_core::components::BehaviorState;
use veranda_core::snapshot::AgentSnapshot;
use veranda_core::Atmosphere;

/// Build the generation prompt for one agent.
pub fn build_prompt(
    agent: &AgentSnapshot,
    room_name: Option<&str>,
    neighbors: &[&AgentSnapshot],
    hour_of_day: f32,
    atmosphere: Atmosphere,
) -> String {
    let mut prompt = format!(
        "You are a {} at the Hotel Veranda, a grand atrium hotel. \
         You are {} and feeling {}.",
        agent.role.label(),
        state_clause(agent.state),
        agent.mood,
    );

    if let Some(room) = room_name {
        prompt.push_str(&format!(" You are in the {room}."));
    }
    prompt.push_str(&format!(
        " It is {} and the hotel feels {}.",
        time_phrase(hour_of_day),
        atmosphere.label(),
    ));

    if !neighbors.is_empty() {
        let company: Vec<&str> = neighbors.iter().map(|n| n.role.label()).collect();
        prompt.push_str(&format!(" Nearby: {}.", company.join(", ")));
    }

    prompt.push_str(
        " Say one short in-character sentence out loud, as if overheard in passing. \
         Reply with the sentence only, no quotation marks.",
    );
    prompt
}

fn state_clause(state: BehaviorState) -> &'static str {
    match state {
        BehaviorState::Walking => "crossing the floor",
        BehaviorState::Pausing => "pausing for a moment",
        BehaviorState::Observing => "taking in the scene",
        BehaviorState::Servicing => "going about your duties",
        BehaviorState::Charging => "docked at the charging alcove",
        BehaviorState::Socializing => "mingling with the company around you",
        BehaviorState::Conversing => "mid-conversation",
    }
}

fn time_phrase(hour: f32) -> &'static str {
    match hour {
        h if (5.0..12.0).contains(&h) => "morning",
        h if (12.0..17.0).contains(&h) => "afternoon",
        h if (17.0..22.0).contains(&h) => "evening",
        _ => "late at night",
    }
}
