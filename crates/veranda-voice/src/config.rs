//! Pipeline and capability configuration.
//!
//! Capability endpoints and credentials load from environment variables;
//! everything else has plain defaults. A missing key is not a construction
//! error — the capability clients carry the empty key and fail softly per
//! job, so the simulation runs fine without any credentials (agents simply
//! stay quiet).

use std::env;
use std::time::Duration;

/// Sampling parameters passed to the text-generation capability.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            max_output_tokens: 60,
        }
    }
}

/// Tunables for the dialogue pipeline itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum wall-clock gap between two generations for the same agent.
    /// The immediate request path bypasses this.
    pub cooldown: Duration,
    /// Coin-flip probability for sweep-eligible agents, so a sweep never
    /// fires every eligible agent at once.
    pub sweep_chance: f64,
    /// Pause between finishing one job and draining the next.
    pub inter_job_delay: Duration,
    /// Deadline applied to each external call individually.
    pub request_timeout: Duration,
    /// Chebyshev radius of the neighbor window fed into prompts.
    pub neighbor_radius: i32,
    pub params: GenerationParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            sweep_chance: 0.35,
            inter_job_delay: Duration::from_millis(1200),
            request_timeout: Duration::from_secs(20),
            neighbor_radius: 4,
            params: GenerationParams::default(),
        }
    }
}

/// Text-generation capability endpoint.
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Base API URL of an OpenAI-compatible chat completions service.
    pub api_url: String,
    /// API key; empty means "no credentials", which fails softly.
    pub api_key: String,
    pub model: String,
}

impl TextConfig {
    /// Load from `VERANDA_TEXT_API_URL`, `VERANDA_TEXT_API_KEY` and
    /// `VERANDA_TEXT_MODEL`, with defaults for everything but the key.
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("VERANDA_TEXT_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: env::var("VERANDA_TEXT_API_KEY").unwrap_or_default(),
            model: env::var("VERANDA_TEXT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        }
    }

    /// A config with no credentials; every call fails softly. Handy for
    /// headless runs and tests.
    pub fn disabled() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Speech-synthesis capability endpoint plus the voice roster.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Base API URL of an ElevenLabs-style text-to-speech service.
    pub api_url: String,
    /// API key; empty means "no credentials", which fails softly.
    pub api_key: String,
    /// Voice identity used for robot roles.
    pub robot_voice: String,
    /// Voice identity used for everyone else.
    pub human_voice: String,
}

impl SpeechConfig {
    /// Load from `VERANDA_SPEECH_API_URL`, `VERANDA_SPEECH_API_KEY`,
    /// `VERANDA_SPEECH_ROBOT_VOICE` and `VERANDA_SPEECH_HUMAN_VOICE`.
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("VERANDA_SPEECH_API_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            api_key: env::var("VERANDA_SPEECH_API_KEY").unwrap_or_default(),
            robot_voice: env::var("VERANDA_SPEECH_ROBOT_VOICE")
                .unwrap_or_else(|_| "pMsXgVXv3BLzUgSXRplE".to_string()),
            human_voice: env::var("VERANDA_SPEECH_HUMAN_VOICE")
                .unwrap_or_else(|_| "EXAVITQu4vr4xnSDxMaL".to_string()),
        }
    }

    /// A config with no credentials; every call fails softly.
    pub fn disabled() -> Self {
        Self {
            api_url: "https://api.elevenlabs.io".to_string(),
            api_key: String::new(),
            robot_voice: "pMsXgVXv3BLzUgSXRplE".to_string(),
            human_voice: "EXAVITQu4vr4xnSDxMaL".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults_are_sane() {
        let config = PipelineConfig::default();
        assert!(config.cooldown > config.inter_job_delay);
        assert!(config.sweep_chance > 0.0 && config.sweep_chance < 1.0);
        assert!(config.neighbor_radius > 0);
    }

    #[test]
    fn disabled_configs_carry_no_key() {
        assert!(TextConfig::disabled().api_key.is_empty());
        assert!(SpeechConfig::disabled().api_key.is_empty());
    }
}
