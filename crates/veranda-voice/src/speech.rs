//! Speech-synthesis capability client.
//!
//! Talks to an ElevenLabs-style text-to-speech endpoint and returns the
//! audio bytes as an opaque [`AudioHandle`]. Failure reasons are typed —
//! the service distinguishes missing keys, quota exhaustion, unknown
//! voices and rejected input, and those distinctions are kept even though
//! the pipeline only checks for presence of audio.

use veranda_core::components::{AudioHandle, Role};

use crate::config::SpeechConfig;
use crate::error::SynthesisError;

/// Per-request voice tuning.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

/// The voice identity and settings for a role. Robots get high stability
/// for a consistent machine delivery; humans get a looser, more natural
/// read.
pub fn voice_profile(role: Role, config: &SpeechConfig) -> (String, VoiceSettings) {
    if role.is_robot() {
        (
            config.robot_voice.clone(),
            VoiceSettings {
                stability: 0.9,
                similarity_boost: 0.75,
            },
        )
    } else {
        (
            config.human_voice.clone(),
            VoiceSettings {
                stability: 0.45,
                similarity_boost: 0.75,
            },
        )
    }
}

/// HTTP client for the speech-synthesis capability.
pub struct SpeechClient {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Synthesize `text` with the given voice. A missing API key fails
    /// without touching the network.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &VoiceSettings,
    ) -> Result<AudioHandle, SynthesisError> {
        if self.config.api_key.is_empty() {
            return Err(SynthesisError::KeyMissing);
        }

        let url = format!("{}/v1/text-to-speech/{voice_id}", self.config.api_url);
        let body = serde_json::json!({
            "text": text,
            "voice_settings": {
                "stability": settings.stability,
                "similarity_boost": settings.similarity_boost,
            }
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(error_for_status(status.as_u16(), body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Request(e.to_string()))?;
        Ok(AudioHandle::new(bytes.to_vec()))
    }
}

/// Map a non-success HTTP status onto the typed failure taxonomy.
fn error_for_status(status: u16, body: String) -> SynthesisError {
    match status {
        401 | 403 => SynthesisError::KeyMissing,
        429 => SynthesisError::QuotaExceeded,
        404 => SynthesisError::InvalidVoice,
        400 | 422 => SynthesisError::InvalidInput,
        _ => SynthesisError::Service { status, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_taxonomy() {
        assert!(matches!(error_for_status(401, String::new()), SynthesisError::KeyMissing));
        assert!(matches!(error_for_status(429, String::new()), SynthesisError::QuotaExceeded));
        assert!(matches!(error_for_status(404, String::new()), SynthesisError::InvalidVoice));
        assert!(matches!(error_for_status(422, String::new()), SynthesisError::InvalidInput));
        assert!(matches!(
            error_for_status(500, "boom".to_string()),
            SynthesisError::Service { status: 500, .. }
        ));
    }

    #[test]
    fn robots_get_the_stable_voice() {
        let config = SpeechConfig::disabled();
        let (robot_voice, robot) = voice_profile(Role::RobotWaiter, &config);
        let (human_voice, human) = voice_profile(Role::Guest, &config);
        assert_eq!(robot_voice, config.robot_voice);
        assert_eq!(human_voice, config.human_voice);
        assert!(robot.stability > human.stability);
        assert_eq!(robot.similarity_boost, human.similarity_boost);
    }

    #[tokio::test]
    async fn missing_key_short_circuits() {
        let client = SpeechClient::new(SpeechConfig::disabled());
        let settings = VoiceSettings {
            stability: 0.5,
            similarity_boost: 0.75,
        };
        let result = client.synthesize("Hello.", "voice", &settings).await;
        assert!(matches!(result, Err(SynthesisError::KeyMissing)));
    }
}
