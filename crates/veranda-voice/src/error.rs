//! Error types for the dialogue pipeline capabilities.
//!
//! Every variant here is recoverable by contract: the pipeline logs the
//! failure with the agent id and stage, resolves the job to "no dialogue",
//! and moves on. Nothing propagates out of a job.

/// Text-generation capability failures.
#[derive(Debug, thiserror::Error)]
pub enum TextGenError {
    /// No API key configured; short-circuits before any network call.
    #[error("text generation API key missing")]
    KeyMissing,

    /// The HTTP request itself failed (DNS, connect, TLS, ...).
    #[error("text generation request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("text generation returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response parsed but carried no usable content.
    #[error("text generation response missing content")]
    MalformedResponse,

    /// The per-call deadline expired.
    #[error("text generation timed out")]
    Timeout,
}

/// Speech-synthesis capability failures.
///
/// The typed reasons are part of the capability's contract even though the
/// pipeline itself only branches on presence or absence of audio.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// No API key configured; short-circuits before any network call.
    #[error("speech synthesis API key missing")]
    KeyMissing,

    /// The account's character quota is exhausted.
    #[error("speech synthesis quota exceeded")]
    QuotaExceeded,

    /// The requested voice identity does not exist.
    #[error("unknown voice id")]
    InvalidVoice,

    /// The input text was rejected by the service.
    #[error("speech synthesis rejected the input text")]
    InvalidInput,

    /// The HTTP request itself failed.
    #[error("speech synthesis request failed: {0}")]
    Request(String),

    /// Any other non-success response.
    #[error("speech synthesis returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The per-call deadline expired.
    #[error("speech synthesis timed out")]
    Timeout,
}
