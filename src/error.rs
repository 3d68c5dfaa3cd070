//! Error types for latelier.
//!
//! One enum per collaborator: the Gemini transport, the analysis client and
//! the speech pipeline. History persistence never surfaces an error to the
//! user; its failures are logged where they happen.

use thiserror::Error;

/// Failure talking to the Gemini `generateContent` endpoint.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("No Gemini API key configured (set gemini.api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `message` is the service's `error.message` when present.
    #[error("Service returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Failure of one diary analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Diary entry is empty")]
    EmptyInput,

    #[error(transparent)]
    Service(#[from] GeminiError),

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("Malformed analysis: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Incomplete analysis: {0}")]
    IncompletePayload(String),

    #[error("Segments do not reproduce the translation (joined: {joined:?})")]
    SegmentMismatch { joined: String },
}

/// Failure of one speech synthesis or playback.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error(transparent)]
    Service(#[from] GeminiError),

    #[error("No audio data received from the AI model.")]
    NoAudio,

    #[error("Malformed audio: {0}")]
    MalformedAudio(String),

    #[error("Audio output failed: {0}")]
    Playback(String),
}
