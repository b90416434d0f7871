//! Error types for the fitness intake client.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Voice error: {0}")]
    Voice(#[from] VoiceError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("Submission rejected: {0}")]
    Rejected(#[from] SubmitRejected),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Voice capture and transcription errors.
///
/// None of these are fatal: the text path stays usable and the user may
/// record again.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VoiceError {
    #[error("Microphone access denied: {0}")]
    MicAccessDenied(String),

    #[error("Audio capture failed: {0}")]
    CaptureFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// Failures of the stage ingest round-trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures of the one-shot workout generation call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerateError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Generation rejected: {0}")]
    Rejected(String),

    #[error("Profile is incomplete, missing: {}", missing.join(", "))]
    IncompleteProfile { missing: Vec<String> },
}

/// A submission that was not dispatched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("A submission is already in flight")]
    Busy,

    #[error("No voice draft to accept")]
    NoDraft,

    #[error("Invalid form: {0}")]
    InvalidForm(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
