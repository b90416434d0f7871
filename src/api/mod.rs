//! Backend collaborators: stage ingestion, speech transcription, and
//! one-shot workout generation.
//!
//! Each concern is a trait so the conversation can be driven against stubs;
//! `BackendClient` implements all three over HTTP.

pub mod client;
pub mod wire;

pub use client::BackendClient;
pub use wire::{
    Controls, GenerateWorkoutRequest, GenerateWorkoutResponse, IngestRequest, IngestResponse,
    Transcription,
};

use async_trait::async_trait;

use crate::conversation::stage::Stage;
use crate::error::{GenerateError, IngestError, VoiceError};
use crate::voice::AudioClip;
use crate::workout::WorkoutDocument;

/// Sends one stage's selections and returns the backend's reply.
#[async_trait]
pub trait IngestBackend: Send + Sync {
    async fn ingest(&self, request: &IngestRequest) -> Result<IngestResponse, IngestError>;
}

/// Turns recorded audio into a transcript plus extracted selections.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// `stage` is the stage the recording is bound to, fixed when it stopped.
    async fn transcribe(
        &self,
        session_id: &str,
        stage: Stage,
        audio: AudioClip,
    ) -> Result<Transcription, VoiceError>;
}

/// Generates a plan from a complete profile in a single call.
#[async_trait]
pub trait WorkoutGenerator: Send + Sync {
    async fn generate_workout(
        &self,
        request: &GenerateWorkoutRequest,
    ) -> Result<WorkoutDocument, GenerateError>;
}
