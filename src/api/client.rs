//! HTTP implementation of the backend collaborators.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::conversation::stage::Stage;
use crate::error::{ConfigError, GenerateError, IngestError, VoiceError};
use crate::voice::AudioClip;
use crate::workout::WorkoutDocument;

use super::wire::{
    ErrorBody, GenerateWorkoutRequest, GenerateWorkoutResponse, IngestRequest, IngestResponse,
    Transcription,
};
use super::{IngestBackend, Transcriber, WorkoutGenerator};

/// reqwest-backed client for the intake backend.
pub struct BackendClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl BackendClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "http_client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl IngestBackend for BackendClient {
    async fn ingest(&self, request: &IngestRequest) -> Result<IngestResponse, IngestError> {
        let url = self.config.endpoint("/chat/ingest");
        debug!(session_id = %request.session_id, stage = %request.stage, "POST {url}");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| IngestError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), stage = %request.stage, "Ingest rejected");
            return Err(IngestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<IngestResponse>()
            .await
            .map_err(|e| IngestError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Transcriber for BackendClient {
    async fn transcribe(
        &self,
        session_id: &str,
        stage: Stage,
        audio: AudioClip,
    ) -> Result<Transcription, VoiceError> {
        let url = self.config.endpoint("/speech/transcribe");
        let file_name = audio.file_name();
        debug!(session_id, %stage, bytes = audio.data.len(), "POST {url}");

        let part = Part::bytes(audio.data)
            .file_name(file_name)
            .mime_str(&audio.mime)
            .map_err(|e| VoiceError::TranscriptionFailed(format!("bad audio type: {e}")))?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(&url)
            .query(&[("stage", stage.to_string()), ("session_id", session_id.to_string())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::TranscriptionFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %stage, "Transcription rejected");
            return Err(VoiceError::TranscriptionFailed(format!(
                "transcribe failed: {}",
                status.as_u16()
            )));
        }

        resp.json::<Transcription>()
            .await
            .map_err(|e| VoiceError::TranscriptionFailed(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl WorkoutGenerator for BackendClient {
    async fn generate_workout(
        &self,
        request: &GenerateWorkoutRequest,
    ) -> Result<WorkoutDocument, GenerateError> {
        let url = self.config.endpoint("/generate-workout");
        debug!(user_id = %request.user_id, "POST {url}");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => match body.detail {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
                Err(_) => text,
            };
            warn!(status = status.as_u16(), %detail, "Workout generation failed");
            return Err(GenerateError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        resp.json::<GenerateWorkoutResponse>()
            .await
            .map_err(|e| GenerateError::Http(format!("malformed response: {e}")))?
            .into_document()
    }
}
