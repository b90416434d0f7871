//! Voice capture: record, transcribe, review, then accept or discard.
//!
//! A `VoiceCaptureSession` owns at most one live capture. The microphone is
//! held by the `AudioCapture` handle and released when that handle drops, so
//! every exit path (finished, failed, or session torn down) gives it back.

pub mod clip_file;

pub use clip_file::ClipFileMicrophone;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::Transcriber;
use crate::conversation::profile::Selections;
use crate::conversation::stage::Stage;
use crate::error::VoiceError;

/// Encoded audio ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
        }
    }

    /// Upload file name, with the extension taken from the MIME subtype.
    pub fn file_name(&self) -> String {
        let ext = self
            .mime
            .split('/')
            .nth(1)
            .and_then(|sub| sub.split(';').next())
            .map(str::trim)
            .filter(|sub| !sub.is_empty())
            .unwrap_or("bin");
        format!("input.{ext}")
    }
}

/// Source of recordings. Opening acquires the device.
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Fails with `MicAccessDenied` when permission is refused or no device
    /// is available.
    async fn open(&self) -> Result<Box<dyn AudioCapture>, VoiceError>;
}

/// A live recording. Dropping it releases the device.
#[async_trait]
pub trait AudioCapture: Send {
    /// Finalize the recording and return the encoded audio.
    async fn finish(&mut self) -> Result<AudioClip, VoiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Idle,
    Recording,
    Transcribing,
}

/// Voice-derived selections awaiting the user's accept or discard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceDraft {
    /// Stage that was active when recording stopped.
    pub stage: Stage,
    pub transcript: String,
    pub selections: Selections,
    pub missing: Vec<String>,
}

struct VoiceInner {
    state: RecordingState,
    capture: Option<Box<dyn AudioCapture>>,
    draft: Option<VoiceDraft>,
}

/// Manages the record → transcribe → review pipeline.
pub struct VoiceCaptureSession {
    microphone: Arc<dyn Microphone>,
    transcriber: Arc<dyn Transcriber>,
    inner: Mutex<VoiceInner>,
}

impl VoiceCaptureSession {
    pub fn new(microphone: Arc<dyn Microphone>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            microphone,
            transcriber,
            inner: Mutex::new(VoiceInner {
                state: RecordingState::Idle,
                capture: None,
                draft: None,
            }),
        }
    }

    pub async fn state(&self) -> RecordingState {
        self.inner.lock().await.state
    }

    pub async fn draft(&self) -> Option<VoiceDraft> {
        self.inner.lock().await.draft.clone()
    }

    pub async fn has_draft(&self) -> bool {
        self.inner.lock().await.draft.is_some()
    }

    /// Start recording.
    ///
    /// Returns `Ok(false)` without touching the microphone when a recording
    /// or transcription is already under way.
    pub async fn start(&self) -> Result<bool, VoiceError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.state != RecordingState::Idle {
                debug!(state = ?inner.state, "Ignoring start while busy");
                return Ok(false);
            }
            inner.state = RecordingState::Recording;
        }

        match self.microphone.open().await {
            Ok(capture) => {
                self.inner.lock().await.capture = Some(capture);
                info!("Recording started");
                Ok(true)
            }
            Err(e) => {
                self.inner.lock().await.state = RecordingState::Idle;
                warn!(error = %e, "Could not start recording");
                Err(e)
            }
        }
    }

    /// Stop recording and transcribe against `stage`.
    ///
    /// The stage is bound here, so a stage change while transcription is in
    /// flight does not affect where the draft applies. Returns `Ok(None)`
    /// when nothing was recording.
    pub async fn stop(&self, session_id: &str, stage: Stage) -> Result<Option<VoiceDraft>, VoiceError> {
        let mut capture = {
            let mut inner = self.inner.lock().await;
            if inner.state != RecordingState::Recording {
                debug!(state = ?inner.state, "Ignoring stop while not recording");
                return Ok(None);
            }
            let Some(capture) = inner.capture.take() else {
                debug!("Stop requested before the microphone opened");
                return Ok(None);
            };
            inner.state = RecordingState::Transcribing;
            capture
        };

        let clip = capture.finish().await;
        drop(capture);
        info!(%stage, "Recording stopped, transcribing");

        let result = match clip {
            Ok(clip) => self.transcriber.transcribe(session_id, stage, clip).await,
            Err(e) => Err(e),
        };

        let mut inner = self.inner.lock().await;
        inner.state = RecordingState::Idle;
        match result {
            Ok(t) => {
                let draft = VoiceDraft {
                    stage,
                    transcript: t.transcript,
                    selections: t.selections,
                    missing: t.missing,
                };
                debug!(%stage, missing = ?draft.missing, "Voice draft ready");
                inner.draft = Some(draft.clone());
                Ok(Some(draft))
            }
            Err(e) => {
                inner.draft = None;
                warn!(error = %e, %stage, "Transcription failed");
                Err(e)
            }
        }
    }

    /// Remove and return the pending draft.
    pub async fn take_draft(&self) -> Option<VoiceDraft> {
        self.inner.lock().await.draft.take()
    }

    /// Drop the pending draft without using it. Returns whether one existed.
    pub async fn discard_draft(&self) -> bool {
        self.inner.lock().await.draft.take().is_some()
    }
}
