//! Microphone stand-in that "records" a prepared audio file.
//!
//! Used by the terminal front end: `/record <path>` loads a clip, and the
//! capture yields its bytes when stopped.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::{AudioCapture, AudioClip, Microphone};
use crate::error::VoiceError;

pub struct ClipFileMicrophone {
    next: Mutex<Option<PathBuf>>,
    default_mime: String,
}

impl ClipFileMicrophone {
    pub fn new(default_mime: impl Into<String>) -> Self {
        Self {
            next: Mutex::new(None),
            default_mime: default_mime.into(),
        }
    }

    /// Choose the file the next recording will read.
    pub fn load(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!(path = %path.display(), "Clip loaded");
        if let Ok(mut next) = self.next.lock() {
            *next = Some(path);
        }
    }

    fn current(&self) -> Option<PathBuf> {
        self.next.lock().ok().and_then(|next| next.clone())
    }
}

#[async_trait]
impl Microphone for ClipFileMicrophone {
    async fn open(&self) -> Result<Box<dyn AudioCapture>, VoiceError> {
        let Some(path) = self.current() else {
            return Err(VoiceError::MicAccessDenied("no clip loaded".to_string()));
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(VoiceError::MicAccessDenied(format!(
                    "{} is not a file",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(VoiceError::MicAccessDenied(format!(
                    "{}: {e}",
                    path.display()
                )));
            }
        }
        let mime = mime_for(&path).unwrap_or(&self.default_mime).to_string();
        Ok(Box::new(ClipCapture { path, mime }))
    }
}

struct ClipCapture {
    path: PathBuf,
    mime: String,
}

#[async_trait]
impl AudioCapture for ClipCapture {
    async fn finish(&mut self) -> Result<AudioClip, VoiceError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| VoiceError::CaptureFailed(format!("{}: {e}", self.path.display())))?;
        if data.is_empty() {
            return Err(VoiceError::CaptureFailed("empty recording".to_string()));
        }
        Ok(AudioClip::new(data, self.mime.clone()))
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "wav" => Some("audio/wav"),
        "webm" => Some("audio/webm"),
        "ogg" | "oga" => Some("audio/ogg"),
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/mp4"),
        _ => None,
    }
}
