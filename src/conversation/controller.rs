//! Coordinates stages, the transcript, and the two
//! input paths (typed forms and accepted voice drafts).
//!
//! Both paths go through [`StageIngestClient`]. A submission holds the
//! in-flight permit from before its user message is appended until after the
//! reply has been applied, so the transcript always reads user line, then
//! assistant line, with no interleaving.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{IngestBackend, Transcriber};
use crate::error::{IngestError, SubmitRejected, VoiceError};
use crate::voice::{Microphone, RecordingState, VoiceCaptureSession, VoiceDraft};
use crate::workout::{PlanRenderer, WorkoutDocument};

use super::form::StageForm;
use super::guard::{InitGuard, SubmissionPermit};
use super::ingest::{IngestOutcome, StageIngestClient};
use super::message::{EMPTY_TRANSCRIPT_TEXT, Message};
use super::profile::{Profile, Selections};
use super::stage::Stage;

/// Collaborators the controller is built from.
pub struct ControllerDeps {
    pub backend: Arc<dyn IngestBackend>,
    pub transcriber: Arc<dyn Transcriber>,
    pub microphone: Arc<dyn Microphone>,
    pub renderer: Arc<dyn PlanRenderer>,
}

/// How a dispatched submission ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The reply was applied; carries the active stage afterwards.
    Advanced(Stage),
    /// A plan arrived and was handed to the renderer.
    Completed,
    /// The call failed. Stage and profile are unchanged.
    Failed(IngestError),
}

/// Which controls are usable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordances {
    pub submit: bool,
    pub accept_voice: bool,
    pub record: bool,
    pub stop: bool,
}

#[derive(Debug, Default)]
struct ConversationState {
    stage: Stage,
    profile: Profile,
    messages: Vec<Message>,
    plan: Option<WorkoutDocument>,
}

/// How an accepted submission updates the profile once the backend has
/// taken it.
enum ProfileUpdate {
    None,
    Form(StageForm),
    Voice { stage: Stage, selections: Selections },
}

impl ProfileUpdate {
    fn apply(&self, profile: &Profile) -> Option<Profile> {
        match self {
            Self::None => None,
            Self::Form(form) => Some(form.apply_to(profile)),
            Self::Voice { stage, selections } => Some(profile.merge(*stage, selections)),
        }
    }
}

pub struct ConversationController {
    session_id: String,
    state: RwLock<ConversationState>,
    ingest: StageIngestClient,
    voice: VoiceCaptureSession,
    init: InitGuard,
    renderer: Arc<dyn PlanRenderer>,
}

impl ConversationController {
    pub fn new(deps: ControllerDeps) -> Self {
        let session_id = format!("session_{}", Uuid::new_v4().simple());
        info!(%session_id, "Conversation created");
        Self {
            session_id,
            state: RwLock::new(ConversationState::default()),
            ingest: StageIngestClient::new(deps.backend),
            voice: VoiceCaptureSession::new(deps.microphone, deps.transcriber),
            init: InitGuard::new(),
            renderer: deps.renderer,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send the opening `basic` turn with no selections.
    ///
    /// Runs at most once per controller: once the opening turn has been
    /// claimed, later calls return `Ok(None)` without doing anything, and the
    /// guard does not reset if the opening call fails. While another
    /// submission is in flight the opening turn is not claimed and
    /// `Err(Busy)` is returned, so the caller can try again.
    pub async fn start(&self) -> Result<Option<TurnOutcome>, SubmitRejected> {
        if self.init.is_claimed() {
            return Ok(None);
        }
        let permit = self.ingest.try_begin().ok_or(SubmitRejected::Busy)?;
        if !self.init.try_claim() {
            return Ok(None);
        }
        info!(session_id = %self.session_id, "Opening conversation");
        Ok(Some(
            self.dispatch(&permit, Stage::Basic, Selections::new(), ProfileUpdate::None)
                .await,
        ))
    }

    /// Submit the typed form for its stage.
    pub async fn submit_form(&self, form: StageForm) -> Result<TurnOutcome, SubmitRejected> {
        form.validate()?;
        let permit = self.ingest.try_begin().ok_or(SubmitRejected::Busy)?;

        let stage = form.stage();
        let selections = form.selections();
        self.push(Message::user(form.display_text())).await;

        Ok(self
            .dispatch(&permit, stage, selections, ProfileUpdate::Form(form))
            .await)
    }

    /// Begin recording. `Ok(false)` when a recording is already active.
    pub async fn start_recording(&self) -> Result<bool, VoiceError> {
        self.voice.start().await
    }

    /// Stop recording and transcribe against the stage active right now.
    pub async fn stop_recording(&self) -> Result<Option<VoiceDraft>, VoiceError> {
        let stage = self.stage().await;
        self.voice.stop(&self.session_id, stage).await
    }

    /// Accept the pending voice draft: show the transcript, submit the
    /// selections for the draft's stage, and clear the draft.
    pub async fn accept_draft(&self) -> Result<TurnOutcome, SubmitRejected> {
        let permit = self.ingest.try_begin().ok_or(SubmitRejected::Busy)?;
        let draft = self.voice.take_draft().await.ok_or(SubmitRejected::NoDraft)?;

        let text = if draft.transcript.trim().is_empty() {
            EMPTY_TRANSCRIPT_TEXT.to_string()
        } else {
            draft.transcript.clone()
        };
        self.push(Message::user(text)).await;

        let update = ProfileUpdate::Voice {
            stage: draft.stage,
            selections: draft.selections.clone(),
        };
        Ok(self
            .dispatch(&permit, draft.stage, draft.selections, update)
            .await)
    }

    /// The pending draft laid over the current profile as a form for the
    /// draft's stage, for editing before submission.
    ///
    /// `None` without a draft; `InvalidForm` while required fields are still
    /// missing from both.
    pub async fn draft_form(&self) -> Option<Result<StageForm, SubmitRejected>> {
        let draft = self.voice.draft().await?;
        let seeded = self.profile().await.merge(draft.stage, &draft.selections);
        Some(StageForm::from_profile(draft.stage, seeded))
    }

    /// Throw away the pending draft. Returns whether there was one.
    pub async fn discard_draft(&self) -> bool {
        self.voice.discard_draft().await
    }

    async fn dispatch(
        &self,
        permit: &SubmissionPermit,
        stage: Stage,
        selections: Selections,
        update: ProfileUpdate,
    ) -> TurnOutcome {
        let outcome = self
            .ingest
            .ingest(permit, &self.session_id, stage, selections)
            .await;

        let mut state = self.state.write().await;
        match outcome {
            IngestOutcome::Advanced {
                assistant_text,
                next_stage,
            } => {
                if let Some(profile) = update.apply(&state.profile) {
                    state.profile = profile;
                }
                state.messages.push(Message::assistant(assistant_text));
                match next_stage {
                    Some(Stage::Complete) => {
                        warn!(stage = %state.stage, "Reply named the complete stage without a plan; staying put");
                    }
                    Some(next) => {
                        if next.ordinal() < state.stage.ordinal() {
                            info!(from = %state.stage, to = %next, "Backend moved the conversation back");
                        } else if next != state.stage {
                            info!(from = %state.stage, to = %next, "Stage advanced");
                        }
                        state.stage = next;
                    }
                    None => {
                        warn!(stage = %state.stage, "Reply named no next stage; staying put");
                    }
                }
                TurnOutcome::Advanced(state.stage)
            }
            IngestOutcome::Completed {
                assistant_text,
                plan,
            } => {
                if let Some(profile) = update.apply(&state.profile) {
                    state.profile = profile;
                }
                state.messages.push(Message::assistant(assistant_text));
                state.stage = Stage::Complete;
                state.plan = Some(plan.clone());
                drop(state);

                info!(session_id = %self.session_id, "Conversation complete");
                self.renderer.render(&plan);
                TurnOutcome::Completed
            }
            IngestOutcome::Failed(e) => {
                state.messages.push(Message::assistant_error());
                TurnOutcome::Failed(e)
            }
        }
    }

    async fn push(&self, message: Message) {
        self.state.write().await.messages.push(message);
    }

    pub async fn stage(&self) -> Stage {
        self.state.read().await.stage
    }

    pub async fn profile(&self) -> Profile {
        self.state.read().await.profile.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    pub async fn plan(&self) -> Option<WorkoutDocument> {
        self.state.read().await.plan.clone()
    }

    /// Whether the conversation has produced a plan. Further submissions are
    /// still accepted, and a later reply may move the stage again.
    pub async fn is_complete(&self) -> bool {
        self.state.read().await.plan.is_some()
    }

    /// Whether a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.ingest.is_busy()
    }

    pub async fn recording_state(&self) -> RecordingState {
        self.voice.state().await
    }

    pub async fn draft(&self) -> Option<VoiceDraft> {
        self.voice.draft().await
    }

    pub async fn affordances(&self) -> Affordances {
        let loading = self.is_loading();
        let recording = self.voice.state().await;
        let has_draft = self.voice.has_draft().await;
        Affordances {
            submit: !loading,
            accept_voice: !loading && has_draft,
            record: recording == RecordingState::Idle,
            stop: recording == RecordingState::Recording,
        }
    }
}
