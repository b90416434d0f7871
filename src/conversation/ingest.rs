//! The single gateway through which stage selections reach the backend.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{IngestBackend, IngestRequest};
use crate::error::IngestError;
use crate::workout::WorkoutDocument;

use super::guard::{SubmissionPermit, SubmissionSlot};
use super::profile::Selections;
use super::stage::Stage;

/// What one ingest round-trip produced.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The backend replied without a plan. `next_stage` is `None` when the
    /// reply did not name one.
    Advanced {
        assistant_text: String,
        next_stage: Option<Stage>,
    },
    /// The reply carried a generated plan.
    Completed {
        assistant_text: String,
        plan: WorkoutDocument,
    },
    Failed(IngestError),
}

/// Sends selections for a stage, one submission at a time.
///
/// Callers take a permit with [`try_begin`](Self::try_begin) before doing
/// anything observable, and hold it until they have applied the outcome.
#[derive(Clone)]
pub struct StageIngestClient {
    backend: Arc<dyn IngestBackend>,
    slot: SubmissionSlot,
}

impl StageIngestClient {
    pub fn new(backend: Arc<dyn IngestBackend>) -> Self {
        Self {
            backend,
            slot: SubmissionSlot::new(),
        }
    }

    /// Claim the in-flight slot. `None` if a submission is already running.
    pub fn try_begin(&self) -> Option<SubmissionPermit> {
        let permit = self.slot.try_acquire();
        if permit.is_none() {
            warn!("Submission rejected: another ingest is in flight");
        }
        permit
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Dispatch one ingest call. Never retries.
    pub async fn ingest(
        &self,
        _permit: &SubmissionPermit,
        session_id: &str,
        stage: Stage,
        selections: Selections,
    ) -> IngestOutcome {
        let request = IngestRequest {
            session_id: session_id.to_string(),
            stage,
            selections,
        };
        debug!(session_id, %stage, fields = request.selections.len(), "Dispatching ingest");

        match self.backend.ingest(&request).await {
            Ok(resp) => {
                if let Some(plan) = resp.workout().cloned() {
                    info!(session_id, %stage, "Backend returned a workout plan");
                    return IngestOutcome::Completed {
                        assistant_text: resp.assistant_text,
                        plan,
                    };
                }
                IngestOutcome::Advanced {
                    assistant_text: resp.assistant_text,
                    next_stage: resp.next_stage,
                }
            }
            Err(e) => {
                warn!(session_id, %stage, error = %e, "Ingest failed");
                IngestOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::IngestResponse;
    use crate::api::wire::Controls;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<IngestResponse, IngestError>,
        seen: Mutex<Vec<IngestRequest>>,
    }

    #[async_trait]
    impl IngestBackend for Canned {
        async fn ingest(&self, request: &IngestRequest) -> Result<IngestResponse, IngestError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn client(reply: Result<IngestResponse, IngestError>) -> (StageIngestClient, Arc<Canned>) {
        let backend = Arc::new(Canned {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        (StageIngestClient::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn advanced_outcome() {
        let (client, backend) = client(Ok(IngestResponse {
            assistant_text: "next".into(),
            next_stage: Some(Stage::Goals),
            controls: None,
        }));
        let permit = client.try_begin().unwrap();
        let outcome = client.ingest(&permit, "s1", Stage::Basic, Selections::new()).await;
        assert_eq!(
            outcome,
            IngestOutcome::Advanced {
                assistant_text: "next".into(),
                next_stage: Some(Stage::Goals)
            }
        );
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].session_id, "s1");
        assert_eq!(seen[0].stage, Stage::Basic);
    }

    #[tokio::test]
    async fn plan_means_completed() {
        let (client, _) = client(Ok(IngestResponse {
            assistant_text: "done".into(),
            next_stage: Some(Stage::Final),
            controls: Some(Controls {
                workout: Some(WorkoutDocument::Formatted("plan".into())),
            }),
        }));
        let permit = client.try_begin().unwrap();
        let outcome = client.ingest(&permit, "s1", Stage::Final, Selections::new()).await;
        assert!(matches!(outcome, IngestOutcome::Completed { .. }));
    }

    #[tokio::test]
    async fn slot_is_exclusive_until_permit_drops() {
        let (client, _) = client(Err(IngestError::Http("down".into())));
        let permit = client.try_begin().unwrap();
        assert!(client.is_busy());
        assert!(client.try_begin().is_none());

        let outcome = client.ingest(&permit, "s1", Stage::Basic, Selections::new()).await;
        assert!(matches!(outcome, IngestOutcome::Failed(IngestError::Http(_))));
        assert!(client.is_busy(), "slot stays held until the permit drops");

        drop(permit);
        assert!(!client.is_busy());
        assert!(client.try_begin().is_some());
    }

    #[tokio::test]
    async fn status_failure_keeps_body() {
        let (client, _) = client(Err(IngestError::Status {
            status: 503,
            body: "busy".into(),
        }));
        let permit = client.try_begin().unwrap();
        let outcome = client.ingest(&permit, "s1", Stage::Goals, Selections::new()).await;
        assert_eq!(
            outcome,
            IngestOutcome::Failed(IngestError::Status {
                status: 503,
                body: "busy".into()
            })
        );
    }
}
