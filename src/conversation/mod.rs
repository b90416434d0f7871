//! Intake conversation: staged collection of a fitness profile.
//!
//! The user answers three stages (basic info, goals, preferences) either by
//! typed form or by accepting a transcribed voice draft. Every answer goes to
//! the backend, which replies with the next stage and eventually a workout
//! plan.

pub mod controller;
pub mod form;
pub mod guard;
pub mod ingest;
pub mod message;
pub mod normalize;
pub mod profile;
pub mod stage;
pub mod vocab;

pub use controller::{Affordances, ControllerDeps, ConversationController, TurnOutcome};
pub use form::{BasicForm, FinalForm, GoalsForm, StageForm};
pub use guard::{InitGuard, SubmissionPermit, SubmissionSlot};
pub use ingest::{IngestOutcome, StageIngestClient};
pub use message::Message;
pub use profile::{Profile, Selections};
pub use stage::Stage;
