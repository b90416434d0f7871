//! JSON shapes exchanged with the intake backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::profile::{Profile, Selections};
use crate::conversation::stage::Stage;
use crate::conversation::vocab::{
    ActivityLevel, Equipment, Gender, Goal, TrainingTime, WorkoutType,
};
use crate::error::GenerateError;
use crate::workout::WorkoutDocument;

/// Body of `POST /chat/ingest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub session_id: String,
    pub stage: Stage,
    pub selections: Selections,
}

/// Reply to `POST /chat/ingest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub assistant_text: String,
    #[serde(default)]
    pub next_stage: Option<Stage>,
    #[serde(default)]
    pub controls: Option<Controls>,
}

/// Optional UI controls attached to an ingest reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    /// Present only when the conversation has produced a plan.
    #[serde(default)]
    pub workout: Option<WorkoutDocument>,
}

impl IngestResponse {
    /// The generated plan, if this reply completes the conversation.
    pub fn workout(&self) -> Option<&WorkoutDocument> {
        self.controls.as_ref().and_then(|c| c.workout.as_ref())
    }
}

/// Reply to `POST /speech/transcribe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub transcript: String,
    #[serde(default)]
    pub selections: Selections,
    #[serde(default)]
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalStats {
    /// Centimeters.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    pub gender: Gender,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalEntry {
    pub goal_type: Goal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub preferred_workout_types: Vec<WorkoutType>,
    pub preferred_training_times: Vec<TrainingTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restrictions {
    pub injuries: Vec<String>,
    pub equipment: Vec<Equipment>,
    pub not_preferred_exercises: Vec<String>,
    pub special_considerations: Vec<String>,
}

/// Body of `POST /generate-workout`: the whole profile in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateWorkoutRequest {
    pub user_id: String,
    pub name: String,
    pub physical_stats: PhysicalStats,
    pub goals: Vec<GoalEntry>,
    pub preferences: Preferences,
    pub activity_level: ActivityLevel,
    pub restrictions: Restrictions,
    pub created_at: Option<DateTime<Utc>>,
}

impl GenerateWorkoutRequest {
    /// Build the document from an accumulated profile.
    ///
    /// Fails with `IncompleteProfile` when any required field is still empty.
    pub fn from_profile(user_id: &str, profile: &Profile) -> Result<Self, GenerateError> {
        let missing = profile.missing_all();
        let (Some(age), Some(gender), Some(height), Some(weight), Some(activity_level)) = (
            profile.age,
            profile.gender,
            profile.height_cm,
            profile.weight_kg,
            profile.activity_level,
        ) else {
            return Err(GenerateError::IncompleteProfile { missing });
        };
        if !missing.is_empty() {
            return Err(GenerateError::IncompleteProfile { missing });
        }

        Ok(Self {
            user_id: user_id.to_string(),
            name: profile.name.clone().unwrap_or_default(),
            physical_stats: PhysicalStats {
                height,
                weight,
                gender,
                age,
            },
            goals: profile
                .goals
                .iter()
                .map(|g| GoalEntry { goal_type: *g })
                .collect(),
            preferences: Preferences {
                preferred_workout_types: profile.preferred_workout_types.clone(),
                preferred_training_times: profile.preferred_training_times.clone(),
            },
            activity_level,
            restrictions: Restrictions {
                injuries: profile.injuries.clone(),
                equipment: profile.equipment.clone(),
                not_preferred_exercises: profile.not_preferred_exercises.clone(),
                special_considerations: profile.special_considerations.clone(),
            },
            created_at: Some(Utc::now()),
        })
    }
}

/// Reply to `POST /generate-workout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateWorkoutResponse {
    pub status: String,
    /// Display-formatted plan.
    #[serde(default)]
    pub workout: Option<String>,
    #[serde(default)]
    pub raw_workout: Option<WorkoutDocument>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GenerateWorkoutResponse {
    /// Convert into a plan, preferring the structured document.
    pub fn into_document(self) -> Result<WorkoutDocument, GenerateError> {
        if self.status != "success" {
            return Err(GenerateError::Rejected(
                self.message.unwrap_or_else(|| format!("status {}", self.status)),
            ));
        }
        self.raw_workout
            .or_else(|| self.workout.map(WorkoutDocument::Formatted))
            .ok_or_else(|| GenerateError::Rejected("success without a workout".to_string()))
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ingest_response_without_controls() {
        let resp: IngestResponse = serde_json::from_value(json!({
            "assistant_text": "Nice, what are your goals?",
            "next_stage": "goals",
            "state": {"ignored": true}
        }))
        .unwrap();
        assert_eq!(resp.next_stage, Some(Stage::Goals));
        assert!(resp.workout().is_none());
    }

    #[test]
    fn ingest_response_with_empty_controls_or_missing_stage() {
        let resp: IngestResponse = serde_json::from_value(json!({
            "assistant_text": "hm",
            "controls": {}
        }))
        .unwrap();
        assert!(resp.next_stage.is_none());
        assert!(resp.workout().is_none());
    }

    #[test]
    fn ingest_response_with_workout() {
        let resp: IngestResponse = serde_json::from_value(json!({
            "assistant_text": "Here it is",
            "next_stage": "final",
            "controls": {"workout": "Squats x10"}
        }))
        .unwrap();
        assert_eq!(
            resp.workout(),
            Some(&WorkoutDocument::Formatted("Squats x10".into()))
        );
    }

    #[test]
    fn transcription_defaults() {
        let t: Transcription = serde_json::from_value(json!({"transcript": "hello"})).unwrap();
        assert!(t.selections.is_empty());
        assert!(t.missing.is_empty());
    }

    #[test]
    fn generate_request_from_incomplete_profile() {
        let err = GenerateWorkoutRequest::from_profile("u1", &Profile::default()).unwrap_err();
        match err {
            GenerateError::IncompleteProfile { missing } => {
                assert_eq!(missing.len(), 6);
                assert!(missing.contains(&"goals".to_string()));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn generate_request_shape() {
        let profile = Profile {
            name: Some("Kay".into()),
            age: Some(30),
            gender: Some(Gender::Female),
            height_cm: Some(164.0),
            weight_kg: Some(80.0),
            activity_level: Some(ActivityLevel::ModeratelyActive),
            goals: vec![Goal::WeightLoss],
            preferred_workout_types: vec![WorkoutType::Pilates],
            preferred_training_times: vec![TrainingTime::Evening],
            not_preferred_exercises: vec!["lunges".into()],
            ..Default::default()
        };
        let req = GenerateWorkoutRequest::from_profile("u1", &profile).unwrap();
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["physical_stats"]["height"], json!(164.0));
        assert_eq!(value["physical_stats"]["gender"], "female");
        assert_eq!(value["goals"], json!([{"goal_type": "weight_loss"}]));
        assert_eq!(value["restrictions"]["not_preferred_exercises"], json!(["lunges"]));
        assert_eq!(value["activity_level"], "moderately_active");
    }

    #[test]
    fn generate_response_variants() {
        let ok: GenerateWorkoutResponse = serde_json::from_value(json!({
            "status": "success",
            "workout": "formatted text"
        }))
        .unwrap();
        assert_eq!(
            ok.into_document().unwrap(),
            WorkoutDocument::Formatted("formatted text".into())
        );

        let failed: GenerateWorkoutResponse = serde_json::from_value(json!({
            "status": "error",
            "message": "llm down"
        }))
        .unwrap();
        assert!(matches!(
            failed.into_document(),
            Err(GenerateError::Rejected(m)) if m == "llm down"
        ));
    }
}
