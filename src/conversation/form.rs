//! Typed per-stage forms: the text-entry path into the conversation.

use serde_json::{Value, json};

use crate::error::SubmitRejected;

use super::profile::{Profile, Selections};
use super::stage::Stage;
use super::vocab::{ActivityLevel, Equipment, Gender, Goal, TrainingTime, WorkoutType};

/// Basic information form.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicForm {
    pub name: Option<String>,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
}

/// Goal selection form. Needs at least one goal to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalsForm {
    pub goals: Vec<Goal>,
}

/// Preferences and constraints form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalForm {
    pub preferred_workout_types: Vec<WorkoutType>,
    pub preferred_training_times: Vec<TrainingTime>,
    pub equipment: Vec<Equipment>,
    pub injuries: Vec<String>,
    pub not_preferred_exercises: Vec<String>,
    pub special_considerations: Vec<String>,
}

/// A typed submission for one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageForm {
    Basic(BasicForm),
    Goals(GoalsForm),
    Final(FinalForm),
}

impl StageForm {
    /// The stage this form belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Basic(_) => Stage::Basic,
            Self::Goals(_) => Stage::Goals,
            Self::Final(_) => Stage::Final,
        }
    }

    /// Build a form from loose key/value input, applying the same coercion
    /// as voice selections and then requiring the stage's fields.
    pub fn from_selections(stage: Stage, selections: &Selections) -> Result<Self, SubmitRejected> {
        Self::from_profile(stage, Profile::default().merge(stage, selections))
    }

    /// Build the form for `stage` from the fields a profile already holds.
    pub fn from_profile(stage: Stage, draft: Profile) -> Result<Self, SubmitRejected> {
        let missing = draft.missing_for(stage);
        if !missing.is_empty() {
            return Err(SubmitRejected::InvalidForm(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        let form = match stage {
            Stage::Basic => match (
                draft.age,
                draft.gender,
                draft.height_cm,
                draft.weight_kg,
                draft.activity_level,
            ) {
                (Some(age), Some(gender), Some(height_cm), Some(weight_kg), Some(activity_level)) => {
                    Self::Basic(BasicForm {
                        name: draft.name,
                        age,
                        gender,
                        height_cm,
                        weight_kg,
                        activity_level,
                    })
                }
                _ => return Err(SubmitRejected::InvalidForm("incomplete basic form".into())),
            },
            Stage::Goals => Self::Goals(GoalsForm { goals: draft.goals }),
            Stage::Final => Self::Final(FinalForm {
                preferred_workout_types: draft.preferred_workout_types,
                preferred_training_times: draft.preferred_training_times,
                equipment: draft.equipment,
                injuries: draft.injuries,
                not_preferred_exercises: draft.not_preferred_exercises,
                special_considerations: draft.special_considerations,
            }),
            Stage::Complete => {
                return Err(SubmitRejected::InvalidForm(
                    "the complete stage has no form".into(),
                ));
            }
        };
        form.validate()?;
        Ok(form)
    }

    /// Field-level checks the submit button enforces.
    pub fn validate(&self) -> Result<(), SubmitRejected> {
        match self {
            Self::Basic(f) => {
                if f.age == 0 {
                    return Err(SubmitRejected::InvalidForm("age must be positive".into()));
                }
                if !(f.height_cm.is_finite() && f.height_cm > 0.0) {
                    return Err(SubmitRejected::InvalidForm("height must be positive".into()));
                }
                if !(f.weight_kg.is_finite() && f.weight_kg > 0.0) {
                    return Err(SubmitRejected::InvalidForm("weight must be positive".into()));
                }
                Ok(())
            }
            Self::Goals(f) if f.goals.is_empty() => Err(SubmitRejected::InvalidForm(
                "select at least one goal".into(),
            )),
            Self::Goals(_) | Self::Final(_) => Ok(()),
        }
    }

    /// The structured selections sent to the backend for this stage.
    pub fn selections(&self) -> Selections {
        let value = match self {
            Self::Basic(f) => json!({
                "name": clean_name(&f.name),
                "age": f.age,
                "gender": f.gender,
                "height_cm": f.height_cm,
                "weight_kg": f.weight_kg,
                "activity_level": f.activity_level,
            }),
            Self::Goals(f) => json!({ "goals": f.goals }),
            Self::Final(f) => json!({
                "preferred_workout_types": f.preferred_workout_types,
                "preferred_training_times": f.preferred_training_times,
                "equipment": f.equipment,
                "injuries": f.injuries,
                "not_preferred_exercises": f.not_preferred_exercises,
                "special_considerations": f.special_considerations,
            }),
        };
        match value {
            Value::Object(map) => map,
            _ => Selections::new(),
        }
    }

    /// The user-authored chat line shown for this submission.
    pub fn display_text(&self) -> String {
        match self {
            Self::Basic(f) => {
                let stats = format!(
                    "Age: {}, Gender: {}, Height: {}cm, Weight: {}kg, Activity: {}",
                    f.age, f.gender, f.height_cm, f.weight_kg, f.activity_level
                );
                match clean_name(&f.name) {
                    Some(name) => format!("Hi, I'm {name}! {stats}"),
                    None => stats,
                }
            }
            Self::Goals(f) => format!("Goals: {}", join(&f.goals)),
            Self::Final(f) => format!(
                "Workout types: {}, Times: {}, Equipment: {}",
                join(&f.preferred_workout_types),
                join(&f.preferred_training_times),
                join(&f.equipment)
            ),
        }
    }

    /// Write this form into `profile`, replacing every field the stage owns.
    ///
    /// A typed submission is an explicit user edit, so it may clear values.
    pub fn apply_to(&self, profile: &Profile) -> Profile {
        let mut next = profile.clone();
        match self {
            Self::Basic(f) => {
                next.name = clean_name(&f.name);
                next.age = Some(f.age);
                next.gender = Some(f.gender);
                next.height_cm = Some(f.height_cm);
                next.weight_kg = Some(f.weight_kg);
                next.activity_level = Some(f.activity_level);
            }
            Self::Goals(f) => next.goals = f.goals.clone(),
            Self::Final(f) => {
                next.preferred_workout_types = f.preferred_workout_types.clone();
                next.preferred_training_times = f.preferred_training_times.clone();
                next.equipment = f.equipment.clone();
                next.injuries = f.injuries.clone();
                next.not_preferred_exercises = f.not_preferred_exercises.clone();
                next.special_considerations = f.special_considerations.clone();
            }
        }
        next
    }
}

fn clean_name(name: &Option<String>) -> Option<String> {
    name.as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
