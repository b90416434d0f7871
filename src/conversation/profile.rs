//! The accumulating fitness profile and its merge rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{Vocabulary, many_of, norm_gender, one_of};
use super::stage::Stage;
use super::vocab::{ActivityLevel, Equipment, Gender, Goal, TrainingTime, WorkoutType};

/// Structured key/value data extracted from one stage's input.
pub type Selections = serde_json::Map<String, Value>;

/// Profile collected across the conversation, partitioned by owning stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    // basic
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    // goals
    pub goals: Vec<Goal>,
    // final
    pub preferred_workout_types: Vec<WorkoutType>,
    pub preferred_training_times: Vec<TrainingTime>,
    pub equipment: Vec<Equipment>,
    pub injuries: Vec<String>,
    pub not_preferred_exercises: Vec<String>,
    pub special_considerations: Vec<String>,
}

impl Profile {
    /// Merge `selections` into the subset of fields owned by `stage`.
    ///
    /// Fields that are absent, null, empty, or cannot be coerced keep their
    /// prior value. Keys owned by other stages are ignored.
    pub fn merge(&self, stage: Stage, selections: &Selections) -> Profile {
        let mut next = self.clone();
        for (key, value) in selections {
            if !stage.owned_fields().contains(&key.as_str()) {
                tracing::debug!(%stage, field = %key, "Ignoring selection not owned by stage");
                continue;
            }
            next.merge_field(key, value);
        }
        next
    }

    fn merge_field(&mut self, key: &str, value: &Value) {
        match key {
            "name" => set_if_some(&mut self.name, coerce_string(value)),
            "age" => set_if_some(&mut self.age, coerce_u32(value)),
            "gender" => set_if_some(&mut self.gender, value.as_str().and_then(norm_gender)),
            "height_cm" => set_if_some(&mut self.height_cm, coerce_f64(value)),
            "weight_kg" => set_if_some(&mut self.weight_kg, coerce_f64(value)),
            "activity_level" => {
                set_if_some(&mut self.activity_level, value.as_str().and_then(one_of))
            }
            "goals" => set_if_nonempty(&mut self.goals, coerce_vocab_list(value)),
            "preferred_workout_types" => {
                set_if_nonempty(&mut self.preferred_workout_types, coerce_vocab_list(value))
            }
            "preferred_training_times" => {
                set_if_nonempty(&mut self.preferred_training_times, coerce_vocab_list(value))
            }
            "equipment" => set_if_nonempty(&mut self.equipment, coerce_vocab_list(value)),
            "injuries" => set_if_nonempty(&mut self.injuries, coerce_text_list(value)),
            "not_preferred_exercises" => {
                set_if_nonempty(&mut self.not_preferred_exercises, coerce_text_list(value))
            }
            "special_considerations" => {
                set_if_nonempty(&mut self.special_considerations, coerce_text_list(value))
            }
            _ => {}
        }
    }

    /// Whether a named field currently holds no value.
    pub fn is_field_empty(&self, field: &str) -> bool {
        match field {
            "name" => self.name.is_none(),
            "age" => self.age.is_none(),
            "gender" => self.gender.is_none(),
            "height_cm" => self.height_cm.is_none(),
            "weight_kg" => self.weight_kg.is_none(),
            "activity_level" => self.activity_level.is_none(),
            "goals" => self.goals.is_empty(),
            "preferred_workout_types" => self.preferred_workout_types.is_empty(),
            "preferred_training_times" => self.preferred_training_times.is_empty(),
            "equipment" => self.equipment.is_empty(),
            "injuries" => self.injuries.is_empty(),
            "not_preferred_exercises" => self.not_preferred_exercises.is_empty(),
            "special_considerations" => self.special_considerations.is_empty(),
            _ => true,
        }
    }

    /// Required fields of `stage` that are still empty, in schema order.
    pub fn missing_for(&self, stage: Stage) -> Vec<String> {
        stage
            .required_fields()
            .iter()
            .filter(|f| self.is_field_empty(f))
            .map(|f| f.to_string())
            .collect()
    }

    /// Missing required fields across every stage.
    pub fn missing_all(&self) -> Vec<String> {
        [Stage::Basic, Stage::Goals, Stage::Final]
            .iter()
            .flat_map(|s| self.missing_for(*s))
            .collect()
    }
}

fn set_if_some<T>(slot: &mut Option<T>, value: Option<T>) {
    if let Some(v) = value {
        *slot = Some(v);
    }
}

fn set_if_nonempty<T>(slot: &mut Vec<T>, value: Vec<T>) {
    if !value.is_empty() {
        *slot = value;
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn coerce_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Accepts a list of strings, or a single string as a one-element list.
fn string_items(value: &Value) -> Vec<&str> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(s) => vec![s.as_str()],
        _ => Vec::new(),
    }
}

fn coerce_vocab_list<V: Vocabulary>(value: &Value) -> Vec<V> {
    many_of(string_items(value))
}

fn coerce_text_list(value: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in string_items(value) {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|e| e == item) {
            out.push(item.to_string());
        }
    }
    out
}
