//! Generated workout documents and the collaborator that presents them.

use serde::{Deserialize, Serialize};

/// One exercise inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub duration: String,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications: Option<String>,
}

/// A named block of exercises (warm-up, main set, cool-down, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSection {
    pub name: String,
    pub duration: String,
    pub exercises: Vec<Exercise>,
}

/// Structured workout plan as produced by the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub title: String,
    pub description: String,
    pub total_duration: String,
    pub difficulty: String,
    pub sections: Vec<WorkoutSection>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progression: Option<String>,
}

/// A generated workout in whichever shape the backend chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkoutDocument {
    /// Already formatted for display.
    Formatted(String),
    Structured(WorkoutPlan),
    /// Anything else; shown as pretty-printed JSON.
    Raw(serde_json::Value),
}

impl WorkoutDocument {
    pub fn to_display_text(&self) -> String {
        match self {
            Self::Formatted(text) => text.clone(),
            Self::Structured(plan) => plan.to_display_text(),
            Self::Raw(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl WorkoutPlan {
    /// Render the plan as plain text.
    pub fn to_display_text(&self) -> String {
        let mut out: Vec<String> = Vec::new();

        out.push(self.title.to_uppercase());
        out.push(format!("{}\n", self.description));
        out.push(format!("Duration: {}", self.total_duration));
        out.push(format!("Level: {}\n", title_case(&self.difficulty)));

        for section in &self.sections {
            out.push(format!("\n== {} ==", section.name.to_uppercase()));
            out.push(format!("Duration: {}\n", section.duration));
            for (i, exercise) in section.exercises.iter().enumerate() {
                out.push(format!("{}. {}", i + 1, exercise.name));
                out.push(format!("   Time: {}", exercise.duration));
                out.push(format!("   How: {}", exercise.instructions));
                if let Some(mods) = exercise.modifications.as_deref().filter(|m| !m.is_empty()) {
                    out.push(format!("   Modifications: {mods}"));
                }
                out.push(String::new());
            }
        }

        if !self.notes.is_empty() {
            out.push("NOTES:".to_string());
            for note in &self.notes {
                out.push(format!("- {note}"));
            }
            out.push(String::new());
        }

        if let Some(progression) = self.progression.as_deref().filter(|p| !p.is_empty()) {
            out.push("PROGRESSION PLAN:".to_string());
            out.push(progression.to_string());
        }

        out.join("\n")
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Receives the generated plan once the conversation completes.
pub trait PlanRenderer: Send + Sync {
    fn render(&self, plan: &WorkoutDocument);
}
