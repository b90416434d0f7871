//! Conversation stages and the profile fields each one owns.

use serde::{Deserialize, Serialize};

/// The phases of the intake conversation.
///
/// Normally progresses Basic → Goals → Final → Complete, but the backend
/// names the next stage in every response and the client follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Basic,
    Goals,
    Final,
    /// Entered only when the backend returns a generated plan.
    Complete,
}

impl Stage {
    /// Whether this stage is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Position in the usual forward order.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Basic => 0,
            Self::Goals => 1,
            Self::Final => 2,
            Self::Complete => 3,
        }
    }

    /// Profile fields written by this stage.
    pub fn owned_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Basic => &[
                "name",
                "age",
                "gender",
                "height_cm",
                "weight_kg",
                "activity_level",
            ],
            Self::Goals => &["goals"],
            Self::Final => &[
                "preferred_workout_types",
                "preferred_training_times",
                "equipment",
                "injuries",
                "not_preferred_exercises",
                "special_considerations",
            ],
            Self::Complete => &[],
        }
    }

    /// Fields that must be filled before the stage is considered answered.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Basic => &["age", "gender", "height_cm", "weight_kg", "activity_level"],
            Self::Goals => &["goals"],
            Self::Final | Self::Complete => &[],
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Basic
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Basic => "basic",
            Self::Goals => "goals",
            Self::Final => "final",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}
