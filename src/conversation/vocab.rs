//! Allowed values for enumerated profile fields.

use serde::{Deserialize, Serialize};

use super::normalize::Vocabulary;

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl Vocabulary for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(
    Gender {
        Male => "male",
        Female => "female",
        Other => "other",
        PreferNotToSay => "prefer_not_to_say",
    }
);

vocabulary!(
    ActivityLevel {
        Sedentary => "sedentary",
        LightlyActive => "lightly_active",
        ModeratelyActive => "moderately_active",
        VeryActive => "very_active",
        ExtremelyActive => "extremely_active",
    }
);

vocabulary!(
    /// A fitness goal; the goals stage needs at least one.
    Goal {
        WeightLoss => "weight_loss",
        MuscleGain => "muscle_gain",
        Endurance => "endurance",
        Strength => "strength",
        Flexibility => "flexibility",
        Maintenance => "maintenance",
    }
);

vocabulary!(
    WorkoutType {
        Cardio => "cardio",
        StrengthTraining => "strength_training",
        Yoga => "yoga",
        Pilates => "pilates",
        Hiit => "HIIT",
    }
);

vocabulary!(
    Equipment {
        Bodyweight => "bodyweight",
        Dumbbells => "dumbbells",
        ResistanceBands => "resistance_bands",
        GymAccess => "gym_access",
    }
);

vocabulary!(
    TrainingTime {
        Morning => "morning",
        Afternoon => "afternoon",
        Evening => "evening",
    }
);
