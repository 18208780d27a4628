//! Stress levels, advice tiers and the stress quiz.
//!
//! A stress level is either self-reported or derived from four quiz answers.
//! Either way it lands in `[1, 5]` and selects one of three advice tiers.

pub mod classifier;

pub use classifier::{
    get_stress_advice, get_stress_advice_from_quiz, AssessmentSource, QuizAssessment,
    StressAdvice,
};

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical answers to "How have you been sleeping lately?"
pub const SLEEP_ANSWERS: &[&str] = &["Very well", "Okay", "Poorly"];
/// Canonical answers to "How would you describe your current workload?"
pub const WORKLOAD_ANSWERS: &[&str] = &["Manageable", "Busy", "Overwhelming"];
/// Canonical answers to "How often have you felt irritable or anxious this week?"
pub const MOOD_ANSWERS: &[&str] = &["Rarely", "Sometimes", "Frequently"];
/// Canonical answers to "Are you making time for relaxation or hobbies?"
pub const RELAXATION_ANSWERS: &[&str] = &["Plenty of time", "A little, but not enough", "Almost none"];

/// A stress level in `[1, 5]`.
///
/// # Examples
///
/// ```
/// use mindwell::stress::{AdviceTier, StressLevel};
///
/// let level = StressLevel::new(4).unwrap();
/// assert_eq!(level.tier(), AdviceTier::SpecificTechnique);
/// assert!(StressLevel::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StressLevel(u8);

impl StressLevel {
    /// Lowest level.
    pub const MIN: u8 = 1;
    /// Highest level.
    pub const MAX: u8 = 5;

    /// Creates a level, rejecting values outside `[1, 5]`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when `value` is out of range.
    pub fn new(value: i64) -> AppResult<Self> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(AppError::Validation(format!(
                "Stress level must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }
        Ok(Self(value as u8))
    }

    /// The numeric level.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Advice tier for this level.
    pub fn tier(self) -> AdviceTier {
        match self.0 {
            0..=2 => AdviceTier::Encouraging,
            3 => AdviceTier::PreventiveTip,
            _ => AdviceTier::SpecificTechnique,
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// Kind of advice a level calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceTier {
    /// Levels 1 and 2: short encouragement.
    Encouraging,
    /// Level 3: one quick preventive tip.
    PreventiveTip,
    /// Levels 4 and 5: a concrete stress-reduction technique.
    SpecificTechnique,
}

impl AdviceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceTier::Encouraging => "encouraging",
            AdviceTier::PreventiveTip => "preventive tip",
            AdviceTier::SpecificTechnique => "specific technique",
        }
    }
}

impl fmt::Display for AdviceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a quiz answer by its canonical label. Case, commas and the
/// choice of spaces or hyphens are ignored, so `very-well` matches
/// `Very well`.
fn parse_answer(input: &str, labels: &'static [&'static str]) -> Result<usize, String> {
    fn normalize(text: &str) -> String {
        text.to_ascii_lowercase()
            .replace(',', "")
            .split(|c: char| c == '-' || c.is_whitespace())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    let wanted = normalize(input);
    labels
        .iter()
        .position(|label| normalize(label) == wanted)
        .ok_or_else(|| {
            format!(
                "unknown answer '{}', expected one of: {}",
                input.trim(),
                labels.join(" | ")
            )
        })
}

macro_rules! quiz_answer {
    ($(#[$doc:meta])* $name:ident, $labels:expr, [$($variant:ident => $label:literal),+ $(,)?]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            const VARIANTS: &'static [$name] = &[$($name::$variant),+];

            /// Canonical label as shown in the quiz.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Contribution to the rubric score: 0, 1 or 2 by position.
            pub fn score(&self) -> u8 {
                Self::VARIANTS
                    .iter()
                    .position(|v| v == self)
                    .unwrap_or_default() as u8
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_answer(s, $labels).map(|index| Self::VARIANTS[index])
            }
        }
    };
}

quiz_answer!(
    /// Answer to "How have you been sleeping lately?"
    SleepQuality,
    SLEEP_ANSWERS,
    [VeryWell => "Very well", Okay => "Okay", Poorly => "Poorly"]
);

quiz_answer!(
    /// Answer to "How would you describe your current workload or daily demands?"
    Workload,
    WORKLOAD_ANSWERS,
    [Manageable => "Manageable", Busy => "Busy", Overwhelming => "Overwhelming"]
);

quiz_answer!(
    /// Answer to "How often have you felt irritable or anxious this week?"
    MoodFrequency,
    MOOD_ANSWERS,
    [Rarely => "Rarely", Sometimes => "Sometimes", Frequently => "Frequently"]
);

quiz_answer!(
    /// Answer to "Are you making time for relaxation or hobbies?"
    RelaxationTime,
    RELAXATION_ANSWERS,
    [
        Plenty => "Plenty of time",
        NotEnough => "A little, but not enough",
        AlmostNone => "Almost none",
    ]
);

/// The four quiz answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub sleep: SleepQuality,
    pub workload: Workload,
    pub mood: MoodFrequency,
    pub relaxation: RelaxationTime,
}

impl QuizAnswers {
    /// The most relaxed set of answers.
    pub fn best_case() -> Self {
        Self {
            sleep: SleepQuality::VeryWell,
            workload: Workload::Manageable,
            mood: MoodFrequency::Rarely,
            relaxation: RelaxationTime::Plenty,
        }
    }

    /// The most stressed set of answers.
    pub fn worst_case() -> Self {
        Self {
            sleep: SleepQuality::Poorly,
            workload: Workload::Overwhelming,
            mood: MoodFrequency::Frequently,
            relaxation: RelaxationTime::AlmostNone,
        }
    }

    /// Sum of the per-answer scores, in `[0, 8]`.
    pub fn rubric_total(&self) -> u8 {
        self.sleep.score() + self.workload.score() + self.mood.score() + self.relaxation.score()
    }

    /// Deterministic level: `1 + ceil(total / 2)`.
    pub fn rubric_level(&self) -> StressLevel {
        StressLevel(1 + self.rubric_total().div_ceil(2))
    }
}

/// How quiz answers are turned into a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizScoring {
    /// Ask the model (`stress_from_quiz`).
    #[default]
    Model,
    /// Score answers locally with a fixed rubric.
    Rubric,
}

impl QuizScoring {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizScoring::Model => "model",
            QuizScoring::Rubric => "rubric",
        }
    }
}

impl fmt::Display for QuizScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizScoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(QuizScoring::Model),
            "rubric" => Ok(QuizScoring::Rubric),
            other => Err(format!(
                "unknown quiz scoring '{}', expected 'model' or 'rubric'",
                other
            )),
        }
    }
}
