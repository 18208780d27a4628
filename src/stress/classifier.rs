//! Turns a stress level or quiz answers into advice.

use super::{AdviceTier, QuizAnswers, QuizScoring, StressLevel};
use crate::ai::flows;
use crate::ai::FlowInvoker;
use crate::constants::{
    STRESS_FALLBACK_ADVICE, STRESS_FALLBACK_JUSTIFICATION, STRESS_FALLBACK_LEVEL,
};
use crate::errors::{FlowError, ValidationStage};
use std::fmt;
use tracing::{info, warn};

/// Advice for a known level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressAdvice {
    pub level: StressLevel,
    pub tier: AdviceTier,
    pub advice: String,
}

/// Where a quiz-derived level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentSource {
    /// The model rated the answers.
    Model,
    /// The local rubric scored the answers.
    Rubric,
    /// Scoring or advice failed and the fixed fallback was used.
    Fallback,
}

impl fmt::Display for AssessmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentSource::Model => write!(f, "model"),
            AssessmentSource::Rubric => write!(f, "rubric"),
            AssessmentSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result of the stress quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAssessment {
    pub level: StressLevel,
    pub tier: AdviceTier,
    pub advice: String,
    pub justification: String,
    pub source: AssessmentSource,
}

impl QuizAssessment {
    /// The fixed assessment shown when the quiz cannot be scored.
    pub fn fallback() -> Self {
        let level = StressLevel(STRESS_FALLBACK_LEVEL);
        Self {
            level,
            tier: level.tier(),
            advice: STRESS_FALLBACK_ADVICE.to_string(),
            justification: STRESS_FALLBACK_JUSTIFICATION.to_string(),
            source: AssessmentSource::Fallback,
        }
    }
}

/// Gets advice for a self-reported level.
///
/// # Errors
///
/// Propagates any `FlowError` from the advice flow.
pub async fn get_stress_advice(
    invoker: &FlowInvoker,
    level: StressLevel,
) -> Result<StressAdvice, FlowError> {
    let advice = flows::stress_advice(invoker, level.value()).await?;
    info!(level = level.value(), tier = %level.tier(), "Stress advice generated");
    Ok(StressAdvice {
        level,
        tier: level.tier(),
        advice,
    })
}

/// Scores quiz answers and gets advice for the resulting level.
///
/// Never fails: if scoring or advice generation fails, the fixed fallback
/// assessment is returned instead.
pub async fn get_stress_advice_from_quiz(
    invoker: &FlowInvoker,
    answers: &QuizAnswers,
    scoring: QuizScoring,
) -> QuizAssessment {
    match assess(invoker, answers, scoring).await {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!(error = %e, scoring = %scoring, "Stress quiz failed, using fallback");
            QuizAssessment::fallback()
        }
    }
}

async fn assess(
    invoker: &FlowInvoker,
    answers: &QuizAnswers,
    scoring: QuizScoring,
) -> Result<QuizAssessment, FlowError> {
    let (level, justification, source) = match scoring {
        QuizScoring::Model => {
            let rated = flows::stress_from_quiz(invoker, answers).await?;
            let level = StressLevel::new(i64::from(rated.stress_level)).map_err(|e| {
                FlowError::Validation {
                    flow: "stress_from_quiz",
                    stage: ValidationStage::Output,
                    violations: vec![e.to_string()],
                }
            })?;
            (level, rated.justification, AssessmentSource::Model)
        }
        QuizScoring::Rubric => (
            answers.rubric_level(),
            rubric_justification(answers),
            AssessmentSource::Rubric,
        ),
    };

    let advice = get_stress_advice(invoker, level).await?;
    Ok(QuizAssessment {
        level,
        tier: advice.tier,
        advice: advice.advice,
        justification,
        source,
    })
}

fn rubric_justification(answers: &QuizAnswers) -> String {
    format!(
        "Your answers scored {} out of 8 (sleep: {}, workload: {}, anxiety: {}, relaxation: {}).",
        answers.rubric_total(),
        answers.sleep.label().to_lowercase(),
        answers.workload.label().to_lowercase(),
        answers.mood.label().to_lowercase(),
        answers.relaxation.label().to_lowercase(),
    )
}
