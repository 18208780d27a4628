//! Typed entry points for each built-in flow.
//!
//! These are thin wrappers over `FlowInvoker::invoke` that fix the input and
//! output record types, so callers never handle raw JSON.

use super::flow::{FlowInvoker, FlowName};
use crate::errors::FlowError;
use crate::models::{ChatMessage, Mood, Quote, Sentiment};
use crate::stress::QuizAnswers;
use serde::{Deserialize, Serialize};

/// One mood log as seen by the pattern-analysis prompt.
#[derive(Debug, Clone, Serialize)]
pub struct MoodLogLine {
    pub date: String,
    pub mood: Mood,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoodPatternsInput<'a> {
    user_id: &'a str,
    mood_logs: &'a [MoodLogLine],
}

#[derive(Debug, Deserialize)]
struct MoodPatternsOutput {
    analysis: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JournalEntryInput<'a> {
    journal_entry: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TipsInput<'a> {
    journal_entry: &'a str,
    mood_data: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TipsOutput {
    wellness_tips: String,
}

#[derive(Debug, Serialize)]
struct QuoteInput<'a> {
    theme: &'a str,
}

#[derive(Debug, Serialize)]
struct ConversationInput<'a> {
    message: &'a str,
    history: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ConversationOutput {
    response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryInput<'a> {
    journal_entries: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StressAdviceInput {
    stress_level: u8,
}

#[derive(Debug, Deserialize)]
struct StressAdviceOutput {
    advice: String,
}

/// Level and justification returned by the quiz flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizLevel {
    pub stress_level: u8,
    pub justification: String,
}

/// Describes trends across a user's mood logs.
pub async fn analyze_mood_patterns(
    invoker: &FlowInvoker,
    user_id: &str,
    mood_logs: &[MoodLogLine],
) -> Result<String, FlowError> {
    let out: MoodPatternsOutput = invoker
        .invoke(
            FlowName::AnalyzeMoodPatterns,
            &MoodPatternsInput { user_id, mood_logs },
        )
        .await?;
    Ok(out.analysis)
}

/// Labels a journal entry positive, negative or neutral with a score in `[-1, 1]`.
pub async fn detect_sentiment(
    invoker: &FlowInvoker,
    journal_entry: &str,
) -> Result<Sentiment, FlowError> {
    invoker
        .invoke(FlowName::DetectSentiment, &JournalEntryInput { journal_entry })
        .await
}

/// Suggests wellness tips from a journal entry and a prose mood summary.
pub async fn personalized_tips(
    invoker: &FlowInvoker,
    journal_entry: &str,
    mood_data: &str,
) -> Result<String, FlowError> {
    let out: TipsOutput = invoker
        .invoke(
            FlowName::PersonalizedTips,
            &TipsInput {
                journal_entry,
                mood_data,
            },
        )
        .await?;
    Ok(out.wellness_tips)
}

pub async fn quote_of_the_day(invoker: &FlowInvoker, theme: &str) -> Result<Quote, FlowError> {
    invoker
        .invoke(FlowName::QuoteOfTheDay, &QuoteInput { theme })
        .await
}

/// Replies to `message` given the earlier turns, oldest first.
pub async fn wellness_conversation(
    invoker: &FlowInvoker,
    message: &str,
    history: &[ChatMessage],
) -> Result<String, FlowError> {
    let out: ConversationOutput = invoker
        .invoke(
            FlowName::WellnessConversation,
            &ConversationInput { message, history },
        )
        .await?;
    Ok(out.response)
}

pub async fn summarize_journal(
    invoker: &FlowInvoker,
    journal_entries: &str,
) -> Result<String, FlowError> {
    let out: SummaryOutput = invoker
        .invoke(FlowName::SummarizeJournal, &SummaryInput { journal_entries })
        .await?;
    Ok(out.summary)
}

/// Advice for a self-reported level. The level is checked against `[1, 5]`
/// by the flow's input shape.
pub async fn stress_advice(invoker: &FlowInvoker, stress_level: u8) -> Result<String, FlowError> {
    let out: StressAdviceOutput = invoker
        .invoke(FlowName::StressAdvice, &StressAdviceInput { stress_level })
        .await?;
    Ok(out.advice)
}

/// Asks the model to rate stress from quiz answers.
pub async fn stress_from_quiz(
    invoker: &FlowInvoker,
    answers: &QuizAnswers,
) -> Result<QuizLevel, FlowError> {
    invoker.invoke(FlowName::StressFromQuiz, answers).await
}
