//! Prompt templates and shapes for the built-in flows.
//!
//! Each flow pairs a template with the shape of the record it is rendered
//! from and the shape of the JSON object the model must answer with.
//! Placeholders use camelCase field names.

use super::flow::{FlowName, PromptSpec};
use super::schema::{RangePolicy, Shape};
use crate::errors::TemplateError;
use crate::models::{CHAT_ROLES, MOOD_NAMES, SENTIMENT_LABELS};
use crate::stress::{MOOD_ANSWERS, RELAXATION_ANSWERS, SLEEP_ANSWERS, WORKLOAD_ANSWERS};

const ANALYZE_MOOD_PATTERNS: &str = r#"You are an assistant specializing in mental health and well-being.
Your task is to analyze a user's mood patterns over time based on their mood logs and return an insightful analysis.

Here are the user's mood logs:
{{#each moodLogs}}
- Date: {{date}}, Mood: {{mood}}, Notes: {{notes}}
{{/each}}

Analyze the mood patterns and summarize the user's mood trends, potential triggers
and notable observations about their emotional well-being. Focus on patterns and trends, not individual entries.
Speak in a friendly, empathetic tone.
"#;

const DETECT_SENTIMENT: &str = r#"Analyze the sentiment of the following journal entry. Return the sentiment as either positive, negative, or neutral, and a numerical score from -1 to 1, where -1 is very negative and 1 is very positive.

Journal Entry: {{{journalEntry}}}"#;

const PERSONALIZED_TIPS: &str = r#"You are a mental wellness expert. Based on the user's journal entry and mood data, provide personalized wellness tips to help improve their mental well-being. Be empathetic and encouraging.

Journal Entry: {{{journalEntry}}}
Mood Data: {{{moodData}}}

Wellness Tips:"#;

const QUOTE_OF_THE_DAY: &str = r#"You are a curator of inspirational quotes. Produce a short, impactful, non-cliche quote about the theme of '{{theme}}'. The quote should be insightful and encouraging. Return the quote and the author. If the author is not well-known, attribute it to "Unknown"."#;

const WELLNESS_CONVERSATION: &str = r#"You are a friendly and empathetic assistant specializing in mental wellness.

Here is the conversation history:
{{#each history}}
  {{role}}: {{content}}
{{/each}}

Respond to the last user message with helpful advice and support.

User Message: {{{message}}}
"#;

const SUMMARIZE_JOURNAL: &str = r#"Summarize the following journal entries:

{{{journalEntries}}}"#;

const STRESS_ADVICE: &str = r#"You are a mental wellness coach. A user has reported their stress level on a scale of 1 (very low) to 5 (very high).

Their stress level is: {{stressLevel}}.

- If the stress level is 1 or 2, congratulate them on managing their stress well and give a short, encouraging message.
- If the stress level is 3, acknowledge it and give one simple, quick tip for prevention, like taking a short break or a few deep breaths.
- If the stress level is 4 or 5, respond with empathy and suggest one specific, actionable stress-reduction technique, such as box breathing, a short mindfulness practice or writing down their thoughts. Keep it concise and easy to follow.

Write a response that is helpful and empathetic.
"#;

const STRESS_FROM_QUIZ: &str = r#"You are an expert at analyzing self-reported wellness data.

Based on the following answers to a short quiz, determine the user's stress level on a scale of 1 (very low) to 5 (very high).

Questions & Answers:
- How have you been sleeping lately? {{sleep}}
- How would you describe your current workload or daily demands? {{workload}}
- How often have you felt irritable or anxious this week? {{mood}}
- Are you making time for relaxation or hobbies? {{relaxation}}

Return a whole-number stress level and a very brief, one-sentence justification. If sleep is poor and workload is overwhelming, the level should be high (4 or 5). If sleep is good and the user is rarely anxious, it should be low (1 or 2).
"#;

/// Builds the spec for every built-in flow, in `FlowName::ALL` order.
///
/// # Errors
///
/// Returns a `TemplateError` if a template fails to parse or references a
/// field missing from its input shape.
pub fn builtin_specs() -> Result<Vec<PromptSpec>, TemplateError> {
    FlowName::ALL.iter().map(|name| spec_for(*name)).collect()
}

fn spec_for(name: FlowName) -> Result<PromptSpec, TemplateError> {
    match name {
        FlowName::AnalyzeMoodPatterns => PromptSpec::new(
            name,
            ANALYZE_MOOD_PATTERNS,
            Shape::new()
                .non_empty_text("userId", "The user whose mood logs are analyzed")
                .list(
                    "moodLogs",
                    "Mood logs, newest first",
                    Shape::new()
                        .text("date", "Date of the log, YYYY-MM-DD")
                        .choice("mood", "Recorded mood", MOOD_NAMES)
                        .optional_text("notes", "Optional notes"),
                ),
            Shape::new().non_empty_text("analysis", "Analysis of mood patterns over time"),
        ),
        FlowName::DetectSentiment => PromptSpec::new(
            name,
            DETECT_SENTIMENT,
            Shape::new().non_empty_text("journalEntry", "Journal entry to analyze"),
            Shape::new()
                .choice("sentiment", "Overall sentiment", SENTIMENT_LABELS)
                .number(
                    "score",
                    "Sentiment strength from -1 (very negative) to 1 (very positive)",
                    -1.0,
                    1.0,
                    RangePolicy::Clamp,
                ),
        ),
        FlowName::PersonalizedTips => PromptSpec::new(
            name,
            PERSONALIZED_TIPS,
            Shape::new()
                .non_empty_text("journalEntry", "Journal entry giving context")
                .text("moodData", "Recent mood data as prose"),
            Shape::new().non_empty_text("wellnessTips", "Personalized wellness tips"),
        ),
        FlowName::QuoteOfTheDay => PromptSpec::new(
            name,
            QUOTE_OF_THE_DAY,
            Shape::new().non_empty_text("theme", "Theme such as mindfulness or perseverance"),
            Shape::new()
                .non_empty_text("quote", "The quote")
                .non_empty_text("author", "The author, or \"Unknown\""),
        ),
        FlowName::WellnessConversation => PromptSpec::new(
            name,
            WELLNESS_CONVERSATION,
            Shape::new()
                .non_empty_text("message", "Latest user message")
                .list(
                    "history",
                    "Earlier turns, oldest first",
                    Shape::new()
                        .choice("role", "Speaker", CHAT_ROLES)
                        .text("content", "What was said"),
                ),
            Shape::new().non_empty_text("response", "Assistant reply to the user"),
        ),
        FlowName::SummarizeJournal => PromptSpec::new(
            name,
            SUMMARIZE_JOURNAL,
            Shape::new().non_empty_text("journalEntries", "Journal text to summarize"),
            Shape::new().non_empty_text("summary", "Summary of the entries"),
        ),
        FlowName::StressAdvice => PromptSpec::new(
            name,
            STRESS_ADVICE,
            Shape::new().integer("stressLevel", "Self-reported stress level from 1 to 5", 1, 5),
            Shape::new().non_empty_text("advice", "Advice for this stress level"),
        ),
        FlowName::StressFromQuiz => PromptSpec::new(
            name,
            STRESS_FROM_QUIZ,
            Shape::new()
                .choice("sleep", "How the user has been sleeping", SLEEP_ANSWERS)
                .choice("workload", "Current workload", WORKLOAD_ANSWERS)
                .choice("mood", "How often the user felt irritable or anxious", MOOD_ANSWERS)
                .choice("relaxation", "Time for relaxation or hobbies", RELAXATION_ANSWERS),
            Shape::new()
                .integer("stressLevel", "Stress level from 1 to 5", 1, 5)
                .non_empty_text("justification", "One-sentence reason for the level"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_specs_parse_in_order() {
        let specs = builtin_specs().unwrap();
        let names: Vec<FlowName> = specs.iter().map(|s| s.name()).collect();
        assert_eq!(names, FlowName::ALL.to_vec());
    }

    #[test]
    fn test_mood_patterns_prompt_lists_each_log() {
        let spec = spec_for(FlowName::AnalyzeMoodPatterns).unwrap();
        let input = spec
            .input_shape()
            .check(&json!({
                "userId": "u1",
                "moodLogs": [
                    {"date": "2024-05-02", "mood": "Good", "notes": "gym"},
                    {"date": "2024-05-01", "mood": "bad"}
                ]
            }))
            .unwrap();
        let prompt = spec.render(&input);
        assert!(prompt.contains("- Date: 2024-05-02, Mood: good, Notes: gym\n"));
        assert!(prompt.contains("- Date: 2024-05-01, Mood: bad, Notes: \n"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_conversation_prompt_renders_history() {
        let spec = spec_for(FlowName::WellnessConversation).unwrap();
        let input = json!({
            "message": "I can't sleep",
            "history": [
                {"role": "assistant", "content": "Hello!"},
                {"role": "user", "content": "Hi"}
            ]
        });
        let prompt = spec.render(&spec.input_shape().check(&input).unwrap());
        assert!(prompt.contains("  assistant: Hello!\n  user: Hi\n"));
        assert!(prompt.ends_with("User Message: I can't sleep\n"));
    }

    #[test]
    fn test_quiz_prompt_keeps_answers_verbatim() {
        let spec = spec_for(FlowName::StressFromQuiz).unwrap();
        let input = json!({
            "sleep": "Poorly",
            "workload": "Overwhelming",
            "mood": "Frequently",
            "relaxation": "A little, but not enough"
        });
        let prompt = spec.render(&spec.input_shape().check(&input).unwrap());
        assert!(prompt.contains("sleeping lately? Poorly"));
        assert!(prompt.contains("hobbies? A little, but not enough"));
    }

    #[test]
    fn test_stress_advice_output_schema_is_strict() {
        let spec = spec_for(FlowName::StressAdvice).unwrap();
        let schema = spec.output_shape().json_schema();
        assert_eq!(schema["required"], json!(["advice"]));
        assert!(spec.input_shape().check(&json!({"stressLevel": 0})).is_err());
        assert!(spec.input_shape().check(&json!({"stressLevel": 5})).is_ok());
    }
}
