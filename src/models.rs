//! Records shared by the store, the flows and the operations.

use crate::constants::{
    JOURNAL_CONTENT_MAX, JOURNAL_CONTENT_MIN, JOURNAL_TITLE_MAX, JOURNAL_TITLE_MIN, MOOD_NOTES_MAX,
};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mood names accepted by the mood log, worst to best.
pub const MOOD_NAMES: &[&str] = &["awful", "bad", "neutral", "good", "great"];

/// Sentiment labels produced by the sentiment flow.
pub const SENTIMENT_LABELS: &[&str] = &["positive", "negative", "neutral"];

/// Speaker roles in a chat transcript.
pub const CHAT_ROLES: &[&str] = &["user", "assistant"];

/// A self-reported mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Awful,
    Bad,
    Neutral,
    Good,
    Great,
}

impl Mood {
    /// Lowercase name as stored and shown.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Awful => "awful",
            Mood::Bad => "bad",
            Mood::Neutral => "neutral",
            Mood::Good => "good",
            Mood::Great => "great",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awful" => Ok(Mood::Awful),
            "bad" => Ok(Mood::Bad),
            "neutral" => Ok(Mood::Neutral),
            "good" => Ok(Mood::Good),
            "great" => Ok(Mood::Great),
            other => Err(format!(
                "unknown mood '{}', expected one of: {}",
                other,
                MOOD_NAMES.join(", ")
            )),
        }
    }
}

/// Overall tone of a piece of writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Sentiment of a journal entry. `score` lies in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub sentiment: SentimentLabel,
    pub score: f64,
}

/// Who said a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Lowercase name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown chat role '{}'", other)),
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A stored journal entry.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub sentiment: Option<Sentiment>,
}

/// A journal entry as submitted by the user.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub title: String,
    pub content: String,
}

impl NewJournalEntry {
    /// Checks title and content lengths.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` describing the first field out of bounds.
    pub fn validate(&self) -> AppResult<()> {
        check_length("Title", &self.title, JOURNAL_TITLE_MIN, JOURNAL_TITLE_MAX)?;
        check_length(
            "Content",
            &self.content,
            JOURNAL_CONTENT_MIN,
            JOURNAL_CONTENT_MAX,
        )
    }
}

/// A stored mood log.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodLog {
    pub id: String,
    pub user_id: String,
    pub mood: Mood,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A mood log as submitted by the user.
#[derive(Debug, Clone)]
pub struct NewMoodLog {
    pub mood: Mood,
    pub notes: Option<String>,
}

impl NewMoodLog {
    /// Checks the notes length.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the notes are too long.
    pub fn validate(&self) -> AppResult<()> {
        match &self.notes {
            Some(notes) => check_length("Notes", notes, 0, MOOD_NOTES_MAX),
            None => Ok(()),
        }
    }
}

/// An inspirational quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(AppError::Validation(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    if len > max {
        return Err(AppError::Validation(format!(
            "{} can't exceed {} characters",
            field, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_parsing_is_case_insensitive() {
        assert_eq!("Great".parse::<Mood>().unwrap(), Mood::Great);
        assert_eq!(" bad ".parse::<Mood>().unwrap(), Mood::Bad);
        let err = "meh".parse::<Mood>().unwrap_err();
        assert!(err.contains("awful, bad, neutral, good, great"));
    }

    #[test]
    fn test_mood_names_match_variants() {
        for name in MOOD_NAMES {
            assert_eq!(name.parse::<Mood>().unwrap().as_str(), *name);
        }
    }

    #[test]
    fn test_journal_validation_bounds() {
        let ok = NewJournalEntry {
            title: "Monday".to_string(),
            content: "A long and quiet day.".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty_title = NewJournalEntry {
            title: String::new(),
            content: "A long and quiet day.".to_string(),
        };
        match empty_title.validate() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("Title must be at least 1")),
            other => panic!("Expected validation error, got {:?}", other),
        }

        let short = NewJournalEntry {
            title: "Monday".to_string(),
            content: "Too short".to_string(),
        };
        assert!(short.validate().is_err());

        let long = NewJournalEntry {
            title: "x".repeat(101),
            content: "A long and quiet day.".to_string(),
        };
        match long.validate() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("can't exceed 100")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_mood_notes_validation() {
        let ok = NewMoodLog {
            mood: Mood::Good,
            notes: Some("slept well".to_string()),
        };
        assert!(ok.validate().is_ok());

        let too_long = NewMoodLog {
            mood: Mood::Good,
            notes: Some("n".repeat(501)),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::assistant("Hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "Hi"}));
    }

    #[test]
    fn test_sentiment_round_trips_through_json() {
        let sentiment = Sentiment {
            sentiment: SentimentLabel::Negative,
            score: -0.4,
        };
        let text = serde_json::to_string(&sentiment).unwrap();
        assert_eq!(text, r#"{"sentiment":"negative","score":-0.4}"#);
        let back: Sentiment = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sentiment);
    }
}
