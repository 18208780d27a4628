//! Journal operations: writing entries and asking the model about them.

use super::run_blocking;
use crate::ai::{flows, FlowInvoker};
use crate::constants::{NO_MOOD_DATA, TIPS_MOOD_WINDOW};
use crate::db::WellnessStore;
use crate::errors::{AppResult, DatabaseError};
use crate::models::{JournalEntry, MoodLog, NewJournalEntry, Sentiment};
use std::sync::Arc;
use tracing::{debug, info};

/// Validates and stores a new entry.
///
/// # Errors
///
/// Returns `AppError::Validation` if the title or content length is out of
/// bounds, or a storage error.
pub async fn add_entry(
    store: &Arc<dyn WellnessStore>,
    user_id: &str,
    entry: NewJournalEntry,
) -> AppResult<JournalEntry> {
    entry.validate()?;
    let user = user_id.to_string();
    let stored = run_blocking(store, move |s| s.add_journal_entry(&user, &entry)).await?;
    info!("Saved journal entry {}", stored.id);
    Ok(stored)
}

/// Up to `limit` entries, newest first.
pub async fn list_entries(
    store: &Arc<dyn WellnessStore>,
    user_id: &str,
    limit: usize,
) -> AppResult<Vec<JournalEntry>> {
    let user = user_id.to_string();
    run_blocking(store, move |s| s.journal_entries(&user, limit)).await
}

/// Summarizes one entry.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` for an unknown entry, or the flow error.
pub async fn summarize_entry(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user_id: &str,
    entry_id: &str,
) -> AppResult<String> {
    let entry = fetch_entry(store, user_id, entry_id).await?;
    Ok(flows::summarize_journal(invoker, &entry.content).await?)
}

/// Detects the sentiment of one entry and stores it on the entry.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` for an unknown entry, the flow error,
/// or a storage error.
pub async fn detect_entry_sentiment(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user_id: &str,
    entry_id: &str,
) -> AppResult<Sentiment> {
    let entry = fetch_entry(store, user_id, entry_id).await?;
    let sentiment = flows::detect_sentiment(invoker, &entry.content).await?;

    let user = user_id.to_string();
    let stored = sentiment.clone();
    run_blocking(store, move |s| s.set_entry_sentiment(&user, &entry.id, &stored)).await?;
    info!(
        "Entry {} sentiment: {} ({:.2})",
        entry_id, sentiment.sentiment, sentiment.score
    );
    Ok(sentiment)
}

/// Wellness tips based on one entry and the most recent mood logs.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` for an unknown entry, the flow error,
/// or a storage error.
pub async fn tips_for_entry(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user_id: &str,
    entry_id: &str,
) -> AppResult<String> {
    let entry = fetch_entry(store, user_id, entry_id).await?;
    tips_for_content(store, invoker, user_id, &entry.content).await
}

pub(crate) async fn tips_for_content(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user_id: &str,
    content: &str,
) -> AppResult<String> {
    let user = user_id.to_string();
    let moods = run_blocking(store, move |s| s.mood_logs(&user, TIPS_MOOD_WINDOW)).await?;
    let mood_data = format_mood_data(&moods);
    debug!("Requesting tips with {} mood logs", moods.len());
    Ok(flows::personalized_tips(invoker, content, &mood_data).await?)
}

/// Renders mood logs as the prose the tips prompt expects.
///
/// # Examples
///
/// ```
/// use mindwell::ops::journal::format_mood_data;
///
/// assert_eq!(format_mood_data(&[]), "No recent mood data available.");
/// ```
pub fn format_mood_data(logs: &[MoodLog]) -> String {
    if logs.is_empty() {
        return NO_MOOD_DATA.to_string();
    }
    logs.iter()
        .map(|log| match log.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => {
                format!("On {}, mood was {} (Notes: {})", log.date, log.mood, notes)
            }
            _ => format!("On {}, mood was {}", log.date, log.mood),
        })
        .collect::<Vec<_>>()
        .join(". ")
}

async fn fetch_entry(
    store: &Arc<dyn WellnessStore>,
    user_id: &str,
    entry_id: &str,
) -> AppResult<JournalEntry> {
    let user = user_id.to_string();
    let id = entry_id.to_string();
    run_blocking(store, move |s| s.journal_entry(&user, &id))
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Journal entry {} not found", entry_id)).into())
}
