//! Journal entry operations.
//!
//! This module provides functions for creating, reading, and annotating
//! journal entries in the database.

use super::{conversion_error, timestamp_from_sql, timestamp_to_sql};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{JournalEntry, NewJournalEntry, Sentiment, SentimentLabel};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

const ENTRY_COLUMNS: &str =
    "id, user_id, title, content, created_at, sentiment_label, sentiment_score";

/// Inserts a new journal entry for `user_id` and returns it.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn insert_entry(
    conn: &Connection,
    user_id: &str,
    entry: &NewJournalEntry,
) -> AppResult<JournalEntry> {
    let stored = JournalEntry {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: entry.title.clone(),
        content: entry.content.clone(),
        created_at: Utc::now(),
        sentiment: None,
    };
    debug!("Inserting journal entry {} for user {}", stored.id, user_id);

    conn.execute(
        r#"
        INSERT INTO journal_entries (id, user_id, title, content, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            stored.id,
            stored.user_id,
            stored.title,
            stored.content,
            timestamp_to_sql(&stored.created_at)
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(stored)
}

/// Lists up to `limit` entries for `user_id`, newest first.
///
/// # Errors
///
/// Returns an error if the database operation fails or a row is corrupt.
pub fn list_entries(conn: &Connection, user_id: &str, limit: usize) -> AppResult<Vec<JournalEntry>> {
    debug!("Listing up to {} journal entries for user {}", limit, user_id);

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM journal_entries WHERE user_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            ENTRY_COLUMNS
        ))
        .map_err(DatabaseError::Sqlite)?;

    // SQLite takes a signed limit; anything larger means "all rows".
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let entries = stmt
        .query_map(params![user_id, limit], entry_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(entries)
}

/// Retrieves one entry owned by `user_id`.
///
/// # Errors
///
/// Returns an error if the database operation fails.
/// Returns `Ok(None)` if no such entry exists for this user.
pub fn get_entry(conn: &Connection, user_id: &str, id: &str) -> AppResult<Option<JournalEntry>> {
    debug!("Getting journal entry {}", id);

    let entry = conn
        .query_row(
            &format!(
                "SELECT {} FROM journal_entries WHERE id = ?1 AND user_id = ?2",
                ENTRY_COLUMNS
            ),
            params![id, user_id],
            entry_from_row,
        )
        .optional()
        .map_err(DatabaseError::Sqlite)?;

    Ok(entry)
}

/// Stores the sentiment detected for an entry.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the entry does not exist for this user.
pub fn update_sentiment(
    conn: &Connection,
    user_id: &str,
    id: &str,
    sentiment: &Sentiment,
) -> AppResult<()> {
    debug!("Storing sentiment {} for entry {}", sentiment.sentiment, id);

    let updated = conn
        .execute(
            r#"
            UPDATE journal_entries
            SET sentiment_label = ?1, sentiment_score = ?2
            WHERE id = ?3 AND user_id = ?4
            "#,
            params![sentiment.sentiment.to_string(), sentiment.score, id, user_id],
        )
        .map_err(DatabaseError::Sqlite)?;

    if updated == 0 {
        return Err(DatabaseError::NotFound(format!("Journal entry {} not found", id)).into());
    }
    Ok(())
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let label: Option<String> = row.get(5)?;
    let score: Option<f64> = row.get(6)?;
    let sentiment = match (label, score) {
        (Some(label), Some(score)) => Some(Sentiment {
            sentiment: parse_label(&label).map_err(|e| conversion_error(5, e))?,
            score,
        }),
        _ => None,
    };

    Ok(JournalEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: timestamp_from_sql(4, &row.get::<_, String>(4)?)?,
        sentiment,
    })
}

fn parse_label(label: &str) -> Result<SentimentLabel, String> {
    match label {
        "positive" => Ok(SentimentLabel::Positive),
        "negative" => Ok(SentimentLabel::Negative),
        "neutral" => Ok(SentimentLabel::Neutral),
        other => Err(format!("unknown sentiment label '{}'", other)),
    }
}
