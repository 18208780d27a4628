//! Mood log operations.

use super::{conversion_error, timestamp_from_sql, timestamp_to_sql};
use crate::constants::DATE_FORMAT_ISO;
use crate::errors::{AppResult, DatabaseError};
use crate::models::{Mood, MoodLog, NewMoodLog};
use chrono::{Local, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use tracing::debug;
use uuid::Uuid;

/// Inserts a mood log dated today (local time) and returns it.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn insert_mood(conn: &Connection, user_id: &str, log: &NewMoodLog) -> AppResult<MoodLog> {
    let stored = MoodLog {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        mood: log.mood,
        notes: log.notes.clone(),
        date: Local::now().date_naive(),
        created_at: Utc::now(),
    };
    debug!("Logging mood {} for user {}", stored.mood, user_id);

    conn.execute(
        r#"
        INSERT INTO mood_logs (id, user_id, mood, notes, date, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            stored.id,
            stored.user_id,
            stored.mood.as_str(),
            stored.notes,
            stored.date.format(DATE_FORMAT_ISO).to_string(),
            timestamp_to_sql(&stored.created_at)
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(stored)
}

/// Lists up to `limit` mood logs for `user_id`, newest first.
///
/// # Errors
///
/// Returns an error if the database operation fails or a row is corrupt.
pub fn list_moods(conn: &Connection, user_id: &str, limit: usize) -> AppResult<Vec<MoodLog>> {
    debug!("Listing up to {} mood logs for user {}", limit, user_id);

    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, user_id, mood, notes, date, created_at
            FROM mood_logs
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let logs = stmt
        .query_map(params![user_id, limit], mood_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(logs)
}

fn mood_from_row(row: &Row<'_>) -> rusqlite::Result<MoodLog> {
    let mood: String = row.get(2)?;
    let date: String = row.get(4)?;

    Ok(MoodLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mood: mood.parse::<Mood>().map_err(|e| conversion_error(2, e))?,
        notes: row.get(3)?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT_ISO)
            .map_err(|e| conversion_error(4, e))?,
        created_at: timestamp_from_sql(5, &row.get::<_, String>(5)?)?,
    })
}
