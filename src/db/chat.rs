//! Chat transcript operations, keyed by session id.

use super::{conversion_error, timestamp_to_sql};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{ChatMessage, Role};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::debug;

/// Appends one turn to a session.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn append_message(conn: &Connection, session_id: &str, message: &ChatMessage) -> AppResult<()> {
    debug!("Appending {} message to session {}", message.role.as_str(), session_id);

    conn.execute(
        "INSERT INTO chat_messages (session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            session_id,
            message.role.as_str(),
            message.content,
            timestamp_to_sql(&Utc::now())
        ],
    )
    .map_err(DatabaseError::Sqlite)?;
    Ok(())
}

/// Returns the last `limit` turns of a session, oldest first.
///
/// # Errors
///
/// Returns an error if the database operation fails or a row is corrupt.
pub fn recent_messages(
    conn: &Connection,
    session_id: &str,
    limit: usize,
) -> AppResult<Vec<ChatMessage>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT role, content FROM (
                SELECT id, role, content FROM chat_messages
                WHERE session_id = ?1
                ORDER BY id DESC
                LIMIT ?2
            )
            ORDER BY id ASC
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let messages = stmt
        .query_map(params![session_id, limit], |row| {
            let role: String = row.get(0)?;
            Ok(ChatMessage {
                role: role.parse::<Role>().map_err(|e| conversion_error(0, e))?,
                content: row.get(1)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    #[test]
    fn test_recent_messages_window() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();

        for i in 0..5 {
            append_message(&conn, "s1", &ChatMessage::user(format!("m{}", i))).unwrap();
        }
        append_message(&conn, "s2", &ChatMessage::assistant("elsewhere")).unwrap();

        let window = recent_messages(&conn, "s1", 3).unwrap();
        let contents: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);

        let other = recent_messages(&conn, "s2", 10).unwrap();
        assert_eq!(other, vec![ChatMessage::assistant("elsewhere")]);

        assert_eq!(recent_messages(&conn, "s1", usize::MAX).unwrap().len(), 5);
    }
}
