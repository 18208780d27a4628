//! Storage for journal entries, mood logs and chat transcripts.
//!
//! Operations talk to storage only through the `WellnessStore` trait. Two
//! backends implement it: `SqliteStore`, a SQLite file behind an r2d2
//! connection pool, and `MemoryStore`, which keeps everything in process.
//! Which one is used is decided by configuration alone.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `journal`, `moods`, `chat`: SQL for each record type
//! - `memory`: the in-memory backend
//!
//! # Example
//!
//! ```no_run
//! use mindwell::db::{Database, SqliteStore, WellnessStore};
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/mindwell.db"))?;
//! db.initialize_schema()?;
//! let store = SqliteStore::new(db);
//! let entries = store.journal_entries("guest-user", 10)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chat;
pub mod journal;
pub mod memory;
pub mod moods;
pub mod schema;

pub use memory::MemoryStore;

use crate::config::{Config, StoreBackend};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{
    ChatMessage, JournalEntry, MoodLog, NewJournalEntry, NewMoodLog, Sentiment,
};
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Persistence port used by every operation.
///
/// Calls are blocking; async callers run them on the blocking pool.
pub trait WellnessStore: Send + Sync {
    /// Stores a new entry and returns it with its id and timestamp.
    fn add_journal_entry(&self, user_id: &str, entry: &NewJournalEntry) -> AppResult<JournalEntry>;

    /// Up to `limit` entries, newest first.
    fn journal_entries(&self, user_id: &str, limit: usize) -> AppResult<Vec<JournalEntry>>;

    /// One entry, if it exists and belongs to `user_id`.
    fn journal_entry(&self, user_id: &str, id: &str) -> AppResult<Option<JournalEntry>>;

    /// Records the detected sentiment of an entry.
    fn set_entry_sentiment(&self, user_id: &str, id: &str, sentiment: &Sentiment) -> AppResult<()>;

    /// Stores a mood dated today.
    fn add_mood_log(&self, user_id: &str, log: &NewMoodLog) -> AppResult<MoodLog>;

    /// Up to `limit` mood logs, newest first.
    fn mood_logs(&self, user_id: &str, limit: usize) -> AppResult<Vec<MoodLog>>;

    fn append_chat_message(&self, session_id: &str, message: &ChatMessage) -> AppResult<()>;

    /// The most recent `limit` turns of a session, oldest first.
    fn chat_history(&self, session_id: &str, limit: usize) -> AppResult<Vec<ChatMessage>>;
}

/// Opens the backend selected in `config`.
///
/// # Errors
///
/// Returns an error if the SQLite file or its directory cannot be created,
/// or the schema cannot be initialized.
pub fn open_store(config: &Config) -> AppResult<Arc<dyn WellnessStore>> {
    match config.store {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Sqlite => {
            if let Some(parent) = config.db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let db = Database::open(&config.db_path)?;
            db.initialize_schema()?;
            Ok(Arc::new(SqliteStore::new(db)))
        }
    }
}

/// Database handle with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates a SQLite database.
    ///
    /// If the database file doesn't exist, it will be created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database file cannot be opened
    /// - Connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(5) // Allow up to 5 concurrent connections
            .connection_customizer(Box::new(ConnectionTuning {
                busy_timeout: Duration::from_secs(5),
            }))
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        // Test the connection
        let conn = pool.get().map_err(DatabaseError::Pool)?;
        conn.execute_batch("SELECT 1").map_err(DatabaseError::Sqlite)?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool.get().map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and indexes if they don't exist.
    /// This is idempotent and safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }
}

/// Per-connection settings applied when the pool hands out a connection.
#[derive(Debug)]
struct ConnectionTuning {
    busy_timeout: Duration,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionTuning {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        // Several pooled connections may write the same file.
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}

/// `WellnessStore` backed by a pooled SQLite database.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl WellnessStore for SqliteStore {
    fn add_journal_entry(&self, user_id: &str, entry: &NewJournalEntry) -> AppResult<JournalEntry> {
        journal::insert_entry(&*self.db.get_conn()?, user_id, entry)
    }

    fn journal_entries(&self, user_id: &str, limit: usize) -> AppResult<Vec<JournalEntry>> {
        journal::list_entries(&*self.db.get_conn()?, user_id, limit)
    }

    fn journal_entry(&self, user_id: &str, id: &str) -> AppResult<Option<JournalEntry>> {
        journal::get_entry(&*self.db.get_conn()?, user_id, id)
    }

    fn set_entry_sentiment(&self, user_id: &str, id: &str, sentiment: &Sentiment) -> AppResult<()> {
        journal::update_sentiment(&*self.db.get_conn()?, user_id, id, sentiment)
    }

    fn add_mood_log(&self, user_id: &str, log: &NewMoodLog) -> AppResult<MoodLog> {
        moods::insert_mood(&*self.db.get_conn()?, user_id, log)
    }

    fn mood_logs(&self, user_id: &str, limit: usize) -> AppResult<Vec<MoodLog>> {
        moods::list_moods(&*self.db.get_conn()?, user_id, limit)
    }

    fn append_chat_message(&self, session_id: &str, message: &ChatMessage) -> AppResult<()> {
        chat::append_message(&*self.db.get_conn()?, session_id, message)
    }

    fn chat_history(&self, session_id: &str, limit: usize) -> AppResult<Vec<ChatMessage>> {
        chat::recent_messages(&*self.db.get_conn()?, session_id, limit)
    }
}

/// Fixed-width UTC timestamp, so text order matches time order.
pub(crate) fn timestamp_to_sql(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn timestamp_from_sql(column: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

pub(crate) fn conversion_error<E>(column: usize, error: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, error.into())
}
