//! In-process store for guests and tests. Nothing survives the process.

use super::WellnessStore;
use crate::errors::{AppResult, DatabaseError};
use crate::models::{
    ChatMessage, JournalEntry, MoodLog, NewJournalEntry, NewMoodLog, Sentiment,
};
use chrono::{Local, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    // Append order is creation order, so newest is last.
    journal: Vec<JournalEntry>,
    moods: Vec<MoodLog>,
    chats: HashMap<String, Vec<ChatMessage>>,
}

/// A `WellnessStore` held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| DatabaseError::Poisoned.into())
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| DatabaseError::Poisoned.into())
    }
}

impl WellnessStore for MemoryStore {
    fn add_journal_entry(&self, user_id: &str, entry: &NewJournalEntry) -> AppResult<JournalEntry> {
        let stored = JournalEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: entry.title.clone(),
            content: entry.content.clone(),
            created_at: Utc::now(),
            sentiment: None,
        };
        self.write()?.journal.push(stored.clone());
        Ok(stored)
    }

    fn journal_entries(&self, user_id: &str, limit: usize) -> AppResult<Vec<JournalEntry>> {
        Ok(self
            .read()?
            .journal
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    fn journal_entry(&self, user_id: &str, id: &str) -> AppResult<Option<JournalEntry>> {
        Ok(self
            .read()?
            .journal
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned())
    }

    fn set_entry_sentiment(&self, user_id: &str, id: &str, sentiment: &Sentiment) -> AppResult<()> {
        let mut state = self.write()?;
        let entry = state
            .journal
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Journal entry {} not found", id)))?;
        entry.sentiment = Some(sentiment.clone());
        Ok(())
    }

    fn add_mood_log(&self, user_id: &str, log: &NewMoodLog) -> AppResult<MoodLog> {
        let stored = MoodLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            mood: log.mood,
            notes: log.notes.clone(),
            date: Local::now().date_naive(),
            created_at: Utc::now(),
        };
        self.write()?.moods.push(stored.clone());
        Ok(stored)
    }

    fn mood_logs(&self, user_id: &str, limit: usize) -> AppResult<Vec<MoodLog>> {
        Ok(self
            .read()?
            .moods
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    fn append_chat_message(&self, session_id: &str, message: &ChatMessage) -> AppResult<()> {
        self.write()?
            .chats
            .entry(session_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    fn chat_history(&self, session_id: &str, limit: usize) -> AppResult<Vec<ChatMessage>> {
        let state = self.read()?;
        let history = state.chats.get(session_id).map(Vec::as_slice).unwrap_or(&[]);
        let skip = history.len().saturating_sub(limit);
        Ok(history[skip..].to_vec())
    }
}
