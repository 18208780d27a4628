//! User-facing operations.
//!
//! Each operation combines the storage port with one or more prompt flows.
//! Storage calls are blocking, so they run on tokio's blocking pool through
//! [`run_blocking`]; flow calls are awaited directly.

pub mod chat;
pub mod dashboard;
pub mod exercise;
pub mod journal;
pub mod mood;
pub mod quote;

pub use chat::ChatSession;
pub use dashboard::{load_dashboard, Dashboard};
pub use exercise::{gratitude_prompt, mindfulness_tip, run_breathing, BreathPhase};
pub use journal::{
    add_entry, detect_entry_sentiment, list_entries, summarize_entry, tips_for_entry,
};
pub use mood::{analyze_patterns, list_moods, log_mood};
pub use quote::{fallback_quote, quote_of_the_day};

use crate::db::WellnessStore;
use crate::errors::AppResult;
use std::sync::Arc;

/// Runs a store call on the blocking pool.
pub(crate) async fn run_blocking<T, F>(store: &Arc<dyn WellnessStore>, f: F) -> AppResult<T>
where
    F: FnOnce(&dyn WellnessStore) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref())).await?
}
