//! Mood logging and pattern analysis.

use super::run_blocking;
use crate::ai::flows::{self, MoodLogLine};
use crate::ai::FlowInvoker;
use crate::constants::{
    DATE_FORMAT_ISO, DEFAULT_EACH_LIMIT, MIN_MOOD_LOGS_FOR_ANALYSIS, MOOD_ANALYSIS_NOT_ENOUGH_DATA,
};
use crate::db::WellnessStore;
use crate::errors::AppResult;
use crate::models::{MoodLog, NewMoodLog};
use std::sync::Arc;
use tracing::info;

/// Validates and stores a mood for today.
///
/// # Errors
///
/// Returns `AppError::Validation` if the notes are too long, or a storage error.
pub async fn log_mood(
    store: &Arc<dyn WellnessStore>,
    user_id: &str,
    log: NewMoodLog,
) -> AppResult<MoodLog> {
    log.validate()?;
    let user = user_id.to_string();
    let stored = run_blocking(store, move |s| s.add_mood_log(&user, &log)).await?;
    info!("Logged mood {} for {}", stored.mood, stored.date);
    Ok(stored)
}

/// Up to `limit` mood logs, newest first.
pub async fn list_moods(
    store: &Arc<dyn WellnessStore>,
    user_id: &str,
    limit: usize,
) -> AppResult<Vec<MoodLog>> {
    let user = user_id.to_string();
    run_blocking(store, move |s| s.mood_logs(&user, limit)).await
}

/// Describes trends across the user's recent mood logs.
///
/// With fewer than three logs the model is not called and a fixed message
/// asking for more data is returned.
///
/// # Errors
///
/// Returns a storage error or the flow error.
pub async fn analyze_patterns(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user_id: &str,
) -> AppResult<String> {
    let logs = list_moods(store, user_id, DEFAULT_EACH_LIMIT).await?;
    if logs.len() < MIN_MOOD_LOGS_FOR_ANALYSIS {
        info!("Only {} mood logs, skipping analysis", logs.len());
        return Ok(MOOD_ANALYSIS_NOT_ENOUGH_DATA.to_string());
    }

    let lines: Vec<MoodLogLine> = logs
        .into_iter()
        .map(|log| MoodLogLine {
            date: log.date.format(DATE_FORMAT_ISO).to_string(),
            mood: log.mood,
            notes: log.notes,
        })
        .collect();
    Ok(flows::analyze_mood_patterns(invoker, user_id, &lines).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::flow::{GenerationRequest, TextGenerator};
    use crate::db::MemoryStore;
    use crate::errors::{AIError, AppError};
    use crate::models::Mood;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for Counting {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, AIError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"analysis":"Your mood is improving."}"#.to_string())
        }
    }

    fn setup() -> (Arc<dyn WellnessStore>, FlowInvoker, Arc<Counting>) {
        let counting = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let invoker = FlowInvoker::with_builtin_catalog(counting.clone()).unwrap();
        (Arc::new(MemoryStore::new()), invoker, counting)
    }

    #[tokio::test]
    async fn test_analysis_needs_three_logs() {
        let (store, invoker, counting) = setup();
        for mood in [Mood::Bad, Mood::Neutral] {
            log_mood(&store, "u", NewMoodLog { mood, notes: None })
                .await
                .unwrap();
        }

        let result = analyze_patterns(&store, &invoker, "u").await.unwrap();
        assert_eq!(result, MOOD_ANALYSIS_NOT_ENOUGH_DATA);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);

        log_mood(&store, "u", NewMoodLog { mood: Mood::Good, notes: None })
            .await
            .unwrap();
        let result = analyze_patterns(&store, &invoker, "u").await.unwrap();
        assert_eq!(result, "Your mood is improving.");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_log_mood_rejects_long_notes() {
        let (store, _, _) = setup();
        let err = log_mood(
            &store,
            "u",
            NewMoodLog {
                mood: Mood::Good,
                notes: Some("x".repeat(501)),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(list_moods(&store, "u", 10).await.unwrap().is_empty());
    }
}
