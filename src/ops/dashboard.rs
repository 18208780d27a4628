//! The dashboard: latest entry, latest mood, a tip and a quote.

use super::journal::tips_for_content;
use super::quote::quote_of_the_day;
use super::run_blocking;
use crate::ai::FlowInvoker;
use crate::constants::{DASHBOARD_EMPTY_TIP, DASHBOARD_TIP_FALLBACK};
use crate::db::WellnessStore;
use crate::errors::AppResult;
use crate::models::{JournalEntry, MoodLog, Quote};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub latest_entry: Option<JournalEntry>,
    pub latest_mood: Option<MoodLog>,
    pub tip: String,
    pub quote: Quote,
}

/// Loads the dashboard for `user_id`.
///
/// The two store reads run concurrently, as do the tip and quote once the
/// latest entry is known. Model failures never fail the dashboard.
///
/// # Errors
///
/// Returns a storage error if either read fails.
pub async fn load_dashboard(
    store: &Arc<dyn WellnessStore>,
    invoker: &FlowInvoker,
    user_id: &str,
    theme: &str,
) -> AppResult<Dashboard> {
    let entry_user = user_id.to_string();
    let mood_user = user_id.to_string();
    let (mut entries, mut moods) = tokio::try_join!(
        run_blocking(store, move |s| s.journal_entries(&entry_user, 1)),
        run_blocking(store, move |s| s.mood_logs(&mood_user, 1)),
    )?;
    let latest_entry = entries.pop();
    let latest_mood = moods.pop();

    let tip = async {
        let Some(entry) = &latest_entry else {
            return DASHBOARD_EMPTY_TIP.to_string();
        };
        match tips_for_content(store, invoker, user_id, &entry.content).await {
            Ok(tip) => tip,
            Err(e) => {
                warn!(error = %e, "Dashboard tip failed, using fallback");
                DASHBOARD_TIP_FALLBACK.to_string()
            }
        }
    };
    let (tip, quote) = tokio::join!(tip, quote_of_the_day(invoker, theme));

    info!(
        has_entry = latest_entry.is_some(),
        has_mood = latest_mood.is_some(),
        "Dashboard loaded"
    );
    Ok(Dashboard {
        latest_entry,
        latest_mood,
        tip,
        quote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::flow::{GenerationRequest, TextGenerator};
    use crate::db::MemoryStore;
    use crate::errors::AIError;
    use crate::models::{Mood, NewJournalEntry, NewMoodLog};
    use crate::ops::quote::fallback_quote;
    use async_trait::async_trait;
    use chrono::Local;

    /// Answers quote requests and fails or answers tip requests.
    struct Split {
        tips: Option<&'static str>,
    }

    #[async_trait]
    impl TextGenerator for Split {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, AIError> {
            if request.prompt.contains("quote") {
                return Ok(r#"{"quote":"Be here now.","author":"Ram Dass"}"#.to_string());
            }
            self.tips
                .map(|t| format!(r#"{{"wellnessTips":"{}"}}"#, t))
                .ok_or(AIError::InvalidResponse("truncated".to_string()))
        }
    }

    fn invoker(tips: Option<&'static str>) -> FlowInvoker {
        FlowInvoker::with_builtin_catalog(Arc::new(Split { tips })).unwrap()
    }

    async fn seeded_store() -> Arc<dyn WellnessStore> {
        let store: Arc<dyn WellnessStore> = Arc::new(MemoryStore::new());
        let s = store.clone();
        run_blocking(&s, |s| {
            s.add_journal_entry(
                "u",
                &NewJournalEntry {
                    title: "Monday".to_string(),
                    content: "Long day at work but a nice dinner.".to_string(),
                },
            )?;
            s.add_mood_log(
                "u",
                &NewMoodLog {
                    mood: Mood::Neutral,
                    notes: None,
                },
            )
        })
        .await
        .unwrap();
        store
    }

    #[tokio::test]
    async fn test_empty_dashboard() {
        let store: Arc<dyn WellnessStore> = Arc::new(MemoryStore::new());
        let dashboard = load_dashboard(&store, &invoker(Some("unused")), "u", "calm")
            .await
            .unwrap();
        assert!(dashboard.latest_entry.is_none());
        assert!(dashboard.latest_mood.is_none());
        assert_eq!(dashboard.tip, DASHBOARD_EMPTY_TIP);
        assert_eq!(dashboard.quote.author, "Ram Dass");
    }

    #[tokio::test]
    async fn test_dashboard_with_entry() {
        let store = seeded_store().await;
        let dashboard = load_dashboard(&store, &invoker(Some("Take a short walk.")), "u", "calm")
            .await
            .unwrap();
        assert_eq!(dashboard.latest_entry.unwrap().title, "Monday");
        assert_eq!(dashboard.latest_mood.unwrap().mood, Mood::Neutral);
        assert_eq!(dashboard.tip, "Take a short walk.");
    }

    #[tokio::test]
    async fn test_dashboard_tip_fallback() {
        let store = seeded_store().await;
        let dashboard = load_dashboard(&store, &invoker(None), "u", "calm")
            .await
            .unwrap();
        assert_eq!(dashboard.tip, DASHBOARD_TIP_FALLBACK);
        assert_ne!(dashboard.quote, fallback_quote(Local::now().date_naive()));
    }
}
