//! Constants used throughout the application.
//!
//! Defaults, environment variable names, input limits and the fixed
//! user-facing fallback strings live here so every operation reports the
//! same text when the model cannot be reached.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "mindwell";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str =
    "Log moods, keep a journal and talk to a wellness assistant running on a local LLM";

// Logging
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "mindwell";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

// Configuration Keys & Environment Variables
/// Base URL of the Ollama-compatible generation service.
pub const ENV_VAR_OLLAMA_URL: &str = "MINDWELL_OLLAMA_URL";
/// Chat model used for every flow.
pub const ENV_VAR_MODEL: &str = "MINDWELL_MODEL";
/// Storage backend selector (`sqlite` or `memory`).
pub const ENV_VAR_STORE: &str = "MINDWELL_STORE";
/// Path to the SQLite database.
pub const ENV_VAR_DB: &str = "MINDWELL_DB";
/// Number of prior chat turns sent with each message.
pub const ENV_VAR_HISTORY_LIMIT: &str = "MINDWELL_HISTORY_LIMIT";
/// Quiz scoring strategy (`model` or `rubric`).
pub const ENV_VAR_QUIZ_SCORING: &str = "MINDWELL_QUIZ_SCORING";
/// HTTP request timeout in seconds.
pub const ENV_VAR_TIMEOUT_SECS: &str = "MINDWELL_TIMEOUT_SECS";

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "llama3.2:3b";
/// Default database location, expanded with `shellexpand`.
pub const DEFAULT_DB_PATH: &str = "~/.mindwell/mindwell.db";
/// Default number of prior chat turns.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
/// Upper bound accepted for `MINDWELL_HISTORY_LIMIT`.
pub const MAX_HISTORY_LIMIT: usize = 100;
/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// User id used when none is given on the command line.
pub const DEFAULT_USER_ID: &str = "guest-user";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Prompt rendering
/// Maximum number of items a single `{{#each}}` block renders.
pub const DEFAULT_EACH_LIMIT: usize = 50;

// Input validation
/// Minimum journal title length in characters.
pub const JOURNAL_TITLE_MIN: usize = 1;
/// Maximum journal title length in characters.
pub const JOURNAL_TITLE_MAX: usize = 100;
/// Minimum journal content length in characters.
pub const JOURNAL_CONTENT_MIN: usize = 10;
/// Maximum journal content length in characters.
pub const JOURNAL_CONTENT_MAX: usize = 5000;
/// Maximum mood note length in characters.
pub const MOOD_NOTES_MAX: usize = 500;
/// Mood logs needed before pattern analysis is attempted.
pub const MIN_MOOD_LOGS_FOR_ANALYSIS: usize = 3;
/// Mood logs used as context for personalized tips.
pub const TIPS_MOOD_WINDOW: usize = 7;

// Date formats
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";

// User-facing fallbacks
/// Greeting that opens every chat session.
pub const CHAT_GREETING: &str = "Hello! I'm your AI wellness companion. How are you feeling today? Feel free to share anything on your mind.";
/// Assistant message shown when a chat turn fails.
pub const CHAT_FALLBACK: &str = "Sorry, I couldn't get a response. Please try again.";
/// Dashboard tip before the user has written anything.
pub const DASHBOARD_EMPTY_TIP: &str =
    "Start by writing a journal entry or logging your mood to get personalized tips.";
/// Dashboard tip when tip generation fails.
pub const DASHBOARD_TIP_FALLBACK: &str =
    "Could not generate a wellness tip at this time. Please try again later.";
/// Returned by pattern analysis when there are too few logs.
pub const MOOD_ANALYSIS_NOT_ENOUGH_DATA: &str =
    "Not enough data to analyze patterns. Keep logging your mood for a few more days!";
/// Mood context used for tips when there are no logs.
pub const NO_MOOD_DATA: &str = "No recent mood data available.";
/// Level reported when the quiz cannot be scored.
pub const STRESS_FALLBACK_LEVEL: u8 = 3;
/// Advice reported when the quiz cannot be scored.
pub const STRESS_FALLBACK_ADVICE: &str = "Take a moment for yourself: breathe in slowly for four counts, hold for four, and breathe out for four. A few rounds can help you reset.";
/// Justification reported when the quiz cannot be scored.
pub const STRESS_FALLBACK_JUSTIFICATION: &str =
    "We could not analyze your answers right now, so a moderate level is shown.";
/// Theme used for the quote of the day when none is given.
pub const DEFAULT_QUOTE_THEME: &str = "mindfulness";
/// Shown when an entry cannot be summarized.
pub const SUMMARY_FALLBACK: &str = "Failed to get summary. Please try again later.";
/// Shown when an entry's sentiment cannot be detected.
pub const SENTIMENT_FALLBACK: &str = "Failed to analyze sentiment. Please try again later.";
/// Shown when wellness tips cannot be generated for an entry.
pub const TIPS_FALLBACK: &str = "Failed to get wellness tips. Please try again later.";
/// Shown when mood pattern analysis fails.
pub const MOOD_ANALYSIS_FALLBACK: &str =
    "Analysis Failed: could not analyze your mood patterns. Please try again later.";

// Guided exercises
/// Breathing cycles run when `--cycles` is not given.
pub const DEFAULT_BREATHING_CYCLES: u32 = 3;
/// Upper bound accepted for `--cycles`.
pub const MAX_BREATHING_CYCLES: u32 = 20;
