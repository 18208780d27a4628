//! Configuration management for the mindwell application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `MINDWELL_OLLAMA_URL`: Base URL of the Ollama API (defaults to http://127.0.0.1:11434)
//! - `MINDWELL_MODEL`: Chat model used by every flow (defaults to llama3.2:3b)
//! - `MINDWELL_STORE`: `sqlite` (default) or `memory`
//! - `MINDWELL_DB`: SQLite database path (defaults to ~/.mindwell/mindwell.db)
//! - `MINDWELL_HISTORY_LIMIT`: Chat turns sent with each message (defaults to 20, at most 100)
//! - `MINDWELL_QUIZ_SCORING`: `model` (default) or `rubric`
//! - `MINDWELL_TIMEOUT_SECS`: HTTP request timeout (defaults to 60)

use crate::constants::{
    DEFAULT_CHAT_MODEL, DEFAULT_DB_PATH, DEFAULT_HISTORY_LIMIT, DEFAULT_OLLAMA_URL,
    DEFAULT_TIMEOUT_SECS, ENV_VAR_DB, ENV_VAR_HISTORY_LIMIT, ENV_VAR_MODEL, ENV_VAR_OLLAMA_URL,
    ENV_VAR_QUIZ_SCORING, ENV_VAR_STORE, ENV_VAR_TIMEOUT_SECS, MAX_HISTORY_LIMIT,
    REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use crate::stress::QuizScoring;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Storage backend selected by `MINDWELL_STORE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// SQLite file at `db_path`.
    #[default]
    Sqlite,
    /// Process-local maps; nothing is persisted.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!(
                "unknown store backend '{}', expected 'sqlite' or 'memory'",
                other
            )),
        }
    }
}

/// Configuration for the mindwell application.
///
/// # Examples
///
/// Starting from defaults and overriding a field:
/// ```
/// use mindwell::config::{Config, StoreBackend};
///
/// let config = Config {
///     store: StoreBackend::Memory,
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
///
/// Loading configuration from environment variables:
/// ```no_run
/// use mindwell::config::Config;
/// use std::env;
///
/// env::set_var("MINDWELL_MODEL", "qwen2.5:7b");
///
/// let config = Config::load().expect("Failed to load configuration");
/// assert_eq!(config.model, "qwen2.5:7b");
/// ```
#[derive(Clone)]
pub struct Config {
    /// Base URL of the Ollama API.
    pub ollama_url: String,

    /// Chat model used by every flow.
    pub model: String,

    /// Where records are kept.
    pub store: StoreBackend,

    /// SQLite database path, used when `store` is `Sqlite`.
    pub db_path: PathBuf,

    /// Number of prior chat turns sent with each message.
    pub history_limit: usize,

    /// How quiz answers are turned into a stress level.
    pub quiz_scoring: QuizScoring,

    /// Upper bound on a single HTTP request.
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("ollama_url", &self.ollama_url)
            .field("model", &self.model)
            .field("store", &self.store)
            .field("db_path", &REDACTED_PLACEHOLDER)
            .field("history_limit", &self.history_limit)
            .field("quiz_scoring", &self.quiz_scoring)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for Config {
    /// Creates a Config with default values and an unexpanded database path.
    fn default() -> Self {
        Config {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            store: StoreBackend::default(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            history_limit: DEFAULT_HISTORY_LIMIT,
            quiz_scoring: QuizScoring::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The database path is expanded with `shellexpand`, so `~` and
    /// `$VAR` references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - A variable holds a value that cannot be parsed
    /// - The database path expansion fails
    /// - The resulting configuration fails `validate`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mindwell::config::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Using model {}", config.model),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let ollama_url = env_or(ENV_VAR_OLLAMA_URL, DEFAULT_OLLAMA_URL);
        let model = env_or(ENV_VAR_MODEL, DEFAULT_CHAT_MODEL);
        let store = parse_env(ENV_VAR_STORE, StoreBackend::default())?;
        let history_limit = parse_env(ENV_VAR_HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT)?;
        let quiz_scoring = parse_env(ENV_VAR_QUIZ_SCORING, QuizScoring::default())?;
        let timeout = Duration::from_secs(parse_env(ENV_VAR_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?);

        let db_path_str = env_or(ENV_VAR_DB, DEFAULT_DB_PATH);
        // Expand the path (handles ~ and environment variables)
        let expanded_path = shellexpand::full(&db_path_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let db_path = PathBuf::from(expanded_path.into_owned());

        let config = Config {
            ollama_url,
            model,
            store,
            db_path,
            history_limit,
            quiz_scoring,
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The Ollama URL is not an http(s) URL
    /// - The model name is empty
    /// - The history limit is outside 1..=100
    /// - The timeout is zero
    /// - The SQLite backend is selected and the database path is empty or relative
    pub fn validate(&self) -> AppResult<()> {
        if !(self.ollama_url.starts_with("http://") || self.ollama_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Ollama URL must start with http:// or https://, got '{}'",
                self.ollama_url
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model name cannot be empty".to_string()));
        }

        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(AppError::Config(format!(
                "History limit must be between 1 and {}, got {}",
                MAX_HISTORY_LIMIT, self.history_limit
            )));
        }

        if self.timeout.is_zero() {
            return Err(AppError::Config(
                "Request timeout must be at least one second".to_string(),
            ));
        }

        if self.store == StoreBackend::Sqlite {
            if self.db_path.as_os_str().is_empty() {
                return Err(AppError::Config("Database path is empty".to_string()));
            }
            if !self.db_path.is_absolute() {
                return Err(AppError::Config(
                    "Database path must be an absolute path".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn env_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

fn parse_env<T>(name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 7] = [
        ENV_VAR_OLLAMA_URL,
        ENV_VAR_MODEL,
        ENV_VAR_STORE,
        ENV_VAR_DB,
        ENV_VAR_HISTORY_LIMIT,
        ENV_VAR_QUIZ_SCORING,
        ENV_VAR_TIMEOUT_SECS,
    ];

    fn setup() {
        for var in ALL_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_debug_impl_redacts_sensitive_info() {
        let config = Config {
            db_path: PathBuf::from("/home/alice/secret/mindwell.db"),
            ..Config::default()
        };
        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains(REDACTED_PLACEHOLDER));
        assert!(!debug_output.contains("alice"));
        assert!(debug_output.contains("llama3.2:3b"));
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        setup();
        let original_home = env::var("HOME").ok();
        env::set_var("HOME", "/tmp/mindwell-home");

        let config = Config::load().unwrap();

        match original_home {
            Some(home) => env::set_var("HOME", home),
            None => env::remove_var("HOME"),
        }
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.store, StoreBackend::Sqlite);
        assert_eq!(
            config.db_path,
            PathBuf::from("/tmp/mindwell-home/.mindwell/mindwell.db")
        );
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.quiz_scoring, QuizScoring::Model);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    #[serial]
    fn test_load_with_overrides() {
        setup();
        env::set_var(ENV_VAR_OLLAMA_URL, "http://ollama.local:11434");
        env::set_var(ENV_VAR_MODEL, "qwen2.5:7b");
        env::set_var(ENV_VAR_STORE, "Memory");
        env::set_var(ENV_VAR_HISTORY_LIMIT, "5");
        env::set_var(ENV_VAR_QUIZ_SCORING, "rubric");
        env::set_var(ENV_VAR_TIMEOUT_SECS, "3");

        let config = Config::load().unwrap();
        assert_eq!(config.ollama_url, "http://ollama.local:11434");
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.quiz_scoring, QuizScoring::Rubric);
        assert_eq!(config.timeout, Duration::from_secs(3));

        setup();
    }

    #[test]
    #[serial]
    fn test_load_rejects_unparseable_values() {
        setup();
        env::set_var(ENV_VAR_HISTORY_LIMIT, "lots");
        match Config::load() {
            Err(AppError::Config(msg)) => assert!(msg.contains(ENV_VAR_HISTORY_LIMIT)),
            other => panic!("Expected Config error, got {:?}", other),
        }

        setup();
        env::set_var(ENV_VAR_STORE, "postgres");
        match Config::load() {
            Err(AppError::Config(msg)) => assert!(msg.contains("unknown store backend")),
            other => panic!("Expected Config error, got {:?}", other),
        }

        setup();
    }

    #[test]
    #[serial]
    fn test_load_rejects_history_limit_out_of_range() {
        setup();
        env::set_var(ENV_VAR_HISTORY_LIMIT, "101");
        match Config::load() {
            Err(AppError::Config(msg)) => assert!(msg.contains("between 1 and 100")),
            other => panic!("Expected Config error, got {:?}", other),
        }
        setup();
    }

    #[test]
    fn test_validate_default_with_absolute_path() {
        let config = Config {
            db_path: PathBuf::from("/var/lib/mindwell.db"),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_relative_db_path() {
        let config = Config {
            db_path: PathBuf::from("relative/mindwell.db"),
            ..Config::default()
        };
        match config.validate() {
            Err(AppError::Config(message)) => {
                assert!(message.contains("must be an absolute path"))
            }
            _ => panic!("Expected Config error about relative path"),
        }

        // The path is irrelevant for the memory backend.
        let memory = Config {
            store: StoreBackend::Memory,
            ..config
        };
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_url_and_model() {
        let config = Config {
            ollama_url: "ftp://host".to_string(),
            store: StoreBackend::Memory,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            model: "  ".to_string(),
            store: StoreBackend::Memory,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = Config {
            timeout: Duration::ZERO,
            store: StoreBackend::Memory,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
