//! Error handling utilities for the mindwell application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Prompt flows have their own taxonomy, `FlowError`, with exactly two kinds:
//! a validation failure (input or response does not match the declared shape)
//! and an upstream failure (the generation service could not be used).

use std::fmt;
use thiserror::Error;

/// Represents specific error cases that can occur when talking to the
/// generation service.
///
/// # Examples
///
/// ```
/// use mindwell::errors::AIError;
///
/// let error = AIError::ModelNotFound("llama3.2:3b".to_string());
/// assert!(format!("{}", error).contains("llama3.2:3b"));
/// ```
#[derive(Debug, Error)]
pub enum AIError {
    /// Ollama API is not reachable.
    #[error("Ollama API error: {0}. Is Ollama running? Try: ollama serve")]
    OllamaOffline(#[source] reqwest::Error),

    /// Requested model not found in Ollama.
    #[error("Model not found: {0}. Try: ollama pull {0}")]
    ModelNotFound(String),

    /// The service answered with a non-success status.
    #[error("Ollama returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response envelope could not be read.
    #[error("Invalid response from Ollama: {0}")]
    InvalidResponse(String),
}

/// Errors raised while parsing a prompt template.
///
/// Templates are parsed once when the flow catalog is built, so these only
/// surface at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{` was never closed.
    #[error("Unclosed tag starting at byte {position}")]
    UnclosedTag {
        /// Byte offset of the opening braces
        position: usize,
    },

    /// A tag with nothing inside it, such as `{{ }}`.
    #[error("Empty tag at byte {position}")]
    EmptyTag {
        /// Byte offset of the opening braces
        position: usize,
    },

    /// An `{{#each}}` block without a matching `{{/each}}`.
    #[error("Block '{{{{#each {field}}}}}' is never closed")]
    UnclosedBlock {
        /// Field the block iterates over
        field: String,
    },

    /// A closing tag with no open block.
    #[error("Unexpected '{{{{/{name}}}}}' at byte {position}")]
    UnexpectedClose {
        /// Name used in the closing tag
        name: String,
        /// Byte offset of the closing tag
        position: usize,
    },

    /// A block helper other than `each`.
    #[error("Unsupported block helper '{0}'")]
    UnsupportedBlock(String),

    /// A placeholder names a field the input shape does not declare.
    #[error("Template references unknown field '{0}'")]
    UnknownField(String),

    /// An `{{#each}}` block iterates over a field that is not a list.
    #[error("Field '{0}' is not a list and cannot be iterated")]
    NotAList(String),
}

/// Which side of a flow failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// The caller-supplied input record.
    Input,
    /// The generated response.
    Output,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStage::Input => write!(f, "input"),
            ValidationStage::Output => write!(f, "output"),
        }
    }
}

/// Failure of a single prompt-flow invocation.
///
/// Neither kind is retried by the invoker; callers decide whether to retry,
/// substitute a fallback, or propagate.
///
/// # Examples
///
/// ```
/// use mindwell::errors::{FlowError, ValidationStage};
///
/// let error = FlowError::Validation {
///     flow: "detect_sentiment",
///     stage: ValidationStage::Output,
///     violations: vec!["missing field 'score'".to_string()],
/// };
/// assert!(error.is_validation());
/// assert!(format!("{}", error).contains("missing field 'score'"));
/// ```
#[derive(Debug, Error)]
pub enum FlowError {
    /// The input or the response does not match the declared shape, or the
    /// response is not parseable JSON.
    #[error("Invalid {stage} for flow '{flow}': {}", .violations.join("; "))]
    Validation {
        /// Flow name
        flow: &'static str,
        /// Which record failed
        stage: ValidationStage,
        /// One message per problem found
        violations: Vec<String>,
    },

    /// The generation service was unreachable or answered with an error.
    #[error("Upstream failure in flow '{flow}': {source}")]
    Upstream {
        /// Flow name
        flow: &'static str,
        /// Client error
        #[source]
        source: AIError,
    },
}

impl FlowError {
    /// Name of the flow that failed.
    pub fn flow(&self) -> &'static str {
        match self {
            FlowError::Validation { flow, .. } | FlowError::Upstream { flow, .. } => flow,
        }
    }

    /// Returns true for the validation kind.
    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Validation { .. })
    }

    /// Returns true for the upstream kind.
    pub fn is_upstream(&self) -> bool {
        matches!(self, FlowError::Upstream { .. })
    }
}

/// Represents specific error cases that can occur during storage operations.
///
/// # Examples
///
/// ```
/// use mindwell::errors::DatabaseError;
///
/// let error = DatabaseError::NotFound("Journal entry abc not found".to_string());
/// assert!(format!("{}", error).contains("not found"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}\n\nThis may indicate database connection issues. Try closing other mindwell instances.")]
    Pool(#[from] r2d2::Error),

    /// Requested record not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A stored value could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Represents all possible errors that can occur in the mindwell application.
///
/// # Examples
///
/// ```
/// use mindwell::errors::AppError;
///
/// let error = AppError::Config("Unknown store backend".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Unknown store backend");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem or terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// User-supplied input was rejected before any work was done.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A prompt template failed to parse.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// A prompt flow failed.
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    /// Errors related to storage operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use mindwell::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Validation("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
