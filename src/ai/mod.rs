//! Prompt flows backed by a local LLM.
//!
//! # Module Structure
//!
//! - `schema`: declarative record shapes and field-by-field checking
//! - `template`: `{{field}}` / `{{#each}}` prompt templates
//! - `flow`: the flow catalog and the invoker that runs one flow end to end
//! - `prompts`: the built-in templates and their shapes
//! - `flows`: typed wrappers, one per flow
//! - `ollama`: HTTP client implementing `TextGenerator`
//!
//! # Example
//!
//! ```no_run
//! use mindwell::ai::{flows, FlowInvoker, OllamaClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new("http://127.0.0.1:11434", "llama3.2:3b", Duration::from_secs(60))?;
//! let invoker = FlowInvoker::with_builtin_catalog(Arc::new(client))?;
//! let sentiment = flows::detect_sentiment(&invoker, "Today felt calm and bright.").await?;
//! println!("{} ({})", sentiment.sentiment, sentiment.score);
//! # Ok(())
//! # }
//! ```

pub mod flow;
pub mod flows;
pub mod ollama;
pub mod prompts;
pub mod schema;
pub mod template;

// Re-export commonly used types
pub use flow::{FlowCatalog, FlowInvoker, FlowName, GenerationRequest, TextGenerator};
pub use ollama::OllamaClient;
pub use schema::{RangePolicy, Shape, ShapeViolation};
