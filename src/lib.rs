/*!
# mindwell

A mood, journal and wellness assistant built on typed prompt flows to a
local LLM.

## Architecture

- `ai`: prompt templates, shape checking, the flow invoker and the Ollama client
- `stress`: stress levels, the quiz and advice tiers
- `db`: the `WellnessStore` port with SQLite and in-memory backends
- `ops`: user-facing operations combining storage and flows
- `cli`, `config`, `errors`, `constants`, `models`: the ambient pieces

## Usage Example

```rust,no_run
use mindwell::ai::{FlowInvoker, OllamaClient};
use mindwell::stress::{get_stress_advice, StressLevel};
use mindwell::Config;
use std::sync::Arc;

# async fn example() -> mindwell::AppResult<()> {
let config = Config::load()?;
let client = OllamaClient::new(&config.ollama_url, &config.model, config.timeout)?;
let invoker = FlowInvoker::with_builtin_catalog(Arc::new(client))?;

let advice = get_stress_advice(&invoker, StressLevel::new(4)?).await?;
println!("{}", advice.advice);
# Ok(())
# }
```
*/

/// Prompt flows and the generation client
pub mod ai;
/// Command-line interface definitions
pub mod cli;
/// Configuration loading and validation
pub mod config;
/// Defaults, limits and fixed user-facing strings
pub mod constants;
/// Storage port and backends
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Records shared by storage, flows and operations
pub mod models;
/// User-facing operations
pub mod ops;
/// Stress levels, the stress quiz and advice
pub mod stress;

// Re-export important types for convenience
pub use config::Config;
pub use errors::{AppError, AppResult};
