//! Prompt flows: named template plus input and output shapes.
//!
//! A `FlowInvoker` runs one flow end to end:
//!
//! 1. serialize the typed input and check it against the input shape,
//! 2. render the template with the normalized input,
//! 3. ask the `TextGenerator` for a completion constrained by the output
//!    schema,
//! 4. parse the reply as JSON, check it against the output shape and
//!    deserialize it into the caller's output type.
//!
//! Every failure maps to exactly one `FlowError` kind. Nothing is retried.

use super::prompts;
use super::schema::{Shape, ShapeViolation};
use super::template::Template;
use crate::errors::{AIError, AppError, AppResult, FlowError, TemplateError, ValidationStage};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Names of the built-in flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowName {
    AnalyzeMoodPatterns,
    DetectSentiment,
    PersonalizedTips,
    QuoteOfTheDay,
    WellnessConversation,
    SummarizeJournal,
    StressAdvice,
    StressFromQuiz,
}

impl FlowName {
    /// Every flow, in catalog order.
    pub const ALL: [FlowName; 8] = [
        FlowName::AnalyzeMoodPatterns,
        FlowName::DetectSentiment,
        FlowName::PersonalizedTips,
        FlowName::QuoteOfTheDay,
        FlowName::WellnessConversation,
        FlowName::SummarizeJournal,
        FlowName::StressAdvice,
        FlowName::StressFromQuiz,
    ];

    /// Snake-case name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowName::AnalyzeMoodPatterns => "analyze_mood_patterns",
            FlowName::DetectSentiment => "detect_sentiment",
            FlowName::PersonalizedTips => "personalized_tips",
            FlowName::QuoteOfTheDay => "quote_of_the_day",
            FlowName::WellnessConversation => "wellness_conversation",
            FlowName::SummarizeJournal => "summarize_journal",
            FlowName::StressAdvice => "stress_advice",
            FlowName::StressFromQuiz => "stress_from_quiz",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FlowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed template bound to its input and output shapes.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    name: FlowName,
    template: Template,
    input: Shape,
    output: Shape,
}

impl PromptSpec {
    /// Parses `source` and checks that every placeholder names an input field.
    ///
    /// # Errors
    ///
    /// Returns a `TemplateError` if the template is malformed or references
    /// a field `input` does not declare.
    pub fn new(
        name: FlowName,
        source: &str,
        input: Shape,
        output: Shape,
    ) -> Result<Self, TemplateError> {
        let template = Template::parse(source)?;
        template.check_fields(&input)?;
        Ok(Self {
            name,
            template,
            input,
            output,
        })
    }

    /// Flow this spec belongs to.
    pub fn name(&self) -> FlowName {
        self.name
    }

    /// Shape the caller's input must satisfy.
    pub fn input_shape(&self) -> &Shape {
        &self.input
    }

    /// Shape the generated response must satisfy.
    pub fn output_shape(&self) -> &Shape {
        &self.output
    }

    /// Renders the prompt for an already-checked input.
    pub fn render(&self, input: &Value) -> String {
        self.template.render(input)
    }
}

/// The fixed set of flows, one spec per `FlowName`.
#[derive(Debug, Clone)]
pub struct FlowCatalog {
    specs: Vec<PromptSpec>,
}

impl FlowCatalog {
    /// Builds the catalog from the built-in templates.
    ///
    /// # Errors
    ///
    /// Fails only if a built-in template is broken.
    pub fn builtin() -> AppResult<Self> {
        Self::from_specs(prompts::builtin_specs()?)
    }

    /// Builds a catalog from explicit specs. Each flow must appear exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for a missing or duplicated flow.
    pub fn from_specs(specs: Vec<PromptSpec>) -> AppResult<Self> {
        let mut slots: Vec<Option<PromptSpec>> = FlowName::ALL.iter().map(|_| None).collect();
        for spec in specs {
            let slot = &mut slots[spec.name.index()];
            if slot.is_some() {
                return Err(AppError::Config(format!(
                    "Flow '{}' is defined more than once",
                    spec.name
                )));
            }
            *slot = Some(spec);
        }

        let mut ordered = Vec::with_capacity(slots.len());
        for (name, slot) in FlowName::ALL.iter().zip(slots) {
            match slot {
                Some(spec) => ordered.push(spec),
                None => {
                    return Err(AppError::Config(format!(
                        "Flow '{}' has no prompt defined",
                        name
                    )))
                }
            }
        }
        Ok(Self { specs: ordered })
    }

    /// Returns the spec for `name`.
    pub fn get(&self, name: FlowName) -> &PromptSpec {
        &self.specs[name.index()]
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully rendered prompt text
    pub prompt: String,
    /// JSON schema the reply should follow
    pub schema: Value,
}

/// Anything that can turn a prompt into text.
///
/// Implemented by `OllamaClient`; tests substitute canned responders.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw completion text for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AIError>;
}

/// Runs flows against a generator.
#[derive(Clone)]
pub struct FlowInvoker {
    generator: Arc<dyn TextGenerator>,
    catalog: Arc<FlowCatalog>,
}

impl FlowInvoker {
    /// Creates an invoker over `generator` and `catalog`.
    pub fn new(generator: Arc<dyn TextGenerator>, catalog: Arc<FlowCatalog>) -> Self {
        Self { generator, catalog }
    }

    /// Convenience constructor using the built-in catalog.
    ///
    /// # Errors
    ///
    /// Fails only if a built-in template is broken.
    pub fn with_builtin_catalog(generator: Arc<dyn TextGenerator>) -> AppResult<Self> {
        Ok(Self::new(generator, Arc::new(FlowCatalog::builtin()?)))
    }

    /// The catalog backing this invoker.
    pub fn catalog(&self) -> &FlowCatalog {
        &self.catalog
    }

    /// Invokes `flow` with `input`, returning the typed response.
    ///
    /// # Errors
    ///
    /// - `FlowError::Validation` at the input stage if `input` does not match
    ///   the flow's input shape.
    /// - `FlowError::Upstream` if the generator fails.
    /// - `FlowError::Validation` at the output stage if the reply is not JSON
    ///   or does not match the output shape.
    pub async fn invoke<I, O>(&self, flow: FlowName, input: &I) -> Result<O, FlowError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let spec = self.catalog.get(flow);
        let name = flow.as_str();

        let raw_input = serde_json::to_value(input).map_err(|e| FlowError::Validation {
            flow: name,
            stage: ValidationStage::Input,
            violations: vec![format!("input is not serializable: {}", e)],
        })?;
        let checked_input = spec
            .input_shape()
            .check(&raw_input)
            .map_err(|violations| validation(name, ValidationStage::Input, violations))?;

        let request = GenerationRequest {
            prompt: spec.render(&checked_input),
            schema: spec.output_shape().json_schema(),
        };
        debug!(flow = name, prompt_len = request.prompt.len(), "Invoking flow");

        let reply = self
            .generator
            .generate(&request)
            .await
            .map_err(|source| {
                warn!(flow = name, error = %source, "Generation failed");
                FlowError::Upstream { flow: name, source }
            })?;

        let parsed = parse_reply(&reply).map_err(|message| FlowError::Validation {
            flow: name,
            stage: ValidationStage::Output,
            violations: vec![message],
        })?;
        let checked_output = spec
            .output_shape()
            .check(&parsed)
            .map_err(|violations| validation(name, ValidationStage::Output, violations))?;

        let output = serde_json::from_value(checked_output).map_err(|e| FlowError::Validation {
            flow: name,
            stage: ValidationStage::Output,
            violations: vec![format!("response does not fit the expected type: {}", e)],
        })?;
        info!(flow = name, "Flow completed");
        Ok(output)
    }
}

fn validation(
    flow: &'static str,
    stage: ValidationStage,
    violations: Vec<ShapeViolation>,
) -> FlowError {
    FlowError::Validation {
        flow,
        stage,
        violations: violations.iter().map(ToString::to_string).collect(),
    }
}

/// Parses a model reply as a JSON object.
///
/// Models sometimes wrap JSON in a Markdown code fence or add a sentence
/// around it, so the fence is stripped and, failing a direct parse, the
/// outermost `{...}` span is tried.
fn parse_reply(reply: &str) -> Result<Value, String> {
    let body = strip_code_fence(reply.trim());
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&body[start..=end]) {
                return Ok(value);
            }
        }
    }

    let preview: String = body.chars().take(80).collect();
    Err(format!("response is not valid JSON: '{}'", preview))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`) on the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
