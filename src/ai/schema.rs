//! Declarative record shapes for flow inputs and outputs.
//!
//! A `Shape` lists named, typed fields. It serves three purposes:
//!
//! - checking a JSON value field-by-field (types, enum membership, numeric
//!   ranges), returning either the normalized value or every violation found,
//! - producing the JSON schema handed to the generation service so it can
//!   constrain its output,
//! - letting templates verify at startup that every placeholder they use
//!   names a real input field.
//!
//! Checking never panics and never throws; callers match on the `Result`.

use serde_json::{json, Map, Value};
use std::fmt;

/// What to do with a number outside its declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    /// Out-of-range values are a violation.
    Reject,
    /// Out-of-range values are pulled to the nearest bound.
    Clamp,
}

/// The type of a single field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A string. `non_empty` rejects strings that are blank after trimming.
    Text {
        /// Whether blank strings are rejected
        non_empty: bool,
    },
    /// A number with optional inclusive bounds.
    Number {
        /// Inclusive lower bound
        min: Option<f64>,
        /// Inclusive upper bound
        max: Option<f64>,
        /// Whether fractional values are rejected
        integer: bool,
        /// Handling of out-of-range values
        policy: RangePolicy,
    },
    /// A string drawn from a fixed set, matched case-insensitively and
    /// normalized to the canonical spelling.
    Choice(&'static [&'static str]),
    /// An array of records sharing one shape.
    List(Shape),
}

/// A named field within a shape.
#[derive(Debug, Clone)]
pub struct Field {
    /// JSON key of the field
    pub name: &'static str,
    /// Field type and constraints
    pub kind: FieldKind,
    /// Whether the field must be present and non-null
    pub required: bool,
    /// Human-readable description, forwarded in the JSON schema
    pub description: &'static str,
}

/// A single problem found while checking a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    /// Dotted path to the offending field (`moodLogs[2].mood`)
    pub path: String,
    /// What is wrong with it
    pub message: String,
}

impl ShapeViolation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: if path.is_empty() {
                "<root>".to_string()
            } else {
                path.to_string()
            },
            message: message.into(),
        }
    }
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' {}", self.path, self.message)
    }
}

/// An ordered list of named, typed fields describing a JSON object.
///
/// # Examples
///
/// ```
/// use mindwell::ai::schema::{RangePolicy, Shape};
/// use serde_json::json;
///
/// let shape = Shape::new()
///     .choice("sentiment", "Overall tone", &["positive", "negative", "neutral"])
///     .number("score", "Strength", -1.0, 1.0, RangePolicy::Clamp);
///
/// let checked = shape.check(&json!({"sentiment": "Positive", "score": 1.7})).unwrap();
/// assert_eq!(checked, json!({"sentiment": "positive", "score": 1.0}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shape {
    fields: Vec<Field>,
}

impl Shape {
    /// Creates an empty shape.
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name,
            kind,
            required: true,
            description,
        });
        self
    }

    /// Adds a required string field. Empty strings are accepted.
    pub fn text(self, name: &'static str, description: &'static str) -> Self {
        self.with(name, description, FieldKind::Text { non_empty: false })
    }

    /// Adds a required string field that must contain non-whitespace text.
    pub fn non_empty_text(self, name: &'static str, description: &'static str) -> Self {
        self.with(name, description, FieldKind::Text { non_empty: true })
    }

    /// Adds an optional string field.
    pub fn optional_text(mut self, name: &'static str, description: &'static str) -> Self {
        self.fields.push(Field {
            name,
            kind: FieldKind::Text { non_empty: false },
            required: false,
            description,
        });
        self
    }

    /// Adds a required number constrained to `[min, max]`.
    pub fn number(
        self,
        name: &'static str,
        description: &'static str,
        min: f64,
        max: f64,
        policy: RangePolicy,
    ) -> Self {
        self.with(
            name,
            description,
            FieldKind::Number {
                min: Some(min),
                max: Some(max),
                integer: false,
                policy,
            },
        )
    }

    /// Adds a required integer constrained to `[min, max]`; out-of-range
    /// values are rejected.
    pub fn integer(self, name: &'static str, description: &'static str, min: i64, max: i64) -> Self {
        self.with(
            name,
            description,
            FieldKind::Number {
                min: Some(min as f64),
                max: Some(max as f64),
                integer: true,
                policy: RangePolicy::Reject,
            },
        )
    }

    /// Adds a required enumerated string field.
    pub fn choice(
        self,
        name: &'static str,
        description: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        self.with(name, description, FieldKind::Choice(options))
    }

    /// Adds a required array field whose items follow `item`.
    pub fn list(self, name: &'static str, description: &'static str, item: Shape) -> Self {
        self.with(name, description, FieldKind::List(item))
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Checks `value` against this shape.
    ///
    /// On success returns a normalized copy containing only declared fields
    /// (absent optional fields become null), with choices in canonical
    /// spelling, clamped numbers pulled into range and integers stored as
    /// integers. On failure returns every violation, not just the first.
    pub fn check(&self, value: &Value) -> Result<Value, Vec<ShapeViolation>> {
        let mut violations = Vec::new();
        let normalized = self.check_object(value, "", &mut violations);
        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(violations)
        }
    }

    fn check_object(&self, value: &Value, prefix: &str, violations: &mut Vec<ShapeViolation>) -> Value {
        let Some(object) = value.as_object() else {
            violations.push(ShapeViolation::new(prefix, "expected an object"));
            return Value::Null;
        };

        let mut normalized = Map::new();
        for field in &self.fields {
            let path = if prefix.is_empty() {
                field.name.to_string()
            } else {
                format!("{}.{}", prefix, field.name)
            };

            match object.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        violations.push(ShapeViolation::new(&path, "is missing"));
                    } else {
                        normalized.insert(field.name.to_string(), Value::Null);
                    }
                }
                Some(raw) => {
                    if let Some(value) = field.kind.check(raw, &path, violations) {
                        normalized.insert(field.name.to_string(), value);
                    }
                }
            }
        }
        Value::Object(normalized)
    }

    /// Renders this shape as a JSON schema object.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut schema = field.kind.json_schema();
            if let Value::Object(map) = &mut schema {
                map.insert("description".to_string(), json!(field.description));
            }
            properties.insert(field.name.to_string(), schema);
            if field.required {
                required.push(json!(field.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl FieldKind {
    fn check(&self, raw: &Value, path: &str, violations: &mut Vec<ShapeViolation>) -> Option<Value> {
        match self {
            FieldKind::Text { non_empty } => {
                let Some(text) = raw.as_str() else {
                    violations.push(ShapeViolation::new(path, "expected a string"));
                    return None;
                };
                if *non_empty && text.trim().is_empty() {
                    violations.push(ShapeViolation::new(path, "must not be empty"));
                    return None;
                }
                Some(Value::String(text.to_string()))
            }
            FieldKind::Number {
                min,
                max,
                integer,
                policy,
            } => {
                let Some(mut number) = raw.as_f64() else {
                    violations.push(ShapeViolation::new(path, "expected a number"));
                    return None;
                };
                if *integer && number.fract() != 0.0 {
                    violations.push(ShapeViolation::new(path, "expected an integer"));
                    return None;
                }
                if let Some(min) = min {
                    if number < *min {
                        match policy {
                            RangePolicy::Clamp => number = *min,
                            RangePolicy::Reject => {
                                violations
                                    .push(ShapeViolation::new(path, format!("must be >= {}", min)));
                                return None;
                            }
                        }
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        match policy {
                            RangePolicy::Clamp => number = *max,
                            RangePolicy::Reject => {
                                violations
                                    .push(ShapeViolation::new(path, format!("must be <= {}", max)));
                                return None;
                            }
                        }
                    }
                }
                if *integer {
                    Some(json!(number as i64))
                } else {
                    Some(json!(number))
                }
            }
            FieldKind::Choice(options) => {
                let Some(text) = raw.as_str() else {
                    violations.push(ShapeViolation::new(path, "expected a string"));
                    return None;
                };
                let text = text.trim();
                match options.iter().find(|option| option.eq_ignore_ascii_case(text)) {
                    Some(canonical) => Some(Value::String(canonical.to_string())),
                    None => {
                        violations.push(ShapeViolation::new(
                            path,
                            format!("must be one of {:?}, got {:?}", options, text),
                        ));
                        None
                    }
                }
            }
            FieldKind::List(item) => {
                let Some(items) = raw.as_array() else {
                    violations.push(ShapeViolation::new(path, "expected an array"));
                    return None;
                };
                let checked = items
                    .iter()
                    .enumerate()
                    .map(|(i, value)| item.check_object(value, &format!("{}[{}]", path, i), violations))
                    .collect();
                Some(Value::Array(checked))
            }
        }
    }

    fn json_schema(&self) -> Value {
        match self {
            FieldKind::Text { non_empty: true } => json!({"type": "string", "minLength": 1}),
            FieldKind::Text { non_empty: false } => json!({"type": "string"}),
            FieldKind::Number {
                min, max, integer, ..
            } => {
                let mut schema = Map::new();
                let kind = if *integer { "integer" } else { "number" };
                schema.insert("type".to_string(), json!(kind));
                if let Some(min) = min {
                    schema.insert("minimum".to_string(), json!(min));
                }
                if let Some(max) = max {
                    schema.insert("maximum".to_string(), json!(max));
                }
                Value::Object(schema)
            }
            FieldKind::Choice(options) => json!({"type": "string", "enum": options}),
            FieldKind::List(item) => json!({"type": "array", "items": item.json_schema()}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTIMENTS: &[&str] = &["positive", "negative", "neutral"];

    fn sentiment_shape() -> Shape {
        Shape::new()
            .choice("sentiment", "label", SENTIMENTS)
            .number("score", "strength", -1.0, 1.0, RangePolicy::Clamp)
    }

    #[test]
    fn test_valid_value_passes_through() {
        let checked = sentiment_shape()
            .check(&json!({"sentiment": "neutral", "score": 0.25}))
            .unwrap();
        assert_eq!(checked, json!({"sentiment": "neutral", "score": 0.25}));
    }

    #[test]
    fn test_choice_is_normalized_to_canonical_spelling() {
        let checked = sentiment_shape()
            .check(&json!({"sentiment": "  NEGATIVE ", "score": -0.5}))
            .unwrap();
        assert_eq!(checked["sentiment"], "negative");
    }

    #[test]
    fn test_clamp_policy_pulls_numbers_into_range() {
        let shape = sentiment_shape();
        let high = shape.check(&json!({"sentiment": "positive", "score": 3.2})).unwrap();
        assert_eq!(high["score"], json!(1.0));
        let low = shape.check(&json!({"sentiment": "negative", "score": -9})).unwrap();
        assert_eq!(low["score"], json!(-1.0));
    }

    #[test]
    fn test_reject_policy_reports_range_violation() {
        let shape = Shape::new().integer("stressLevel", "level", 1, 5);
        let violations = shape.check(&json!({"stressLevel": 6})).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "stressLevel");
        assert!(violations[0].message.contains("<= 5"));

        let violations = shape.check(&json!({"stressLevel": 0})).unwrap_err();
        assert!(violations[0].message.contains(">= 1"));
    }

    #[test]
    fn test_integer_rejects_fractions_and_normalizes_whole_floats() {
        let shape = Shape::new().integer("stressLevel", "level", 1, 5);
        assert!(shape.check(&json!({"stressLevel": 2.5})).is_err());
        let checked = shape.check(&json!({"stressLevel": 4.0})).unwrap();
        assert_eq!(checked["stressLevel"], json!(4));
        assert!(checked["stressLevel"].is_i64());
    }

    #[test]
    fn test_all_violations_are_collected() {
        let violations = sentiment_shape()
            .check(&json!({"sentiment": "ecstatic", "score": "high"}))
            .unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].to_string().contains("must be one of"));
        assert!(violations[1].to_string().contains("expected a number"));
    }

    #[test]
    fn test_missing_and_null_required_fields() {
        let shape = Shape::new().text("summary", "summary");
        let violations = shape.check(&json!({})).unwrap_err();
        assert_eq!(violations[0].to_string(), "field 'summary' is missing");
        assert!(shape.check(&json!({"summary": null})).is_err());
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let shape = Shape::new().text("mood", "mood").optional_text("notes", "notes");
        let checked = shape.check(&json!({"mood": "good"})).unwrap();
        assert_eq!(checked, json!({"mood": "good", "notes": null}));
    }

    #[test]
    fn test_non_empty_text_rejects_blank() {
        let shape = Shape::new().non_empty_text("advice", "advice");
        let violations = shape.check(&json!({"advice": "   "})).unwrap_err();
        assert!(violations[0].message.contains("must not be empty"));
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let shape = Shape::new().text("quote", "q").text("author", "a");
        let checked = shape
            .check(&json!({"quote": "Breathe.", "author": "Unknown", "extra": true}))
            .unwrap();
        assert!(checked.get("extra").is_none());
    }

    #[test]
    fn test_non_object_root_is_a_violation() {
        let violations = sentiment_shape().check(&json!(["positive", 1])).unwrap_err();
        assert_eq!(violations[0].path, "<root>");
    }

    #[test]
    fn test_list_items_report_indexed_paths() {
        let shape = Shape::new().list(
            "history",
            "turns",
            Shape::new()
                .choice("role", "speaker", &["user", "assistant"])
                .text("content", "text"),
        );
        let violations = shape
            .check(&json!({"history": [
                {"role": "user", "content": "hi"},
                {"role": "system", "content": "nope"}
            ]}))
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "history[1].role");
    }

    #[test]
    fn test_json_schema_lists_types_bounds_and_required() {
        let schema = Shape::new()
            .integer("stressLevel", "level", 1, 5)
            .non_empty_text("justification", "why")
            .optional_text("notes", "extra")
            .json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["stressLevel"]["type"], "integer");
        assert_eq!(schema["properties"]["stressLevel"]["minimum"], json!(1.0));
        assert_eq!(schema["properties"]["stressLevel"]["maximum"], json!(5.0));
        assert_eq!(schema["properties"]["justification"]["minLength"], 1);
        assert_eq!(schema["properties"]["justification"]["description"], "why");
        assert_eq!(schema["required"], json!(["stressLevel", "justification"]));
    }

    #[test]
    fn test_json_schema_for_choice_and_list() {
        let schema = Shape::new()
            .choice("sentiment", "label", SENTIMENTS)
            .list("logs", "entries", Shape::new().text("date", "day"))
            .json_schema();
        assert_eq!(schema["properties"]["sentiment"]["enum"], json!(SENTIMENTS));
        assert_eq!(schema["properties"]["logs"]["type"], "array");
        assert_eq!(
            schema["properties"]["logs"]["items"]["properties"]["date"]["type"],
            "string"
        );
    }
}
