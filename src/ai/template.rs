//! Prompt templates with field interpolation and bounded iteration.
//!
//! Supported syntax:
//!
//! - `{{field}}` and `{{{field}}}` insert a field's value verbatim. Both forms
//!   are accepted; prompts are plain text so nothing is escaped.
//! - `{{a.b}}` follows nested objects.
//! - `{{#each list}} ... {{/each}}` renders its body once per array item, up
//!   to a limit. Inside the body, names resolve against the item first and
//!   then against the enclosing records; an item that carries the field as
//!   null shadows the outer value. `{{this}}` is the item itself.
//!
//! A block tag alone on its line is "standalone": the line it sits on is
//! removed from the output, so a block written across several lines renders
//! one line per item.
//!
//! Missing or null values render as an empty string.

use super::schema::{FieldKind, Shape};
use crate::constants::DEFAULT_EACH_LIMIT;
use crate::errors::TemplateError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Each { field: String, body: Vec<Node> },
}

/// A parsed prompt template.
///
/// # Examples
///
/// ```
/// use mindwell::ai::template::Template;
/// use serde_json::json;
///
/// let template = Template::parse("Logs:\n{{#each logs}}\n- {{date}}: {{mood}}\n{{/each}}").unwrap();
/// let rendered = template.render(&json!({
///     "logs": [{"date": "2024-05-01", "mood": "good"}, {"date": "2024-05-02", "mood": "bad"}]
/// }));
/// assert_eq!(rendered, "Logs:\n- 2024-05-01: good\n- 2024-05-02: bad\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parses template source.
    ///
    /// # Errors
    ///
    /// Returns a `TemplateError` for unclosed or empty tags, unbalanced
    /// blocks, or block helpers other than `each`.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut open_blocks: Vec<(String, Vec<Node>)> = Vec::new();
        let mut current: Vec<Node> = Vec::new();
        let mut cursor = 0;

        while let Some(offset) = source[cursor..].find("{{") {
            let start = cursor + offset;
            let (inner_start, closer) = if source[start..].starts_with("{{{") {
                (start + 3, "}}}")
            } else {
                (start + 2, "}}")
            };
            let inner_len = source[inner_start..]
                .find(closer)
                .ok_or(TemplateError::UnclosedTag { position: start })?;
            let inner_end = inner_start + inner_len;
            let mut end = inner_end + closer.len();

            let tag = source[inner_start..inner_end].trim();
            if tag.is_empty() {
                return Err(TemplateError::EmptyTag { position: start });
            }

            let mut text_end = start;
            if tag.starts_with('#') || tag.starts_with('/') {
                if let Some((line_start, after_line)) = standalone_span(source, start, end) {
                    text_end = line_start.max(cursor);
                    end = after_line;
                }
            }
            push_text(&mut current, &source[cursor..text_end]);

            if let Some(helper) = tag.strip_prefix('#') {
                let mut parts = helper.split_whitespace();
                let name = parts.next().unwrap_or_default();
                if name != "each" {
                    return Err(TemplateError::UnsupportedBlock(name.to_string()));
                }
                let field = parts
                    .next()
                    .ok_or(TemplateError::EmptyTag { position: start })?;
                open_blocks.push((field.to_string(), std::mem::take(&mut current)));
            } else if let Some(name) = tag.strip_prefix('/') {
                let name = name.trim();
                match open_blocks.pop() {
                    Some((field, parent)) if name == "each" => {
                        let body = std::mem::replace(&mut current, parent);
                        current.push(Node::Each { field, body });
                    }
                    _ => {
                        return Err(TemplateError::UnexpectedClose {
                            name: name.to_string(),
                            position: start,
                        })
                    }
                }
            } else {
                current.push(Node::Var(tag.to_string()));
            }

            cursor = end;
        }

        push_text(&mut current, &source[cursor..]);

        if let Some((field, _)) = open_blocks.pop() {
            return Err(TemplateError::UnclosedBlock { field });
        }

        Ok(Self { nodes: current })
    }

    /// Renders the template against a JSON record, iterating at most
    /// `DEFAULT_EACH_LIMIT` items per block.
    pub fn render(&self, context: &Value) -> String {
        self.render_with_limit(context, DEFAULT_EACH_LIMIT)
    }

    /// Renders the template, iterating at most `each_limit` items per block.
    pub fn render_with_limit(&self, context: &Value, each_limit: usize) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, &mut vec![context], each_limit, &mut out);
        out
    }

    /// Verifies that every placeholder names a field declared in `shape`
    /// and that every `{{#each}}` iterates over a list field.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::UnknownField` or `TemplateError::NotAList`.
    pub fn check_fields(&self, shape: &Shape) -> Result<(), TemplateError> {
        check_nodes(&self.nodes, &mut vec![shape])
    }
}

/// Returns `(line_start, after_line)` when the tag spanning `start..end` is the
/// only non-whitespace content on its line.
fn standalone_span(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    if !source[line_start..start].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }

    let rest = &source[end..];
    let newline = rest.find('\n');
    let trailing = match newline {
        Some(i) => &rest[..i],
        None => rest,
    };
    if !trailing.chars().all(|c| c == ' ' || c == '\t' || c == '\r') {
        return None;
    }

    let after_line = match newline {
        Some(i) => end + i + 1,
        None => source.len(),
    };
    Some((line_start, after_line))
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// Resolves `path` against the innermost record that has its first segment.
/// A field present as null still stops the search.
fn lookup<'a>(scopes: &[&'a Value], path: &str) -> Option<&'a Value> {
    if path == "this" {
        return scopes.last().copied();
    }
    let mut segments = path.split('.');
    let root = segments.next()?;
    let found = scopes.iter().rev().find_map(|scope| scope.get(root))?;
    segments.try_fold(found, |value, segment| value.get(segment))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(text) => out.push_str(text),
        other => out.push_str(&other.to_string()),
    }
}

fn render_nodes<'a>(nodes: &[Node], scopes: &mut Vec<&'a Value>, each_limit: usize, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => {
                if let Some(value) = lookup(scopes, path) {
                    write_value(out, value);
                }
            }
            Node::Each { field, body } => {
                if let Some(Value::Array(items)) = lookup(scopes, field) {
                    for item in items.iter().take(each_limit) {
                        scopes.push(item);
                        render_nodes(body, scopes, each_limit, out);
                        scopes.pop();
                    }
                }
            }
        }
    }
}

fn find_field<'a>(scopes: &[&'a Shape], name: &str) -> Option<&'a FieldKind> {
    let root = name.split('.').next().unwrap_or(name);
    scopes
        .iter()
        .rev()
        .copied()
        .find_map(|shape| shape.field(root))
        .map(|field| &field.kind)
}

fn check_nodes<'a>(nodes: &'a [Node], scopes: &mut Vec<&'a Shape>) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Var(path) => {
                if path != "this" && find_field(scopes, path).is_none() {
                    return Err(TemplateError::UnknownField(path.clone()));
                }
            }
            Node::Each { field, body } => match find_field(scopes, field) {
                Some(FieldKind::List(item)) => {
                    scopes.push(item);
                    let result = check_nodes(body, scopes);
                    scopes.pop();
                    result?;
                }
                Some(_) => return Err(TemplateError::NotAList(field.clone())),
                None => return Err(TemplateError::UnknownField(field.clone())),
            },
        }
    }
    Ok(())
}
