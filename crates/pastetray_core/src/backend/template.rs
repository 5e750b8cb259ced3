//! Request templates with `{placeholder}` substitution.
//!
//! `{{` and `}}` produce literal braces. Every other `{name}` must be a
//! [`Parameter`] name or `user_agent`.

use super::Parameter;
use std::collections::BTreeMap;

/// Something a template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Parameter(Parameter),
    UserAgent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// Values available while rendering templates for one request.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    pub user_agent: String,
    pub parameters: BTreeMap<Parameter, String>,
}

impl TemplateValues {
    fn get(&self, placeholder: Placeholder) -> Option<&str> {
        match placeholder {
            Placeholder::UserAgent => Some(self.user_agent.as_str()),
            Placeholder::Parameter(parameter) => self.parameters.get(&parameter).map(String::as_str),
        }
    }
}

fn resolve_placeholder(name: &str) -> Result<Placeholder, String> {
    if name == "user_agent" {
        return Ok(Placeholder::UserAgent);
    }
    Parameter::from_name(name)
        .map(Placeholder::Parameter)
        .ok_or_else(|| format!("unknown placeholder '{{{}}}'", name))
}

impl Template {
    /// Parse a template string.
    ///
    /// # Returns
    /// The parsed template, or a human-readable reason on malformed input.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err("unclosed '{'".to_string());
                    }
                    let placeholder = resolve_placeholder(name.trim())?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                '}' => return Err("unmatched '}'".to_string()),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Iterate the placeholders referenced by this template.
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(placeholder) => Some(*placeholder),
            Segment::Literal(_) => None,
        })
    }

    /// Render the template.
    ///
    /// # Returns
    /// `None` when any referenced placeholder has no value, so the caller can
    /// drop the whole field instead of sending a half-filled one.
    pub fn render(&self, values: &TemplateValues) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(placeholder) => out.push_str(values.get(*placeholder)?),
            }
        }
        Some(out)
    }
}
