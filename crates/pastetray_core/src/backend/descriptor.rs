//! Backend descriptor model and invariant checks.

use super::template::{Placeholder, Template};
use crate::error::DescriptorError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A value a pastebin may accept alongside the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Title,
    Content,
    Syntax,
    Username,
    ExpiryDays,
}

impl Parameter {
    /// Every parameter, in display order.
    pub const ALL: [Parameter; 5] = [
        Parameter::Title,
        Parameter::Content,
        Parameter::Syntax,
        Parameter::Username,
        Parameter::ExpiryDays,
    ];

    /// Document and template name of this parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Title => "title",
            Parameter::Content => "content",
            Parameter::Syntax => "syntax",
            Parameter::Username => "username",
            Parameter::ExpiryDays => "expiry_days",
        }
    }

    /// Look up a parameter by its document name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|parameter| parameter.as_str() == name)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a paste should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ExpiryRepr", into = "ExpiryRepr")]
pub enum Expiry {
    Days(u32),
    Never,
}

// Documents spell expiry as a bare day count or the string "never".
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ExpiryRepr {
    Days(u32),
    Keyword(String),
}

impl TryFrom<ExpiryRepr> for Expiry {
    type Error = String;

    fn try_from(value: ExpiryRepr) -> Result<Self, Self::Error> {
        match value {
            ExpiryRepr::Days(days) => Ok(Expiry::Days(days)),
            ExpiryRepr::Keyword(word) => word.parse(),
        }
    }
}

impl From<Expiry> for ExpiryRepr {
    fn from(value: Expiry) -> Self {
        match value {
            Expiry::Days(days) => ExpiryRepr::Days(days),
            Expiry::Never => ExpiryRepr::Keyword("never".to_string()),
        }
    }
}

impl FromStr for Expiry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("never") {
            return Ok(Expiry::Never);
        }
        trimmed
            .parse::<u32>()
            .map(Expiry::Days)
            .map_err(|_| format!("expected a day count or 'never', got '{}'", trimmed))
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::Days(days) => write!(f, "{}", days),
            Expiry::Never => f.write_str("never"),
        }
    }
}

impl Expiry {
    /// Value substituted for `{expiry_days}`; "never" has none.
    pub fn template_value(self) -> Option<String> {
        match self {
            Expiry::Days(days) => Some(days.to_string()),
            Expiry::Never => None,
        }
    }
}

/// HTTP verb used by a form backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpMethod {
    #[default]
    Post,
    Get,
}

/// Where a form backend's paste URL comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Response body, trimmed.
    #[default]
    Body,
    /// URL of the final response after redirects.
    FinalUrl,
}

/// HTTP form submission recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTransport {
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub response: ResponseSource,
}

impl FormTransport {
    /// POST recipe against `endpoint` with no templates yet.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Post,
            fields: BTreeMap::new(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            response: ResponseSource::Body,
        }
    }

    fn templates(&self) -> impl Iterator<Item = &String> {
        self.fields
            .values()
            .chain(self.query.values())
            .chain(self.headers.values())
    }
}

/// Raw TCP submission address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketTransport {
    pub host: String,
    pub port: u16,
}

/// How a backend is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transport {
    Form(FormTransport),
    Socket(SocketTransport),
}

impl Transport {
    /// Short label for listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Transport::Form(_) => "form",
            Transport::Socket(_) => "socket",
        }
    }
}

/// Static description of one pastebin service.
///
/// Descriptors are validated on construction and immutable afterwards.
/// Deserialization goes through the same checks as [`Self::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorDocument")]
pub struct BackendDescriptor {
    name: String,
    url: String,
    accepted_parameters: BTreeSet<Parameter>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    syntax_choices: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_syntax: Option<String>,
    expiry_choices: Vec<Expiry>,
    transport: Transport,
}

// Unvalidated document shape.
#[derive(Deserialize)]
struct DescriptorDocument {
    name: String,
    url: String,
    #[serde(default)]
    accepted_parameters: BTreeSet<Parameter>,
    #[serde(default)]
    syntax_choices: BTreeMap<String, String>,
    #[serde(default)]
    default_syntax: Option<String>,
    expiry_choices: Vec<Expiry>,
    transport: Transport,
}

impl TryFrom<DescriptorDocument> for BackendDescriptor {
    type Error = DescriptorError;

    fn try_from(doc: DescriptorDocument) -> Result<Self, Self::Error> {
        BackendDescriptor {
            name: doc.name,
            url: doc.url,
            accepted_parameters: doc.accepted_parameters,
            syntax_choices: doc.syntax_choices,
            default_syntax: doc.default_syntax,
            expiry_choices: doc.expiry_choices,
            transport: doc.transport,
        }
        .validated()
    }
}

impl BackendDescriptor {
    /// Start building a descriptor in code.
    pub fn builder(
        name: impl Into<String>,
        url: impl Into<String>,
        transport: Transport,
    ) -> DescriptorBuilder {
        DescriptorBuilder {
            inner: BackendDescriptor {
                name: name.into(),
                url: url.into(),
                accepted_parameters: BTreeSet::new(),
                syntax_choices: BTreeMap::new(),
                default_syntax: None,
                expiry_choices: Vec::new(),
                transport,
            },
        }
    }

    /// Parse and validate a JSON backend document.
    ///
    /// # Returns
    /// The validated descriptor, or the first violated invariant.
    pub fn from_json(text: &str) -> Result<Self, DescriptorError> {
        let doc: DescriptorDocument = serde_json::from_str(text)?;
        BackendDescriptor::try_from(doc)
    }

    /// Render as a pretty JSON document accepted by [`Self::from_json`].
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn validated(mut self) -> Result<Self, DescriptorError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        self.accepted_parameters.insert(Parameter::Content);

        if self.accepts(Parameter::Syntax) {
            if self.syntax_choices.is_empty() {
                return Err(DescriptorError::MissingSyntaxChoices(self.name));
            }
            match self.default_syntax.as_deref() {
                Some(label) if self.syntax_choices.contains_key(label) => {}
                other => {
                    return Err(DescriptorError::InvalidDefaultSyntax {
                        backend: self.name.clone(),
                        label: other.unwrap_or_default().to_string(),
                    });
                }
            }
        }

        if self.expiry_choices.is_empty() {
            return Err(DescriptorError::MissingExpiryChoices(self.name));
        }

        if let Transport::Form(form) = &self.transport {
            for source in form.templates() {
                self.check_template(source)?;
            }
        }
        Ok(self)
    }

    fn check_template(&self, source: &str) -> Result<(), DescriptorError> {
        let template_error = |reason: String| DescriptorError::Template {
            backend: self.name.clone(),
            template: source.to_string(),
            reason,
        };
        let template = Template::parse(source).map_err(template_error)?;
        for placeholder in template.placeholders() {
            if let Placeholder::Parameter(parameter) = placeholder {
                if !self.accepts(parameter) {
                    return Err(template_error(format!(
                        "references '{}', which the backend does not accept",
                        parameter
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public base URL of the service.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Whether requests to this backend may carry `parameter`.
    pub fn accepts(&self, parameter: Parameter) -> bool {
        self.accepted_parameters.contains(&parameter)
    }

    /// Accepted parameters in a stable order.
    pub fn accepted_parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        self.accepted_parameters.iter().copied()
    }

    /// Display label → service syntax code.
    pub fn syntax_choices(&self) -> &BTreeMap<String, String> {
        &self.syntax_choices
    }

    /// Syntax labels sorted case-insensitively, for pickers.
    pub fn sorted_syntax_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.syntax_choices.keys().map(String::as_str).collect();
        labels.sort_by_key(|label| label.to_lowercase());
        labels
    }

    /// Default syntax label, present only when syntax is accepted.
    pub fn default_syntax(&self) -> Option<&str> {
        if !self.accepts(Parameter::Syntax) {
            return None;
        }
        self.default_syntax.as_deref()
    }

    /// Map a display label to this service's syntax code.
    pub fn syntax_code(&self, label: &str) -> Option<&str> {
        self.syntax_choices.get(label).map(String::as_str)
    }

    pub fn expiry_choices(&self) -> &[Expiry] {
        &self.expiry_choices
    }

    pub fn offers_expiry(&self, expiry: Expiry) -> bool {
        self.expiry_choices.contains(&expiry)
    }
}

/// Incremental construction of a [`BackendDescriptor`] in code.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    inner: BackendDescriptor,
}

impl DescriptorBuilder {
    pub fn accept(mut self, parameter: Parameter) -> Self {
        self.inner.accepted_parameters.insert(parameter);
        self
    }

    pub fn syntax(mut self, label: impl Into<String>, code: impl Into<String>) -> Self {
        self.inner.syntax_choices.insert(label.into(), code.into());
        self
    }

    pub fn default_syntax(mut self, label: impl Into<String>) -> Self {
        self.inner.default_syntax = Some(label.into());
        self
    }

    pub fn expiry(mut self, expiry: Expiry) -> Self {
        self.inner.expiry_choices.push(expiry);
        self
    }

    /// Validate and finish.
    ///
    /// # Returns
    /// The descriptor, or the same error [`BackendDescriptor::from_json`]
    /// would report for an equivalent document.
    pub fn build(self) -> Result<BackendDescriptor, DescriptorError> {
        self.inner.validated()
    }
}
