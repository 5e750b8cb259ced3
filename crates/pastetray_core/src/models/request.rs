//! Paste requests and their validation against a backend.

use crate::backend::{BackendDescriptor, Expiry, Parameter, TemplateValues};
use crate::error::RequestError;
use std::sync::Arc;

/// Everything needed to create one paste on one backend.
///
/// Only obtainable through [`PasteRequestBuilder::build`], so a request never
/// carries a parameter its backend does not accept, an unknown syntax or an
/// expiry the backend does not offer.
#[derive(Debug, Clone)]
pub struct PasteRequest {
    backend: Arc<BackendDescriptor>,
    content: String,
    title: Option<String>,
    syntax: Option<String>,
    username: Option<String>,
    expiry: Option<Expiry>,
}

impl PasteRequest {
    /// Start a request for `backend`.
    pub fn builder(
        backend: Arc<BackendDescriptor>,
        content: impl Into<String>,
    ) -> PasteRequestBuilder {
        PasteRequestBuilder {
            backend,
            content: content.into(),
            title: None,
            syntax_label: None,
            username: None,
            expiry: None,
        }
    }

    pub fn backend(&self) -> &BackendDescriptor {
        &self.backend
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn accepted<T>(&self, parameter: Parameter, value: Option<T>) -> Option<T> {
        value.filter(|_| self.backend.accepts(parameter))
    }

    pub fn title(&self) -> Option<&str> {
        self.accepted(Parameter::Title, self.title.as_deref())
    }

    /// Resolved service syntax code.
    pub fn syntax(&self) -> Option<&str> {
        self.accepted(Parameter::Syntax, self.syntax.as_deref())
    }

    pub fn username(&self) -> Option<&str> {
        self.accepted(Parameter::Username, self.username.as_deref())
    }

    pub fn expiry(&self) -> Option<Expiry> {
        self.accepted(Parameter::ExpiryDays, self.expiry)
    }

    /// String value of `parameter` as sent on the wire.
    ///
    /// # Returns
    /// `None` when the parameter is absent, has no wire value ("never"
    /// expiry), or is not accepted by the backend.
    pub fn value(&self, parameter: Parameter) -> Option<String> {
        match parameter {
            Parameter::Content => Some(self.content.clone()),
            Parameter::Title => self.title().map(str::to_string),
            Parameter::Syntax => self.syntax().map(str::to_string),
            Parameter::Username => self.username().map(str::to_string),
            Parameter::ExpiryDays => self.expiry().and_then(Expiry::template_value),
        }
    }

    /// Collect template values for this request.
    pub fn template_values(&self, user_agent: &str) -> TemplateValues {
        TemplateValues {
            user_agent: user_agent.to_string(),
            parameters: Parameter::ALL
                .into_iter()
                .filter_map(|parameter| self.value(parameter).map(|value| (parameter, value)))
                .collect(),
        }
    }
}

/// Collects optional fields before validation.
#[derive(Debug, Clone)]
pub struct PasteRequestBuilder {
    backend: Arc<BackendDescriptor>,
    content: String,
    title: Option<String>,
    syntax_label: Option<String>,
    username: Option<String>,
    expiry: Option<Expiry>,
}

impl PasteRequestBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Syntax by display label, e.g. `"Plain text"`.
    pub fn syntax(mut self, label: impl Into<String>) -> Self {
        self.syntax_label = Some(label.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = Some(expiry);
        self
    }

    fn ensure_accepted(&self, parameter: Parameter, supplied: bool) -> Result<(), RequestError> {
        if supplied && !self.backend.accepts(parameter) {
            return Err(RequestError::UnsupportedParameter {
                backend: self.backend.name().to_string(),
                parameter,
            });
        }
        Ok(())
    }

    /// Validate against the backend.
    ///
    /// When the backend accepts syntax and none was chosen, its default
    /// syntax is used.
    ///
    /// # Errors
    /// [`RequestError`] for unaccepted parameters, unknown syntax labels and
    /// expiry values the backend does not offer.
    pub fn build(self) -> Result<PasteRequest, RequestError> {
        self.ensure_accepted(Parameter::Title, self.title.is_some())?;
        self.ensure_accepted(Parameter::Syntax, self.syntax_label.is_some())?;
        self.ensure_accepted(Parameter::Username, self.username.is_some())?;
        self.ensure_accepted(Parameter::ExpiryDays, self.expiry.is_some())?;

        let syntax = match self.syntax_label.as_deref().or(self.backend.default_syntax()) {
            Some(label) => Some(
                self.backend
                    .syntax_code(label)
                    .map(str::to_string)
                    .ok_or_else(|| RequestError::UnknownSyntax {
                        backend: self.backend.name().to_string(),
                        label: label.to_string(),
                    })?,
            ),
            None => None,
        };

        if let Some(expiry) = self.expiry {
            if !self.backend.offers_expiry(expiry) {
                return Err(RequestError::InvalidExpiry {
                    backend: self.backend.name().to_string(),
                    expiry,
                });
            }
        }

        Ok(PasteRequest {
            backend: self.backend,
            content: self.content,
            title: self.title,
            syntax,
            username: self.username,
            expiry: self.expiry,
        })
    }

    /// Skip validation; the syntax label is used verbatim as the code.
    #[cfg(test)]
    pub(crate) fn build_unchecked(self) -> PasteRequest {
        PasteRequest {
            backend: self.backend,
            content: self.content,
            title: self.title,
            syntax: self.syntax_label,
            username: self.username,
            expiry: self.expiry,
        }
    }
}
