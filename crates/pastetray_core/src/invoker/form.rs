//! HTTP form-post strategy.

use crate::backend::{FormTransport, HttpMethod, ResponseSource, Template, TemplateValues};
use crate::models::{FailureKind, PasteRequest, PasteResult};
use std::collections::BTreeMap;
use tracing::debug;

// Error pages can be whole HTML documents; keep messages readable.
const MAX_ERROR_BODY_CHARS: usize = 512;

type Pairs = Vec<(String, String)>;

#[derive(Debug, Default)]
struct RenderedForm {
    fields: Pairs,
    query: Pairs,
    headers: Pairs,
}

fn render_pairs(
    section: &str,
    templates: &BTreeMap<String, String>,
    values: &TemplateValues,
) -> Result<Pairs, String> {
    let mut pairs = Vec::with_capacity(templates.len());
    for (key, source) in templates {
        let template = Template::parse(source)
            .map_err(|reason| format!("{} '{}': {}", section, key, reason))?;
        match template.render(values) {
            Some(value) => pairs.push((key.clone(), value)),
            None => debug!("omitting {} '{}': no value for its placeholders", section, key),
        }
    }
    Ok(pairs)
}

fn render_form(form: &FormTransport, values: &TemplateValues) -> Result<RenderedForm, String> {
    Ok(RenderedForm {
        fields: render_pairs("field", &form.fields, values)?,
        query: render_pairs("query", &form.query, values)?,
        headers: render_pairs("header", &form.headers, values)?,
    })
}

pub(super) fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status.to_string();
    }
    let mut excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if excerpt.len() < body.len() {
        excerpt.push_str("...");
    }
    format!("{}: {}", status, excerpt)
}

fn request_failure(err: reqwest::Error) -> PasteResult {
    // Builder errors come from the document (bad header name etc), not the network.
    let kind = if err.is_builder() {
        FailureKind::Internal
    } else {
        FailureKind::Transport
    };
    PasteResult::failure(kind, err.to_string())
}

pub(super) fn submit(
    client: &reqwest::blocking::Client,
    form: &FormTransport,
    request: &PasteRequest,
    user_agent: &str,
) -> PasteResult {
    let values = request.template_values(user_agent);
    let rendered = match render_form(form, &values) {
        Ok(rendered) => rendered,
        Err(message) => return PasteResult::failure(FailureKind::Internal, message),
    };

    let builder = match form.method {
        HttpMethod::Post => client
            .post(form.endpoint.as_str())
            .query(&rendered.query)
            .form(&rendered.fields),
        HttpMethod::Get => {
            let mut pairs = rendered.query;
            pairs.extend(rendered.fields);
            client.get(form.endpoint.as_str()).query(&pairs)
        }
    };
    let builder = rendered
        .headers
        .iter()
        .fold(builder, |builder, (name, value)| {
            builder.header(name.as_str(), value.as_str())
        });

    let response = match builder.send() {
        Ok(response) => response,
        Err(err) => return request_failure(err),
    };
    let status = response.status();
    let final_url = response.url().to_string();
    let body = match response.text() {
        Ok(body) => body,
        Err(err) => {
            return PasteResult::failure(
                FailureKind::Transport,
                format!("failed to read response body: {}", err),
            )
        }
    };

    if !status.is_success() {
        return PasteResult::failure(
            FailureKind::HttpStatus,
            error_message_for_response(status, &body),
        );
    }

    match form.response {
        ResponseSource::Body => PasteResult::success(body.trim()),
        ResponseSource::FinalUrl => PasteResult::success(final_url),
    }
}
