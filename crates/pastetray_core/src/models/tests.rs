//! Model-level unit tests.

use super::*;
use crate::backend::{BackendRegistry, Expiry, Parameter};
use crate::error::RequestError;

fn backend(name: &str) -> std::sync::Arc<crate::BackendDescriptor> {
    BackendRegistry::bundled()
        .expect("bundled")
        .lookup(name)
        .expect("bundled backend")
}

#[test]
fn dpaste_rejects_unknown_syntax_label() {
    let err = PasteRequest::builder(backend("dpaste"), "fn main() {}")
        .syntax("Brainfudge")
        .build()
        .expect_err("unknown syntax");
    assert_eq!(
        err,
        RequestError::UnknownSyntax {
            backend: "dpaste".to_string(),
            label: "Brainfudge".to_string(),
        }
    );
}

#[test]
fn dpaste_resolves_labels_and_defaults_syntax() {
    let chosen = PasteRequest::builder(backend("dpaste"), "fn main() {}")
        .syntax("Rust")
        .title("demo")
        .username("akuli")
        .expiry(Expiry::Days(7))
        .build()
        .expect("valid request");
    assert_eq!(chosen.syntax(), Some("rust"));
    assert_eq!(chosen.title(), Some("demo"));
    assert_eq!(chosen.value(Parameter::ExpiryDays).as_deref(), Some("7"));

    let defaulted = PasteRequest::builder(backend("dpaste"), "hello")
        .build()
        .expect("valid request");
    assert_eq!(defaulted.syntax(), Some("text"));
}

#[test]
fn parameters_outside_the_accepted_set_are_rejected() {
    let cases = [
        (
            PasteRequest::builder(backend("termbin"), "hello").title("t"),
            Parameter::Title,
        ),
        (
            PasteRequest::builder(backend("termbin"), "hello").username("me"),
            Parameter::Username,
        ),
        (
            PasteRequest::builder(backend("termbin"), "hello").syntax("Rust"),
            Parameter::Syntax,
        ),
        (
            PasteRequest::builder(backend("termbin"), "hello").expiry(Expiry::Never),
            Parameter::ExpiryDays,
        ),
    ];
    for (builder, parameter) in cases {
        assert_eq!(
            builder.build().expect_err("unsupported"),
            RequestError::UnsupportedParameter {
                backend: "termbin".to_string(),
                parameter,
            }
        );
    }
}

#[test]
fn expiry_must_be_offered_by_backend() {
    let err = PasteRequest::builder(backend("dpaste"), "hello")
        .expiry(Expiry::Days(2))
        .build()
        .expect_err("invalid expiry");
    assert!(matches!(err, RequestError::InvalidExpiry { expiry: Expiry::Days(2), .. }));
}

#[test]
fn unaccepted_values_are_invisible_even_when_carried() {
    let request = PasteRequest::builder(backend("termbin"), "hello")
        .title("secret title")
        .username("secret user")
        .build_unchecked();

    assert_eq!(request.title(), None);
    assert_eq!(request.username(), None);
    let values = request.template_values("PasteTray/test");
    assert_eq!(values.parameters.len(), 1);
    assert_eq!(
        values.parameters.get(&Parameter::Content).map(String::as_str),
        Some("hello")
    );
}

#[test]
fn never_expiry_has_no_wire_value() {
    let descriptor = crate::BackendDescriptor::builder(
        "keeper",
        "http://keeper.example/",
        crate::backend::Transport::Form(crate::backend::FormTransport::post(
            "http://keeper.example/api",
        )),
    )
    .accept(Parameter::ExpiryDays)
    .expiry(Expiry::Never)
    .expiry(Expiry::Days(1))
    .build()
    .expect("descriptor");
    let request = PasteRequest::builder(std::sync::Arc::new(descriptor), "hi")
        .expiry(Expiry::Never)
        .build()
        .expect("request");
    assert_eq!(request.expiry(), Some(Expiry::Never));
    assert_eq!(request.value(Parameter::ExpiryDays), None);
}

#[test]
fn paste_result_reports_kind_and_serializes_tagged() {
    let failure = PasteResult::failure(FailureKind::HttpStatus, "503 Service Unavailable");
    assert_eq!(failure.failure_kind().map(FailureKind::as_str), Some("http_status"));
    assert_eq!(failure.to_string(), "http_status error: 503 Service Unavailable");
    assert_eq!(failure.url(), None);

    let success = PasteResult::success("http://termbin.com/abcd");
    assert!(success.is_success());
    let rendered = serde_json::to_value(&success).expect("serialize");
    assert_eq!(
        rendered,
        serde_json::json!({"status": "success", "url": "http://termbin.com/abcd"})
    );
}
