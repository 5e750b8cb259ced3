//! Descriptor validation and registry behavior.

use super::*;
use crate::error::{DescriptorError, LoadError, RegistryError};
use tempfile::TempDir;

fn socket_backend(name: &str) -> BackendDescriptor {
    BackendDescriptor::builder(
        name,
        format!("http://{}.example/", name),
        Transport::Socket(SocketTransport {
            host: "127.0.0.1".to_string(),
            port: 9999,
        }),
    )
    .expiry(Expiry::Never)
    .build()
    .expect("valid socket backend")
}

fn write_document(dir: &TempDir, file_name: &str, name: &str) {
    let text = socket_backend(name).to_json_pretty().expect("render json");
    std::fs::write(dir.path().join(file_name), text).expect("write document");
}

#[test]
fn lookup_returns_every_registered_backend() {
    let mut registry = BackendRegistry::new();
    let originals: Vec<BackendDescriptor> = ["alpha", "Beta", "gamma"]
        .into_iter()
        .map(socket_backend)
        .collect();
    for descriptor in &originals {
        registry.register(descriptor.clone()).expect("register");
    }

    for descriptor in &originals {
        let found = registry.lookup(descriptor.name()).expect("lookup");
        assert_eq!(found.as_ref(), descriptor);
    }
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.all().count(), 3);
    assert_eq!(registry.all().count(), 3, "all() must be restartable");
}

#[test]
fn duplicate_registration_leaves_registry_unchanged() {
    let mut registry = BackendRegistry::new();
    let first = registry.register(socket_backend("termbin")).expect("first");

    let replacement = BackendDescriptor::builder(
        "termbin",
        "http://elsewhere.example/",
        Transport::Form(FormTransport::post("http://elsewhere.example/api")),
    )
    .expiry(Expiry::Days(1))
    .build()
    .expect("valid form backend");

    let err = registry.register(replacement).expect_err("duplicate");
    assert_eq!(err, RegistryError::DuplicateBackend("termbin".to_string()));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup("termbin").expect("lookup"), first);
}

#[test]
fn unknown_lookup_is_reported() {
    let registry = BackendRegistry::new();
    assert_eq!(
        registry.lookup("nope"),
        Err(RegistryError::UnknownBackend("nope".to_string()))
    );
}

#[test]
fn sorted_orders_names_case_insensitively() {
    let mut registry = BackendRegistry::new();
    for name in ["zeta", "Alpha", "beta"] {
        registry.register(socket_backend(name)).expect("register");
    }
    let names: Vec<String> = registry
        .sorted()
        .iter()
        .map(|descriptor| descriptor.name().to_string())
        .collect();
    assert_eq!(names, ["Alpha", "beta", "zeta"]);
}

#[test]
fn bundled_defaults_match_their_services() {
    let registry = BackendRegistry::bundled().expect("bundled");
    assert_eq!(registry.len(), 2);

    let termbin = registry.lookup("termbin").expect("termbin");
    assert_eq!(termbin.accepted_parameters().collect::<Vec<_>>(), [Parameter::Content]);
    assert_eq!(termbin.expiry_choices(), &[Expiry::Never]);
    assert_eq!(termbin.default_syntax(), None);
    assert!(matches!(termbin.transport(), Transport::Socket(socket) if socket.port == 9999));

    let dpaste = registry.lookup("dpaste").expect("dpaste");
    for parameter in Parameter::ALL {
        assert!(dpaste.accepts(parameter), "dpaste should accept {}", parameter);
    }
    assert_eq!(dpaste.default_syntax(), Some("Plain text"));
    assert_eq!(dpaste.syntax_code("Rust"), Some("rust"));
    assert_eq!(
        dpaste.expiry_choices(),
        &[Expiry::Days(1), Expiry::Days(7), Expiry::Days(30), Expiry::Days(365)]
    );
}

#[test]
fn content_is_always_accepted() {
    let descriptor = BackendDescriptor::from_json(
        r#"{
            "name": "bare",
            "url": "http://bare.example/",
            "expiry_choices": ["never"],
            "transport": {"kind": "socket", "host": "bare.example", "port": 1}
        }"#,
    )
    .expect("parse");
    assert!(descriptor.accepts(Parameter::Content));
}

#[test]
fn plain_serde_deserialization_is_validated() {
    let missing_choices = r#"{
        "name": "colors",
        "url": "http://colors.example/",
        "accepted_parameters": ["syntax"],
        "expiry_choices": [1],
        "transport": {"kind": "socket", "host": "colors.example", "port": 1}
    }"#;
    let err = serde_json::from_str::<BackendDescriptor>(missing_choices)
        .expect_err("syntax without choices");
    assert!(err.to_string().contains("no syntax choices"), "{}", err);

    let padded: BackendDescriptor = serde_json::from_str(
        r#"{
            "name": "  padded  ",
            "url": "http://padded.example/",
            "expiry_choices": ["never"],
            "transport": {"kind": "socket", "host": "padded.example", "port": 1}
        }"#,
    )
    .expect("valid document");
    assert_eq!(padded.name(), "padded");
    assert!(padded.accepts(Parameter::Content));
}

#[test]
fn syntax_backends_need_choices_and_a_valid_default() {
    let base = || {
        BackendDescriptor::builder(
            "colors",
            "http://colors.example/",
            Transport::Form(FormTransport::post("http://colors.example/api")),
        )
        .accept(Parameter::Syntax)
        .expiry(Expiry::Days(1))
    };

    assert!(matches!(
        base().build(),
        Err(DescriptorError::MissingSyntaxChoices(name)) if name == "colors"
    ));
    assert!(matches!(
        base().syntax("Rust", "rust").default_syntax("Go").build(),
        Err(DescriptorError::InvalidDefaultSyntax { label, .. }) if label == "Go"
    ));
    assert!(base()
        .syntax("Rust", "rust")
        .default_syntax("Rust")
        .build()
        .is_ok());
}

#[test]
fn expiry_choices_must_not_be_empty() {
    let result = BackendDescriptor::builder(
        "forever",
        "http://forever.example/",
        Transport::Form(FormTransport::post("http://forever.example/api")),
    )
    .build();
    assert!(matches!(result, Err(DescriptorError::MissingExpiryChoices(_))));
}

#[test]
fn templates_cannot_reference_unaccepted_parameters() {
    let mut form = FormTransport::post("http://strict.example/api");
    form.fields
        .insert("poster".to_string(), "{username}".to_string());
    let result = BackendDescriptor::builder("strict", "http://strict.example/", Transport::Form(form))
        .expiry(Expiry::Never)
        .build();
    match result {
        Err(DescriptorError::Template { reason, .. }) => {
            assert!(reason.contains("username"), "reason: {}", reason);
        }
        other => panic!("expected template error, got {:?}", other),
    }
}

#[test]
fn expiry_parses_days_and_never() {
    assert_eq!("7".parse::<Expiry>(), Ok(Expiry::Days(7)));
    assert_eq!(" Never ".parse::<Expiry>(), Ok(Expiry::Never));
    assert!("soon".parse::<Expiry>().is_err());
    assert_eq!(Expiry::Never.template_value(), None);
    assert_eq!(Expiry::Days(30).template_value().as_deref(), Some("30"));
}

#[test]
fn load_dir_reads_documents_and_skips_other_files() {
    let dir = TempDir::new().expect("temp dir");
    write_document(&dir, "a.json", "first");
    write_document(&dir, "b.JSON", "second");
    std::fs::write(dir.path().join("notes.txt"), "not a backend").expect("write notes");

    let registry = BackendRegistry::load_dir(dir.path()).expect("load");
    assert_eq!(registry.len(), 2);
    assert!(registry.contains("first"));
    assert!(registry.contains("second"));
    assert!(!registry.contains("dpaste"));
}

#[test]
fn load_dir_falls_back_to_bundled_when_empty_or_missing() {
    let dir = TempDir::new().expect("temp dir");
    let empty = BackendRegistry::load_dir(dir.path()).expect("load empty");
    assert!(empty.contains("dpaste") && empty.contains("termbin"));

    let missing = BackendRegistry::load_dir(&dir.path().join("missing")).expect("load missing");
    assert_eq!(missing.len(), 2);
}

#[test]
fn load_dir_rejects_duplicate_names() {
    let dir = TempDir::new().expect("temp dir");
    write_document(&dir, "one.json", "same");
    write_document(&dir, "two.json", "same");

    match BackendRegistry::load_dir(dir.path()) {
        Err(LoadError::Registry { path, source }) => {
            assert_eq!(path, dir.path().join("two.json"));
            assert_eq!(source, RegistryError::DuplicateBackend("same".to_string()));
        }
        other => panic!("expected duplicate error, got {:?}", other),
    }
}

#[test]
fn load_dir_reports_invalid_documents_with_their_path() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("broken.json"), "{ not json").expect("write");

    match BackendRegistry::load_dir(dir.path()) {
        Err(LoadError::Descriptor { path, source }) => {
            assert_eq!(path, dir.path().join("broken.json"));
            assert!(matches!(source, DescriptorError::Json(_)));
        }
        other => panic!("expected descriptor error, got {:?}", other),
    }
}

#[test]
fn exported_defaults_load_back_identically() {
    let dir = TempDir::new().expect("temp dir");
    let written = bundled::export(dir.path(), false).expect("export");
    assert_eq!(written.len(), bundled::BUNDLED_DOCUMENTS.len());
    assert!(bundled::export(dir.path(), false).expect("re-export").is_empty());

    let loaded = BackendRegistry::load_dir(dir.path()).expect("load");
    let defaults = BackendRegistry::bundled().expect("bundled");
    for descriptor in defaults.all() {
        assert_eq!(loaded.lookup(descriptor.name()).expect("lookup"), *descriptor);
    }
}
