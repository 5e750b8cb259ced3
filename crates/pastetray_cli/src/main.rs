//! Command-line driver for PasteTray.

use anyhow::{bail, Context};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use pastetray_core::backend::bundled;
use pastetray_core::{
    BackendDescriptor, Config, Expiry, Parameter, PasteRequest, PasteResult, Session,
    DEFAULT_POLL_INTERVAL,
};
use serde_json::{json, Value};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ptray", about = "Post text to online pastebins", version)]
struct Cli {
    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Connect timeout in seconds (default: PASTETRAY_CONNECT_TIMEOUT_SECS or 10)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    connect_timeout: Option<u64>,

    /// Read timeout in seconds (default: PASTETRAY_READ_TIMEOUT_SECS or 30)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    read_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured pastebins
    Backends,
    /// Describe one pastebin
    Show { name: String },
    /// Submit text and print the paste URL
    Paste(PasteArgs),
    /// List recent pastes, newest first
    History,
    /// Forget all recent pastes
    ClearHistory,
    /// Write the bundled pastebin documents to the config directory
    InitBackends {
        /// Overwrite documents that already exist
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct PasteArgs {
    /// Pastebin to post to
    #[arg(short, long, env = "PASTETRAY_BACKEND", default_value = "dpaste")]
    backend: String,
    /// Read content from this file instead of stdin ("-" means stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,
    #[arg(short, long)]
    title: Option<String>,
    /// Syntax label as listed by `ptray show`
    #[arg(short, long)]
    syntax: Option<String>,
    /// Poster name (default: login name)
    #[arg(short, long)]
    username: Option<String>,
    /// Lifetime in days, or "never"
    #[arg(short, long, value_parser = parse_expiry)]
    expiry: Option<Expiry>,
}

fn parse_expiry(value: &str) -> Result<Expiry, String> {
    value.parse()
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("pastetray=warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn login_name() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(secs) = cli.connect_timeout {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.read_timeout {
        config.read_timeout = Duration::from_secs(secs);
    }
    config
}

fn read_content(file: Option<&PathBuf>, stdin: &mut dyn Read) -> anyhow::Result<String> {
    let content = match file {
        Some(path) if path.as_path() != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    if content.trim().is_empty() {
        bail!("nothing to paste: content is empty");
    }
    Ok(content)
}

/// Whether `parameter` may be forwarded; warns when a given value is dropped.
fn forwards(backend: &BackendDescriptor, parameter: Parameter, given: bool) -> bool {
    let accepted = backend.accepts(parameter);
    if given && !accepted {
        warn!("{} does not accept {}; ignoring it", backend.name(), parameter);
    }
    accepted
}

/// Build a request carrying only what `backend` accepts.
///
/// Username falls back to `login`, expiry to the backend's first choice.
fn build_request(
    backend: Arc<BackendDescriptor>,
    content: String,
    args: &PasteArgs,
    login: Option<String>,
) -> anyhow::Result<PasteRequest> {
    let mut builder = PasteRequest::builder(Arc::clone(&backend), content);

    if forwards(&backend, Parameter::Title, args.title.is_some()) {
        if let Some(title) = &args.title {
            builder = builder.title(title.as_str());
        }
    }
    if forwards(&backend, Parameter::Syntax, args.syntax.is_some()) {
        if let Some(label) = &args.syntax {
            builder = builder.syntax(label.as_str());
        }
    }
    if forwards(&backend, Parameter::Username, args.username.is_some()) {
        if let Some(username) = args.username.clone().or(login) {
            builder = builder.username(username);
        }
    }
    if forwards(&backend, Parameter::ExpiryDays, args.expiry.is_some()) {
        let expiry = args
            .expiry
            .or_else(|| backend.expiry_choices().first().copied());
        if let Some(expiry) = expiry {
            builder = builder.expiry(expiry);
        }
    }

    builder
        .build()
        .with_context(|| format!("cannot paste to {}", backend.name()))
}

fn accepted_names(backend: &BackendDescriptor) -> Vec<&'static str> {
    backend.accepted_parameters().map(Parameter::as_str).collect()
}

fn expiry_names(backend: &BackendDescriptor) -> Vec<String> {
    backend
        .expiry_choices()
        .iter()
        .map(Expiry::to_string)
        .collect()
}

fn backend_summary(backend: &BackendDescriptor) -> Value {
    json!({
        "name": backend.name(),
        "url": backend.url(),
        "transport": backend.transport().kind(),
        "accepts": accepted_names(backend),
        "default_syntax": backend.default_syntax(),
        "expiry_choices": backend.expiry_choices(),
    })
}

fn format_backends_output(
    backends: &[Arc<BackendDescriptor>],
    json: bool,
) -> Result<String, serde_json::Error> {
    if json {
        let summaries: Vec<Value> = backends.iter().map(|b| backend_summary(b)).collect();
        return serde_json::to_string_pretty(&summaries);
    }

    let mut rows = vec![format!(
        "{:<12} {:<9} {:<26} {}",
        "NAME", "TRANSPORT", "URL", "PARAMETERS"
    )];
    for backend in backends {
        rows.push(format!(
            "{:<12} {:<9} {:<26} {}",
            backend.name(),
            backend.transport().kind(),
            backend.url(),
            accepted_names(backend).join(",")
        ));
    }
    Ok(rows.join("\n"))
}

fn format_show_output(backend: &BackendDescriptor, json: bool) -> Result<String, serde_json::Error> {
    if json {
        let mut summary = backend_summary(backend);
        if backend.accepts(Parameter::Syntax) {
            summary["syntax_choices"] = json!(backend.sorted_syntax_labels());
        }
        return serde_json::to_string_pretty(&summary);
    }

    let mut lines = vec![
        format!("{} ({})", backend.name(), backend.url()),
        format!("transport: {}", backend.transport().kind()),
        format!("accepts: {}", accepted_names(backend).join(", ")),
    ];
    if backend.accepts(Parameter::Syntax) {
        let labels = backend.sorted_syntax_labels();
        lines.push(format!(
            "syntax: {} choices, default '{}'",
            labels.len(),
            backend.default_syntax().unwrap_or("none")
        ));
        lines.extend(labels.iter().map(|label| format!("  {}", label)));
    }
    lines.push(format!("expiry: {}", expiry_names(backend).join(", ")));
    Ok(lines.join("\n"))
}

fn format_history_output(urls: &[String], json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(urls);
    }
    if urls.is_empty() {
        return Ok("(no pastes)".to_string());
    }
    Ok(urls
        .iter()
        .enumerate()
        .map(|(index, url)| format!("{}. {}", index + 1, url))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn paste(
    session: &mut Session,
    args: &PasteArgs,
    stdin: &mut dyn Read,
) -> anyhow::Result<PasteResult> {
    let backend = session.backend(&args.backend)?;
    let content = read_content(args.file.as_ref(), stdin)?;
    let request = build_request(backend, content, args, login_name())?;

    let started = Instant::now();
    let mut task = session.submit(request)?;
    let mut polls = 0_u32;
    task.wait(DEFAULT_POLL_INTERVAL, || polls += 1)?;
    debug!(polls, elapsed_ms = started.elapsed().as_millis() as u64, "submission finished");

    let result = session.complete(&mut task)?;
    if let Some(url) = result.url() {
        // The paste already exists remotely.
        if let Err(err) = session.save_history() {
            warn!("paste created at {} but history was not saved: {:#}", url, err);
        }
    }
    Ok(result)
}

/// Execute one non-completion command against `config`.
fn run(cli: Cli, config: Config, stdin: &mut dyn Read, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = apply_overrides(config, &cli);
    let json = cli.json;

    match cli.command {
        Commands::Completions { .. } => bail!("completions are written by main"),
        Commands::InitBackends { force } => {
            let dir = config.pastebins_dir();
            let written = bundled::export(&dir, force)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&written)?)?;
            } else if written.is_empty() {
                writeln!(out, "{} already has every bundled document (use --force)", dir.display())?;
            } else {
                for path in written {
                    writeln!(out, "wrote {}", path.display())?;
                }
            }
        }
        Commands::Backends => {
            let session = Session::open(config)?;
            let output = format_backends_output(&session.registry().sorted(), json)?;
            writeln!(out, "{}", output)?;
        }
        Commands::Show { name } => {
            let session = Session::open(config)?;
            let backend = session.backend(&name)?;
            writeln!(out, "{}", format_show_output(&backend, json)?)?;
        }
        Commands::History => {
            let session = Session::open(config)?;
            writeln!(out, "{}", format_history_output(&session.history().all(), json)?)?;
        }
        Commands::ClearHistory => {
            let mut session = Session::open(config)?;
            let cleared = session.history().len();
            session.clear_history();
            session.save_history()?;
            if json {
                writeln!(out, "{}", json!({ "cleared": cleared }))?;
            } else {
                writeln!(out, "Cleared {} recent paste(s)", cleared)?;
            }
        }
        Commands::Paste(args) => {
            let mut session = Session::open(config)?;
            let result = paste(&mut session, &args, stdin)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
            }
            match result {
                PasteResult::Success { url } => {
                    if !json {
                        writeln!(out, "{}", url)?;
                    }
                }
                failure => bail!("{}", failure),
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, Config::from_env(), &mut io::stdin(), &mut out)
}
