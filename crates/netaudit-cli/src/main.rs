// netaudit-cli/src/main.rs
// ============================================================================
// Module: Netaudit CLI Entry Point
// Description: Command surface for network-device state validation runs.
// Purpose: Wire catalog, classifier, probe, engine, and aggregator into one run.
// Dependencies: clap, netaudit-catalog, netaudit-core, netaudit-transport, serde_json, tokio.
// ============================================================================

//! ## Overview
//! The netaudit CLI discovers the test catalog, builds the execution context
//! from its arguments, and runs the orchestrator. stdout carries exactly one
//! pretty-printed JSON document and the process always exits 0; calling
//! automation reads the payload's `status` field, never the exit code.
//! Diagnostics go to stderr through `tracing`.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgGroup;
use clap::Parser;
use clap::ValueEnum;
use netaudit_catalog::discover;
use netaudit_core::Credentials;
use netaudit_core::EngineConfig;
use netaudit_core::EnvironmentTier;
use netaudit_core::ExecutionContext;
use netaudit_core::ExecutionEngine;
use netaudit_core::HostName;
use netaudit_core::Orchestrator;
use netaudit_core::OrchestratorConfig;
use netaudit_core::TestSelection;
use netaudit_transport::CacheDetailExtractor;
use netaudit_transport::CommandExecutor;
use netaudit_transport::CommandExecutorConfig;
use netaudit_transport::TcpProbe;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable consulted when `--password` is absent.
///
/// This read happens here at the outermost layer only; deeper components
/// receive credentials through the execution context.
const PASSWORD_ENV: &str = "NETAUDIT_PASSWORD";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "netaudit",
    about = "Validate network-device state with environment-gated declarative tests",
    group = ArgGroup::new("targets").args(["hostname", "hostnames"]).multiple(false)
)]
struct Cli {
    /// Single target host.
    #[arg(long)]
    hostname: Option<String>,

    /// Comma-separated list of target hosts.
    #[arg(long)]
    hostnames: Option<String>,

    /// Device login user name.
    #[arg(long)]
    username: Option<String>,

    /// Device login password; falls back to the NETAUDIT_PASSWORD variable.
    #[arg(long)]
    password: Option<String>,

    /// Comma-separated test names; default is every environment-appropriate test.
    #[arg(long)]
    tests: Option<String>,

    /// Target environment tier.
    #[arg(long, value_enum, default_value_t = EnvironmentArg::Development)]
    environment: EnvironmentArg,

    /// Print the discovered-test catalog as JSON and exit without executing.
    #[arg(long = "list_tests")]
    list_tests: bool,

    /// Directory holding test-definition files.
    #[arg(long = "test_dir", default_value = "device_tests")]
    test_dir: PathBuf,

    /// Directory holding raw response artifacts for detail extraction.
    #[arg(long = "cache_dir", default_value = ".netaudit-cache")]
    cache_dir: PathBuf,

    /// Management TCP port probed before execution.
    #[arg(long, default_value_t = 22)]
    port: u16,

    /// Device-session helper program executing the checks.
    #[arg(long = "session_helper", default_value = "netaudit-session")]
    session_helper: PathBuf,
}

/// CLI selection of the target environment tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EnvironmentArg {
    /// Development or lab devices.
    Development,
    /// Pre-production staging devices.
    Staging,
    /// Production devices.
    Production,
}

/// Converts CLI tier selections into core tiers.
impl From<EnvironmentArg> for EnvironmentTier {
    fn from(value: EnvironmentArg) -> Self {
        match value {
            EnvironmentArg::Development => Self::Development,
            EnvironmentArg::Staging => Self::Staging,
            EnvironmentArg::Production => Self::Production,
        }
    }
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// Fatal orchestration-level error rendered as a `status: error` payload.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
struct CliError {
    /// Explanation surfaced in the JSON payload.
    message: String,
}

impl CliError {
    /// Creates a new CLI error.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if error.use_stderr() => {
            // Malformed input still honors the exit-0 contract: the failure
            // travels in the JSON payload.
            let payload = error_payload(EnvironmentTier::Development, &error.to_string());
            return emit(&payload);
        }
        Err(help_or_version) => {
            let _ = help_or_version.print();
            return ExitCode::SUCCESS;
        }
    };

    let environment = EnvironmentTier::from(cli.environment);
    let payload = match run(cli).await {
        Ok(payload) => payload,
        Err(error) => error_payload(environment, &error.message),
    };
    emit(&payload)
}

/// Runs discovery plus either the listing or a full orchestrated run.
async fn run(cli: Cli) -> Result<Value, CliError> {
    let catalog = discover(&cli.test_dir).map_err(|error| CliError::new(error.to_string()))?;

    if cli.list_tests {
        return Ok(catalog.listing());
    }

    let context = build_context(&cli)?;
    let report = orchestrator(&cli).execute(&catalog.ordered(), &context).await;
    serde_json::to_value(report).map_err(|error| CliError::new(format!("render failed: {error}")))
}

// ============================================================================
// SECTION: Context Construction
// ============================================================================

/// Builds the immutable execution context from CLI input.
fn build_context(cli: &Cli) -> Result<ExecutionContext, CliError> {
    let hosts = parse_hosts(cli.hostname.as_deref(), cli.hostnames.as_deref())?;

    let Some(username) = cli.username.clone().filter(|username| !username.is_empty()) else {
        return Err(CliError::new("--username is required"));
    };
    let password = match cli.password.clone() {
        Some(password) => password,
        None => std::env::var(PASSWORD_ENV).map_err(|_| {
            CliError::new(format!("--password or {PASSWORD_ENV} is required"))
        })?,
    };

    Ok(ExecutionContext {
        environment: EnvironmentTier::from(cli.environment),
        hosts,
        credentials: Credentials {
            username,
            password,
        },
        selection: parse_selection(cli.tests.as_deref()),
    })
}

/// Parses the mutually exclusive host arguments into an ordered host list.
fn parse_hosts(
    hostname: Option<&str>,
    hostnames: Option<&str>,
) -> Result<Vec<HostName>, CliError> {
    let raw = match (hostname, hostnames) {
        (Some(single), None) => single.to_string(),
        (None, Some(many)) => many.to_string(),
        (None, None) => {
            return Err(CliError::new("one of --hostname or --hostnames is required"));
        }
        (Some(_), Some(_)) => {
            return Err(CliError::new("--hostname and --hostnames are mutually exclusive"));
        }
    };

    let hosts: Vec<HostName> = raw
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(HostName::from)
        .collect();
    if hosts.is_empty() {
        return Err(CliError::new("no target hosts given"));
    }
    Ok(hosts)
}

/// Parses the optional comma-separated test selection.
fn parse_selection(tests: Option<&str>) -> TestSelection {
    let Some(tests) = tests else {
        return TestSelection::All;
    };
    let names: Vec<_> = tests
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Into::into)
        .collect();
    if names.is_empty() { TestSelection::All } else { TestSelection::Named(names) }
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Wires the orchestrator over the concrete transport collaborators.
fn orchestrator(cli: &Cli) -> Orchestrator {
    let executor = CommandExecutor::new(CommandExecutorConfig {
        program: cli.session_helper.clone(),
        extra_args: Vec::new(),
        cache_dir: cli.cache_dir.clone(),
    });
    let extractor = CacheDetailExtractor::new(cli.cache_dir.clone());
    let engine =
        ExecutionEngine::new(Arc::new(executor), Arc::new(extractor), EngineConfig::default());
    Orchestrator::new(
        Arc::new(TcpProbe),
        engine,
        OrchestratorConfig {
            probe_port: cli.port,
            ..OrchestratorConfig::default()
        },
    )
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Builds the `status: error` payload for a fatal orchestration error.
fn error_payload(environment: EnvironmentTier, message: &str) -> Value {
    json!({
        "status": "error",
        "environment": environment,
        "message": message,
    })
}

/// Writes the payload to stdout as pretty JSON. Always exits 0.
fn emit(payload: &Value) -> ExitCode {
    let rendered = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|_| r#"{"status":"error","message":"render failed"}"#.to_string());
    let mut stdout = std::io::stdout();
    if let Err(error) = writeln!(&mut stdout, "{rendered}") {
        tracing::error!(%error, "cannot write report to stdout");
    }
    ExitCode::SUCCESS
}

/// Installs the stderr tracing subscriber, honoring `RUST_LOG`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("netaudit=info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
