//! # limerc
//!
//! Command-line client for the LimeSurvey RemoteControl API. Every command
//! opens its own session and releases it before exiting.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use limerc_auth::{
    ChainedCredentials, CredentialSource, EnvCredentials, FileCredentials, PASSWORD_VAR,
    clear_credentials, credentials_file_path, save_credentials,
};
use limerc_core::{CallRequest, Credentials, RpcOutcome};
use limerc_rpc::{
    HttpTransport, IdSequence, SessionManager, SurveyClient, SurveyTool, invoke, render_error,
    render_value,
};
use limerc_settings::LimercSettings;
use serde_json::Value;

/// LimeSurvey RemoteControl client.
#[derive(Parser, Debug)]
#[command(name = "limerc", version, about = "LimeSurvey RemoteControl client")]
struct Cli {
    /// Base URL of the survey installation (overrides settings).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds (overrides settings).
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Log level (`RUST_LOG` still wins).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Credentials file (default `~/.limerc/credentials.json`).
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a command line such as `get_survey_properties 123`.
    Call {
        /// Method name followed by its arguments.
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Run a JSON call description `{"method": ..., "params": ...}`.
    Json {
        /// The call description.
        call: String,
    },
    /// Invoke a named tool with one line of input.
    Tool {
        /// Tool name (`list_surveys`, `create_survey`, ...).
        name: String,
        /// Tool input.
        #[arg(default_value = "")]
        input: String,
    },
    /// List the available tools.
    Tools,
    /// Log in, list surveys, and release, printing each step.
    Probe,
    /// Store or remove credentials in the credentials file.
    Login {
        /// Account name.
        #[arg(long)]
        username: Option<String>,
        /// Password (falls back to `LIMESURVEY_PASSWORD`).
        #[arg(long)]
        password: Option<String>,
        /// Remove the stored credentials instead.
        #[arg(long, conflicts_with_all = ["username", "password"])]
        clear: bool,
    },
}

impl Cli {
    fn credentials_path(&self) -> PathBuf {
        self.credentials
            .clone()
            .unwrap_or_else(|| credentials_file_path(&limerc_settings::data_dir()))
    }

    /// Settings with command-line overrides applied.
    fn settings(&self) -> Result<LimercSettings> {
        let mut settings = limerc_settings::load_settings().context("failed to load settings")?;
        if let Some(url) = &self.base_url {
            settings.endpoint.base_url.clone_from(url);
        }
        if let Some(ms) = self.timeout_ms {
            settings.endpoint.timeout_ms = ms;
        }
        settings
            .endpoint
            .validate()
            .context("invalid endpoint configuration")?;
        Ok(settings)
    }

    /// Environment first, then the credentials file.
    fn credential_source(&self) -> Arc<dyn CredentialSource> {
        Arc::new(
            ChainedCredentials::new()
                .with(Arc::new(EnvCredentials::default()))
                .with(Arc::new(FileCredentials::new(self.credentials_path()))),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    limerc_logging::init_from_settings(&settings.logging, cli.log_level.as_deref());
    tracing::debug!(url = %settings.endpoint.url(), "starting");

    match &cli.command {
        Command::Call { words } => {
            let mut client = survey_client(&cli, &settings)?;
            let outcome = client.execute(CallRequest::freeform(words.join(" "))).await;
            print_outcome(outcome)
        }
        Command::Json { call } => {
            let value: Value = serde_json::from_str(call).context("call is not valid JSON")?;
            let request = CallRequest::from_json(&value).context("invalid call description")?;
            let mut client = survey_client(&cli, &settings)?;
            print_outcome(client.execute(request).await)
        }
        Command::Tool { name, input } => {
            let tool: SurveyTool = name.parse()?;
            let mut client = survey_client(&cli, &settings)?;
            let output = invoke(&mut client, tool, input).await;
            println!("{output}");
            if output.starts_with("Error") {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Tools => {
            for tool in SurveyTool::ALL {
                println!("{:<24} {}", tool.name(), tool.description());
            }
            Ok(())
        }
        Command::Probe => probe(&cli, &settings).await,
        Command::Login {
            username,
            password,
            clear,
        } => login(&cli, username.as_deref(), password.as_deref(), *clear),
    }
}

fn survey_client(cli: &Cli, settings: &LimercSettings) -> Result<SurveyClient> {
    SurveyClient::from_settings(settings, cli.credential_source())
        .context("failed to build RPC client")
}

fn print_outcome(outcome: Result<RpcOutcome, limerc_rpc::RpcError>) -> Result<()> {
    match outcome {
        Ok(RpcOutcome::Success(value)) => {
            println!("{}", render_value(&value));
            Ok(())
        }
        Ok(RpcOutcome::Fault(fault)) => bail!("remote error: {fault}"),
        Err(e) => bail!("{}", render_error(&e)),
    }
}

/// Step-by-step connectivity check against the configured endpoint.
async fn probe(cli: &Cli, settings: &LimercSettings) -> Result<()> {
    let credentials = cli
        .credential_source()
        .credentials()
        .context("no credentials available")?;
    let transport =
        HttpTransport::from_settings(&settings.endpoint).context("failed to build HTTP client")?;

    println!("endpoint: {}", transport.url());
    println!("username: {}", credentials.username);

    let ids = Arc::new(IdSequence::new());
    let transport = Arc::new(transport);
    let mut sessions =
        SessionManager::new(transport.clone(), settings.endpoint.timeout(), ids.clone());

    println!("1. get_session_key");
    let token = match sessions.acquire(&credentials).await {
        Ok(token) => token.to_string(),
        Err(e) => bail!("   login failed: {}", render_error(&e)),
    };
    println!("   ok, session {}", limerc_core::redact_token(&token));

    println!("2. list_surveys");
    let envelope = limerc_core::RpcEnvelope::new(
        "list_surveys",
        vec![Value::String(token)],
        ids.next_id(),
    );
    let listed =
        limerc_rpc::round_trip(transport.as_ref(), &envelope, settings.endpoint.timeout()).await;
    match &listed {
        Ok(RpcOutcome::Success(Value::Array(surveys))) => {
            println!("   ok, {} survey(s)", surveys.len());
        }
        Ok(RpcOutcome::Success(other)) => println!("   ok, {}", render_value(other)),
        Ok(RpcOutcome::Fault(fault)) => println!("   remote error: {fault}"),
        Err(fault) => println!("   failed: {fault}"),
    }

    println!("3. release_session_key");
    sessions.release().await;
    println!("   done");

    if listed.is_err() {
        bail!("probe failed");
    }
    Ok(())
}

fn login(cli: &Cli, username: Option<&str>, password: Option<&str>, clear: bool) -> Result<()> {
    let path = cli.credentials_path();
    if clear {
        clear_credentials(&path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        println!("removed {}", path.display());
        return Ok(());
    }

    let Some(username) = username.filter(|u| !u.is_empty()) else {
        bail!("--username is required");
    };
    let password = match password {
        Some(p) => p.to_string(),
        None => std::env::var(PASSWORD_VAR)
            .with_context(|| format!("pass --password or set {PASSWORD_VAR}"))?,
    };

    save_credentials(&path, &Credentials::new(username, password))
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("saved credentials for {username} to {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
