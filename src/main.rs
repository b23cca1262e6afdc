//! `resilient-exec`: run a command or fetch a URL with bounded retries.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI flags ──┐
//!               ├─▶ ExecutorConfig ─▶ RetryPolicy ─┐
//!   config.toml ┘        │                         ▼
//!                        │              ┌────────────────────┐
//!                        ├─▶ logging    │ ResilientExecutor  │◀── Ctrl+C
//!                        │              │  attempt ─▶ wait   │    (cancel)
//!                        └─▶ limiter ──▶│  attempt ─▶ wait   │
//!                                       │  ...               │
//!                                       └─────────┬──────────┘
//!                                                 ▼
//!                                       exit code / stdout
//! ```

use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use resilient_exec::commands::http::Fetcher;
use resilient_exec::commands::{plan, process};
use resilient_exec::config::{load_config, validate_config, ConfigError, ExecutorConfig, LogFormat};
use resilient_exec::lifecycle;
use resilient_exec::limits::RateLimiter;
use resilient_exec::observability::logging;
use resilient_exec::observability::metrics::{self, Outcome};
use resilient_exec::resilience::{ExecuteError, LogRetries, ResilientExecutor, RetryPolicy};

/// Exit code used when the run is interrupted.
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "resilient-exec")]
#[command(about = "Run commands and requests with exponential-backoff retries", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Total attempts, first try included.
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Delay before the first retry, in milliseconds.
    #[arg(long, global = true)]
    initial_delay_ms: Option<u64>,

    /// Factor applied to the delay after each failed attempt.
    #[arg(long, global = true)]
    backoff_multiplier: Option<f64>,

    /// Upper bound for any delay, in milliseconds.
    #[arg(long, global = true)]
    max_delay_ms: Option<u64>,

    /// Deadline for a single attempt, in milliseconds.
    #[arg(long, global = true)]
    attempt_timeout_ms: Option<u64>,

    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it exits successfully
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,
    },
    /// GET a URL until it answers with a 2xx status
    Fetch { url: String },
    /// Print the backoff schedule without executing anything
    Plan,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Flags win over the config file.
    fn apply_overrides(&self, config: &mut ExecutorConfig) {
        if let Some(v) = self.max_attempts {
            config.retry.max_attempts = v;
        }
        if let Some(v) = self.initial_delay_ms {
            config.retry.initial_delay_ms = v;
        }
        if let Some(v) = self.backoff_multiplier {
            config.retry.backoff_multiplier = v;
        }
        if let Some(v) = self.max_delay_ms {
            config.retry.max_delay_ms = v;
        }
        if let Some(v) = self.attempt_timeout_ms {
            config.timeouts.attempt_ms = Some(v);
        }
        if let Some(v) = self.log_format {
            config.observability.log_format = v.into();
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ExecutorConfig::default(),
    };
    cli.apply_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);

    let policy = RetryPolicy::try_from(&config.retry)?;
    let attempt_timeout = config.timeouts.attempt_ms.map(Duration::from_millis);

    tracing::debug!(
        max_attempts = policy.max_attempts(),
        initial_delay = ?policy.initial_delay(),
        backoff_multiplier = policy.backoff_multiplier(),
        max_delay = ?policy.max_delay(),
        attempt_timeout = ?attempt_timeout,
        "Configuration loaded"
    );

    let cancel = CancellationToken::new();
    let _watcher = lifecycle::cancel_on_ctrl_c(cancel.clone());
    let span = tracing::info_span!("run", run_id = %Uuid::new_v4());

    let code = match cli.command {
        Commands::Plan => {
            let plan = plan::plan(&policy);
            println!("{}", serde_json::to_string_pretty(&plan)?);
            ExitCode::SUCCESS
        }
        Commands::Run { argv } => {
            run_program(argv, policy, attempt_timeout, &cancel)
                .instrument(span)
                .await
        }
        Commands::Fetch { url } => {
            let url = Url::parse(&url)?;
            let limiter = config
                .rate_limit
                .enabled
                .then(|| RateLimiter::from_config(&config.rate_limit));
            let fetcher = Fetcher::new(reqwest::Client::new(), limiter, attempt_timeout);
            fetch_url(&fetcher, &url, policy, &cancel).instrument(span).await
        }
    };

    cancel.cancel();
    Ok(code)
}

async fn run_program(
    argv: Vec<String>,
    policy: RetryPolicy,
    attempt_timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> ExitCode {
    let Some((program, args)) = argv.split_first() else {
        return ExitCode::FAILURE;
    };

    tracing::info!(program = %program, max_attempts = policy.max_attempts(), "Running command");

    let result = ResilientExecutor::new(policy)
        .with_hook(LogRetries::new(program.as_str()))
        .execute_until_cancelled(|| process::run_once(program, args, attempt_timeout), cancel)
        .await;

    match finish(program, result) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Some(err)) => err
            .exit_code()
            .and_then(|code| u8::try_from(code).ok())
            .map(ExitCode::from)
            .unwrap_or(ExitCode::FAILURE),
        Err(None) => ExitCode::from(EXIT_CANCELLED),
    }
}

async fn fetch_url(
    fetcher: &Fetcher,
    url: &Url,
    policy: RetryPolicy,
    cancel: &CancellationToken,
) -> ExitCode {
    tracing::info!(url = %url, max_attempts = policy.max_attempts(), "Fetching");

    let result = ResilientExecutor::new(policy)
        .with_hook(LogRetries::new("fetch"))
        .execute_until_cancelled(|| fetcher.fetch_once(url), cancel)
        .await;

    match finish("fetch", result) {
        Ok(body) => {
            print!("{}", body);
            ExitCode::SUCCESS
        }
        Err(Some(_)) => ExitCode::FAILURE,
        Err(None) => ExitCode::from(EXIT_CANCELLED),
    }
}

/// Log and count the outcome. `Err(None)` means the run was cancelled.
fn finish<T, E: Display>(operation: &str, result: Result<T, ExecuteError<E>>) -> Result<T, Option<E>> {
    match result {
        Ok(value) => {
            metrics::record_outcome(operation, Outcome::Success);
            tracing::info!(operation, "Succeeded");
            Ok(value)
        }
        Err(ExecuteError::Operation(err)) => {
            metrics::record_outcome(operation, Outcome::Failure);
            tracing::error!(operation, error = %err, "Giving up after final attempt");
            Err(Some(err))
        }
        Err(ExecuteError::Cancelled { attempts, last_error }) => {
            metrics::record_outcome(operation, Outcome::Cancelled);
            match last_error {
                Some(err) => tracing::warn!(operation, attempts, last_error = %err, "Cancelled"),
                None => tracing::warn!(operation, attempts, "Cancelled"),
            }
            Err(None)
        }
    }
}
