//! statusboard - service status checks from the command line
//!
//! ## Commands
//!
//! - `check`: resolve targets, probe them, and print the status report
//! - `targets`: print the resolved target list without probing
//! - `report`: print a pre-filled issue-report mail link

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use statusboard_core::{
    compose_issue_link, load_sources, render_text, resolve_targets, Clock, StatusBoard,
    StatusConfig, StatusReport, SystemClock, UuidLabels,
};
use std::io::Write;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "statusboard")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Service status checks with repository freshness", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    pass: PassArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Settings shared by every command that resolves targets.
#[derive(Args, Clone)]
struct PassArgs {
    /// Domain the checked services live under
    #[arg(long, global = true, env = "STATUSBOARD_DOMAIN")]
    domain: Option<String>,

    /// Local override document (file path or URL)
    #[arg(long, global = true, env = "STATUSBOARD_LOCAL_CONFIG")]
    local_config: Option<String>,

    /// Remote registry document URL
    #[arg(long, global = true, env = "STATUSBOARD_REGISTRY")]
    registry: Option<String>,

    /// Latency at or above which a service is reported slow (ms)
    #[arg(long, global = true, env = "STATUSBOARD_WARN_MS")]
    warn_ms: Option<u64>,

    /// Hard deadline for each probe (ms)
    #[arg(long, global = true, env = "STATUSBOARD_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Repository metadata API base URL
    #[arg(long, global = true, env = "STATUSBOARD_REPO_API")]
    repo_api: Option<String>,

    /// Issue report recipient
    #[arg(long, global = true, env = "STATUSBOARD_ISSUE_EMAIL")]
    issue_email: Option<String>,
}

impl PassArgs {
    fn to_config(&self) -> StatusConfig {
        let mut config = StatusConfig::default();
        if let Some(domain) = &self.domain {
            config = config.with_domain(domain);
        }
        if let Some(location) = &self.local_config {
            config = config.with_local_config(location);
        }
        if let Some(url) = &self.registry {
            config = config.with_registry_url(url);
        }
        let warn_ms = self.warn_ms.unwrap_or(config.warn_ms);
        let timeout_ms = self.timeout_ms.unwrap_or(config.timeout_ms);
        config = config.with_thresholds(warn_ms, timeout_ms);
        if let Some(base) = &self.repo_api {
            config = config.with_repo_api_base(base);
        }
        if let Some(email) = &self.issue_email {
            config = config.with_issue_email(email);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every target and print the status report
    Check {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip repository freshness lookups
        #[arg(long)]
        no_repos: bool,

        /// Exit non-zero when any service is down
        #[arg(long)]
        strict: bool,
    },

    /// Print the resolved target list without probing
    Targets {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print a pre-filled issue-report mail link
    Report {
        /// Do not run a pass first (no repository context in the report)
        #[arg(long)]
        no_pass: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    statusboard_core::init_tracing(cli.json_logs, level);

    let config = cli.pass.to_config();
    let command = cli.command.unwrap_or(Commands::Check {
        format: OutputFormat::Text,
        no_repos: false,
        strict: false,
    });

    match command {
        Commands::Check {
            format,
            no_repos,
            strict,
        } => cmd_check(config, format, no_repos, strict).await,
        Commands::Targets { format } => cmd_targets(config, format).await,
        Commands::Report { no_pass } => cmd_report(config, no_pass).await,
    }
}

fn build_board(config: StatusConfig, no_repos: bool) -> Result<StatusBoard> {
    let board = StatusBoard::from_config(config).context("Failed to build HTTP client")?;
    Ok(if no_repos { board.without_repos() } else { board })
}

async fn cmd_check(
    config: StatusConfig,
    format: OutputFormat,
    no_repos: bool,
    strict: bool,
) -> Result<()> {
    let board = build_board(config, no_repos)?;
    info!(domain = %board.config().domain, "Checking services");

    let report = board.run().await;
    print_report(&report, format)?;

    if strict && report.tally.down > 0 {
        anyhow::bail!("{} service(s) down", report.tally.down);
    }
    Ok(())
}

fn print_report(report: &StatusReport, format: OutputFormat) -> Result<()> {
    let out = match format {
        OutputFormat::Text => render_text(report, SystemClock.now()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")? + "\n"
        }
    };
    std::io::stdout()
        .write_all(out.as_bytes())
        .context("Failed to write report")
}

async fn cmd_targets(config: StatusConfig, format: OutputFormat) -> Result<()> {
    let client = statusboard_core::sources::http_client().context("Failed to build HTTP client")?;
    let fetcher = statusboard_core::HttpFetcher::new(client).with_timeout(config.timeout());

    let sources = load_sources(&fetcher, &config).await;
    let targets = resolve_targets(
        &config,
        &sources.local,
        &sources.registry,
        &SystemClock,
        &UuidLabels,
    );

    match format {
        OutputFormat::Text => {
            for target in &targets {
                println!("{:<24} {}", target.name, target.url);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&targets).context("Failed to serialize targets")?
            );
        }
    }
    Ok(())
}

async fn cmd_report(config: StatusConfig, no_pass: bool) -> Result<()> {
    let context = if no_pass {
        None
    } else {
        let board = build_board(config.clone(), false)?;
        board.run().await.issue_context()
    };

    let now = chrono::Local::now();
    println!("{}", compose_issue_link(&config, &now, context.as_deref()));
    Ok(())
}
