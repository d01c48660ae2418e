use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use octosync::sync::log_decisions;
use octosync::{Config, GitHubClient, Reconciler, Settings};

#[derive(Parser)]
#[command(name = "octosync")]
#[command(about = "Decide whether each repository of a GitHub organization should be cloned or fetched")]
#[command(version)]
struct Cli {
    /// Name of GitHub org to sync. Defaults to name of current working directory
    org_name: Option<String>,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Output format for the decisions
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(clap::ValueEnum, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Log decisions line by line
    Text,

    /// Also print the decisions as a JSON array on stdout
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_or_default(),
    };

    // Logging must exist before a config error can be reported
    let level = match &config {
        Ok(c) => c.logging.level_filter(),
        Err(_) => Ok(LevelFilter::INFO),
    };
    init_logging(cli.debug, level.clone().unwrap_or(LevelFilter::INFO));

    if let Err(invalid) = level {
        warn!("Ignoring invalid logging.level '{}', using info", invalid);
    }

    let config = config?;
    info!("Starting octosync v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::resolve(cli.org_name.as_deref(), &config)?;
    let client = GitHubClient::new(&settings.token)?;
    let reconciler = Reconciler::new(Arc::new(client), &settings);

    let (decisions, _summary) = tokio::select! {
        result = reconciler.reconcile_with_summary(&settings.org) => result?,
        _ = tokio::signal::ctrl_c() => bail!("Interrupted"),
    };

    log_decisions(&decisions);

    if cli.format == OutputFormat::Json {
        let json =
            serde_json::to_string_pretty(&decisions).context("Failed to serialize decisions")?;
        println!("{}", json);
    }

    Ok(())
}

/// Initialize logging on stderr; `RUST_LOG` overrides the configured level
fn init_logging(debug: bool, level: LevelFilter) {
    let default_level = if debug { LevelFilter::DEBUG } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
