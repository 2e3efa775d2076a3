//! Filmow Exporter main entry point
//!
//! This is the command-line interface for exporting a user's watched movies.

use anyhow::Context;
use clap::Parser;
use filmow_exporter::config::{load_config_with_hash, validate, Config};
use filmow_exporter::crawler::{check_user, export, CrawlProgress, Orchestrator};
use filmow_exporter::output::{print_statistics, CsvSink};
use filmow_exporter::ExporterError;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Filmow Exporter: export a user's watched movies to CSV
///
/// Crawls every "already watched" listing page of the user, follows each movie
/// to its detail page and writes `<user>.csv` with the columns
/// Title, Directors, Year and Rating.
#[derive(Parser, Debug)]
#[command(name = "filmow-exporter")]
#[command(version)]
#[command(about = "Export a filmow.com user's watched movies", long_about = None)]
struct Cli {
    /// Username whose watched movies are exported
    #[arg(value_name = "USER")]
    user: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the CSV file is written to (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Base URL of the site (overrides the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only check that the user exists and print the result as JSON
    #[arg(long)]
    check: bool,
}

/// Payload printed by `--check`
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum UserCheck<'a> {
    Found { hello: &'a str },
    Missing { error: &'static str },
}

/// Exit code for a user without a profile
const EXIT_INVALID_USER: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.check {
        handle_check(&config, &cli.user).await
    } else {
        handle_export(config, &cli.user, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("filmow_exporter=info,warn"),
            1 => EnvFilter::new("filmow_exporter=debug,info"),
            2 => EnvFilter::new("filmow_exporter=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if given, then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }
    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles `--check`: prints `{"hello": user}` or `{"error": "invalid user"}`
async fn handle_check(config: &Config, user: &str) -> anyhow::Result<ExitCode> {
    let exists = check_user(config, user)
        .await
        .with_context(|| format!("failed to check user '{}'", user))?;

    let payload = if exists {
        UserCheck::Found { hello: user }
    } else {
        UserCheck::Missing {
            error: "invalid user",
        }
    };
    println!("{}", serde_json::to_string(&payload)?);

    Ok(if exists {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID_USER)
    })
}

/// Handles the main export operation
async fn handle_export(config: Config, user: &str, quiet: bool) -> anyhow::Result<ExitCode> {
    tracing::info!("Exporting watched movies of '{}' from {}", user, config.site.base_url);

    let mut sink = CsvSink::new(&config.output.directory);
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let reporter = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event {
                CrawlProgress::PagesDiscovered { total } => {
                    tracing::info!("Crawling {} listing page(s)", total)
                }
                CrawlProgress::PageCompleted {
                    completed, total, ..
                } => tracing::debug!("done: {}/{}", completed, total),
            }
        }
    });

    let orchestrator = Orchestrator::new(config, user).with_progress(sender);
    let result = export(orchestrator, &mut sink).await;
    // Every sender is gone once the orchestrator is dropped inside `export`
    let _ = reporter.await;

    match result {
        Ok(stats) => {
            if !quiet {
                print_statistics(user, &stats);
                if let Some(path) = sink.last_path() {
                    println!("\n✓ Exported to: {}", path.display());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(ExporterError::InvalidUser { user }) => {
            eprintln!("User '{}' does not exist; nothing was exported", user);
            Ok(ExitCode::from(EXIT_INVALID_USER))
        }
        Err(e) => Err(e).context(format!("export of '{}' failed", user)),
    }
}
