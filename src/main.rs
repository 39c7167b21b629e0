//! Sumi-Fetch main entry point
//!
//! This is the command-line interface for the Sumi-Fetch downloader.

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use sumi_fetch::config::{load_config_with_hash, validate, Config};
use sumi_fetch::fetcher::{PooledFetcher, SequentialFetcher};
use sumi_fetch::output::{format_result, print_statistics, FetchStatistics};
use sumi_fetch::FetchResult;
use tracing_subscriber::EnvFilter;

/// Sumi-Fetch: fetch web resources for a crawler
///
/// Fetches every given URL, either one at a time or on a fixed-size worker
/// pool, and prints one line per URL in input order. A failing URL never
/// stops the others.
#[derive(Parser, Debug)]
#[command(name = "sumi-fetch")]
#[command(version = "1.0.0")]
#[command(about = "Fetch URLs sequentially or on a worker pool", long_about = None)]
struct Cli {
    /// URLs to fetch
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Read additional URLs from a file, one per line ("-" for stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Fetch one URL at a time instead of using the worker pool
    #[arg(long, conflicts_with = "pool_size")]
    sequential: bool,

    /// Number of pool workers (overrides the config file)
    #[arg(long, value_name = "N")]
    pool_size: Option<usize>,

    /// Per-request timeout in seconds (overrides the config file)
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Validate config and show what would be fetched without fetching
    #[arg(long)]
    dry_run: bool,

    /// Do not print statistics after the results
    #[arg(long)]
    no_stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    if cli.dry_run {
        return handle_dry_run(&cli, &config);
    }

    let requests = request_lines(&cli)?;

    let results = if cli.sequential {
        tracing::info!(
            "Fetching sequentially (timeout {}s)",
            config.fetcher.timeout
        );
        let fetcher = SequentialFetcher::from_config(&config)?;
        fetcher.try_get(requests).await?
    } else {
        tracing::info!(
            "Fetching with {} workers (timeout {}s)",
            config.fetcher.pool_size,
            config.fetcher.timeout
        );
        let fetcher = PooledFetcher::from_config(&config)?;
        let results = fetcher.try_get(requests).await?;
        fetcher.shutdown().await;
        results
    };

    report(&cli, &results);

    let failed = results.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        tracing::warn!("{} of {} requests failed", failed, results.len());
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_fetch=info,warn"),
            1 => EnvFilter::new("sumi_fetch=debug,info"),
            2 => EnvFilter::new("sumi_fetch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stderr)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(pool_size) = cli.pool_size {
        config.fetcher.pool_size = pool_size;
    }
    if let Some(timeout) = cli.timeout {
        config.fetcher.timeout = timeout;
    }
    validate(&config).context("Invalid command-line override")?;

    Ok(config)
}

/// URLs from the command line followed by the lines of `--input`
///
/// File lines are read lazily; blank lines and `#` comments are skipped.
fn request_lines(cli: &Cli) -> anyhow::Result<Box<dyn Iterator<Item = io::Result<String>>>> {
    let from_args = cli.urls.clone().into_iter().map(Ok);

    let from_file: Box<dyn Iterator<Item = io::Result<String>>> = match &cli.input {
        None => Box::new(std::iter::empty()),
        Some(path) => Box::new(
            open_input(path)?
                .lines()
                .map(|line| line.map(|l| l.trim().to_string()))
                .filter(|line| {
                    line.as_ref()
                        .map(|l| !l.is_empty() && !l.starts_with('#'))
                        .unwrap_or(true)
                }),
        ),
    };

    Ok(Box::new(from_args.chain(from_file)))
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open input {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Handles the --dry-run mode: shows the configuration and the URLs
fn handle_dry_run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    println!("=== Sumi-Fetch Dry Run ===\n");

    println!("Fetcher Configuration:");
    if cli.sequential {
        println!("  Mode: sequential");
    } else {
        println!("  Mode: pooled ({} workers)", config.fetcher.pool_size);
    }
    println!("  Timeout: {}s", config.fetcher.timeout);
    println!("  Error for status: {}", config.fetcher.error_for_status);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent_string());

    if !config.headers.is_empty() {
        println!("\nDefault Headers ({}):", config.headers.len());
        for (name, value) in &config.headers {
            println!("  {}: {}", name, value);
        }
    }

    let urls = request_lines(cli)?.collect::<io::Result<Vec<_>>>()?;
    println!("\nURLs ({}):", urls.len());
    for url in &urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Prints one line per result, then the statistics
fn report(cli: &Cli, results: &[FetchResult]) {
    if cli.quiet {
        return;
    }

    for result in results {
        println!("{}", format_result(result));
    }

    if !cli.no_stats {
        println!();
        print_statistics(&FetchStatistics::from_results(results));
    }
}
