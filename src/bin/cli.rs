//! Housing Crawler CLI
//!
//! Single-run entry point: crawls every configured source, archives raw
//! page bodies, and writes the normalized relations. Exits nonzero only
//! for configuration errors; per-page failures are logged and absorbed.

use std::path::PathBuf;

use clap::Parser;
use housing_crawler::{
    error::Result,
    models::Config,
    pipeline::{run_pipeline, PipelineOptions},
    storage::{LocalStore, ObjectStore, S3Store},
    utils::http::HttpTransport,
};

/// Housing Crawler - property listing acquisition pipeline
#[derive(Parser, Debug)]
#[command(
    name = "housing-crawler",
    version,
    about = "Crawls property portals, archives raw pages, writes normalized CSVs"
)]
struct Cli {
    /// Path to the static directory containing per-source config files
    #[arg(short, long, default_value = "static")]
    static_dir: PathBuf,

    /// Seconds to wait between page requests
    #[arg(short, long, default_value_t = 2)]
    delay: u64,

    /// Disable raw page archival
    #[arg(long)]
    skip_raw: bool,

    /// Write to a local directory instead of S3
    #[arg(long)]
    local: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Housing crawler starting...");

    let config_path = cli.static_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    config.validate()?;

    log::info!(
        "Crawling sources: {} (delay {}s, raw archival {})",
        config.sources.join(", "),
        cli.delay,
        if cli.skip_raw { "off" } else { "on" }
    );

    let transport = HttpTransport::new(&config.crawler)?;
    let store: Box<dyn ObjectStore> = match &cli.local {
        Some(dir) => {
            log::info!("Writing to local directory {}", dir.display());
            Box::new(LocalStore::new(dir))
        }
        None => Box::new(S3Store::from_env(&config.crawler.bucket).await),
    };

    let options = PipelineOptions {
        delay_secs: cli.delay,
        save_raw: !cli.skip_raw,
    };

    run_pipeline(&config, &cli.static_dir, &transport, store.as_ref(), &options).await?;

    log::info!("Done!");

    Ok(())
}
