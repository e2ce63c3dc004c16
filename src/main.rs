//! catalog-harvest - paginated catalog, review and testimonial harvester
//!
//! Runs every collector by default and writes one CSV per category.

use anyhow::Result;
use catalog_harvest::commands::{CollectorKind, RunCommand};
use catalog_harvest::config::Config;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "catalog-harvest",
    version,
    about = "Harvest products, reviews and testimonials into CSV files",
    long_about = "Walks a catalog's next-link pagination, a GraphQL review connection and a \
                  page-numbered testimonial feed, then writes products.csv, reviews.csv and \
                  testimonials.csv."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the CSV files
    #[arg(short, long, env = "HARVEST_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Site root (e.g., https://web-scraping.dev)
    #[arg(long, env = "HARVEST_BASE_URL")]
    base_url: Option<String>,

    /// Delay between pages in milliseconds
    #[arg(long, env = "HARVEST_DELAY")]
    delay: Option<u64>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, env = "HARVEST_PROXY")]
    proxy: Option<String>,

    /// Run only these collectors (comma-separated)
    #[arg(long, value_delimiter = ',')]
    only: Option<Vec<CollectorKind>>,

    /// Exit non-zero when any collector or write failed
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    let selection = cli.only.unwrap_or_else(|| CollectorKind::all().to_vec());

    let cmd = RunCommand::new(config);
    let report = cmd.execute(&selection).await?;
    println!("{}", report);

    if cli.strict && report.has_failures() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
