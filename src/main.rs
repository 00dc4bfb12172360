//! Command-line entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use adm_tenders::application::ScrapeSession;
use adm_tenders::infrastructure::config::AppConfig;
use adm_tenders::infrastructure::logging::init_logging;
use adm_tenders::infrastructure::output::{write_csv, write_json};

#[derive(Debug, Parser)]
#[command(
    name = "adm-tenders",
    version,
    about = "Extract tender listings from the ADM public procurement portal"
)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV output path (overrides the configured one)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON output path (overrides the configured one)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Result-page size to request from the portal
    #[arg(long)]
    page_size: Option<u32>,

    /// Also fetch every tender's detail page and merge its fields
    #[arg(long)]
    details: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = AppConfig::load_or_default(cli.config.as_deref()).await?;
    if let Some(page_size) = cli.page_size {
        config.portal.page_size = page_size;
    }
    if let Some(csv) = cli.csv {
        config.output.csv_path = csv;
    }
    if let Some(json) = cli.json {
        config.output.json_path = json;
    }

    let session = ScrapeSession::new(config.clone())?;
    let mut outcome = session.run().await?;

    if outcome.tenders.is_empty() {
        warn!("no tenders found");
        return Ok(());
    }

    if cli.details {
        session.enrich_with_details(&mut outcome.tenders).await?;
    }

    write_csv(&outcome.tenders, &config.output.csv_path)?;
    write_json(
        &outcome.tenders,
        &config.portal.list_url,
        &config.output.json_path,
    )?;

    info!(
        "scraping completed: {} tenders extracted, outputs at {} and {}",
        outcome.tenders.len(),
        config.output.csv_path.display(),
        config.output.json_path.display()
    );
    Ok(())
}
