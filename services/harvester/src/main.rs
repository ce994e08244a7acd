//! Climate dataset harvester.
//!
//! Expands the coverage catalog into concrete dataset identifiers,
//! resolves each one to a URL on a THREDDS server (consulting the
//! server's catalog listings for wildcard patterns), and downloads the
//! datasets in fixed-size concurrent batches.

mod config;
mod crawler;
mod download;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use coverage_catalog::ValueFilter;
use thredds_client::{fnmatch, resolve_datasets, DatasetResolver, HttpCatalogFetch};

use crawler::DEFAULT_BATCH_SIZE;
use download::{DownloadConfig, Downloader};

#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(about = "Downloads climate coverage datasets from a THREDDS server")]
struct Args {
    /// Base URL of the THREDDS server
    #[arg(long, env = "THREDDS_BASE_URL")]
    catalog_url: String,

    /// Configuration directory (contains parameters.yaml and coverages/)
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Directory for downloaded datasets
    #[arg(long, default_value = "datasets")]
    output_dir: PathBuf,

    /// Only crawl configurations whose identifier matches this wildcard
    #[arg(long)]
    coverage: Option<String>,

    /// Restrict a parameter to a value, as name=value (repeatable)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Concurrent downloads per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Re-download datasets that already exist locally
    #[arg(long)]
    force_download: bool,

    /// Catalog lookup timeout in seconds
    #[arg(long, default_value = "30")]
    catalog_timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Parse repeated `--filter name=value` arguments.
fn parse_filters(raw: &[String]) -> Result<Option<ValueFilter>> {
    if raw.is_empty() {
        return Ok(None);
    }

    let mut pairs = Vec::with_capacity(raw.len());
    for entry in raw {
        let (parameter, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid filter '{}', expected name=value", entry))?;
        if parameter.is_empty() || value.is_empty() {
            return Err(anyhow!("Invalid filter '{}', expected name=value", entry));
        }
        pairs.push((parameter.to_string(), value.to_string()));
    }

    Ok(Some(ValueFilter::from_pairs(pairs)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting climate dataset harvester");

    let catalog = config::load_catalog(&args.config_dir)?;
    config::validate_catalog(&catalog);

    let configurations: Vec<_> = match &args.coverage {
        Some(pattern) => catalog
            .coverage_configurations
            .iter()
            .filter(|c| fnmatch(pattern, &c.identifier))
            .cloned()
            .collect(),
        None => catalog.coverage_configurations.clone(),
    };

    if configurations.is_empty() {
        info!("No coverage configurations selected, nothing to do");
        return Ok(());
    }

    let value_filter = parse_filters(&args.filters)?;

    let fetcher = HttpCatalogFetch::new(Duration::from_secs(args.catalog_timeout_secs))
        .context("Failed to create catalog client")?;
    let resolver = DatasetResolver::new(fetcher);

    info!(
        configurations = configurations.len(),
        catalog_url = %args.catalog_url,
        "Resolving dataset locations"
    );

    let datasets = resolve_datasets(
        &resolver,
        &configurations,
        &catalog.parameters,
        value_filter.as_ref(),
        &args.catalog_url,
    )
    .await;

    if datasets.is_empty() {
        info!("No datasets resolved, nothing to download");
        return Ok(());
    }

    let downloader = Downloader::new(DownloadConfig {
        request_timeout: Duration::from_secs(600),
        output_dir: args.output_dir.clone(),
        force_download: args.force_download,
    })?;

    info!(
        count = datasets.len(),
        batch_size = args.batch_size,
        output_dir = %args.output_dir.display(),
        "Starting crawl"
    );

    let report = crawler::crawl(&downloader, &datasets, args.batch_size).await;

    info!(
        attempted = report.attempted,
        downloaded = report.downloaded,
        skipped = report.skipped,
        failed = report.failed,
        "Harvest complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        let filter = parse_filters(&["scenario=rcp26".to_string(), "measure=anom".to_string()])
            .unwrap()
            .unwrap();
        assert!(filter.allows("scenario", "rcp26"));
        assert!(!filter.allows("scenario", "rcp85"));
        assert!(filter.allows("season", "djf"));
    }

    #[test]
    fn test_parse_filters_empty() {
        assert!(parse_filters(&[]).unwrap().is_none());
    }

    #[test]
    fn test_parse_filters_rejects_malformed() {
        assert!(parse_filters(&["scenario".to_string()]).is_err());
        assert!(parse_filters(&["=rcp26".to_string()]).is_err());
        assert!(parse_filters(&["scenario=".to_string()]).is_err());
    }
}
