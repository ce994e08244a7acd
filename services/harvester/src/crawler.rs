//! Batched crawl over resolved dataset URLs.
//!
//! Downloads run in fixed-size batches: every download within a batch is
//! concurrent, batches themselves are strictly sequential, so in-flight
//! requests never exceed the batch size. A failed download is logged and
//! skipped; its siblings always run to completion. Re-running the crawl
//! retries only what is missing, since existing files are skipped.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{error, info, warn};

use thredds_client::ResolvedDataset;

use crate::download::{DownloadOutcome, Downloader};

/// Bounds concurrent downloads within one crawl.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Summary of one crawl run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub attempted: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Download every resolved dataset, batch by batch.
pub async fn crawl(
    downloader: &Downloader,
    datasets: &[ResolvedDataset],
    batch_size: usize,
) -> CrawlReport {
    let started_at = Utc::now();
    let batch_size = batch_size.max(1);

    let mut downloaded = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for batch in datasets.chunks(batch_size) {
        let outcomes = join_all(
            batch
                .iter()
                .map(|dataset| downloader.fetch(&dataset.url, &dataset.fragment)),
        )
        .await;

        for (dataset, outcome) in batch.iter().zip(outcomes) {
            match outcome {
                Ok(DownloadOutcome::Downloaded(_)) => downloaded += 1,
                Ok(DownloadOutcome::AlreadyPresent(_)) => skipped += 1,
                Err(e) => {
                    failed += 1;
                    error!(
                        coverage = %dataset.coverage_identifier,
                        url = %dataset.url,
                        error = ?e,
                        "Download failed, skipping"
                    );
                }
            }
        }
    }

    let report = CrawlReport {
        attempted: datasets.len(),
        downloaded,
        skipped,
        failed,
        started_at,
        finished_at: Utc::now(),
    };

    if report.failed > 0 {
        warn!(
            attempted = report.attempted,
            downloaded = report.downloaded,
            skipped = report.skipped,
            failed = report.failed,
            "Crawl finished with failures; re-run to retry missing datasets"
        );
    } else {
        info!(
            attempted = report.attempted,
            downloaded = report.downloaded,
            skipped = report.skipped,
            "Crawl finished"
        );
    }

    report
}
