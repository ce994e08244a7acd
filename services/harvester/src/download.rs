//! Dataset download with streaming writes.
//!
//! Downloads are streamed to a `.partial` sibling file and renamed into
//! place on completion. Existing files are kept unless force-download is
//! requested; there is no automatic retry here, failed downloads are
//! reported to the caller and picked up by the next crawl.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use reqwest::Client;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Configuration for the downloader.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Root directory for downloaded datasets
    pub output_dir: PathBuf,
    /// Re-download files that already exist locally
    pub force_download: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(600),
            output_dir: PathBuf::from("datasets"),
            force_download: false,
        }
    }
}

/// What happened to one download.
#[derive(Debug)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    AlreadyPresent(PathBuf),
}

/// Streams remote datasets to the local output directory.
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Local path for a dataset, preserving the fragment's structure
    /// relative to the output directory.
    ///
    /// Rejects absolute fragments and `..` components so a hostile
    /// catalog entry cannot escape the output directory.
    pub fn output_path(&self, fragment: &str) -> Result<PathBuf> {
        let mut path = self.config.output_dir.clone();
        for component in Path::new(fragment).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return Err(anyhow!("Unsafe dataset path: {}", fragment)),
            }
        }
        if path == self.config.output_dir {
            return Err(anyhow!("Empty dataset path: {}", fragment));
        }
        Ok(path)
    }

    /// Fetch one dataset, skipping files that already exist locally
    /// unless force-download is set.
    pub async fn fetch(&self, url: &str, fragment: &str) -> Result<DownloadOutcome> {
        let final_path = self.output_path(fragment)?;

        if final_path.exists() && !self.config.force_download {
            debug!(path = %final_path.display(), "File already exists, skipping download");
            return Ok(DownloadOutcome::AlreadyPresent(final_path));
        }

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file_name = final_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Dataset path has no file name: {}", fragment))?;
        let temp_path = final_path.with_file_name(format!("{}.partial", file_name));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {}", response.status()));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .context("Failed to open output file")?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Error reading response chunk")?;
            file.write_all(&chunk)
                .await
                .context("Error writing to file")?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        // copy+delete fallback for cross-filesystem moves
        if fs::rename(&temp_path, &final_path).await.is_err() {
            fs::copy(&temp_path, &final_path).await?;
            fs::remove_file(&temp_path).await?;
        }

        info!(
            path = %final_path.display(),
            bytes = downloaded,
            "Download completed"
        );

        Ok(DownloadOutcome::Downloaded(final_path))
    }
}
