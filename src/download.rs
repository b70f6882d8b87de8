//! Sample downloading from a placeholder image service
//!
//! Samples are fetched one at a time with a per-request timeout. Each body is
//! streamed into a `.part` file next to its target and renamed into place only
//! after the transfer completed, so a failed request never leaves a truncated
//! sample behind. Failed requests are not retried.

use crate::config::DownloadConfig;
use crate::error::{DatasetError, Result};
use crate::services::io::ImageIOService;
use crate::services::progress::{ItemProgress, ProgressReporter, ProgressUpdate, Stage};
use crate::tracing_config::spans;
use futures_util::stream::TryStreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::Instrument;

/// Result of handling a single sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The sample was fetched and written
    Downloaded { bytes: u64 },
    /// The sample already existed and `force` was not set
    Skipped,
    /// The request or the write failed; the reason is kept for the report
    Failed(String),
}

impl DownloadOutcome {
    /// Short status label used in progress output
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Downloaded { .. } => "Done",
            Self::Skipped => "Skipped",
            Self::Failed(_) => "Error",
        }
    }
}

/// Outcome of a download batch
#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    /// Directory the samples were written to
    pub output_dir: PathBuf,
    /// Per-sample outcomes, in request order
    pub outcomes: Vec<(String, DownloadOutcome)>,
}

impl DownloadSummary {
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Downloaded { .. }))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Skipped))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Failed(_)))
    }

    /// Total bytes written during this batch
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                DownloadOutcome::Downloaded { bytes } => *bytes,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, predicate: impl Fn(&DownloadOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

/// Downloads numbered samples into a dataset directory
pub struct SampleDownloader<'a> {
    client: Client,
    config: DownloadConfig,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> SampleDownloader<'a> {
    /// Create a downloader for the given configuration
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(config: DownloadConfig, reporter: &'a dyn ProgressReporter) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DatasetError::network_error("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            config,
            reporter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Fetch samples `1..=count` into the output directory
    ///
    /// # Errors
    /// Only failure to create the output directory is fatal. Individual
    /// request failures are recorded as [`DownloadOutcome::Failed`].
    pub async fn run(&self) -> Result<DownloadSummary> {
        let config = &self.config;
        let start_time = Instant::now();
        ImageIOService::ensure_dir(&config.output_dir)?;

        let url = config.url();
        let total = config.count as usize;
        self.reporter.report_progress(ProgressUpdate::with_description(
            Stage::Downloading,
            format!(
                "Fetching {} sample(s) of {}x{} from {}",
                config.count, config.size, config.size, url
            ),
            start_time,
        ));

        let mut summary = DownloadSummary {
            output_dir: config.output_dir.clone(),
            outcomes: Vec::with_capacity(total),
        };

        for index in 1..=config.count {
            let file_name = config.file_name(index);
            let target = config.output_dir.join(&file_name);

            let outcome = if target.exists() && !config.force {
                tracing::debug!("Skipping existing {}", file_name);
                DownloadOutcome::Skipped
            } else {
                let outcome = match self
                    .download_file(&url, &target)
                    .instrument(spans::download(&url, &target))
                    .await
                {
                    Ok(bytes) => DownloadOutcome::Downloaded { bytes },
                    Err(e) => {
                        tracing::warn!("Failed to download {}: {}", file_name, e);
                        self.reporter.report_error(
                            Stage::Downloading,
                            &format!("Failed to download {}: {}", file_name, e),
                        );
                        DownloadOutcome::Failed(e.to_string())
                    },
                };
                tokio::time::sleep(config.delay).await;
                outcome
            };

            self.reporter.report_item(ItemProgress {
                stage: Stage::Downloading,
                position: index as usize,
                total,
                name: file_name.clone(),
                status: outcome.label().to_string(),
            });
            summary.outcomes.push((file_name, outcome));
        }

        tracing::info!(
            downloaded = summary.downloaded(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Download batch finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        self.reporter.report_completion("Batch operation completed.");
        Ok(summary)
    }

    /// Download one file, replacing `target` only after the body was fully written
    async fn download_file(&self, url: &str, target: &Path) -> Result<u64> {
        let partial = partial_path(target);
        let result = self.stream_to(url, &partial).await;

        match result {
            Ok(bytes) => {
                tokio::fs::rename(&partial, target).await.map_err(|e| {
                    DatasetError::file_io_error("move downloaded sample to", target, &e)
                })?;
                tracing::debug!("Downloaded {} bytes to {}", bytes, target.display());
                Ok(bytes)
            },
            Err(e) => {
                if partial.exists() {
                    if let Err(cleanup_err) = tokio::fs::remove_file(&partial).await {
                        tracing::warn!("Failed to cleanup partial file: {}", cleanup_err);
                    }
                }
                Err(e)
            },
        }
    }

    /// Stream the response body of `url` into `dest`
    async fn stream_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let response =
            self.client.get(url).send().await.map_err(|e| {
                DatasetError::network_error(format!("Failed to download {}", url), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Network(format!(
                "HTTP error {} for {}",
                status, url
            )));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| DatasetError::file_io_error("create file", dest, &e))?;

        let mut stream = StreamReader::new(
            response
                .bytes_stream()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );

        let mut downloaded = 0u64;
        let mut buffer = vec![0; 8192];

        loop {
            let bytes_read = stream
                .read(&mut buffer)
                .await
                .map_err(|e| DatasetError::network_error("Failed to read download stream", e))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(buffer.get(..bytes_read).unwrap_or(&[]))
                .await
                .map_err(|e| DatasetError::file_io_error("write to file", dest, &e))?;

            downloaded += bytes_read as u64;
        }

        file.flush()
            .await
            .map_err(|e| DatasetError::file_io_error("flush file", dest, &e))?;

        Ok(downloaded)
    }
}

/// Sibling path used while a download is in flight
fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}
