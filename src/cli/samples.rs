//! Bulk sample downloader
//!
//! Fetches `sample_1.jpg ..= sample_N.jpg` from a placeholder image service.
//! Existing files are kept unless `--force` is given.

use crate::config::{DownloadConfig, DEFAULT_SAMPLES_DIR};
use crate::download::SampleDownloader;
use crate::services::create_cli_progress_reporter;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Bulk image downloader
#[derive(Parser, Debug)]
#[command(author, version, about = "Bulk Image Downloader CLI", long_about = None)]
#[command(name = "imgset-samples")]
pub struct Cli {
    /// Number of samples
    #[arg(short, long, default_value_t = 10)]
    pub number: u32,

    /// Image dimension SxS
    #[arg(short, long, default_value_t = 1000)]
    pub size: u32,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_SAMPLES_DIR)]
    pub output: PathBuf,

    /// Force regenerate/overwrite existing files
    #[arg(short, long)]
    pub force: bool,

    /// Base URL of the image service
    #[arg(long, default_value = "https://picsum.photos")]
    pub base_url: String,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Convert the parsed flags into a download configuration
    #[must_use]
    pub fn to_config(&self) -> DownloadConfig {
        DownloadConfig {
            count: self.number,
            size: self.size,
            output_dir: self.output.clone(),
            force: self.force,
            base_url: self.base_url.clone(),
            ..DownloadConfig::default()
        }
    }
}

/// Entry point of `imgset-samples`
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    super::init_tracing(cli.verbose).context("Failed to initialize tracing")?;
    run(&cli).await
}

/// Run the downloader for already parsed arguments
pub async fn run(cli: &Cli) -> Result<()> {
    let config = cli.to_config();
    println!(
        "Target: {} images | Size: {}x{} | Dir: {}",
        config.count,
        config.size,
        config.size,
        config.output_dir.display()
    );

    let reporter =
        create_cli_progress_reporter(cli.quiet, cli.verbose > 0, config.count as usize);
    let downloader =
        SampleDownloader::new(config, reporter.as_ref()).context("Invalid downloader settings")?;
    let summary = downloader
        .run()
        .await
        .context("Failed to prepare output directory")?;

    println!(
        "\nBatch operation completed. {} downloaded, {} skipped, {} failed.",
        summary.downloaded(),
        summary.skipped(),
        summary.failed()
    );
    Ok(())
}
