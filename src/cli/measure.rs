//! JPEG compression analysis tool
//!
//! Re-encodes every selected image at quality 1 to 100 and writes one CSV
//! row per (image, quality) pair.

use crate::config::{SweepConfig, DEFAULT_PREFIX, DEFAULT_SAMPLES_DIR};
use crate::services::create_cli_progress_reporter;
use crate::sweep::{collect_targets, CompressionSweep, SweepSummary};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// JPEG compression analysis tool with auto-normalization
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "JPEG Compression Analysis Tool with Auto-Normalization",
    long_about = None
)]
#[command(name = "imgset-measure")]
pub struct Cli {
    /// Input directory
    #[arg(short, long, default_value = DEFAULT_SAMPLES_DIR)]
    pub input: PathBuf,

    /// File prefix filter
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Output directory
    #[arg(short, long, default_value = "./out")]
    pub output: PathBuf,

    /// Output CSV filename
    #[arg(short, long, default_value = "result.csv")]
    pub csv: String,

    /// Force resize images to NxN (0 keeps native dimensions)
    #[arg(short, long, default_value_t = 1000)]
    pub resize: u32,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Convert the parsed flags into a validated sweep configuration
    pub fn to_config(&self) -> Result<SweepConfig> {
        SweepConfig::builder()
            .input_dir(&self.input)
            .prefix(&self.prefix)
            .output_dir(&self.output)
            .table_name(&self.csv)
            .resize(self.resize)
            .build()
            .context("Invalid sweep settings")
    }
}

/// Entry point of `imgset-measure`
pub fn main() -> Result<()> {
    let cli = Cli::parse();
    super::init_tracing(cli.verbose).context("Failed to initialize tracing")?;
    run(&cli).map(|_| ())
}

/// Run the sweep for already parsed arguments
pub fn run(cli: &Cli) -> Result<SweepSummary> {
    let config = cli.to_config()?;
    let files = collect_targets(&config)?;

    let resize = config
        .resize
        .map_or_else(|| "native".to_string(), |d| format!("{d}x{d}"));
    println!(
        "Target: {} images | Resize: {} | Output: {}",
        files.len(),
        resize,
        config.table_path().display()
    );

    let reporter = create_cli_progress_reporter(cli.quiet, cli.verbose > 0, files.len());
    let summary = CompressionSweep::new(config, reporter.as_ref()).run_on(&files)?;

    println!("\nAnalysis completed successfully.");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["imgset-measure"]).unwrap();
        let config = cli.to_config().unwrap();
        assert_eq!(config, SweepConfig::default());
    }

    #[test]
    fn test_resize_zero_disables_resampling() {
        let cli = Cli::try_parse_from(["imgset-measure", "-r", "0", "-c", "sizes.csv", "-o", "o"])
            .unwrap();
        let config = cli.to_config().unwrap();
        assert_eq!(config.resize, None);
        assert_eq!(config.table_path(), PathBuf::from("o/sizes.csv"));
    }

    #[test]
    fn test_no_matching_files_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args: Vec<std::ffi::OsString> = vec![
            "imgset-measure".into(),
            "-i".into(),
            temp_dir.path().as_os_str().to_os_string(),
            "-o".into(),
            temp_dir.path().join("out").into_os_string(),
            "-q".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("No files matching 'sample_*'"));
        assert!(!temp_dir.path().join("out").exists());
    }
}
