//! Dataset integrity and consistency checker
//!
//! Prints the reconciliation report on stdout. The verdict is informational:
//! the process only fails when the input directory does not exist.

use crate::config::{CheckConfig, DEFAULT_EXTENSION, DEFAULT_PREFIX, DEFAULT_SAMPLES_DIR};
use crate::dataset::scan_dataset;
use crate::integrity::ImageIntegrityProbe;
use crate::reconcile::{ReconciliationChecker, ReconciliationReport};
use crate::services::create_cli_progress_reporter;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Dataset integrity and consistency checker
#[derive(Parser, Debug)]
#[command(author, version, about = "Dataset Integrity & Consistency Checker", long_about = None)]
#[command(name = "imgset-check")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Directory to check
    #[arg(short, long, default_value = DEFAULT_SAMPLES_DIR)]
    pub input: PathBuf,

    /// Expected total number of samples
    #[arg(short, long, default_value_t = 30, allow_negative_numbers = true)]
    pub number: i64,

    /// Filename prefix
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Expected file extension
    #[arg(short, long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Skip deep integrity check (opening files)
    #[arg(long)]
    pub no_integrity: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Convert the parsed flags into a validated checker configuration
    pub fn to_config(&self) -> Result<CheckConfig> {
        CheckConfig {
            input_dir: self.input.clone(),
            expected_count: self.number,
            prefix: self.prefix.clone(),
            extension: self.extension.clone(),
            deep_check: !self.no_integrity,
        }
        .validate()
        .context("Invalid checker settings")
    }
}

/// Entry point of `imgset-check`
pub fn main() -> Result<()> {
    let cli = Cli::parse();
    super::init_tracing(cli.verbose).context("Failed to initialize tracing")?;
    run(&cli).map(|_| ())
}

/// Run the checker for already parsed arguments and print its report
pub fn run(cli: &Cli) -> Result<ReconciliationReport> {
    let config = cli.to_config()?;

    if !cli.json {
        println!("Checking dataset in '{}'...", config.input_dir.display());
        println!(
            "Expected range: 1 to {} | Prefix: '{}'",
            config.expected_count, config.prefix
        );
        println!("{}", "-".repeat(50));
    }

    // Sizing the progress bar needs the file count up front
    let total = if config.deep_check {
        scan_dataset(&config.input_dir, &config.prefix, &config.extension)
            .map(|entries| entries.len())
            .unwrap_or(0)
    } else {
        0
    };
    let reporter = create_cli_progress_reporter(cli.quiet || cli.json, cli.verbose > 0, total);
    let probe = ImageIntegrityProbe::new();

    let report = ReconciliationChecker::new(config, &probe, reporter.as_ref()).run()?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("Found {} files matching pattern.", report.scanned);
        println!("{}", report.render());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["imgset-check"]).unwrap();
        let config = cli.to_config().unwrap();
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "imgset-check",
            "-i",
            "data",
            "-n",
            "5",
            "-p",
            "img_",
            "-e",
            "png",
            "--no-integrity",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let config = cli.to_config().unwrap();
        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.expected_count, 5);
        assert_eq!(config.prefix, "img_");
        assert_eq!(config.extension, ".png");
        assert!(!config.deep_check);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("absent");
        let args: Vec<std::ffi::OsString> = vec![
            "imgset-check".into(),
            "-i".into(),
            missing.into_os_string(),
            "-q".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    fn run_in(dir: &std::path::Path, extra: &[&str]) -> Result<ReconciliationReport> {
        let mut args: Vec<std::ffi::OsString> = vec![
            "imgset-check".into(),
            "-i".into(),
            dir.as_os_str().to_owned(),
            "-q".into(),
            "--no-integrity".into(),
        ];
        args.extend(extra.iter().map(std::ffi::OsString::from));
        run(&Cli::try_parse_from(args)?)
    }

    #[test]
    fn test_empty_prefix_is_accepted() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["1.jpg", "2.jpg", "notes.jpg"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }
        let report = run_in(temp_dir.path(), &["-p", "", "-n", "2"]).unwrap();
        assert_eq!(report.scanned, 3);
        assert!(report.missing.is_empty());
        assert!(report.is_healthy());
    }

    #[test]
    fn test_negative_count_reports_everything_as_extra() {
        let temp_dir = tempfile::tempdir().unwrap();
        for i in 1..=3 {
            std::fs::write(temp_dir.path().join(format!("sample_{i}.jpg")), b"x").unwrap();
        }
        for extra in [&["-n=-2"][..], &["-n", "-2"][..]] {
            let report = run_in(temp_dir.path(), extra).unwrap();
            assert_eq!(report.expected_count, -2);
            assert!(report.missing.is_empty());
            assert_eq!(report.extra, vec![1, 2, 3]);
        }
    }
}
