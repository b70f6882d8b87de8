//! Offline downloader behavior: idempotent skips and contained failures

mod common;

use common::{list_names, write_jpeg};
use imgset::{DownloadConfig, DownloadOutcome, NoOpProgressReporter, Result, SampleDownloader};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Configuration pointing at a closed local port so no request can succeed
fn unreachable(dir: &Path, count: u32) -> DownloadConfig {
    DownloadConfig {
        count,
        size: 32,
        output_dir: dir.to_path_buf(),
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        delay: Duration::ZERO,
        ..DownloadConfig::default()
    }
}

#[tokio::test]
async fn test_second_run_leaves_dataset_unchanged() -> Result<()> {
    let temp_dir = TempDir::new()?;
    for i in 1..=4 {
        write_jpeg(temp_dir.path(), &format!("sample_{i}.jpg"), 8, 8);
    }
    let before: Vec<Vec<u8>> = (1..=4)
        .map(|i| std::fs::read(temp_dir.path().join(format!("sample_{i}.jpg"))).unwrap())
        .collect();

    let reporter = NoOpProgressReporter;
    for _ in 0..2 {
        let summary = SampleDownloader::new(unreachable(temp_dir.path(), 4), &reporter)?
            .run()
            .await?;
        assert_eq!(summary.skipped(), 4);
        assert!(summary
            .outcomes
            .iter()
            .all(|(_, outcome)| *outcome == DownloadOutcome::Skipped));
    }

    let after: Vec<Vec<u8>> = (1..=4)
        .map(|i| std::fs::read(temp_dir.path().join(format!("sample_{i}.jpg"))).unwrap())
        .collect();
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn test_failures_only_affect_missing_samples() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_jpeg(temp_dir.path(), "sample_2.jpg", 8, 8);

    let reporter = NoOpProgressReporter;
    let summary = SampleDownloader::new(unreachable(temp_dir.path(), 3), &reporter)?
        .run()
        .await?;

    let labels: Vec<&str> = summary.outcomes.iter().map(|(_, o)| o.label()).collect();
    assert_eq!(labels, vec!["Error", "Skipped", "Error"]);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.bytes_written(), 0);

    // No partial files are left behind
    assert_eq!(list_names(temp_dir.path()), vec!["sample_2.jpg"]);
    Ok(())
}

#[tokio::test]
async fn test_unwritable_output_dir_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("samples");
    std::fs::write(&blocker, b"a file, not a directory").unwrap();

    let reporter = NoOpProgressReporter;
    let result = SampleDownloader::new(unreachable(&blocker, 1), &reporter)
        .unwrap()
        .run()
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_zero_size_fails_per_sample() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = DownloadConfig {
        size: 0,
        ..unreachable(temp_dir.path(), 2)
    };

    let reporter = NoOpProgressReporter;
    let summary = SampleDownloader::new(config, &reporter)?.run().await?;
    assert_eq!(summary.failed(), 2);
    assert!(list_names(temp_dir.path()).is_empty());
    Ok(())
}
