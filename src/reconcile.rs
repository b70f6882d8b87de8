//! Dataset reconciliation: missing identifiers, extras and corrupted files
//!
//! The checker diffs the identifiers found on disk against the expected
//! contiguous range `[1, N]` and, optionally, runs an [`IntegrityProbe`] on
//! every matched file. Per-file failures are collected, never fatal.

use crate::config::CheckConfig;
use crate::dataset::scan_dataset;
use crate::error::{DatasetError, Result};
use crate::integrity::{IntegrityProbe, IntegrityVerdict};
use crate::services::progress::{ItemProgress, ProgressReporter, ProgressUpdate, Stage};
use crate::tracing_config::spans;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write as _;
use std::time::Instant;

/// Overall dataset verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetStatus {
    /// No identifier missing and no file corrupted
    Healthy,
    /// At least one identifier missing or one file corrupted
    IncompleteOrDamaged,
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "HEALTHY"),
            Self::IncompleteOrDamaged => write!(f, "INCOMPLETE / DAMAGED"),
        }
    }
}

/// A file that failed the integrity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorruptFile {
    pub file_name: String,
    pub reason: String,
}

/// Result of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Upper bound of the expected range
    pub expected_count: i64,
    /// Number of files matching the pattern
    pub scanned: usize,
    /// Identifiers found on disk
    pub present: BTreeSet<i64>,
    /// Expected identifiers with no file, ascending
    pub missing: Vec<i64>,
    /// Identifiers outside `[1, N]`, ascending
    pub extra: Vec<i64>,
    /// Files that failed the integrity probe, in scan order
    pub corrupted: Vec<CorruptFile>,
    /// Whether the integrity probe ran
    pub deep_checked: bool,
    pub status: DatasetStatus,
}

impl ReconciliationReport {
    /// Assemble a report from its parts, deriving missing, extra and status
    #[must_use]
    pub fn new(
        expected_count: i64,
        scanned: usize,
        present: BTreeSet<i64>,
        corrupted: Vec<CorruptFile>,
        deep_checked: bool,
    ) -> Self {
        let (missing, extra) = reconcile_ids(&present, expected_count);
        let status = if missing.is_empty() && corrupted.is_empty() {
            DatasetStatus::Healthy
        } else {
            DatasetStatus::IncompleteOrDamaged
        };
        Self {
            expected_count,
            scanned,
            present,
            missing,
            extra,
            corrupted,
            deep_checked,
            status,
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == DatasetStatus::Healthy
    }

    /// Render the operator-facing report
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "-".repeat(50));
        let _ = writeln!(out, "REPORT:");

        if self.missing.is_empty() {
            let _ = writeln!(out, "✅ No missing IDs in sequence.");
        } else {
            let _ = writeln!(
                out,
                "❌ MISSING IDs ({}): {:?}",
                self.missing.len(),
                self.missing
            );
        }

        if !self.corrupted.is_empty() {
            let names: Vec<&str> = self.corrupted.iter().map(|c| c.file_name.as_str()).collect();
            let _ = writeln!(
                out,
                "❌ CORRUPTED FILES ({}): {:?}",
                self.corrupted.len(),
                names
            );
            let _ = writeln!(out, "   (These files exist but cannot be processed)");
        } else if self.deep_checked {
            let _ = writeln!(out, "✅ All files passed integrity check.");
        }

        if !self.extra.is_empty() {
            let _ = writeln!(
                out,
                "⚠️ EXTRA FILES (Outside range 1-{}): {:?}",
                self.expected_count, self.extra
            );
        }

        let _ = writeln!(out);
        let _ = write!(out, "Dataset STATUS: {}", self.status);
        out
    }
}

/// Diff the present identifiers against the expected range `[1, n]`
///
/// Returns `(missing, extra)`, both ascending.
///
/// # Examples
/// ```rust
/// use imgset::reconcile::reconcile_ids;
/// use std::collections::BTreeSet;
///
/// let present: BTreeSet<i64> = [2, 3, 5].into_iter().collect();
/// assert_eq!(reconcile_ids(&present, 5), (vec![1, 4], vec![]));
/// ```
#[must_use]
pub fn reconcile_ids(present: &BTreeSet<i64>, n: i64) -> (Vec<i64>, Vec<i64>) {
    let missing = (1..=n).filter(|id| !present.contains(id)).collect();
    let extra = present
        .iter()
        .copied()
        .filter(|id| !(1..=n).contains(id))
        .collect();
    (missing, extra)
}

/// Runs a reconciliation over one dataset directory
pub struct ReconciliationChecker<'a> {
    config: CheckConfig,
    probe: &'a dyn IntegrityProbe,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> ReconciliationChecker<'a> {
    #[must_use]
    pub fn new(
        config: CheckConfig,
        probe: &'a dyn IntegrityProbe,
        reporter: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            config,
            probe,
            reporter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Scan, probe and reconcile
    ///
    /// # Errors
    /// - [`DatasetError::MissingDirectory`] when the input directory does not exist
    /// - I/O errors while listing the directory
    pub fn run(&self) -> Result<ReconciliationReport> {
        let config = &self.config;
        let _span = spans::scan(&config.input_dir).entered();
        let start_time = Instant::now();

        if !config.input_dir.is_dir() {
            return Err(DatasetError::missing_directory(&config.input_dir));
        }

        self.reporter
            .report_progress(ProgressUpdate::new(Stage::Scanning, start_time));
        let entries = scan_dataset(&config.input_dir, &config.prefix, &config.extension)?;
        tracing::info!("Found {} files matching pattern.", entries.len());

        let mut present = BTreeSet::new();
        let mut corrupted = Vec::new();

        if config.deep_check {
            self.reporter
                .report_progress(ProgressUpdate::new(Stage::IntegrityCheck, start_time));
        }

        let total = entries.len();
        for (index, entry) in entries.iter().enumerate() {
            if let Some(id) = entry.identifier {
                present.insert(id);
            } else {
                tracing::debug!(file = %entry.file_name, "No identifier in file name");
            }

            let mut status = "Indexed";
            if config.deep_check {
                match self.probe.probe(&entry.path) {
                    IntegrityVerdict::Valid => status = "Valid",
                    IntegrityVerdict::Corrupt(reason) => {
                        status = "Corrupt";
                        tracing::debug!(
                            "Integrity check failed for {}: {}",
                            entry.file_name,
                            reason
                        );
                        self.reporter.report_error(
                            Stage::IntegrityCheck,
                            &format!("{}: {}", entry.file_name, reason),
                        );
                        corrupted.push(CorruptFile {
                            file_name: entry.file_name.clone(),
                            reason,
                        });
                    },
                }
            }

            self.reporter.report_item(ItemProgress {
                stage: if config.deep_check {
                    Stage::IntegrityCheck
                } else {
                    Stage::Scanning
                },
                position: index + 1,
                total,
                name: entry.file_name.clone(),
                status: status.to_string(),
            });
        }

        let report = ReconciliationReport::new(
            config.expected_count,
            total,
            present,
            corrupted,
            config.deep_check,
        );
        tracing::info!(
            missing = report.missing.len(),
            extra = report.extra.len(),
            corrupted = report.corrupted.len(),
            status = %report.status,
            "Reconciliation finished in {}ms",
            start_time.elapsed().as_millis()
        );
        self.reporter
            .report_completion(&format!("Dataset STATUS: {}", report.status));
        Ok(report)
    }
}
