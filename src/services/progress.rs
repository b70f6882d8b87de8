//! Progress reporting service
//!
//! This module separates progress reporting concerns from the pipelines,
//! so each frontend decides how (or whether) to show progress. Tests use
//! [`NoOpProgressReporter`].

use std::time::Instant;

/// Stages of the dataset pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Enumerating the dataset directory
    Scanning,
    /// Probing files for structural damage
    IntegrityCheck,
    /// Fetching samples from the image service
    Downloading,
    /// Re-encoding an image across quality levels
    Sweeping,
    /// Persisting the measurement table
    WritingTable,
    /// Pipeline finished
    Completed,
}

impl Stage {
    /// Get a human-readable description of the stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Scanning => "Scanning dataset directory",
            Stage::IntegrityCheck => "Checking file integrity",
            Stage::Downloading => "Downloading samples",
            Stage::Sweeping => "Measuring compression levels",
            Stage::WritingTable => "Writing measurement table",
            Stage::Completed => "Completed",
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current stage
    pub stage: Stage,
    /// Human-readable description
    pub description: String,
    /// Elapsed time since the pipeline started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update
    #[must_use]
    pub fn new(stage: Stage, start_time: Instant) -> Self {
        Self::with_description(stage, stage.description().to_string(), start_time)
    }

    /// Create a progress update with custom description
    #[must_use]
    pub fn with_description(stage: Stage, description: String, start_time: Instant) -> Self {
        Self {
            stage,
            description,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}

/// Per-item progress within a batch (one file, one download)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProgress {
    /// Stage the item belongs to
    pub stage: Stage,
    /// 1-based position of the item
    pub position: usize,
    /// Number of items in the batch
    pub total: usize,
    /// Name of the item, usually a file name
    pub name: String,
    /// Short status such as `Done` or `Skipped`
    pub status: String,
}

impl ItemProgress {
    /// Fraction of the batch completed, in percent
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.position as f64 / self.total as f64 * 100.0
        }
    }
}

/// Trait for reporting progress during a pipeline run
pub trait ProgressReporter: Send + Sync {
    /// Report a stage transition
    fn report_progress(&self, update: ProgressUpdate);

    /// Report that one item of a batch has been handled
    fn report_item(&self, item: ItemProgress);

    /// Report a recoverable error for a single item
    fn report_error(&self, stage: Stage, error: &str);

    /// Report pipeline completion with a summary line
    fn report_completion(&self, _summary: &str) {}
}

/// No-op progress reporter that discards all progress updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_item(&self, _item: ItemProgress) {}

    fn report_error(&self, _stage: Stage, _error: &str) {}
}

/// Progress reporter that emits tracing events
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Also log every individual item
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            tracing::info!("{} ({}ms elapsed)", update.description, update.elapsed_ms);
        } else {
            tracing::info!("{}", update.description);
        }
    }

    fn report_item(&self, item: ItemProgress) {
        if self.verbose {
            tracing::info!(
                "[{:.1}%] {}/{} {} {}",
                item.percent(),
                item.position,
                item.total,
                item.status,
                item.name
            );
        }
    }

    fn report_error(&self, stage: Stage, error: &str) {
        tracing::error!("❌ Error during {}: {}", stage.description(), error);
    }

    fn report_completion(&self, summary: &str) {
        tracing::info!("✅ {}", summary);
    }
}

/// Progress bar reporter for interactive terminals
#[cfg(feature = "cli")]
pub struct BarProgressReporter {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl BarProgressReporter {
    /// Create a progress bar sized for `total` items
    #[must_use]
    pub fn new(total: usize) -> Self {
        let bar = indicatif::ProgressBar::new(total as u64);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("Progress |{bar:40.cyan/blue}| {percent}% {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▉-"));
        }
        Self { bar }
    }
}

#[cfg(feature = "cli")]
impl ProgressReporter for BarProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        self.bar.set_message(update.description);
    }

    fn report_item(&self, item: ItemProgress) {
        self.bar.set_position(item.position as u64);
        self.bar.set_message(format!("{} {}", item.status, item.name));
    }

    fn report_error(&self, stage: Stage, error: &str) {
        self.bar
            .println(format!("[Error] {}: {}", stage.description(), error));
    }

    fn report_completion(&self, summary: &str) {
        self.bar.finish_with_message(summary.to_string());
    }
}

/// Create appropriate progress reporter based on CLI flags
///
/// # Arguments
/// * `quiet` - Whether the --quiet flag was set
/// * `verbose` - Whether verbose logging is enabled
/// * `total` - Number of items in the batch
#[cfg(feature = "cli")]
#[must_use]
pub fn create_cli_progress_reporter(
    quiet: bool,
    verbose: bool,
    total: usize,
) -> Box<dyn ProgressReporter> {
    match (quiet, verbose, total) {
        (true, _, _) => Box::new(NoOpProgressReporter),
        (false, true, _) | (false, false, 0) => Box::new(ConsoleProgressReporter::new(verbose)),
        (false, false, _) => Box::new(BarProgressReporter::new(total)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Test progress reporter that captures reports for verification
    #[derive(Default)]
    struct TestProgressReporter {
        updates: Arc<Mutex<Vec<ProgressUpdate>>>,
        items: Arc<Mutex<Vec<ItemProgress>>>,
        errors: Arc<Mutex<Vec<(Stage, String)>>>,
    }

    impl ProgressReporter for TestProgressReporter {
        fn report_progress(&self, update: ProgressUpdate) {
            self.updates.lock().unwrap().push(update);
        }

        fn report_item(&self, item: ItemProgress) {
            self.items.lock().unwrap().push(item);
        }

        fn report_error(&self, stage: Stage, error: &str) {
            self.errors.lock().unwrap().push((stage, error.to_string()));
        }
    }

    #[test]
    fn test_stage_descriptions() {
        assert_eq!(Stage::Scanning.description(), "Scanning dataset directory");
        assert_eq!(Stage::Sweeping.description(), "Measuring compression levels");
        assert_eq!(Stage::Completed.description(), "Completed");
    }

    #[test]
    fn test_progress_update_creation() {
        let start = Instant::now();
        let update = ProgressUpdate::new(Stage::IntegrityCheck, start);
        assert_eq!(update.stage, Stage::IntegrityCheck);
        assert_eq!(update.description, "Checking file integrity");

        let custom =
            ProgressUpdate::with_description(Stage::Sweeping, "3 images".to_string(), start);
        assert_eq!(custom.description, "3 images");
    }

    #[test]
    fn test_item_percent() {
        let item = ItemProgress {
            stage: Stage::Downloading,
            position: 1,
            total: 4,
            name: "sample_1.jpg".to_string(),
            status: "Done".to_string(),
        };
        assert!((item.percent() - 25.0).abs() < f64::EPSILON);

        let empty = ItemProgress { total: 0, ..item };
        assert!((empty.percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trait_object_dispatch() {
        let reporter = TestProgressReporter::default();
        let items = Arc::clone(&reporter.items);
        let errors = Arc::clone(&reporter.errors);
        let boxed: Box<dyn ProgressReporter> = Box::new(reporter);

        boxed.report_progress(ProgressUpdate::new(Stage::Scanning, Instant::now()));
        boxed.report_item(ItemProgress {
            stage: Stage::Scanning,
            position: 1,
            total: 1,
            name: "a".to_string(),
            status: "Done".to_string(),
        });
        boxed.report_error(Stage::Sweeping, "decode failed");
        boxed.report_completion("done");

        assert_eq!(items.lock().unwrap().len(), 1);
        assert_eq!(
            errors.lock().unwrap().as_slice(),
            &[(Stage::Sweeping, "decode failed".to_string())]
        );
    }

    #[test]
    fn test_no_op_reporter_accepts_everything() {
        let reporter = NoOpProgressReporter;
        reporter.report_progress(ProgressUpdate::new(Stage::Completed, Instant::now()));
        reporter.report_error(Stage::Downloading, "ignored");
        reporter.report_completion("ignored");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_create_cli_progress_reporter() {
        let reporter = create_cli_progress_reporter(true, false, 10);
        reporter.report_error(Stage::Sweeping, "quiet reporter swallows this");
        let reporter = create_cli_progress_reporter(false, true, 10);
        reporter.report_completion("verbose reporter logs this");
    }
}
