#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # imgset
//!
//! Tools for a small image dataset stored as a directory of numbered files
//! (`sample_1.jpg`, `sample_2.jpg`, ...).
//!
//! ## Features
//!
//! - **Download**: fetch numbered placeholder samples, skipping files that already exist
//! - **Reconcile**: report missing identifiers, identifiers outside the expected
//!   range and files that fail a structural integrity probe
//! - **Measure**: re-encode every image at JPEG quality 1 to 100 and record the
//!   encoded sizes in a CSV table
//! - **CLI Integration**: three command-line tools (enable with the `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgset::{
//!     CheckConfig, ImageIntegrityProbe, NoOpProgressReporter, ReconciliationChecker,
//! };
//!
//! # fn example() -> imgset::Result<()> {
//! let config = CheckConfig {
//!     input_dir: "./samples".into(),
//!     expected_count: 10,
//!     ..CheckConfig::default()
//! }
//! .validate()?;
//!
//! let probe = ImageIntegrityProbe::new();
//! let reporter = NoOpProgressReporter;
//! let report = ReconciliationChecker::new(config, &probe, &reporter).run()?;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```
//!
//! A compression sweep over the same directory:
//!
//! ```rust,no_run
//! use imgset::{CompressionSweep, NoOpProgressReporter, SweepConfig};
//!
//! # fn example() -> imgset::Result<()> {
//! let config = SweepConfig::builder()
//!     .input_dir("./samples")
//!     .output_dir("./out")
//!     .resize(512)
//!     .build()?;
//!
//! let reporter = NoOpProgressReporter;
//! let summary = CompressionSweep::new(config, &reporter).run()?;
//! println!("{} rows written to {}", summary.rows_written, summary.table_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line tools, progress bars and the tracing subscriber
//! - `webp-support` (default): WebP decoding

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod download;
pub mod encoders;
pub mod error;
pub mod integrity;
pub mod measurement;
pub mod reconcile;
pub mod services;
pub mod sweep;
pub mod tracing_config;

pub use config::{CheckConfig, DownloadConfig, SweepConfig, SweepConfigBuilder};
pub use dataset::{extract_identifier, scan_dataset, DatasetEntry};
pub use download::{DownloadOutcome, DownloadSummary, SampleDownloader};
pub use encoders::JpegQualityEncoder;
pub use error::{DatasetError, Result};
pub use integrity::{ImageIntegrityProbe, IntegrityProbe, IntegrityVerdict};
pub use measurement::{CompressionRecord, MeasurementTable};
pub use reconcile::{
    reconcile_ids, CorruptFile, DatasetStatus, ReconciliationChecker, ReconciliationReport,
};
pub use services::{
    ConsoleProgressReporter, ImageIOService, ItemProgress, NoOpProgressReporter,
    ProgressReporter, ProgressUpdate, Stage,
};
pub use sweep::{
    collect_targets, select_target_files, sweep_image, CompressionSweep, SweepFailure,
    SweepSummary,
};
pub use tracing_config::{TracingConfig, TracingFormat};
