//! JPEG compression sweep over a directory of images
//!
//! Every selected image is decoded once, normalized to RGB, optionally
//! resampled to a square, then encoded at every configured quality level.
//! The encoded size of each level becomes one row of the measurement table.

use crate::config::SweepConfig;
use crate::encoders::JpegQualityEncoder;
use crate::error::{DatasetError, Result};
use crate::measurement::{
    dimension_string, size_kb_from_bytes, CompressionRecord, MeasurementTable,
};
use crate::services::io::ImageIOService;
use crate::services::progress::{ItemProgress, ProgressReporter, ProgressUpdate, Stage};
use crate::tracing_config::spans;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Source extensions accepted by the sweep (lowercase, without the dot)
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Select the images to sweep: regular files starting with `prefix` whose
/// extension is accepted, sorted by path
pub fn select_target_files<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DatasetError::missing_directory(dir));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .map_err(|e| DatasetError::file_io_error("read directory", dir, &e))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let name_matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix));
        if name_matches && is_accepted_image(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Select the targets of a sweep configuration
///
/// # Errors
/// - [`DatasetError::MissingDirectory`] when the input directory does not exist
/// - [`DatasetError::NoMatchingFiles`] when nothing matches the prefix filter
pub fn collect_targets(config: &SweepConfig) -> Result<Vec<PathBuf>> {
    let files = select_target_files(&config.input_dir, &config.prefix)?;
    if files.is_empty() {
        return Err(DatasetError::NoMatchingFiles {
            dir: config.input_dir.clone(),
            prefix: config.prefix.clone(),
        });
    }
    Ok(files)
}

/// Check if file has an accepted image extension
fn is_accepted_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Normalize an image for JPEG encoding: RGB8, optionally resampled to `dim x dim`
#[must_use]
pub fn prepare_image(image: DynamicImage, resize: Option<u32>) -> RgbImage {
    let rgb = match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    };
    match resize {
        Some(dim) if rgb.dimensions() != (dim, dim) => {
            image::imageops::resize(&rgb, dim, dim, FilterType::Lanczos3)
        },
        _ => rgb,
    }
}

/// Encode one prepared image at every quality level and collect its records
///
/// # Arguments
/// * `image` - Prepared RGB image
/// * `image_name` - File name written to the table
/// * `original_format` - Source extension including the leading dot
/// * `qualities` - Quality levels to visit, in ascending order
/// * `scratch_dir` - Directory for the short-lived temporary artifacts
pub fn sweep_image(
    encoder: &JpegQualityEncoder,
    image: &RgbImage,
    image_name: &str,
    original_format: &str,
    qualities: RangeInclusive<u8>,
    scratch_dir: &Path,
) -> Result<Vec<CompressionRecord>> {
    let (width, height) = image.dimensions();
    let dimensions = dimension_string(width, height);
    let stem = Path::new(image_name)
        .file_stem()
        .map_or_else(|| "image".to_string(), |s| s.to_string_lossy().into_owned());

    let mut records = Vec::with_capacity(qualities.len());
    for quality in qualities {
        let bytes = encoder.measure(image, quality, scratch_dir, &stem)?;
        records.push(CompressionRecord {
            image_name: image_name.to_string(),
            original_format: original_format.to_string(),
            quality,
            size_kb: size_kb_from_bytes(bytes),
            dimensions: dimensions.clone(),
        });
    }
    Ok(records)
}

/// An image the sweep had to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of a sweep run
#[derive(Debug, Clone)]
pub struct SweepSummary {
    /// Where the measurement table was written
    pub table_path: PathBuf,
    /// Number of images selected by the filter
    pub images_selected: usize,
    /// Number of images fully measured
    pub images_processed: usize,
    /// Data rows in the table (header excluded)
    pub rows_written: usize,
    /// Images skipped because of an error
    pub failures: Vec<SweepFailure>,
}

/// Runs the compression sweep described by a [`SweepConfig`]
pub struct CompressionSweep<'a> {
    config: SweepConfig,
    encoder: JpegQualityEncoder,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> CompressionSweep<'a> {
    #[must_use]
    pub fn new(config: SweepConfig, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            config,
            encoder: JpegQualityEncoder::new(),
            reporter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Select the target files, failing when none match
    pub fn targets(&self) -> Result<Vec<PathBuf>> {
        collect_targets(&self.config)
    }

    /// Run the sweep over every target and write the measurement table
    ///
    /// # Errors
    /// - [`DatasetError::MissingDirectory`] / [`DatasetError::NoMatchingFiles`] before any work
    /// - Failure to create the output directory or to write the table
    ///
    /// Images that fail to decode or encode are recorded in
    /// [`SweepSummary::failures`] and do not abort the run.
    pub fn run(&self) -> Result<SweepSummary> {
        self.config.validate()?;
        let files = self.targets()?;
        self.run_on(&files)
    }

    /// Run the sweep over an explicit, already selected file list
    pub fn run_on(&self, files: &[PathBuf]) -> Result<SweepSummary> {
        let config = &self.config;
        let start_time = Instant::now();
        ImageIOService::ensure_dir(&config.output_dir)?;

        self.reporter.report_progress(ProgressUpdate::with_description(
            Stage::Sweeping,
            format!(
                "Sweeping {} image(s) at qualities {}-{}",
                files.len(),
                config.qualities.start(),
                config.qualities.end()
            ),
            start_time,
        ));

        let mut table = MeasurementTable::new();
        let mut failures = Vec::new();
        let mut processed = 0;

        for (index, path) in files.iter().enumerate() {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let status = match self.process_file(path, &file_name) {
                Ok(records) => {
                    table.extend(records);
                    processed += 1;
                    "Done"
                },
                Err(e) => {
                    tracing::debug!("Failed processing {}: {}", file_name, e);
                    self.reporter.report_error(
                        Stage::Sweeping,
                        &format!("Failed processing {}: {}", file_name, e),
                    );
                    failures.push(SweepFailure {
                        file_name: file_name.clone(),
                        reason: e.to_string(),
                    });
                    "Failed"
                },
            };

            self.reporter.report_item(ItemProgress {
                stage: Stage::Sweeping,
                position: index + 1,
                total: files.len(),
                name: file_name,
                status: status.to_string(),
            });
        }

        self.reporter
            .report_progress(ProgressUpdate::new(Stage::WritingTable, start_time));
        let table_path = config.table_path();
        table.write_csv(&table_path)?;

        let summary = SweepSummary {
            table_path,
            images_selected: files.len(),
            images_processed: processed,
            rows_written: table.len(),
            failures,
        };
        tracing::info!(
            processed = summary.images_processed,
            failed = summary.failures.len(),
            rows = summary.rows_written,
            "Sweep finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        self.reporter.report_completion(&format!(
            "Measured {}/{} image(s), {} rows",
            summary.images_processed, summary.images_selected, summary.rows_written
        ));
        Ok(summary)
    }

    /// Decode, normalize and sweep a single file
    fn process_file(&self, path: &Path, file_name: &str) -> Result<Vec<CompressionRecord>> {
        let _span = spans::sweep_image(path).entered();
        let original_format = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let decoded = ImageIOService::load_image(path)?;
        let prepared = prepare_image(decoded, self.config.resize);
        tracing::debug!(
            width = prepared.width(),
            height = prepared.height(),
            "Prepared image for sweep"
        );

        sweep_image(
            &self.encoder,
            &prepared,
            file_name,
            &original_format,
            self.config.qualities.clone(),
            &self.config.output_dir,
        )
    }
}
