//! Configuration types for the download, reconciliation and sweep pipelines
//!
//! All configuration comes from command-line flags. These types carry the
//! documented defaults so the library can be driven without the CLI.

use crate::error::{DatasetError, Result};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

/// Default filename prefix shared by all three tools
pub const DEFAULT_PREFIX: &str = "sample_";

/// Default dataset file extension
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Default dataset directory
pub const DEFAULT_SAMPLES_DIR: &str = "./samples";

/// Lowest and highest JPEG quality levels visited by a sweep
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Normalize an extension so it always carries a leading dot
#[must_use]
pub fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

/// Settings for the reconciliation checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Directory holding the dataset
    pub input_dir: PathBuf,
    /// Upper bound `N` of the expected identifier range `[1, N]`
    pub expected_count: i64,
    /// Filename prefix preceding the identifier
    pub prefix: String,
    /// Expected file extension, including the leading dot
    pub extension: String,
    /// Whether to run the structural integrity probe on every file
    pub deep_check: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_SAMPLES_DIR),
            expected_count: 30,
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            deep_check: true,
        }
    }
}

impl CheckConfig {
    /// Normalize the extension
    ///
    /// An empty prefix matches every file with the extension and a
    /// non-positive count leaves the expected range empty; neither is an error.
    pub fn validate(mut self) -> Result<Self> {
        self.extension = normalize_extension(&self.extension);
        Ok(self)
    }
}

/// Settings for the compression sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Directory holding the source images
    pub input_dir: PathBuf,
    /// Filename prefix filter
    pub prefix: String,
    /// Directory receiving the measurement table (created if absent)
    pub output_dir: PathBuf,
    /// Measurement table file name inside `output_dir`
    pub table_name: String,
    /// Square resize dimension; `None` keeps native dimensions
    pub resize: Option<u32>,
    /// Quality levels to visit, inclusive
    pub qualities: RangeInclusive<u8>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_SAMPLES_DIR),
            prefix: DEFAULT_PREFIX.to_string(),
            output_dir: PathBuf::from("./out"),
            table_name: "result.csv".to_string(),
            resize: Some(1000),
            qualities: MIN_QUALITY..=MAX_QUALITY,
        }
    }
}

impl SweepConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Full path of the measurement table
    #[must_use]
    pub fn table_path(&self) -> PathBuf {
        self.output_dir.join(&self.table_name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let (start, end) = (*self.qualities.start(), *self.qualities.end());
        if start < MIN_QUALITY || end > MAX_QUALITY || start > end {
            return Err(DatasetError::config_value_error(
                "quality range",
                format!("{start}..={end}"),
                "1-100, non-empty",
            ));
        }
        if self.table_name.is_empty()
            || self.table_name.contains('/')
            || self.table_name.contains('\\')
        {
            return Err(DatasetError::invalid_config(format!(
                "table name must be a bare file name, got '{}'",
                self.table_name
            )));
        }
        Ok(())
    }
}

/// Builder for [`SweepConfig`]
#[derive(Debug, Default)]
pub struct SweepConfigBuilder {
    config: SweepConfig,
}

impl SweepConfigBuilder {
    /// Set the input directory
    #[must_use]
    pub fn input_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    /// Set the filename prefix filter
    #[must_use]
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the measurement table file name
    #[must_use]
    pub fn table_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.table_name = name.into();
        self
    }

    /// Set the square resize dimension (0 disables resizing)
    #[must_use]
    pub fn resize(mut self, dimension: u32) -> Self {
        self.config.resize = (dimension > 0).then_some(dimension);
        self
    }

    /// Restrict the visited quality levels
    #[must_use]
    pub fn qualities(mut self, qualities: RangeInclusive<u8>) -> Self {
        self.config.qualities = qualities;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SweepConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Settings for the sample downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Number of samples to fetch, named `1..=count`
    pub count: u32,
    /// Square edge length requested from the image service
    pub size: u32,
    /// Directory receiving the samples
    pub output_dir: PathBuf,
    /// Overwrite files that already exist
    pub force: bool,
    /// Base URL of the placeholder image service
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause between consecutive network requests
    pub delay: Duration,
    /// Filename prefix of the produced samples
    pub prefix: String,
    /// File extension of the produced samples
    pub extension: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            count: 10,
            size: 1000,
            output_dir: PathBuf::from(DEFAULT_SAMPLES_DIR),
            force: false,
            base_url: "https://picsum.photos".to_string(),
            timeout: Duration::from_secs(10),
            delay: Duration::from_millis(100),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl DownloadConfig {
    /// File name of the sample with the given identifier
    #[must_use]
    pub fn file_name(&self, index: u32) -> String {
        format!("{}{}{}", self.prefix, index, normalize_extension(&self.extension))
    }

    /// URL fetched for every sample
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.size,
            self.size
        )
    }

    /// Validate the configuration
    ///
    /// A zero size is accepted; the service rejects those requests one by one.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DatasetError::invalid_config(format!(
                "base URL must use http or https, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }
}
