//! Image and filesystem I/O operations service
//!
//! This module separates file I/O from the pipelines, keeping decode
//! fallbacks and directory preparation in one place.

use crate::error::{DatasetError, Result};
use image::DynamicImage;
use std::path::Path;

/// Service for handling image file input and output directories
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Decoding is driven by the file extension first. When that fails the
    /// format is sniffed from the file content, so a mislabelled file still
    /// loads.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use imgset::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("samples/sample_1.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(DatasetError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                tracing::debug!(
                    "Extension-based loading failed for {}: {}. Trying content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    DatasetError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    tracing::debug!(
                        "Content-based loading failed for {}: {}",
                        path_ref.display(),
                        content_err
                    );
                    DatasetError::Image(e)
                })
            },
        }
    }

    /// Create a directory (and its parents) unless it already exists
    ///
    /// Fails when the path exists but is not a directory.
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path_ref = path.as_ref();
        if path_ref.is_dir() {
            return Ok(());
        }
        if path_ref.exists() {
            return Err(DatasetError::invalid_config(format!(
                "Output path exists and is a file, not a directory: {}",
                path_ref.display()
            )));
        }
        std::fs::create_dir_all(path_ref)
            .map_err(|e| DatasetError::file_io_error("create directory", path_ref, &e))
    }
}
