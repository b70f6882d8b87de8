//! JPEG encoding for compression measurements
//!
//! Each measurement encodes to a real temporary file inside the scratch
//! directory so the recorded size is the on-disk size. The temporary file is
//! removed when it goes out of scope, on success and on error alike.

use crate::error::{DatasetError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JPEG encoder that reports the encoded size of an image at a given quality
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegQualityEncoder;

impl JpegQualityEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encode `image` at `quality` into memory
    pub fn encode(&self, image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(image)?;
        Ok(buffer)
    }

    /// Encode `image` at `quality` into a temporary file and return its size in bytes
    ///
    /// # Arguments
    /// * `image` - RGB image to encode
    /// * `quality` - JPEG quality (1-100)
    /// * `scratch_dir` - Directory receiving the temporary artifact
    /// * `stem` - Human-readable part of the temporary file name
    pub fn measure(
        &self,
        image: &RgbImage,
        quality: u8,
        scratch_dir: &Path,
        stem: &str,
    ) -> Result<u64> {
        let artifact = tempfile::Builder::new()
            .prefix(&format!("temp_{stem}_{quality}_"))
            .suffix(".jpg")
            .tempfile_in(scratch_dir)
            .map_err(|e| {
                DatasetError::file_io_error("create temporary artifact in", scratch_dir, &e)
            })?;

        {
            let mut writer = BufWriter::new(artifact.as_file());
            JpegEncoder::new_with_quality(&mut writer, quality).encode_image(image)?;
            writer.flush()?;
        }

        let size = artifact.as_file().metadata()?.len();
        tracing::trace!(quality, size, "Measured JPEG artifact");
        Ok(size)
    }
}
