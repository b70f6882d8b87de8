//! Shared fixtures for the integration tests
//!
//! Images are generated on the fly so the tests need no checked-in assets.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};

/// Deterministic image with gradients and noise, so JPEG quality matters
pub fn photo_like(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    RgbImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (state >> 26) as u8;
        image::Rgb([
            ((x * 255) / width.max(1)) as u8 ^ noise,
            ((y * 255) / height.max(1)) as u8,
            (((x + y) * 7) as u8).wrapping_add(noise),
        ])
    })
}

/// Write a JPEG sample and return its path
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode_image(&photo_like(width, height, width ^ height))
        .unwrap();
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Write a PNG sample and return its path
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    photo_like(width, height, 7)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

/// Cut a file down to half its length
pub fn truncate_half(path: &Path) {
    let bytes = std::fs::read(path).unwrap();
    std::fs::write(path, &bytes[..bytes.len() / 2]).unwrap();
}

/// File names in a directory, sorted
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
