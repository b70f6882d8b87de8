//! Structural integrity probing for dataset files
//!
//! The probe parses container headers and checks the container structure for
//! truncation. JPEG segments and PNG chunks are walked up to their end marker,
//! so bytes appended after a complete image are ignored. Pixel data is never
//! decoded.

use image::ImageFormat;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// JPEG marker codes used by the segment walk
const JPEG_SOI: u8 = 0xD8;
const JPEG_EOI: u8 = 0xD9;
const JPEG_SOS: u8 = 0xDA;
const JPEG_TEM: u8 = 0x01;
const JPEG_RST: std::ops::RangeInclusive<u8> = 0xD0..=0xD7;

/// PNG file signature
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Outcome of probing a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityVerdict {
    /// The container is structurally sound
    Valid,
    /// The file cannot be processed, with a human-readable reason
    Corrupt(String),
}

impl IntegrityVerdict {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Capability to classify a file as valid or corrupt
///
/// Implementations must not panic and must release any handle they open
/// before returning.
pub trait IntegrityProbe {
    fn probe(&self, path: &Path) -> IntegrityVerdict;
}

/// Probe backed by the `image` crate's header parsers
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageIntegrityProbe;

impl ImageIntegrityProbe {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check(path: &Path) -> Result<(), String> {
        let file = File::open(path).map_err(|e| format!("cannot open file: {e}"))?;
        let len = file
            .metadata()
            .map_err(|e| format!("cannot read metadata: {e}"))?
            .len();
        if len == 0 {
            return Err("file is empty".to_string());
        }

        let reader = image::ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(|e| format!("cannot read header: {e}"))?;
        let format = reader
            .format()
            .ok_or_else(|| "unrecognized image container".to_string())?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| format!("malformed {format:?} header: {e}"))?;
        if width == 0 || height == 0 {
            return Err(format!("invalid dimensions {width}x{height}"));
        }

        let mut file = File::open(path).map_err(|e| format!("cannot reopen file: {e}"))?;
        check_trailer(&mut file, format, len)
    }
}

impl IntegrityProbe for ImageIntegrityProbe {
    fn probe(&self, path: &Path) -> IntegrityVerdict {
        match Self::check(path) {
            Ok(()) => IntegrityVerdict::Valid,
            Err(reason) => {
                tracing::debug!(path = %path.display(), %reason, "Integrity probe failed");
                IntegrityVerdict::Corrupt(reason)
            },
        }
    }
}

/// Verify the container ends where its format says it must
fn check_trailer<R: Read + Seek>(
    reader: &mut R,
    format: ImageFormat,
    len: u64,
) -> Result<(), String> {
    match format {
        ImageFormat::Jpeg => walk_jpeg(&read_all(reader, len)?),
        ImageFormat::Png => walk_png(&read_all(reader, len)?),
        ImageFormat::WebP => {
            let header = read_head(reader, 8)?;
            let declared = header
                .get(4..8)
                .and_then(|b| b.try_into().ok())
                .map(u32::from_le_bytes)
                .ok_or_else(|| "truncated RIFF header".to_string())?;
            let expected = u64::from(declared) + 8;
            if expected <= len {
                Ok(())
            } else {
                Err(format!(
                    "truncated WebP: RIFF declares {expected} bytes, file has {len}"
                ))
            }
        },
        ImageFormat::Bmp => {
            let header = read_head(reader, 6)?;
            let declared = header
                .get(2..6)
                .and_then(|b| b.try_into().ok())
                .map(u32::from_le_bytes)
                .ok_or_else(|| "truncated BMP header".to_string())?;
            if u64::from(declared) <= len {
                Ok(())
            } else {
                Err(format!(
                    "truncated BMP: header declares {declared} bytes, file has {len}"
                ))
            }
        },
        // Header parse is the only check available for other containers
        _ => Ok(()),
    }
}

/// Follow the JPEG segments from SOI until the EOI that closes the last scan
///
/// Entropy-coded data is skipped byte-wise: `FF 00` stuffing and restart
/// markers stay inside a scan, any other marker ends it.
fn walk_jpeg(data: &[u8]) -> Result<(), String> {
    let truncated = || "truncated JPEG: missing end-of-image marker".to_string();
    if data.get(..2) != Some(&[0xFF, JPEG_SOI][..]) {
        return Err("malformed JPEG: missing start-of-image marker".to_string());
    }

    let mut pos = 2;
    let mut scanned = false;
    loop {
        if data.get(pos) != Some(&0xFF) {
            return Err(match data.get(pos) {
                Some(_) => format!("malformed JPEG: expected marker at offset {pos}"),
                None => truncated(),
            });
        }
        // Fill bytes may precede a marker code
        while data.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *data.get(pos + 1).ok_or_else(truncated)?;

        match marker {
            JPEG_EOI if scanned => return Ok(()),
            JPEG_EOI => {
                return Err("malformed JPEG: no image scan before end marker".to_string());
            },
            JPEG_TEM => pos += 2,
            m if JPEG_RST.contains(&m) => pos += 2,
            _ => {
                let length = data
                    .get(pos + 2..pos + 4)
                    .and_then(|b| b.try_into().ok())
                    .map(|b| usize::from(u16::from_be_bytes(b)))
                    .ok_or_else(truncated)?;
                pos += 2 + length;
                if pos > data.len() {
                    return Err(truncated());
                }
                if marker == JPEG_SOS {
                    scanned = true;
                    pos = skip_entropy_data(data, pos).ok_or_else(truncated)?;
                }
            },
        }
    }
}

/// Offset of the first marker that ends the entropy-coded data at `pos`
fn skip_entropy_data(data: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let rest = data.get(pos..)?;
        let offset = rest.iter().position(|&b| b == 0xFF)?;
        pos += offset;
        match *data.get(pos + 1)? {
            0x00 => pos += 2,
            m if JPEG_RST.contains(&m) => pos += 2,
            _ => return Some(pos),
        }
    }
}

/// Follow the PNG chunks up to IEND, checking each chunk's bounds and CRC
fn walk_png(data: &[u8]) -> Result<(), String> {
    if data.get(..8) != Some(&PNG_SIGNATURE[..]) {
        return Err("malformed PNG: bad signature".to_string());
    }

    let mut pos = 8;
    while pos < data.len() {
        let (length, kind) = data
            .get(pos..pos + 4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_be_bytes)
            .zip(data.get(pos + 4..pos + 8))
            .ok_or_else(|| "truncated PNG: incomplete chunk header".to_string())?;
        let kind = String::from_utf8_lossy(kind).into_owned();

        let body_end = pos + 8 + length as usize;
        let (body, stored) = data
            .get(pos + 4..body_end)
            .zip(
                data.get(body_end..body_end + 4)
                    .and_then(|b| b.try_into().ok())
                    .map(u32::from_be_bytes),
            )
            .ok_or_else(|| format!("truncated PNG: {kind} chunk runs past end of file"))?;
        if crc32fast::hash(body) != stored {
            return Err(format!("corrupt PNG: CRC mismatch in {kind} chunk"));
        }

        if kind == "IEND" {
            return Ok(());
        }
        pos = body_end + 4;
    }
    Err("truncated PNG: missing IEND chunk".to_string())
}

fn read_all<R: Read + Seek>(reader: &mut R, len: u64) -> Result<Vec<u8>, String> {
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| format!("cannot seek to start: {e}"))?;
    let mut data = Vec::with_capacity(len as usize);
    reader
        .read_to_end(&mut data)
        .map_err(|e| format!("cannot read file: {e}"))?;
    Ok(data)
}

fn read_head<R: Read + Seek>(reader: &mut R, count: usize) -> Result<Vec<u8>, String> {
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| format!("cannot seek to header: {e}"))?;
    let mut head = vec![0; count];
    reader
        .read_exact(&mut head)
        .map_err(|e| format!("cannot read header: {e}"))?;
    Ok(head)
}
