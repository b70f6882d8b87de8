//! Compression records and the measurement table
//!
//! One [`CompressionRecord`] per (image, quality) pair. The table is
//! append-only while a sweep runs and is written once, as CSV, at the end.

use crate::error::{DatasetError, Result};
use serde::{Serialize, Serializer};
use std::io::Write;
use std::path::Path;

/// Header row of the measurement table
pub const TABLE_HEADER: [&str; 5] = [
    "Image_Name",
    "Original_Format",
    "Quality",
    "Size_KB",
    "Dimensions",
];

/// Convert a byte count to kilobytes rounded to two decimals
#[must_use]
pub fn size_kb_from_bytes(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// Format dimensions as `WxH`
#[must_use]
pub fn dimension_string(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

/// One measurement: an image encoded at one quality level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionRecord {
    #[serde(rename = "Image_Name")]
    pub image_name: String,
    /// Source extension including the leading dot
    #[serde(rename = "Original_Format")]
    pub original_format: String,
    #[serde(rename = "Quality")]
    pub quality: u8,
    #[serde(rename = "Size_KB", serialize_with = "two_decimals")]
    pub size_kb: f64,
    #[serde(rename = "Dimensions")]
    pub dimensions: String,
}

/// Ordered collection of compression records
#[derive(Debug, Default, Clone)]
pub struct MeasurementTable {
    records: Vec<CompressionRecord>,
}

impl MeasurementTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CompressionRecord) {
        self.records.push(record);
    }

    pub fn extend<I: IntoIterator<Item = CompressionRecord>>(&mut self, records: I) {
        self.records.extend(records);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[CompressionRecord] {
        &self.records
    }

    /// Serialize the table as CSV, header row first
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(TABLE_HEADER)?;
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the table to `path`, replacing any previous table
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .map_err(|e| DatasetError::file_io_error("create measurement table", path, &e))?;
        self.write_to(std::io::BufWriter::new(file))?;
        tracing::info!(
            rows = self.records.len(),
            path = %path.display(),
            "Measurement table written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quality: u8, size_kb: f64) -> CompressionRecord {
        CompressionRecord {
            image_name: "sample_1.jpg".to_string(),
            original_format: ".jpg".to_string(),
            quality,
            size_kb,
            dimensions: dimension_string(1000, 1000),
        }
    }

    #[test]
    fn test_size_kb_rounding() {
        assert!((size_kb_from_bytes(1024) - 1.0).abs() < f64::EPSILON);
        assert!((size_kb_from_bytes(1536) - 1.5).abs() < f64::EPSILON);
        assert!((size_kb_from_bytes(1000) - 0.98).abs() < 1e-9);
        assert!((size_kb_from_bytes(0)).abs() < f64::EPSILON);
        assert!((size_kb_from_bytes(123_456) - 120.56).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let table = MeasurementTable::new();
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Image_Name,Original_Format,Quality,Size_KB,Dimensions\n"
        );
    }

    #[test]
    fn test_rows_use_two_fractional_digits() {
        let mut table = MeasurementTable::new();
        table.push(record(1, 12.5));
        table.extend([record(2, 13.0), record(100, 301.27)]);
        assert_eq!(table.len(), 3);

        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Image_Name,Original_Format,Quality,Size_KB,Dimensions",
                "sample_1.jpg,.jpg,1,12.50,1000x1000",
                "sample_1.jpg,.jpg,2,13.00,1000x1000",
                "sample_1.jpg,.jpg,100,301.27,1000x1000",
            ]
        );
    }

    #[test]
    fn test_names_with_commas_are_quoted() {
        let mut table = MeasurementTable::new();
        table.push(CompressionRecord {
            image_name: "sample_1,copy.jpg".to_string(),
            ..record(50, 1.0)
        });
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("\"sample_1,copy.jpg\",.jpg,50,1.00,1000x1000"));
    }
}
