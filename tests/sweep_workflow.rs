//! End-to-end compression sweeps over generated images

mod common;

use common::{list_names, write_jpeg, write_png};
use imgset::{CompressionSweep, DatasetError, NoOpProgressReporter, Result, SweepConfig};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

fn read_rows(table: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(table).unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}

#[test]
fn test_full_quality_range_produces_one_row_per_level() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("samples");
    let output = temp_dir.path().join("out");
    std::fs::create_dir(&input)?;
    write_jpeg(&input, "sample_1.jpg", 40, 30);
    write_png(&input, "sample_2.png", 20, 50);

    let config = SweepConfig::builder()
        .input_dir(&input)
        .output_dir(&output)
        .resize(32)
        .build()?;
    let reporter = NoOpProgressReporter;
    let summary = CompressionSweep::new(config, &reporter).run()?;

    assert_eq!(summary.images_processed, 2);
    assert_eq!(summary.rows_written, 200);
    assert!(summary.failures.is_empty());

    let text = std::fs::read_to_string(&summary.table_path)?;
    assert_eq!(text.lines().count(), 201);
    assert_eq!(
        text.lines().next(),
        Some("Image_Name,Original_Format,Quality,Size_KB,Dimensions")
    );

    let rows = read_rows(&summary.table_path);
    assert!(rows.iter().all(|row| &row[4] == "32x32"));
    assert!(rows
        .iter()
        .all(|row| row[3].split('.').nth(1).map(str::len) == Some(2)));

    let formats: Vec<&str> = rows.iter().map(|row| &row[1]).collect();
    assert_eq!(formats.first(), Some(&".jpg"));
    assert_eq!(formats.last(), Some(&".png"));

    // Only the table remains in the output directory
    assert_eq!(list_names(&output), vec!["result.csv"]);
    Ok(())
}

#[test]
fn test_native_dimensions_without_resize() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_png(temp_dir.path(), "sample_1.png", 21, 13);

    let output = temp_dir.path().join("out");
    let config = SweepConfig::builder()
        .input_dir(temp_dir.path())
        .output_dir(&output)
        .resize(0)
        .qualities(1..=3)
        .build()?;
    let reporter = NoOpProgressReporter;
    let summary = CompressionSweep::new(config, &reporter).run()?;

    let rows = read_rows(&summary.table_path);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| &row[4] == "21x13"));
    assert_eq!(
        rows.iter().map(|row| row[2].to_string()).collect::<Vec<_>>(),
        vec!["1", "2", "3"]
    );
    Ok(())
}

#[test]
fn test_highest_quality_is_not_smaller_than_lowest() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_jpeg(temp_dir.path(), "sample_1.jpg", 64, 64);

    let config = SweepConfig::builder()
        .input_dir(temp_dir.path())
        .output_dir(temp_dir.path().join("out"))
        .resize(0)
        .build()?;
    let reporter = NoOpProgressReporter;
    let summary = CompressionSweep::new(config, &reporter).run()?;

    let sizes: HashMap<String, f64> = read_rows(&summary.table_path)
        .iter()
        .map(|row| (row[2].to_string(), row[3].parse().unwrap()))
        .collect();
    assert!(sizes["100"] >= sizes["1"]);
    Ok(())
}

#[test]
fn test_undecodable_image_is_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("out");
    write_jpeg(temp_dir.path(), "sample_1.jpg", 16, 16);
    std::fs::write(temp_dir.path().join("sample_3.webp"), b"RIFF????")?;
    std::fs::write(temp_dir.path().join("sample_2.jpg"), b"\xFF\xD8garbage")?;

    let config = SweepConfig::builder()
        .input_dir(temp_dir.path())
        .output_dir(&output)
        .resize(8)
        .qualities(1..=10)
        .build()?;
    let reporter = NoOpProgressReporter;
    let summary = CompressionSweep::new(config, &reporter).run()?;

    assert_eq!(summary.images_selected, 3);
    assert_eq!(summary.images_processed, 1);
    assert_eq!(summary.rows_written, 10);
    let failed: Vec<&str> = summary
        .failures
        .iter()
        .map(|f| f.file_name.as_str())
        .collect();
    assert_eq!(failed, vec!["sample_2.jpg", "sample_3.webp"]);
    assert_eq!(list_names(&output), vec!["result.csv"]);
    Ok(())
}

#[test]
fn test_rerun_regenerates_table() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_png(temp_dir.path(), "sample_1.png", 10, 10);

    let build = || {
        SweepConfig::builder()
            .input_dir(temp_dir.path())
            .output_dir(temp_dir.path().join("out"))
            .table_name("sizes.csv")
            .qualities(50..=59)
            .resize(8)
            .build()
    };
    let reporter = NoOpProgressReporter;
    let first = CompressionSweep::new(build()?, &reporter).run()?;
    let second = CompressionSweep::new(build()?, &reporter).run()?;

    assert_eq!(first.rows_written, 10);
    assert_eq!(second.rows_written, 10);
    assert_eq!(read_rows(&second.table_path).len(), 10);
    Ok(())
}

#[test]
fn test_preconditions() {
    let temp_dir = TempDir::new().unwrap();
    let reporter = NoOpProgressReporter;

    let missing = SweepConfig::builder()
        .input_dir(temp_dir.path().join("absent"))
        .build()
        .unwrap();
    let err = CompressionSweep::new(missing, &reporter).run().unwrap_err();
    assert!(matches!(err, DatasetError::MissingDirectory(_)));

    std::fs::write(temp_dir.path().join("photo_1.jpg"), b"x").unwrap();
    let unmatched = SweepConfig::builder()
        .input_dir(temp_dir.path())
        .build()
        .unwrap();
    let err = CompressionSweep::new(unmatched, &reporter).run().unwrap_err();
    assert!(matches!(err, DatasetError::NoMatchingFiles { .. }));
    assert!(err.is_precondition());
}
