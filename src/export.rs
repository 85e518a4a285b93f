//! Export of correlated rows to `{label}_{yyyyMMdd_HHmmss}.csv`.
//!
//! Output uses the same `;` delimiter as the input files: one row per line,
//! no header, no quoting. The timestamp has one-second resolution, so two
//! exports under the same label within one second overwrite each other.

use crate::error::{Error, Result};
use crate::loader::DELIMITER;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Exporter { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `rows` under `label`, stamped with the local time.
    pub fn export<T: Serialize>(&self, label: &str, rows: &[T]) -> Result<PathBuf> {
        self.export_at(label, rows, Local::now().naive_local())
    }

    /// Same as `export` with a fixed timestamp.
    pub fn export_at<T: Serialize>(
        &self,
        label: &str,
        rows: &[T],
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf> {
        let path = self.dir.join(file_name(label, timestamp));

        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_path(&path)
            .map_err(|e| Error::from_csv(&path, e))?;

        for row in rows {
            writer.serialize(row).map_err(|e| Error::from_csv(&path, e))?;
        }
        writer.flush().map_err(|e| Error::io(&path, e))?;

        info!(path = %path.display(), rows = rows.len(), "exported");
        Ok(path)
    }
}

/// `{label}_{yyyyMMdd_HHmmss}.csv`
pub fn file_name(label: &str, timestamp: NaiveDateTime) -> String {
    format!("{}_{}.csv", label, timestamp.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 2)
            .unwrap()
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(file_name("ana", fixed_time()), "ana_20240309_070502.csv");
    }

    #[test]
    fn test_review_export_single_line() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let rows = vec![("Matrix".to_string(), "great".to_string())];
        let path = exporter.export_at("ana", &rows, fixed_time()).unwrap();

        assert_eq!(path.file_name().unwrap(), "ana_20240309_070502.csv");
        assert_eq!(fs::read_to_string(&path).unwrap(), "Matrix;great\n");
    }

    #[test]
    fn test_export_uses_current_time() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let rows = vec![("Matrix", "great")];
        let path = exporter.export("ana", &rows).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ana_"));
        assert!(name.ends_with(".csv"));
        // ana_ + yyyyMMdd_HHmmss + .csv
        assert_eq!(name.len(), 4 + 15 + 4);
    }

    #[test]
    fn test_listing_export_no_header_no_quotes() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let rows = vec![
            ("Galaxy", "Matrix", "Wachowski", 1999),
            ("Galaxy", "Dune, Part One", "Villeneuve", 2021),
        ];
        let path = exporter.export_at("Galaxy", &rows, fixed_time()).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Galaxy;Matrix;Wachowski;1999\nGalaxy;Dune, Part One;Villeneuve;2021\n"
        );
    }

    #[test]
    fn test_same_second_overwrites() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        exporter.export_at("ana", &[("A", "first")], fixed_time()).unwrap();
        let path = exporter.export_at("ana", &[("B", "second")], fixed_time()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "B;second\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path().join("does-not-exist"));

        let err = exporter
            .export_at("ana", &[("Matrix", "great")], fixed_time())
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_empty_rows_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());

        let rows: Vec<(String, String)> = Vec::new();
        let path = exporter.export_at("ana", &rows, fixed_time()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
