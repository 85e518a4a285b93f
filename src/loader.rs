// 📂 Bulk Loader - delimited text files → store
//
// Input files are `;`-separated, no header row, no quoting. A field that
// itself contains `;` splits into two fields; that is a known limitation of
// the format and is not worked around here.

use crate::config::Config;
use crate::db::EntityStore;
use crate::entities::{Entity, EntityKind, Listing, Movie, Review};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::{info, warn};

pub const DELIMITER: u8 = b';';

// ============================================================================
// COLUMN SPEC
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    /// Parsed as `i32`, no trimming
    Int,
}

/// Expected shape of one input file
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub columns: &'static [(&'static str, ColumnType)],
}

impl ColumnSpec {
    pub const MOVIES: ColumnSpec = ColumnSpec {
        columns: &[
            ("title", ColumnType::Text),
            ("director", ColumnType::Text),
            ("year", ColumnType::Int),
        ],
    };

    pub const REVIEWS: ColumnSpec = ColumnSpec {
        columns: &[
            ("title", ColumnType::Text),
            ("author", ColumnType::Text),
            ("text", ColumnType::Text),
        ],
    };

    pub const LISTINGS: ColumnSpec = ColumnSpec {
        columns: &[("cinema", ColumnType::Text), ("title", ColumnType::Text)],
    };

    pub fn for_kind(kind: EntityKind) -> ColumnSpec {
        match kind {
            EntityKind::Movie => Self::MOVIES,
            EntityKind::Review => Self::REVIEWS,
            EntityKind::Listing => Self::LISTINGS,
        }
    }

    /// Check one row. Extra trailing fields are ignored.
    fn validate(&self, fields: &[String]) -> std::result::Result<(), String> {
        if fields.len() < self.columns.len() {
            return Err(format!(
                "expected {} fields, found {}",
                self.columns.len(),
                fields.len()
            ));
        }

        for ((name, column_type), value) in self.columns.iter().zip(fields) {
            if *column_type == ColumnType::Int && value.parse::<i32>().is_err() {
                return Err(format!("column '{}' is not an integer: {:?}", name, value));
            }
        }

        Ok(())
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Read a delimited file into field tuples, in file order.
///
/// The whole file is validated before anything is returned: the first bad
/// row fails the load with `Error::Format`, so callers never see a partial
/// file. Empty lines produce no tuple.
pub fn load(path: &Path, spec: &ColumnSpec) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::from_csv(path, e))?;

    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| Error::from_csv(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        spec.validate(&fields).map_err(|message| Error::Format {
            path: path.to_path_buf(),
            line,
            message,
        })?;

        rows.push(fields);
    }

    Ok(rows)
}

/// Load one file and insert every row as an `E`. Returns rows inserted.
pub fn load_into<E: Entity>(store: &EntityStore, path: &Path) -> Result<usize> {
    let rows = load(path, &ColumnSpec::for_kind(E::KIND))?;

    let mut inserted = 0;
    for (index, fields) in rows.iter().enumerate() {
        let entity = E::from_fields(fields).ok_or_else(|| Error::Format {
            path: path.to_path_buf(),
            line: index as u64 + 1,
            message: format!("cannot build {} from {:?}", E::KIND, fields),
        })?;
        store.insert(&entity)?;
        inserted += 1;
    }

    Ok(inserted)
}

/// Rows loaded per kind at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub movies: usize,
    pub reviews: usize,
    pub listings: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.movies + self.reviews + self.listings
    }
}

/// Startup sequence: clear the store (unless configured not to), then load
/// movies, reviews and listings in that order.
///
/// A file that cannot be read or fails validation counts as zero rows and is
/// logged; the remaining files still load. Store failures are returned.
pub fn seed(store: &mut EntityStore, config: &Config) -> Result<LoadReport> {
    if !config.keep_data {
        store.reset_all()?;
    }

    let report = LoadReport {
        movies: seed_kind::<Movie>(store, config)?,
        reviews: seed_kind::<Review>(store, config)?,
        listings: seed_kind::<Listing>(store, config)?,
    };

    info!(
        movies = report.movies,
        reviews = report.reviews,
        listings = report.listings,
        "startup load complete"
    );

    Ok(report)
}

fn seed_kind<E: Entity>(store: &EntityStore, config: &Config) -> Result<usize> {
    let path = config.input_path(E::KIND);

    match load_into::<E>(store, &path) {
        Ok(count) => {
            info!(kind = %E::KIND, path = %path.display(), count, "loaded");
            Ok(count)
        }
        Err(err @ (Error::Io { .. } | Error::Format { .. })) => {
            warn!(kind = %E::KIND, "{}; treating as zero rows", err);
            Ok(0)
        }
        Err(err) => Err(err),
    }
}
