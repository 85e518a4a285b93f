//! Runtime configuration: command-line flags with environment fallbacks.

use crate::entities::EntityKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "filmoteca")]
#[command(about = "Browse, review and export a small movie catalog")]
#[command(version)]
pub struct Config {
    /// SQLite database file (":memory:" for a throwaway store)
    #[arg(long, default_value = "filmoteca.db", env = "FILMOTECA_DATABASE")]
    pub database: PathBuf,

    /// Directory holding movies.csv, reviews.csv and cinema-listings.csv
    #[arg(long, default_value = "data", env = "FILMOTECA_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory export files are written to
    #[arg(long, default_value = ".", env = "FILMOTECA_EXPORT_DIR")]
    pub export_dir: PathBuf,

    /// Keep rows from a previous run instead of clearing the store at startup
    #[arg(long)]
    pub keep_data: bool,
}

impl Config {
    /// Configuration for a given data directory, everything else default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            database: PathBuf::from(":memory:"),
            data_dir: data_dir.into(),
            export_dir: PathBuf::from("."),
            keep_data: false,
        }
    }

    /// Input file for one entity kind
    pub fn input_path(&self, kind: EntityKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }
}
