//! Error taxonomy for the filmoteca library.
//!
//! Every failure is terminal for the single action that raised it. The
//! session loop reports recoverable errors to the operator and returns to
//! the main menu; only a broken console ends the loop.

use crate::entities::EntityKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for filmoteca operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// File could not be read or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed field in an input file (aborts that file's load)
    #[error("Format error in {} line {line}: {message}", .path.display())]
    Format {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// Id-based lookup, delete or modify missed
    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    /// Out-of-range or unparseable menu selection
    #[error("Invalid option: {0}")]
    InvalidChoice(String),

    /// Store failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The terminal itself failed (stdin closed with an error, stdout gone)
    #[error("Console error: {0}")]
    Console(#[from] io::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert a csv error, keeping I/O failures distinct from malformed data.
    pub fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let path = path.into();
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Error::Io { path, source },
            _ => Error::Format {
                path,
                line,
                message,
            },
        }
    }

    /// Whether the session loop can report this and carry on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Console(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
