// Filmoteca - Core Library
// Loads movies, reviews and cinema listings from flat files into SQLite and
// drives the interactive review session over them.

pub mod error;
pub mod config;
pub mod entities;
pub mod db;
pub mod loader;
pub mod correlation;
pub mod export;
pub mod console;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use config::Config;
pub use entities::{Entity, EntityKind, Listing, Movie, Review};
pub use db::{EntityStore, Snapshot, setup_database};
pub use loader::{ColumnSpec, ColumnType, LoadReport, load, load_into, seed};
pub use correlation::{
    catalog, cinema_program, find_movie_by_title, listings_for_cinema, movies_for_cinema,
    reviewed_movies_for_user, reviews_for_movie, reviews_for_user_and_movie,
    unique_cinema_names,
};
pub use export::Exporter;
pub use console::Console;
pub use session::{Session, State};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
