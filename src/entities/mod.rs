// Entity Models - Movie, Review, Listing
//
// Each record carries a store-assigned integer id. Relationships between
// kinds are NOT stored: reviews and listings point at a movie only through
// its title text, and the correlation module re-derives them on every read.

pub mod movie;
pub mod review;
pub mod listing;

pub use movie::Movie;
pub use review::Review;
pub use listing::Listing;

use rusqlite::types::ToSql;
use rusqlite::Row;
use std::fmt;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// The three id spaces of the store. Ids are only meaningful within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Movie,
    Review,
    Listing,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Movie, EntityKind::Review, EntityKind::Listing];

    /// Lowercase label shown next to ids ("review #12")
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::Review => "review",
            EntityKind::Listing => "listing",
        }
    }

    /// Backing table
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Movie => "movies",
            EntityKind::Review => "reviews",
            EntityKind::Listing => "listings",
        }
    }

    /// Input file name inside the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            EntityKind::Movie => "movies.csv",
            EntityKind::Review => "reviews.csv",
            EntityKind::Listing => "cinema-listings.csv",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// ENTITY TRAIT
// ============================================================================

/// A record kind the store knows how to persist.
///
/// `COLUMNS` lists the data columns in bind order, excluding `id`. Rows are
/// always selected as `id, COLUMNS...`, so `from_row` reads the id at index 0.
pub trait Entity: Sized {
    const KIND: EntityKind;
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Values bound to `COLUMNS`, same order
    fn values(&self) -> Vec<&dyn ToSql>;

    /// Build a record from one loader tuple (already validated against the
    /// kind's column spec). The id is left at 0 until the store assigns one.
    fn from_fields(fields: &[String]) -> Option<Self>;
}
