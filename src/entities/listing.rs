// 🎟️ Listing Entity
//
// One row per (cinema, movie) association. A cinema showing three movies has
// three rows sharing `cinema_name`. Listings are never edited or deleted by
// the operator.

use super::{Entity, EntityKind};
use rusqlite::types::ToSql;
use rusqlite::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: i64,
    pub cinema_name: String,
    pub movie_title: String,
}

impl Listing {
    pub fn new(cinema_name: impl Into<String>, movie_title: impl Into<String>) -> Self {
        Listing {
            id: 0,
            cinema_name: cinema_name.into(),
            movie_title: movie_title.into(),
        }
    }
}

impl Entity for Listing {
    const KIND: EntityKind = EntityKind::Listing;
    const COLUMNS: &'static [&'static str] = &["cinema_name", "movie_title"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Listing {
            id: row.get(0)?,
            cinema_name: row.get(1)?,
            movie_title: row.get(2)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.cinema_name as &dyn ToSql, &self.movie_title as &dyn ToSql]
    }

    fn from_fields(fields: &[String]) -> Option<Self> {
        match fields {
            [cinema, title, ..] => Some(Listing::new(cinema.as_str(), title.as_str())),
            _ => None,
        }
    }
}
