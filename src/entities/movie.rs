// 🎬 Movie Entity
//
// The title is the natural key every other kind correlates against. It is
// not enforced unique; when two movies share a title, lookups by title take
// the first one in store order.

use super::{Entity, EntityKind};
use rusqlite::types::ToSql;
use rusqlite::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i32,
}

impl Movie {
    /// New unsaved movie (id assigned on insert)
    pub fn new(title: impl Into<String>, director: impl Into<String>, year: i32) -> Self {
        Movie {
            id: 0,
            title: title.into(),
            director: director.into(),
            year,
        }
    }

    /// "Matrix (Wachowski, 1999)"
    pub fn headline(&self) -> String {
        format!("{} ({}, {})", self.title, self.director, self.year)
    }
}

impl Entity for Movie {
    const KIND: EntityKind = EntityKind::Movie;
    const COLUMNS: &'static [&'static str] = &["title", "director", "year"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Movie {
            id: row.get(0)?,
            title: row.get(1)?,
            director: row.get(2)?,
            year: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.title as &dyn ToSql,
            &self.director as &dyn ToSql,
            &self.year as &dyn ToSql,
        ]
    }

    fn from_fields(fields: &[String]) -> Option<Self> {
        match fields {
            [title, director, year, ..] => Some(Movie::new(
                title.as_str(),
                director.as_str(),
                year.parse().ok()?,
            )),
            _ => None,
        }
    }
}
