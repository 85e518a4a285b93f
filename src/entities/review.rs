// 💬 Review Entity
//
// `movie_title` links the review to a movie by exact text match. A review
// whose title matches no movie stays in the store but never shows up in a
// movie-centric view. `text` is the only field the operator can edit.

use super::{Entity, EntityKind};
use rusqlite::types::ToSql;
use rusqlite::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: i64,
    pub movie_title: String,
    pub author: String,
    pub text: String,
}

impl Review {
    pub fn new(
        movie_title: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Review {
            id: 0,
            movie_title: movie_title.into(),
            author: author.into(),
            text: text.into(),
        }
    }

    pub fn is_by(&self, author: &str) -> bool {
        self.author == author
    }

    pub fn is_about(&self, title: &str) -> bool {
        self.movie_title == title
    }
}

impl Entity for Review {
    const KIND: EntityKind = EntityKind::Review;
    const COLUMNS: &'static [&'static str] = &["movie_title", "author", "text"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Review {
            id: row.get(0)?,
            movie_title: row.get(1)?,
            author: row.get(2)?,
            text: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.movie_title as &dyn ToSql,
            &self.author as &dyn ToSql,
            &self.text as &dyn ToSql,
        ]
    }

    fn from_fields(fields: &[String]) -> Option<Self> {
        match fields {
            [title, author, text, ..] => Some(Review::new(title.as_str(), author.as_str(), text.as_str())),
            _ => None,
        }
    }
}
