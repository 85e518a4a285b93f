use crate::entities::{Entity, EntityKind, Listing, Movie, Review};
use crate::error::{Error, Result};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

/// Full read of the three collections, in id order.
///
/// This is what the correlation functions work on. It is rebuilt for every
/// view and never cached between menu actions.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub movies: Vec<Movie>,
    pub reviews: Vec<Review>,
    pub listings: Vec<Listing>,
}

/// Table-like store for movies, reviews and listings.
///
/// Each kind has its own id space (`INTEGER PRIMARY KEY AUTOINCREMENT`), so
/// ids are handed out in insertion order and never reused within a run, even
/// after a delete. There are no foreign keys between tables.
///
/// Every primitive is a single statement or a single SQLite transaction, so
/// callers never observe a partial write. The store assumes one caller; wrap
/// it in a `Mutex` before sharing it.
pub struct EntityStore {
    conn: Connection,
}

impl EntityStore {
    /// Open (or create) a store at `path`. `:memory:` gives a throwaway store.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        if path != Path::new(":memory:") {
            // Enable WAL mode for crash recovery
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        setup_database(&conn)?;
        info!(path = %path.display(), "store opened");

        Ok(Self { conn })
    }

    /// In-memory store with the full schema. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a record and return the id the store assigned to it.
    /// Whatever id the record carries is ignored.
    pub fn insert<E: Entity>(&self, entity: &E) -> Result<i64> {
        insert_row(&self.conn, entity)
    }

    /// Fetch one record by id, or `NotFound` labelled with the kind.
    pub fn get<E: Entity>(&self, id: i64) -> Result<E> {
        get_row(&self.conn, id)?.ok_or(Error::NotFound { kind: E::KIND, id })
    }

    /// Delete one record by id. Deleting an absent id is `NotFound` and
    /// leaves the table untouched.
    pub fn delete<E: Entity>(&self, id: i64) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", E::KIND.table());
        let affected = self.conn.execute(&sql, [id])?;

        if affected == 0 {
            return Err(Error::NotFound { kind: E::KIND, id });
        }

        debug!(kind = %E::KIND, id, "deleted");
        Ok(())
    }

    /// Read-mutate-write one record in a single transaction and return the
    /// stored result. The mutator cannot move the record to another id.
    pub fn update<E, F>(&mut self, id: i64, mutator: F) -> Result<E>
    where
        E: Entity,
        F: FnOnce(&mut E),
    {
        let tx = self.conn.transaction()?;

        let mut entity: E = get_row(&tx, id)?.ok_or(Error::NotFound { kind: E::KIND, id })?;
        mutator(&mut entity);

        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            E::KIND.table(),
            assignments,
            E::COLUMNS.len() + 1
        );

        let mut values = entity.values();
        values.push(&id);
        tx.execute(&sql, values.as_slice())?;
        drop(values);
        tx.commit()?;
        debug!(kind = %E::KIND, id, "updated");

        self.get(id)
    }

    /// All records of one kind, in id (insertion) order.
    pub fn scan<E: Entity>(&self) -> Result<Vec<E>> {
        let sql = format!(
            "SELECT id, {} FROM {} ORDER BY id",
            E::COLUMNS.join(", "),
            E::KIND.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], E::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn count(&self, kind: EntityKind) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;

        Ok(count)
    }

    /// Empty every table and restart id numbering at 1.
    pub fn reset_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;

        for kind in EntityKind::ALL {
            tx.execute(&format!("DELETE FROM {}", kind.table()), [])?;
        }
        let tables = EntityKind::ALL.map(|kind| kind.table());
        tx.execute(
            "DELETE FROM sqlite_sequence WHERE name IN (?1, ?2, ?3)",
            params_from_iter(tables.iter()),
        )?;

        tx.commit()?;
        info!("store reset");

        Ok(())
    }

    /// Read all three collections for one render.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            movies: self.scan()?,
            reviews: self.scan()?,
            listings: self.scan()?,
        })
    }

    /// Release the connection. Any error from SQLite while closing is returned.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Database(e))?;
        info!("store closed");
        Ok(())
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            director TEXT NOT NULL,
            year INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            movie_title TEXT NOT NULL,
            author TEXT NOT NULL,
            text TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS listings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cinema_name TEXT NOT NULL,
            movie_title TEXT NOT NULL
        );",
    )?;

    Ok(())
}

fn insert_row<E: Entity>(conn: &Connection, entity: &E) -> Result<i64> {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::KIND.table(),
        E::COLUMNS.join(", "),
        placeholders
    );

    conn.execute(&sql, entity.values().as_slice())?;

    Ok(conn.last_insert_rowid())
}

fn get_row<E: Entity>(conn: &Connection, id: i64) -> Result<Option<E>> {
    let sql = format!(
        "SELECT id, {} FROM {} WHERE id = ?1",
        E::COLUMNS.join(", "),
        E::KIND.table()
    );

    let entity = conn.query_row(&sql, [id], E::from_row).optional()?;

    Ok(entity)
}
