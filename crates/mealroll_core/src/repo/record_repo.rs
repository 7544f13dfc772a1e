//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the `RecordStore` boundary used by meal services.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Record order is the `people.position` order and survives round-trips.
//! - Every person row is written with exactly one `meal_slots` row per slot.
//! - Unparseable stored skip dates load as absent instead of failing.

use crate::db::DbError;
use crate::model::meal::{
    format_skip_date, normalize_cell, parse_skip_date, MealSlot, PersonMealRecord,
};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record store error for persistence and load operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// File-backed store could not be read or replaced.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Persisted data does not have the expected shape.
    InvalidData(String),
    /// No person matches the given display key.
    NotFound(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::NotFound(key) => write!(f, "person not found: {key}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::InvalidData(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Boundary between meal services and whatever holds the person records.
pub trait RecordStore {
    /// Loads every record in store order.
    fn load_all(&self) -> RepoResult<Vec<PersonMealRecord>>;

    /// Replaces the whole store with `records`, preserving their order.
    fn write_all(&self, records: &[PersonMealRecord]) -> RepoResult<()>;

    /// Reads one person by `PersonMealRecord::display_key`.
    fn find_person(&self, display_key: &str) -> RepoResult<Option<PersonMealRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|record| record.display_key() == display_key))
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn load_all(&self) -> RepoResult<Vec<PersonMealRecord>> {
        (**self).load_all()
    }

    fn write_all(&self, records: &[PersonMealRecord]) -> RepoResult<()> {
        (**self).write_all(records)
    }

    fn find_person(&self, display_key: &str) -> RepoResult<Option<PersonMealRecord>> {
        (**self).find_person(display_key)
    }
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SqliteRecordStore<'_> {
    /// Loads every person, or only the one at `only_position` when given.
    fn read_records(&self, only_position: Option<i64>) -> RepoResult<Vec<PersonMealRecord>> {
        let mut people_stmt = self.conn.prepare(
            "SELECT position, name, address
             FROM people
             WHERE (?1 IS NULL OR position = ?1)
             ORDER BY position ASC;",
        )?;
        let mut rows = people_stmt.query([only_position])?;
        let mut records = Vec::new();
        let mut index_by_position = HashMap::new();

        while let Some(row) = rows.next()? {
            let position: i64 = row.get("position")?;
            let name: String = row.get("name")?;
            let address: String = row.get("address")?;
            index_by_position.insert(position, records.len());
            records.push(PersonMealRecord::new(
                normalize_cell(&name),
                normalize_cell(&address),
            ));
        }

        let mut slot_stmt = self.conn.prepare(
            "SELECT position, slot, default_order, today_order, skip_until
             FROM meal_slots
             WHERE (?1 IS NULL OR position = ?1)
             ORDER BY position ASC, slot ASC;",
        )?;
        let mut rows = slot_stmt.query([only_position])?;
        let mut unparsed_dates = 0usize;

        while let Some(row) = rows.next()? {
            let position: i64 = row.get("position")?;
            let slot_text: String = row.get("slot")?;
            let slot = MealSlot::parse(&slot_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid slot `{slot_text}` in meal_slots.slot"))
            })?;
            let index = *index_by_position.get(&position).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "meal_slots row references missing position {position}"
                ))
            })?;

            let raw_skip: Option<String> = row.get("skip_until")?;
            let skip_until = raw_skip.as_deref().and_then(parse_skip_date);
            let has_skip_text = raw_skip
                .as_deref()
                .is_some_and(|value| !normalize_cell(value).is_empty());
            if skip_until.is_none() && has_skip_text {
                unparsed_dates += 1;
            }

            let order = records[index].slot_mut(slot);
            order.default_order = normalize_cell(&row.get::<_, String>("default_order")?);
            order.today_order = normalize_cell(&row.get::<_, String>("today_order")?);
            order.skip_until = skip_until;
        }

        if unparsed_dates > 0 {
            warn!(
                "event=records_load module=repo store=sqlite status=degraded unparsed_skip_dates={unparsed_dates}"
            );
        }
        Ok(records)
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn load_all(&self) -> RepoResult<Vec<PersonMealRecord>> {
        let records = self.read_records(None)?;
        info!(
            "event=records_load module=repo store=sqlite status=ok count={}",
            records.len()
        );
        Ok(records)
    }

    fn write_all(&self, records: &[PersonMealRecord]) -> RepoResult<()> {
        // Dropping an uncommitted transaction rolls back, so the previous
        // rows survive any failure below.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM meal_slots;", [])?;
        tx.execute("DELETE FROM people;", [])?;

        {
            let mut insert_person = tx.prepare(
                "INSERT INTO people (position, name, address) VALUES (?1, ?2, ?3);",
            )?;
            let mut insert_slot = tx.prepare(
                "INSERT INTO meal_slots (
                    position,
                    slot,
                    default_order,
                    today_order,
                    skip_until
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;

            for (position, record) in records.iter().enumerate() {
                let position = i64::try_from(position).map_err(|_| {
                    RepoError::InvalidData(format!("record position {position} out of range"))
                })?;
                insert_person.execute(params![
                    position,
                    record.name.as_str(),
                    record.address.as_str()
                ])?;

                for slot in MealSlot::ALL {
                    let order = record.slot(slot);
                    let skip_until = order
                        .skip_until
                        .map(|date| format_skip_date(Some(date)));
                    insert_slot.execute(params![
                        position,
                        slot.as_str(),
                        order.default_order.as_str(),
                        order.today_order.as_str(),
                        skip_until,
                    ])?;
                }
            }
        }

        tx.commit()?;
        info!(
            "event=records_write module=repo store=sqlite status=ok count={}",
            records.len()
        );
        Ok(())
    }

    fn find_person(&self, display_key: &str) -> RepoResult<Option<PersonMealRecord>> {
        let position = self
            .conn
            .query_row(
                "SELECT position
                 FROM people
                 WHERE name || ' (' || address || ')' = ?1
                 ORDER BY position ASC
                 LIMIT 1;",
                [display_key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match position {
            Some(position) => Ok(self.read_records(Some(position))?.into_iter().next()),
            None => Ok(None),
        }
    }
}
