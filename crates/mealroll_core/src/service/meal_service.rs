//! Meal use-case service.
//!
//! # Responsibility
//! - Run resolution cycles end to end: load, resolve, write back.
//! - Provide person lookup, per-slot edits, and store seeding.
//!
//! # Invariants
//! - The resolver never runs without a successfully loaded record set.
//! - Every mutation is persisted with one whole-store `write_all`.
//! - A failed write-back hands the resolved cycle back to the caller so the
//!   in-memory state can be retried; the stored state stays as it was.

use crate::model::meal::{normalize_cell, MealSlot, PersonMealRecord};
use crate::model::sample::sample_records;
use crate::repo::record_repo::{RecordStore, RepoError, RepoResult};
use crate::service::resolve::{resolve, ResolvedCycle};
use chrono::NaiveDate;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::time::Instant;

pub type MealServiceResult<T> = Result<T, MealServiceError>;

/// Service error for meal use-cases.
#[derive(Debug)]
pub enum MealServiceError {
    /// Records could not be loaded; nothing was resolved.
    NoData(RepoError),
    /// The cycle resolved but could not be persisted.
    WriteBack {
        cycle: Box<ResolvedCycle>,
        source: RepoError,
    },
    /// No person matches the display key.
    PersonNotFound(String),
    /// A person with the same display key already exists.
    DuplicatePerson(String),
    /// Person names must not be blank.
    BlankName,
    /// Seeding refused because the store already holds records.
    StoreNotEmpty(usize),
    Repo(RepoError),
}

impl Display for MealServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData(err) => write!(f, "no data available: {err}"),
            Self::WriteBack { source, .. } => {
                write!(f, "failed to save resolved records: {source}")
            }
            Self::PersonNotFound(key) => write!(f, "person not found: {key}"),
            Self::DuplicatePerson(key) => write!(f, "person already exists: {key}"),
            Self::BlankName => write!(f, "person name cannot be blank"),
            Self::StoreNotEmpty(count) => {
                write!(f, "record store already holds {count} record(s)")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MealServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoData(err) | Self::Repo(err) => Some(err),
            Self::WriteBack { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RepoError> for MealServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(key) => Self::PersonNotFound(key),
            other => Self::Repo(other),
        }
    }
}

/// Partial edit of one person's meal slot.
///
/// `None` leaves a field unchanged. For `skip_until`, `Some(None)` clears the
/// skip window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotEdit {
    pub today_order: Option<String>,
    pub default_order: Option<String>,
    pub skip_until: Option<Option<NaiveDate>>,
}

impl SlotEdit {
    pub fn is_empty(&self) -> bool {
        self.today_order.is_none() && self.default_order.is_none() && self.skip_until.is_none()
    }
}

/// Meal service facade over a record store.
pub struct MealService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> MealService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one resolution cycle for `slot` on `today` and persists the
    /// mutated records.
    pub fn run_resolution_cycle(
        &self,
        slot: MealSlot,
        today: NaiveDate,
    ) -> MealServiceResult<ResolvedCycle> {
        let started_at = Instant::now();
        info!("event=resolution_cycle module=service status=start slot={slot} date={today}");

        let records = self.store.load_all().map_err(|err| {
            error!(
                "event=resolution_cycle module=service status=error slot={slot} stage=load error={err}"
            );
            MealServiceError::NoData(err)
        })?;

        let cycle = resolve(slot, today, records);
        if let Err(source) = self.store.write_all(&cycle.records) {
            error!(
                "event=resolution_cycle module=service status=error slot={slot} stage=write_back error={source}"
            );
            return Err(MealServiceError::WriteBack {
                cycle: Box::new(cycle),
                source,
            });
        }

        let suppressed = cycle
            .outcomes
            .iter()
            .filter(|outcome| outcome.is_suppressed())
            .count();
        info!(
            "event=resolution_cycle module=service status=ok slot={slot} records={} served={} suppressed={suppressed} mutated={} duration_ms={}",
            cycle.records.len(),
            cycle.serving_list.len(),
            cycle.mutated_count(),
            started_at.elapsed().as_millis()
        );
        Ok(cycle)
    }

    /// Persists a record set, typically from a failed cycle's write-back.
    pub fn persist(&self, records: &[PersonMealRecord]) -> MealServiceResult<()> {
        self.store.write_all(records)?;
        Ok(())
    }

    /// Lists all people in store order.
    pub fn list_people(&self) -> MealServiceResult<Vec<PersonMealRecord>> {
        self.store.load_all().map_err(MealServiceError::NoData)
    }

    /// Gets one person by display key.
    pub fn find_person(&self, display_key: &str) -> RepoResult<Option<PersonMealRecord>> {
        self.store.find_person(display_key)
    }

    /// Applies `edit` to one slot of one person and saves the store.
    pub fn update_slot(
        &self,
        display_key: &str,
        slot: MealSlot,
        edit: &SlotEdit,
    ) -> MealServiceResult<PersonMealRecord> {
        let mut records = self.store.load_all().map_err(MealServiceError::NoData)?;
        let record = records
            .iter_mut()
            .find(|record| record.display_key() == display_key)
            .ok_or_else(|| MealServiceError::PersonNotFound(display_key.to_string()))?;

        let order = record.slot_mut(slot);
        if let Some(today_order) = &edit.today_order {
            order.today_order = normalize_cell(today_order);
        }
        if let Some(default_order) = &edit.default_order {
            order.default_order = normalize_cell(default_order);
        }
        if let Some(skip_until) = edit.skip_until {
            order.skip_until = skip_until;
        }
        let updated = record.clone();

        self.store.write_all(&records)?;
        info!("event=slot_update module=service status=ok slot={slot}");
        Ok(updated)
    }

    /// Appends a person with blank slots.
    pub fn add_person(&self, name: &str, address: &str) -> MealServiceResult<PersonMealRecord> {
        let name = normalize_cell(name);
        if name.is_empty() {
            return Err(MealServiceError::BlankName);
        }
        let record = PersonMealRecord::new(name, normalize_cell(address));
        let display_key = record.display_key();

        let mut records = self.store.load_all().map_err(MealServiceError::NoData)?;
        if records
            .iter()
            .any(|existing| existing.display_key() == display_key)
        {
            return Err(MealServiceError::DuplicatePerson(display_key));
        }

        records.push(record.clone());
        self.store.write_all(&records)?;
        info!(
            "event=person_add module=service status=ok count={}",
            records.len()
        );
        Ok(record)
    }

    /// Writes the sample record set. Refuses a non-empty store unless `force`.
    ///
    /// A sheet file that does not exist yet counts as empty. Any other load
    /// failure is reported as `NoData` and leaves the store untouched.
    pub fn seed_sample(&self, today: NaiveDate, force: bool) -> MealServiceResult<usize> {
        if !force {
            let existing = match self.store.load_all() {
                Ok(records) => records.len(),
                Err(RepoError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => 0,
                Err(err) => {
                    error!("event=store_seed module=service status=error stage=load error={err}");
                    return Err(MealServiceError::NoData(err));
                }
            };
            if existing > 0 {
                return Err(MealServiceError::StoreNotEmpty(existing));
            }
        }

        let records = sample_records(today);
        self.store.write_all(&records)?;
        info!(
            "event=store_seed module=service status=ok count={}",
            records.len()
        );
        Ok(records.len())
    }
}

/// Copies every record from `source` into `target`, replacing its contents.
pub fn transfer_records(source: &impl RecordStore, target: &impl RecordStore) -> RepoResult<usize> {
    let records = source.load_all()?;
    target.write_all(&records)?;
    info!(
        "event=records_transfer module=service status=ok count={}",
        records.len()
    );
    Ok(records.len())
}
