//! Core domain logic for mealroll.
//! This crate is the single source of truth for meal resolution invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, MealrollConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::meal::{
    normalize_cell, parse_skip_date, MealSlot, PersonMealRecord, SlotLabels, SlotOrder,
};
pub use model::sample::sample_records;
pub use repo::record_repo::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use repo::sheet_file::SheetFileStore;
pub use search::people::{search_people, SearchHit, SearchQuery};
pub use service::meal_service::{
    transfer_records, MealService, MealServiceError, MealServiceResult, SlotEdit,
};
pub use service::resolve::{
    resolve, resolve_record, MealSource, Resolution, ResolvedCycle, ServingList,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
