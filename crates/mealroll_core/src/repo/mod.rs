//! Record store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the load-all / find / write-all contract the services depend on.
//! - Isolate SQLite and sheet-file details from resolution logic.
//!
//! # Invariants
//! - `write_all` is a whole-store overwrite and must be atomic: a failed
//!   write leaves the previously persisted records intact.
//! - Loaded text cells are normalized and skip dates are parsed exactly once.

pub mod record_repo;
pub mod sheet_file;
