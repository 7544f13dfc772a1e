//! Person search entry points.
//!
//! # Responsibility
//! - Expose type-as-you-search lookup over loaded records.
//! - Keep result shaping inside core.

pub mod people;
