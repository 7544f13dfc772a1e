//! Domain model for per-person meal ordering.
//!
//! # Responsibility
//! - Define canonical data structures used by the resolver and stores.
//! - Own cell normalization and the single skip-date parse step.
//!
//! # Invariants
//! - Text cells never carry null-serialization leakage (`nan`, `none`).
//! - Skip dates are typed; stores parse them once at load time.

pub mod meal;
pub mod sample;
