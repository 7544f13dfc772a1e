//! Core use-case services.
//!
//! # Responsibility
//! - Hold the pure meal resolver.
//! - Orchestrate record store calls into use-case level APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod meal_service;
pub mod resolve;
