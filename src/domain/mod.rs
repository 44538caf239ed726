//! Domain layer types and invariants.

pub mod configuration;
pub mod error;
