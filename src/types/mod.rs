//! Core types for type-safe vector spaces and sensor input

pub mod measurement;
pub mod spaces;
