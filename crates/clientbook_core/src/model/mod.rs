//! Domain models for the client directory.
//!
//! # Responsibility
//! - Define the canonical client/phone records and write-request shapes.
//! - Keep field-level validation next to the data it protects.
//!
//! # Invariants
//! - `id` values are database-assigned and immutable once issued.
//! - Validation runs before any write reaches SQL.

pub mod client;
