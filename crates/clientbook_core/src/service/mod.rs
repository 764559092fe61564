//! Use-case services orchestrating repository access.
//!
//! # Responsibility
//! - Provide stable entry points for core callers (CLI, FFI, tests).
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Services remain storage-agnostic.

pub mod client_service;
