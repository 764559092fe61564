//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce model `validate()` before persistence.
//! - Multi-statement writes (client + phones) commit as one transaction.
//! - Repository APIs return semantic errors (`Constraint`) in addition to
//!   DB transport errors.

pub mod client_repo;
