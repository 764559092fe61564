//! Core data-access logic for the clientbook directory.
//! This crate is the single source of truth for client/phone invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::client::{
    ClientId, ClientMatch, ClientRecord, ClientSearchQuery, ClientUpdate, ClientValidationError,
    NewClient, PhoneId,
};
pub use repo::client_repo::{
    ClientRepository, ConstraintKind, RepoError, RepoResult, SqliteClientRepository,
};
pub use service::client_service::ClientService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
