//! Client use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD/search entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::client::{
    ClientId, ClientMatch, ClientRecord, ClientSearchQuery, ClientUpdate, NewClient, PhoneId,
};
use crate::repo::client_repo::{ClientRepository, RepoResult};

/// Use-case service wrapper for client CRUD and search operations.
pub struct ClientService<R: ClientRepository> {
    repo: R,
}

impl<R: ClientRepository> ClientService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new client with optional initial phone numbers.
    ///
    /// # Contract
    /// - The client row and all phone rows commit as one unit.
    /// - Returns the database-assigned client id.
    pub fn register_client(&mut self, draft: &NewClient) -> RepoResult<ClientId> {
        self.repo.create_client(draft)
    }

    /// Adds one phone number to an existing client.
    pub fn add_phone(&self, client_id: ClientId, phone: &str) -> RepoResult<PhoneId> {
        self.repo.add_phone(client_id, phone)
    }

    /// Applies a targeted update to an existing client.
    ///
    /// Absent fields stay unchanged; a provided phone list replaces the
    /// whole phone set.
    pub fn update_client(&mut self, client_id: ClientId, changes: &ClientUpdate) -> RepoResult<()> {
        self.repo.update_client(client_id, changes)
    }

    /// Removes all phone rows matching the exact phone text.
    ///
    /// Returns the number of rows removed; zero is not an error.
    pub fn delete_phone(&self, client_id: ClientId, phone: &str) -> RepoResult<usize> {
        self.repo.delete_phone(client_id, phone)
    }

    /// Removes one client and, via cascade, all its phone rows.
    ///
    /// Returns the number of client rows removed; zero is not an error.
    pub fn delete_client(&self, client_id: ClientId) -> RepoResult<usize> {
        self.repo.delete_client(client_id)
    }

    /// Gets one client with its phone numbers.
    pub fn get_client(&self, client_id: ClientId) -> RepoResult<Option<ClientRecord>> {
        self.repo.get_client(client_id)
    }

    /// Searches clients by AND-combined case-insensitive substrings.
    pub fn find_clients(&self, query: &ClientSearchQuery) -> RepoResult<Vec<ClientMatch>> {
        self.repo.find_clients(query)
    }
}
