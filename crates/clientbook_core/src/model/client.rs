//! Client domain model.
//!
//! # Responsibility
//! - Define insert/update request shapes and read models for clients.
//! - Provide `validate()` helpers used by repository write paths.
//!
//! # Invariants
//! - `first_name`, `last_name`, `email` are never persisted empty.
//! - Phone entries are never persisted empty; duplicates are allowed.
//! - Update requests use presence/absence, not sentinel values: `None`
//!   means "leave unchanged", `Some` means "set to this value".

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Surrogate key for a client row, assigned by the database on insert.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ClientId = i64;

/// Surrogate key for a phone row.
pub type PhoneId = i64;

/// Field-level validation failure for client write requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientValidationError {
    /// A required text field is empty or whitespace-only.
    EmptyField(&'static str),
    /// A phone entry is empty or whitespace-only.
    EmptyPhone,
}

impl Display for ClientValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::EmptyPhone => write!(f, "phone entries must not be empty"),
        }
    }
}

impl Error for ClientValidationError {}

/// Insert request for one client and its initial phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Initial phone numbers; may be empty.
    #[serde(default)]
    pub phones: Vec<String>,
}

impl NewClient {
    /// Creates an insert request without phone numbers.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phones: Vec::new(),
        }
    }

    /// Adds initial phone numbers to the request.
    pub fn with_phones<I, S>(mut self, phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phones = phones.into_iter().map(Into::into).collect();
        self
    }

    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        validate_required("first_name", &self.first_name)?;
        validate_required("last_name", &self.last_name)?;
        validate_required("email", &self.email)?;
        validate_phones(&self.phones)
    }
}

/// Targeted update request for an existing client.
///
/// Every field is optional. `Some("")` for a text field is rejected by
/// `validate()` rather than treated as "unchanged", so callers cannot
/// silently lose an intended write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// When present, the full phone set is replaced. `Some(vec![])`
    /// removes every phone row and adds none.
    pub phones: Option<Vec<String>>,
}

impl ClientUpdate {
    /// Returns whether this request carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phones.is_none()
    }

    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if let Some(value) = self.first_name.as_deref() {
            validate_required("first_name", value)?;
        }
        if let Some(value) = self.last_name.as_deref() {
            validate_required("last_name", value)?;
        }
        if let Some(value) = self.email.as_deref() {
            validate_required("email", value)?;
        }
        if let Some(phones) = self.phones.as_deref() {
            validate_phones(phones)?;
        }
        Ok(())
    }
}

/// Read model for one client with its phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Phone numbers ordered by insertion (phone row id).
    pub phones: Vec<String>,
}

/// Search criteria; every provided field is an AND-combined,
/// case-insensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSearchQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ClientSearchQuery {
    /// Returns whether no criterion was provided.
    ///
    /// An empty query short-circuits to an empty result set instead of
    /// scanning the whole directory.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

/// Denormalized search result row.
///
/// A client with several matching phones appears once per phone row; a
/// phoneless client matched by a non-phone criterion appears once with
/// `phone = None` (left-join semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMatch {
    pub client_id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

fn validate_required(field: &'static str, value: &str) -> Result<(), ClientValidationError> {
    if value.trim().is_empty() {
        return Err(ClientValidationError::EmptyField(field));
    }
    Ok(())
}

fn validate_phones(phones: &[String]) -> Result<(), ClientValidationError> {
    for phone in phones {
        if phone.trim().is_empty() {
            return Err(ClientValidationError::EmptyPhone);
        }
    }
    Ok(())
}
