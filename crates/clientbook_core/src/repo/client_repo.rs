//! Client repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and search APIs over `clients`/`phones` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call model `validate()` before SQL mutations.
//! - `create_client` and `update_client` run all their statements in one
//!   `IMMEDIATE` transaction: commit on success, rollback on any failure.
//! - Deleting a nonexistent client or phone affects zero rows and is not
//!   an error.
//! - `find_clients` with no criteria returns an empty result set without
//!   touching the database.

use crate::db::{migrations::latest_version, DbError};
use crate::model::client::{
    ClientId, ClientMatch, ClientRecord, ClientSearchQuery, ClientUpdate, ClientValidationError,
    NewClient, PhoneId,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CLIENT_MATCH_SELECT_SQL: &str = "SELECT
    c.id,
    c.first_name,
    c.last_name,
    c.email,
    p.phone
FROM clients c
LEFT JOIN phones p ON p.client_id = c.id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Category of a database-enforced constraint rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Unique index conflict (duplicate client email).
    Unique,
    /// Foreign key violation (phone referencing a nonexistent client).
    ForeignKey,
    /// Any other constraint failure (NOT NULL, CHECK, ...).
    Other,
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unique => write!(f, "unique"),
            Self::ForeignKey => write!(f, "foreign key"),
            Self::Other => write!(f, "constraint"),
        }
    }
}

/// Generic repository error for client persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ClientValidationError),
    Constraint {
        kind: ConstraintKind,
        message: String,
    },
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Constraint { kind, message } => {
                write!(f, "{kind} constraint violation: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted client data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClientValidationError> for RepoError {
    fn from(value: ClientValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        map_sqlite_error(value)
    }
}

/// Repository interface for client CRUD and search operations.
pub trait ClientRepository {
    /// Inserts one client plus its initial phones, returns the new id.
    fn create_client(&mut self, draft: &NewClient) -> RepoResult<ClientId>;
    /// Inserts one phone row for an existing client.
    fn add_phone(&self, client_id: ClientId, phone: &str) -> RepoResult<PhoneId>;
    /// Applies a targeted update; absent fields stay unchanged.
    fn update_client(&mut self, client_id: ClientId, changes: &ClientUpdate) -> RepoResult<()>;
    /// Deletes all phone rows matching client id and exact phone text.
    fn delete_phone(&self, client_id: ClientId, phone: &str) -> RepoResult<usize>;
    /// Deletes one client; cascade removes its phone rows.
    fn delete_client(&self, client_id: ClientId) -> RepoResult<usize>;
    /// Gets one client with its phones.
    fn get_client(&self, client_id: ClientId) -> RepoResult<Option<ClientRecord>>;
    /// Searches clients by AND-combined case-insensitive substrings.
    fn find_clients(&self, query: &ClientSearchQuery) -> RepoResult<Vec<ClientMatch>>;
}

/// SQLite-backed client repository.
pub struct SqliteClientRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Rejects connections that were not opened through `db::open_db` /
    /// `db::open_db_in_memory` (or whose schema drifted) with semantic
    /// errors instead of failing later inside arbitrary statements.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn create_client(&mut self, draft: &NewClient) -> RepoResult<ClientId> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO clients (first_name, last_name, email)
             VALUES (?1, ?2, ?3);",
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.email.as_str(),
            ],
        )?;
        let client_id = tx.last_insert_rowid();

        for phone in &draft.phones {
            insert_phone(&tx, client_id, phone)?;
        }

        tx.commit()?;
        Ok(client_id)
    }

    fn add_phone(&self, client_id: ClientId, phone: &str) -> RepoResult<PhoneId> {
        if phone.trim().is_empty() {
            return Err(ClientValidationError::EmptyPhone.into());
        }
        insert_phone(self.conn, client_id, phone)
    }

    fn update_client(&mut self, client_id: ClientId, changes: &ClientUpdate) -> RepoResult<()> {
        changes.validate()?;
        if changes.is_empty() {
            return Ok(());
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(value) = changes.first_name.as_deref() {
            tx.execute(
                "UPDATE clients SET first_name = ?1 WHERE id = ?2;",
                params![value, client_id],
            )?;
        }
        if let Some(value) = changes.last_name.as_deref() {
            tx.execute(
                "UPDATE clients SET last_name = ?1 WHERE id = ?2;",
                params![value, client_id],
            )?;
        }
        if let Some(value) = changes.email.as_deref() {
            tx.execute(
                "UPDATE clients SET email = ?1 WHERE id = ?2;",
                params![value, client_id],
            )?;
        }
        if let Some(phones) = changes.phones.as_deref() {
            tx.execute("DELETE FROM phones WHERE client_id = ?1;", [client_id])?;
            for phone in phones {
                insert_phone(&tx, client_id, phone)?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_phone(&self, client_id: ClientId, phone: &str) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM phones WHERE client_id = ?1 AND phone = ?2;",
            params![client_id, phone],
        )?;
        Ok(deleted)
    }

    fn delete_client(&self, client_id: ClientId) -> RepoResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1;", [client_id])?;
        Ok(deleted)
    }

    fn get_client(&self, client_id: ClientId) -> RepoResult<Option<ClientRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, email
             FROM clients
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([client_id])?;
        if let Some(row) = rows.next()? {
            let record = ClientRecord {
                id: row.get("id")?,
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
                email: row.get("email")?,
                phones: load_phones_for_client(self.conn, client_id)?,
            };
            return Ok(Some(record));
        }

        Ok(None)
    }

    fn find_clients(&self, query: &ClientSearchQuery) -> RepoResult<Vec<ClientMatch>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!("{CLIENT_MATCH_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(value) = query.first_name.as_deref() {
            sql.push_str(" AND c.first_name LIKE ?");
            bind_values.push(Value::Text(substring_pattern(value)));
        }
        if let Some(value) = query.last_name.as_deref() {
            sql.push_str(" AND c.last_name LIKE ?");
            bind_values.push(Value::Text(substring_pattern(value)));
        }
        if let Some(value) = query.email.as_deref() {
            sql.push_str(" AND c.email LIKE ?");
            bind_values.push(Value::Text(substring_pattern(value)));
        }
        if let Some(value) = query.phone.as_deref() {
            sql.push_str(" AND p.phone LIKE ?");
            bind_values.push(Value::Text(substring_pattern(value)));
        }

        sql.push_str(" ORDER BY c.id ASC, p.id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut matches = Vec::new();

        while let Some(row) = rows.next()? {
            matches.push(ClientMatch {
                client_id: row.get("id")?,
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
                email: row.get("email")?,
                phone: row.get("phone")?,
            });
        }

        Ok(matches)
    }
}

/// Wraps a user-provided criterion into a `LIKE` substring pattern.
///
/// The wildcards wrap an already-bound value; the criterion itself is never
/// interpolated into statement text. SQLite `LIKE` is case-insensitive for
/// ASCII, which gives the required case-insensitive matching.
fn substring_pattern(value: &str) -> String {
    format!("%{value}%")
}

fn insert_phone(conn: &Connection, client_id: ClientId, phone: &str) -> RepoResult<PhoneId> {
    conn.execute(
        "INSERT INTO phones (client_id, phone) VALUES (?1, ?2);",
        params![client_id, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

fn load_phones_for_client(conn: &Connection, client_id: ClientId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT phone
         FROM phones
         WHERE client_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([client_id])?;
    let mut phones = Vec::new();
    while let Some(row) = rows.next()? {
        phones.push(row.get(0)?);
    }
    Ok(phones)
}

fn map_sqlite_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            let kind = match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::Unique,
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                _ => ConstraintKind::Other,
            };
            return RepoError::Constraint {
                kind,
                message: message
                    .clone()
                    .unwrap_or_else(|| "constraint failed".to_string()),
            };
        }
    }
    RepoError::Db(DbError::Sqlite(err))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version == 0 {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["clients", "phones"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["id", "first_name", "last_name", "email"] {
        if !table_has_column(conn, "clients", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "clients",
                column,
            });
        }
    }

    for column in ["id", "client_id", "phone"] {
        if !table_has_column(conn, "phones", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "phones",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
