use clientbook_core::db::open_db_in_memory;
use clientbook_core::{
    ClientRepository, ClientService, ClientUpdate, ClientValidationError, ConstraintKind,
    NewClient, RepoError, SqliteClientRepository,
};
use rusqlite::Connection;

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let draft = NewClient::new("Ivan", "Ivanov", "ivan@example.com")
        .with_phones(["1111111111", "2222222222"]);
    let id = repo.create_client(&draft).unwrap();

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.first_name, "Ivan");
    assert_eq!(loaded.last_name, "Ivanov");
    assert_eq!(loaded.email, "ivan@example.com");
    assert_eq!(loaded.phones, vec!["1111111111", "2222222222"]);
}

#[test]
fn get_missing_client_returns_none() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    assert!(repo.get_client(4242).unwrap().is_none());
}

#[test]
fn duplicate_email_fails_and_leaves_first_row_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let first = NewClient::new("Ivan", "Ivanov", "ivan@example.com").with_phones(["1111111111"]);
    let first_id = repo.create_client(&first).unwrap();

    let second = NewClient::new("Petr", "Petrov", "ivan@example.com");
    let err = repo.create_client(&second).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::Unique,
            ..
        }
    ));

    let kept = repo.get_client(first_id).unwrap().unwrap();
    assert_eq!(kept.first_name, "Ivan");
    assert_eq!(kept.email, "ivan@example.com");
    assert_eq!(kept.phones, vec!["1111111111"]);
}

#[test]
fn create_with_invalid_phone_persists_nothing() {
    let mut conn = open_db_in_memory().unwrap();

    {
        let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();
        let draft =
            NewClient::new("Ivan", "Ivanov", "ivan@example.com").with_phones(["1111111111", "  "]);
        let err = repo.create_client(&draft).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ClientValidationError::EmptyPhone)
        ));
    }

    assert_eq!(count_rows(&conn, "clients"), 0);
    assert_eq!(count_rows(&conn, "phones"), 0);
}

#[test]
fn add_phone_for_missing_client_is_foreign_key_violation() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let err = repo.add_phone(4242, "3333333333").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));
}

#[test]
fn add_phone_allows_duplicates_for_one_client() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_client(&NewClient::new("Ivan", "Ivanov", "ivan@example.com"))
        .unwrap();
    repo.add_phone(id, "1111111111").unwrap();
    repo.add_phone(id, "1111111111").unwrap();

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.phones, vec!["1111111111", "1111111111"]);
}

#[test]
fn partial_update_preserves_untouched_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_client(
            &NewClient::new("Ivan", "Ivanov", "ivan@example.com").with_phones(["1111111111"]),
        )
        .unwrap();

    let changes = ClientUpdate {
        last_name: Some("Petrov".to_string()),
        ..ClientUpdate::default()
    };
    repo.update_client(id, &changes).unwrap();

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.first_name, "Ivan");
    assert_eq!(loaded.last_name, "Petrov");
    assert_eq!(loaded.email, "ivan@example.com");
    assert_eq!(loaded.phones, vec!["1111111111"]);
}

#[test]
fn update_with_empty_provided_field_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_client(&NewClient::new("Ivan", "Ivanov", "ivan@example.com"))
        .unwrap();

    let changes = ClientUpdate {
        first_name: Some(String::new()),
        ..ClientUpdate::default()
    };
    let err = repo.update_client(id, &changes).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ClientValidationError::EmptyField("first_name"))
    ));

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.first_name, "Ivan");
}

#[test]
fn update_replaces_whole_phone_set() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_client(
            &NewClient::new("Ivan", "Ivanov", "ivan@example.com")
                .with_phones(["1111111111", "2222222222"]),
        )
        .unwrap();

    let changes = ClientUpdate {
        phones: Some(vec!["3333333333".to_string()]),
        ..ClientUpdate::default()
    };
    repo.update_client(id, &changes).unwrap();

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.phones, vec!["3333333333"]);
}

#[test]
fn update_with_empty_phone_list_removes_all_phones() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_client(
            &NewClient::new("Ivan", "Ivanov", "ivan@example.com")
                .with_phones(["1111111111", "2222222222"]),
        )
        .unwrap();

    let changes = ClientUpdate {
        phones: Some(Vec::new()),
        ..ClientUpdate::default()
    };
    repo.update_client(id, &changes).unwrap();

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert!(loaded.phones.is_empty());
}

#[test]
fn update_nonexistent_client_fields_is_silent_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let changes = ClientUpdate {
        last_name: Some("Petrov".to_string()),
        ..ClientUpdate::default()
    };
    repo.update_client(4242, &changes).unwrap();
    assert!(repo.get_client(4242).unwrap().is_none());
}

#[test]
fn empty_update_request_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_client(&NewClient::new("Ivan", "Ivanov", "ivan@example.com"))
        .unwrap();
    repo.update_client(id, &ClientUpdate::default()).unwrap();

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.first_name, "Ivan");
}

#[test]
fn delete_client_cascades_to_phones() {
    let mut conn = open_db_in_memory().unwrap();

    {
        let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();
        let id = repo
            .create_client(
                &NewClient::new("Ivan", "Ivanov", "ivan@example.com")
                    .with_phones(["1111111111", "2222222222"]),
            )
            .unwrap();

        let deleted = repo.delete_client(id).unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.get_client(id).unwrap().is_none());
    }

    assert_eq!(count_rows(&conn, "clients"), 0);
    assert_eq!(count_rows(&conn, "phones"), 0);
}

#[test]
fn delete_phone_removes_all_matching_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_client(
            &NewClient::new("Ivan", "Ivanov", "ivan@example.com")
                .with_phones(["1111111111", "1111111111", "2222222222"]),
        )
        .unwrap();

    let deleted = repo.delete_phone(id, "1111111111").unwrap();
    assert_eq!(deleted, 2);

    let loaded = repo.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.phones, vec!["2222222222"]);
}

#[test]
fn deleting_nonexistent_rows_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteClientRepository::try_new(&mut conn).unwrap();

    assert_eq!(repo.delete_client(4242).unwrap(), 0);
    assert_eq!(repo.delete_phone(4242, "0000000000").unwrap(), 0);
}

#[test]
fn service_wraps_repository_calls() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteClientRepository::try_new(&mut conn).unwrap();
    let mut service = ClientService::new(repo);

    let id = service
        .register_client(&NewClient::new("Ivan", "Ivanov", "ivan@example.com"))
        .unwrap();
    service.add_phone(id, "1111111111").unwrap();

    let loaded = service.get_client(id).unwrap().unwrap();
    assert_eq!(loaded.phones, vec!["1111111111"]);

    assert_eq!(service.delete_phone(id, "1111111111").unwrap(), 1);
    assert_eq!(service.delete_client(id).unwrap(), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteClientRepository::try_new(&mut conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();

    let result = SqliteClientRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("clients"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL
        );
        CREATE TABLE phones (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL,
            phone TEXT NOT NULL
        );
        PRAGMA user_version = 1;",
    )
    .unwrap();

    let result = SqliteClientRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "clients",
            column: "email"
        })
    ));
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
