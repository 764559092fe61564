//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `clientbook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use clientbook_core::db::open_db_in_memory;
use clientbook_core::{ClientSearchQuery, ClientService, NewClient, SqliteClientRepository};

fn main() {
    if let Err(err) = run() {
        eprintln!("clientbook smoke check failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("clientbook_core version={}", clientbook_core::core_version());

    // One in-memory roundtrip proves schema bootstrap and the search path
    // without touching any on-disk state.
    let mut conn = open_db_in_memory()?;
    let repo = SqliteClientRepository::try_new(&mut conn)?;
    let mut service = ClientService::new(repo);

    let draft = NewClient::new("Ada", "Lovelace", "ada@example.com").with_phones(["5550100"]);
    let client_id = service.register_client(&draft)?;

    let query = ClientSearchQuery {
        first_name: Some("ada".to_string()),
        ..ClientSearchQuery::default()
    };
    let matches = service.find_clients(&query)?;

    println!("smoke client_id={client_id} matches={}", matches.len());
    Ok(())
}
