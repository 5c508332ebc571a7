//! SQLite storage integration tests.
//!
//! Run with: cargo test --test storage_sqlite --features sqlite
//!
//! Uses an in-memory database and a temporary file, no external
//! dependencies required.

mod storage;

use reman_portal::config::SqliteConfig;
use reman_portal::storage::{SqliteStorage, UserStore};

#[tokio::test]
async fn test_sqlite_in_memory_contract() {
    println!("=== SQLite (memory) Storage Tests ===");

    let store = SqliteStorage::in_memory()
        .await
        .expect("Failed to open in-memory SQLite");
    store.init_schema().await.expect("Failed to create schema");

    run_storage_contract_tests!(&store);

    println!("=== All SQLite (memory) Storage tests PASSED ===");
}

#[tokio::test]
async fn test_sqlite_file_contract() {
    println!("=== SQLite (file) Storage Tests ===");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = SqliteConfig {
        path: dir.path().join("nested/portal.db").display().to_string(),
        max_connections: 4,
    };
    println!("Opening: {}", config.path);

    let store = SqliteStorage::connect(&config)
        .await
        .expect("Failed to open SQLite file");
    store.init_schema().await.expect("Failed to create schema");

    run_storage_contract_tests!(&store);

    println!("=== All SQLite (file) Storage tests PASSED ===");
}

#[tokio::test]
async fn test_sqlite_schema_is_idempotent_and_persistent() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = SqliteConfig {
        path: dir.path().join("portal.db").display().to_string(),
        max_connections: 2,
    };

    let user_id = {
        let store = SqliteStorage::connect(&config).await.unwrap();
        store.init_schema().await.unwrap();
        store.init_schema().await.expect("schema creation must be repeatable");
        let user = storage::make_user(&store).await;
        store.pool().close().await;
        user.id
    };

    let reopened = SqliteStorage::connect(&config).await.unwrap();
    reopened.init_schema().await.unwrap();
    assert!(reopened.get_user(user_id).await.unwrap().is_some());
}
