//! Test for connection retry logic
//!
//! Run with: cargo test --test connection_retry_test -- --nocapture

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use recipe_core::adapters::duckdb::{DuckDbRepository, Table};
use recipe_core::domain::NewUser;
use recipe_core::ports::Repository;
use recipe_core::UserFields;

/// Concurrent open attempts on one file all succeed
#[test]
fn test_concurrent_connections() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.duckdb");

    // Create initial database
    {
        let repo = DuckDbRepository::new(&db_path).unwrap();
        repo.ensure_schema().unwrap();
    }

    let barrier = Arc::new(Barrier::new(3));
    let db_path = Arc::new(db_path);
    let mut handles = vec![];

    for i in 0..3 {
        let barrier = Arc::clone(&barrier);
        let db_path = Arc::clone(&db_path);

        handles.push(thread::spawn(move || {
            barrier.wait();

            let start = Instant::now();
            match DuckDbRepository::new(&db_path) {
                Ok(_repo) => {
                    println!("Thread {}: opened after {:?}", i, start.elapsed());
                    // Hold the connection briefly to create contention
                    thread::sleep(Duration::from_millis(100));
                    Ok(())
                }
                Err(e) => {
                    println!("Thread {}: failed after {:?}: {}", i, start.elapsed(), e);
                    Err(e.to_string())
                }
            }
        }));
    }

    let failures: Vec<String> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap().err())
        .collect();

    assert!(failures.is_empty(), "all opens should succeed: {:?}", failures);
}

/// Opening the same file repeatedly keeps the schema and the data
#[test]
fn test_sequential_connections() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_sequential.duckdb");

    for i in 0..5 {
        let start = Instant::now();
        let repo = DuckDbRepository::new(&db_path).unwrap();
        repo.ensure_schema().unwrap();

        let draft = NewUser::new(
            format!("cook{}@kitchen.io", i),
            "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            UserFields::default(),
        )
        .unwrap();
        repo.insert_user(&draft).unwrap();

        assert_eq!(repo.count(Table::Users).unwrap(), i + 1);
        println!("Connection {}: opened in {:?}", i, start.elapsed());
    }
}

/// A path that can never be opened fails without retrying forever
#[test]
fn test_unopenable_path_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("missing-dir").join("test.duckdb");

    let start = Instant::now();
    let result = DuckDbRepository::new(&db_path);

    assert!(result.is_err());
    // Not a lock error, so no backoff (which would add up to 750ms)
    assert!(start.elapsed() < Duration::from_millis(700));
}
