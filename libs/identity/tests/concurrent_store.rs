//! Concurrency tests for the in-memory user store
//!
//! These tests hammer a shared store from many threads and check that the
//! uniqueness indexes stay consistent with the record map.

use std::sync::{Arc, Barrier};
use std::thread;

use identity::{MemoryUserStore, NewUser, StoreError, UserStore};

const WORKERS: usize = 32;

fn new_user(id: String, email: String, username: String) -> NewUser {
    NewUser {
        id,
        email,
        username,
        password_hash: "hash".to_string(),
        first_name: "First".to_string(),
        last_name: "Last".to_string(),
    }
}

/// Run `f(i)` on `WORKERS` threads released together and collect the results
fn race<T, F>(f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(WORKERS));
    let f = Arc::new(f);

    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let f = Arc::clone(&f);
            thread::spawn(move || {
                barrier.wait();
                f(i)
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect()
}

#[test]
fn test_concurrent_distinct_creates_all_succeed() {
    let store = Arc::new(MemoryUserStore::new());

    let shared = Arc::clone(&store);
    let results = race(move |i| {
        shared.create(new_user(
            format!("id-{i}"),
            format!("user{i}@x.com"),
            format!("user{i}"),
        ))
    });

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(store.len(), WORKERS);

    for i in 0..WORKERS {
        let by_id = store.get_by_id(&format!("id-{i}")).unwrap();
        let by_email = store.get_by_email(&format!("user{i}@x.com")).unwrap();
        let by_username = store.get_by_username(&format!("user{i}")).unwrap();
        assert_eq!(by_id, by_email);
        assert_eq!(by_id, by_username);
    }
}

#[test]
fn test_concurrent_creates_with_same_email_yield_one_winner() {
    let store = Arc::new(MemoryUserStore::new());

    let shared = Arc::clone(&store);
    let results = race(move |i| {
        shared.create(new_user(
            format!("id-{i}"),
            "same@x.com".to_string(),
            format!("user{i}"),
        ))
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| **r == Err(StoreError::AlreadyExists))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, WORKERS - 1);
    assert_eq!(store.len(), 1);

    // The losers' usernames never reached the index.
    let winner = store.get_by_email("same@x.com").unwrap();
    for i in 0..WORKERS {
        let username = format!("user{i}");
        if username != winner.username {
            assert_eq!(store.get_by_username(&username), Err(StoreError::NotFound));
        }
    }
}

#[test]
fn test_concurrent_renames_keep_indexes_consistent() {
    let store = Arc::new(MemoryUserStore::new());
    store
        .create(new_user(
            "target".to_string(),
            "start@x.com".to_string(),
            "start".to_string(),
        ))
        .unwrap();

    // Half the workers rename the record, half read it through every key.
    let shared = Arc::clone(&store);
    race(move |i| {
        if i % 2 == 0 {
            let mut user = shared.get_by_id("target").unwrap();
            user.email = format!("renamed{i}@x.com");
            user.username = format!("renamed{i}");
            shared.update(user).unwrap();
        } else {
            let by_id = shared.get_by_id("target").unwrap();
            // Whatever email the record had, the index still resolves it,
            // unless a rename landed between the two reads.
            if let Ok(by_email) = shared.get_by_email(&by_id.email) {
                assert_eq!(by_email.id, "target");
            }
        }
    });

    let user = store.get_by_id("target").unwrap();
    assert_eq!(store.get_by_email(&user.email).unwrap().id, "target");
    assert_eq!(store.get_by_username(&user.username).unwrap().id, "target");
    assert_eq!(store.get_by_email("start@x.com"), Err(StoreError::NotFound));
    assert_eq!(store.len(), 1);
}
