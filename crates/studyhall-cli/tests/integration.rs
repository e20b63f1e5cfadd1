//! Integration tests for studyhall
//!
//! These verify the end-to-end behavior of the assembled pieces: the
//! stopwatch over a real on-disk store, and the group flow over the
//! provider boundary.

use std::sync::Arc;
use std::time::Duration;
use studyhall_api::{DEFAULT_MAX_GROUP_SIZE, LedgerRecord};
use studyhall_core::{CommitOutcome, GroupDirectory, IdentityGateway, Stopwatch};
use studyhall_provider::{DirectoryProvider, MemoryAuth, MemoryDirectory};
use studyhall_store::{LAST_DATE_KEY, LedgerStore, LocalStore, SqliteStore};
use studyhall_util::MonotonicInstant;

#[test]
fn stopwatch_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("studyhall.db");

    {
        let store = Arc::new(SqliteStore::open(&db_path).unwrap());
        let mut sw = Stopwatch::load(LedgerStore::new(store), &studyhall_util::now());

        let t0 = MonotonicInstant::now();
        sw.toggle(t0);
        let t1 = t0 + Duration::from_millis(65_000);
        sw.toggle(t1);

        match sw.commit(&studyhall_util::now(), t1) {
            CommitOutcome::Saved { entry, persisted } => {
                assert_eq!(entry.formatted, "00:01:05");
                assert!(persisted);
            }
            other => panic!("expected Saved, got {:?}", other),
        }
    }

    // A fresh session on the same day sees the committed data
    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    let sw = Stopwatch::load(LedgerStore::new(store), &studyhall_util::now());

    assert_eq!(sw.today().total_ms, 65_000);
    assert_eq!(sw.today().sessions, 1);
    assert_eq!(sw.all_time().total_ms, 65_000);
    assert_eq!(sw.history().len(), 1);
    assert_eq!(sw.history()[0].duration_ms, 65_000);
}

#[test]
fn rollover_happens_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("studyhall.db");

    {
        let store = Arc::new(SqliteStore::open(&db_path).unwrap());
        let mut sw = Stopwatch::load(LedgerStore::new(store.clone()), &studyhall_util::now());

        let t0 = MonotonicInstant::now();
        sw.toggle(t0);
        let t1 = t0 + Duration::from_millis(5_000);
        sw.commit(&studyhall_util::now(), t1);

        // Pretend the last session happened long ago
        store.set(LAST_DATE_KEY, "1999-01-01").unwrap();
    }

    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    let sw = Stopwatch::load(LedgerStore::new(store), &studyhall_util::now());

    assert_eq!(*sw.today(), LedgerRecord::default());
    assert_eq!(sw.all_time().total_ms, 5_000);
    assert_eq!(sw.all_time().sessions, 1);
}

#[tokio::test]
async fn group_lifecycle_across_two_users() {
    let provider = Arc::new(MemoryDirectory::new());

    let alice_auth = Arc::new(MemoryAuth::new());
    let alice_gateway = IdentityGateway::new(alice_auth.clone());
    alice_gateway
        .sign_up("alice@example.com", "password123")
        .await
        .unwrap();
    let alice = GroupDirectory::new(provider.clone(), alice_auth, DEFAULT_MAX_GROUP_SIZE);

    let bob_auth = Arc::new(MemoryAuth::new());
    let bob_gateway = IdentityGateway::new(bob_auth.clone());
    bob_gateway
        .sign_up("bob@example.com", "password123")
        .await
        .unwrap();
    let bob = GroupDirectory::new(provider.clone(), bob_auth, DEFAULT_MAX_GROUP_SIZE);

    // Alice creates, Bob sees it in his live listing and joins
    let group = alice.create_group("Chess Club").await.unwrap();

    let mut bob_rx = bob.subscribe();
    let snapshot = bob_rx.borrow_and_update().clone();
    let rows = bob.rows(&snapshot);
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].joined);

    bob.join_group(&group.id).await.unwrap();
    bob_rx.changed().await.unwrap();
    let rows = bob.rows(&bob_rx.borrow_and_update().clone());
    assert_eq!(rows[0].occupancy(), "2/10");
    assert!(rows[0].joined);

    // Both leave; the last leave deletes the group
    alice.leave_group(&group.id).await.unwrap();
    bob.leave_group(&group.id).await.unwrap();

    assert!(provider.get_group(&group.id).await.unwrap().is_none());
    let rows = bob.rows(&bob.subscribe().borrow().clone());
    assert!(rows.is_empty());
}

#[tokio::test]
async fn signed_out_user_loses_directory_access() {
    let provider = Arc::new(MemoryDirectory::new());
    let auth = Arc::new(MemoryAuth::new());
    let gateway = IdentityGateway::new(auth.clone());

    gateway
        .sign_up("alice@example.com", "password123")
        .await
        .unwrap();
    let directory = GroupDirectory::new(provider, auth, DEFAULT_MAX_GROUP_SIZE);

    directory.create_group("Chess Club").await.unwrap();

    gateway.sign_out().await.unwrap();
    let err = directory.create_group("Another Club").await.unwrap_err();
    assert_eq!(
        err.user_message().text,
        "You must be logged in to do that"
    );
}
