//! Integration tests for the session store
//!
//! Covers the TTL eviction policy and the per-session serialization
//! guarantee under concurrent turns for the same session identifier.

use aftercare_engine::session::{InMemorySessionStore, SessionStore};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_eviction_policy_end_to_end() {
    let store = InMemorySessionStore::new(Duration::from_millis(40));

    store.get_or_create("short-lived").await;
    store.get_or_create("kept-alive").await;

    tokio::time::sleep(Duration::from_millis(25)).await;
    store.get_or_create("kept-alive").await; // touch

    tokio::time::sleep(Duration::from_millis(25)).await;
    let evicted = store.evict_expired().await;

    assert_eq!(evicted, 1);
    assert!(store.get("short-lived").await.is_none());
    assert!(store.get("kept-alive").await.is_some());
}

#[tokio::test]
async fn test_concurrent_turns_on_same_session_are_serialized() {
    let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(60)));

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let session = store.get_or_create("shared").await;
            let mut state = session.lock().await;
            // Two appends under one lock; interleaving would tear the pairing.
            state.record_user_turn(&format!("turn {} first", i));
            tokio::task::yield_now().await;
            state.record_user_turn(&format!("turn {} second", i));
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let session = store.get_or_create("shared").await;
    let state = session.lock().await;
    assert_eq!(state.conversation_history.len(), 32);

    // Each task's pair of entries must be adjacent.
    for pair in state.conversation_history.chunks(2) {
        let first = &pair[0].user;
        let second = &pair[1].user;
        let id = first.strip_prefix("turn ").and_then(|s| s.split(' ').next());
        assert_eq!(
            second.strip_prefix("turn ").and_then(|s| s.split(' ').next()),
            id
        );
        assert!(first.ends_with("first"));
        assert!(second.ends_with("second"));
    }
}

#[tokio::test]
async fn test_store_usable_through_trait_object() {
    let store: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(Duration::from_secs(60)));

    store.get_or_create("a").await;
    store.get_or_create("b").await;
    assert_eq!(store.session_count().await, 2);
    assert_eq!(store.evict_expired().await, 0);
}
