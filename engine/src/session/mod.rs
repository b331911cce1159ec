//! Session store
//!
//! Maps opaque client-supplied session identifiers to conversation state.
//! The store is pluggable behind the [`SessionStore`] trait; the shipped
//! implementation is an in-memory map with time-to-live eviction, so idle
//! sessions cannot accumulate for the lifetime of the process.
//!
//! Each session's state sits behind its own `tokio::sync::Mutex`, which
//! serializes concurrent turns for the same session identifier without
//! blocking turns of other sessions.

use crate::router::SessionState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Handle to one session's state. Lock it for the duration of a turn.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Backing store for conversation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for `session_id`, creating it if absent. Touches
    /// the session's eviction clock.
    async fn get_or_create(&self, session_id: &str) -> SessionHandle;

    /// Fetch an existing session without creating one.
    async fn get(&self, session_id: &str) -> Option<SessionHandle>;

    /// Remove sessions idle past their time-to-live. Returns the number of
    /// evicted sessions.
    async fn evict_expired(&self) -> usize;

    /// Number of live sessions.
    async fn session_count(&self) -> usize;
}

struct SessionEntry {
    state: SessionHandle,
    last_seen: Instant,
}

/// In-memory session store with TTL eviction.
pub struct InMemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.write().await;

        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!("Created new session: {}", session_id);
                SessionEntry {
                    state: Arc::new(Mutex::new(SessionState::new())),
                    last_seen: Instant::now(),
                }
            });

        entry.last_seen = Instant::now();
        Arc::clone(&entry.state)
    }

    async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|e| Arc::clone(&e.state))
    }

    async fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} expired session(s)", evicted);
        }
        evicted
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn the background eviction sweep for a store.
pub fn spawn_sweeper(store: Arc<dyn SessionStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh process
        // doesn't sweep an empty map.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = store.evict_expired().await;
            debug!("Session sweep complete, evicted {}", evicted);
        }
    });
}
