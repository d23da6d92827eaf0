//! In-memory session store keyed by browser session id.

use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Default lifetime of a session entry
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Longest lifetime a session entry may be given
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Opaque identifier handed to the browser
pub type SessionId = String;

#[derive(Debug, Clone)]
struct SessionEntry {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Server-side session storage.
///
/// Entries carry their own expiry, independent of the token's `exp`: an entry
/// can outlive its token (the guard then rejects it) and a token can outlive
/// its entry (the session is simply gone).
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self::with_clock(ttl_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs.min(MAX_SESSION_TTL_SECS) as i64),
            clock,
        }
    }

    /// Store `token` under a fresh random session id
    pub async fn create(&self, token: String) -> SessionId {
        let now = self.clock.now();
        let id = Uuid::new_v4().to_string();
        let entry = SessionEntry {
            token,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(id.clone(), entry);
        id
    }

    /// Token stored for `id`, if the session exists and has not expired
    pub async fn get(&self, id: &str) -> Option<String> {
        let now = self.clock.now();
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.token.clone())
    }

    /// Remove the session; returns whether one existed
    pub async fn destroy(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop every expired entry and return how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::mock::ManualClock;

    fn clock() -> Arc<ManualClock> {
        ManualClock::starting_now()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::default();
        let id = store.create("token-a".to_string()).await;

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.get(&id).await.as_deref(), Some("token-a"));
        assert!(store.get("unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SessionStore::default();
        let a = store.create("t".to_string()).await;
        let b = store.create("t".to_string()).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = SessionStore::default();
        let id = store.create("token".to_string()).await;

        assert!(store.destroy(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(!store.destroy(&id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_entries_expire_on_their_own_ttl() {
        let clock = clock();
        let store = SessionStore::with_clock(60, clock.clone());
        let id = store.create("token".to_string()).await;

        clock.advance(Duration::seconds(59));
        assert!(store.get(&id).await.is_some());

        clock.advance(Duration::seconds(1));
        assert!(store.get(&id).await.is_none());
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_sweeps_expired_entries() {
        let clock = clock();
        let store = SessionStore::with_clock(10, clock.clone());
        store.create("old".to_string()).await;

        clock.advance(Duration::seconds(11));
        store.create("new".to_string()).await;

        assert_eq!(store.len().await, 1);
    }
}
