//! In-memory session store
//!
//! Sessions are never persisted: a restart or an expired TTL discards them,
//! the same as a browser reload would.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::Session;

/// Shared map of live sessions
///
/// Locks are held for one state transition at a time, never across a
/// network call.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a fresh `Idle` session
    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        debug!(session_id = %session.id, "Session created");
        session
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Apply `f` to a session under the write lock
    ///
    /// Returns `None` when the session does not exist.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(f)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions older than `ttl`, sparing any with a request in flight
    pub async fn prune_expired(&self, ttl: Duration) -> usize {
        // A TTL too large to represent never expires anything
        let Some(cutoff) = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl))
        else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            session.created_at > cutoff || session.state().is_in_flight()
        });
        before - sessions.len()
    }
}

/// Periodically prune expired sessions until the runtime shuts down
pub fn spawn_session_pruner(store: SessionStore, ttl: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let pruned = store.prune_expired(ttl).await;
            if pruned > 0 {
                let remaining = store.len().await;
                info!(pruned, remaining, "Pruned expired sessions");
            }
        }
    })
}
