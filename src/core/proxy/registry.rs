//! Live proxy sessions, tracked for the shutdown broadcast.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use futures_util::future::join_all;

use super::SessionId;
use super::client::ClientCloser;
use super::close_code::GOING_AWAY;

/// Reason sent to every client when the server stops
pub const SHUTDOWN_REASON: &str = "Server shutting down";

/// Registry entry for one session
#[derive(Clone)]
pub struct SessionHandle {
    closer: Arc<dyn ClientCloser>,
    created_at: Instant,
    shutdown_sent: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// Concurrent map of live sessions.
///
/// Used only to reach every client at shutdown; frames are never routed
/// through it.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<SessionId, SessionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session_id: SessionId, closer: Arc<dyn ClientCloser>) {
        self.sessions.insert(
            session_id,
            SessionHandle {
                closer,
                created_at: Instant::now(),
                shutdown_sent: Arc::new(AtomicBool::new(false)),
            },
        );
        tracing::debug!(%session_id, active = self.sessions.len(), "Session registered");
    }

    /// Remove a session. Returns whether it was present.
    pub fn remove(&self, session_id: SessionId) -> bool {
        match self.sessions.remove(&session_id) {
            Some((_, handle)) => {
                tracing::debug!(
                    %session_id,
                    duration_ms = handle.created_at.elapsed().as_millis() as u64,
                    "Session removed"
                );
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.sessions.contains_key(&session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Send close 1001 `Server shutting down` to every live client and close
    /// it. Returns how many clients were closed.
    ///
    /// Each session is broadcast to at most once, so a repeated call only
    /// reaches sessions registered since the previous one. Handles are
    /// snapshotted first so no shard lock is held across an await.
    pub async fn close_all(&self) -> usize {
        let closers: Vec<Arc<dyn ClientCloser>> = self
            .sessions
            .iter()
            .filter(|entry| !entry.value().shutdown_sent.swap(true, Ordering::AcqRel))
            .map(|entry| Arc::clone(&entry.value().closer))
            .collect();

        let count = closers.len();
        join_all(
            closers
                .iter()
                .map(|closer| closer.close_with(GOING_AWAY, SHUTDOWN_REASON)),
        )
        .await;

        tracing::info!("Closed {count} active WebSocket connection(s)");
        count
    }
}
