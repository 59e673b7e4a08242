use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    session::memory::{ConversationMemory, SessionSummary},
    types::SessionId,
};

/// Per-session conversation memory.
///
/// The outer map lock is held only long enough to find or create a session
/// slot; read-modify-write of one session is serialized by that slot's own
/// lock, so unrelated sessions never wait on each other.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<ConversationMemory>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, session_id: &str) -> Arc<Mutex<ConversationMemory>> {
        let mut sessions = self.sessions.lock().await;
        if let Some(slot) = sessions.get(session_id) {
            return Arc::clone(slot);
        }

        tracing::debug!(
            target: "session",
            session_id = session_id,
            "session_created"
        );
        let slot = Arc::new(Mutex::new(ConversationMemory::default()));
        sessions.insert(session_id.to_string(), Arc::clone(&slot));
        slot
    }

    /// Takes exclusive ownership of one session for the duration of a turn.
    pub async fn checkout(&self, session_id: &str) -> SessionLease {
        let guard = self.slot(session_id).await.lock_owned().await;
        SessionLease {
            session_id: session_id.to_string(),
            guard,
        }
    }

    async fn existing(&self, session_id: &str) -> Option<Arc<Mutex<ConversationMemory>>> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    /// Copy of the stored memory; an unknown id reads as empty and is not created.
    pub async fn snapshot(&self, session_id: &str) -> ConversationMemory {
        match self.existing(session_id).await {
            Some(slot) => slot.lock().await.clone(),
            None => ConversationMemory::default(),
        }
    }

    pub async fn summary(&self, session_id: &str) -> SessionSummary {
        match self.existing(session_id).await {
            Some(slot) => slot.lock().await.summary(),
            None => ConversationMemory::default().summary(),
        }
    }

    /// Drops a session; the next contact with the same id starts empty.
    ///
    /// Waits for an in-flight turn to commit. The slot stays mapped while
    /// other turns are queued on it, so they keep sharing one lock.
    pub async fn evict(&self, session_id: &str) -> bool {
        let Some(slot) = self.existing(session_id).await else {
            tracing::info!(
                target: "session",
                session_id = session_id,
                removed = false,
                "session_evicted"
            );
            return false;
        };

        let mut memory = slot.lock().await;
        *memory = ConversationMemory::default();
        let mut sessions = self.sessions.lock().await;
        let queued = Arc::strong_count(&slot) > 2;
        let unmapped = !queued
            && sessions
                .get(session_id)
                .is_some_and(|mapped| Arc::ptr_eq(mapped, &slot));
        if unmapped {
            sessions.remove(session_id);
        }
        tracing::info!(
            target: "session",
            session_id = session_id,
            removed = true,
            unmapped = unmapped,
            "session_evicted"
        );
        true
    }

    pub async fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Exclusive hold on one session's memory.
///
/// Dropping the lease without calling [`SessionLease::commit`] leaves the
/// stored memory untouched.
pub struct SessionLease {
    session_id: SessionId,
    guard: OwnedMutexGuard<ConversationMemory>,
}

impl SessionLease {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.guard
    }

    pub fn commit(mut self, memory: ConversationMemory) {
        *self.guard = memory;
        tracing::debug!(
            target: "session",
            session_id = %self.session_id,
            conversation_turns = self.guard.history.len(),
            "session_committed"
        );
    }
}
