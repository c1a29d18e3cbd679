//! Broadcast registry: the single source of truth for who is connected.
//!
//! All membership state lives behind one async mutex, and every
//! operation holds it for its full body. A broadcast pass therefore
//! observes a consistent snapshot: nobody joining mid-pass receives a
//! partial broadcast, and dead-connection pruning cannot race a
//! concurrent join or leave. Sends go through non-blocking channel
//! handles, so the lock is never held across peer I/O.

use tokio::sync::Mutex;

use super::connection::{ConnectionHandle, ConnectionId};

/// In-memory set of currently joined connections. Constructed once at
/// startup and shared via `AppState`; entries are removed individually
/// as clients disconnect.
#[derive(Default)]
pub struct BroadcastRegistry {
    members: Mutex<Vec<ConnectionHandle>>,
}

impl BroadcastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the broadcast group. Joining twice with the
    /// same id is a no-op: a connection appears at most once.
    pub async fn join(&self, handle: ConnectionHandle) {
        let mut members = self.members.lock().await;
        if members.iter().all(|m| m.id() != handle.id()) {
            members.push(handle);
        }
        tracing::debug!(total = members.len(), "connection joined");
    }

    /// Remove a connection. Absent is a no-op, so cleanup paths may call
    /// this without tracking whether removal already happened.
    pub async fn leave(&self, id: ConnectionId) {
        let mut members = self.members.lock().await;
        members.retain(|m| m.id() != id);
        tracing::debug!(total = members.len(), "connection left");
    }

    /// Current membership size. May be stale by the time the caller
    /// acts on it.
    pub async fn count(&self) -> usize {
        self.members.lock().await.len()
    }

    /// Deliver `text` to every member except `excluding`, best-effort
    /// and independent per recipient. Members whose send fails are
    /// collected during the pass and pruned afterwards under the same
    /// lock hold: never mid-iteration, and never via `leave`, which
    /// would re-acquire the mutex and deadlock.
    pub async fn broadcast(&self, text: &str, excluding: Option<ConnectionId>) {
        let mut members = self.members.lock().await;

        let mut dead: Vec<ConnectionId> = Vec::new();
        for member in members.iter() {
            if Some(member.id()) == excluding {
                continue;
            }
            if member.send(text).is_err() {
                dead.push(member.id());
            }
        }

        if !dead.is_empty() {
            members.retain(|m| !dead.contains(&m.id()));
            tracing::debug!(
                pruned = dead.len(),
                total = members.len(),
                "dropped dead connections after broadcast"
            );
        }
    }
}
