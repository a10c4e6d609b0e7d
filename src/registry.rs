use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Handle to one connected session, owned by the registry.
///
/// The handle never touches the socket: messages are enqueued on the
/// session's outbound channel and written by its writer task. A closed
/// channel means the session is gone.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub peer: SocketAddr,
    outbound: mpsc::UnboundedSender<Message>,
}

impl SessionHandle {
    pub fn new(id: Uuid, peer: SocketAddr, outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self { id, peer, outbound }
    }

    /// Enqueue a message for delivery. Returns false once the session's
    /// writer task has exited.
    pub fn send(&self, message: Message) -> bool {
        self.outbound.send(message).is_ok()
    }
}

/// The set of currently connected sessions, shared between the accept path,
/// the broadcast dispatcher and the control loop.
#[derive(Clone)]
pub struct ClientRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add a session. Registering an id twice is a no-op.
    pub async fn register(&self, handle: SessionHandle) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(handle.id).or_insert(handle);
    }

    /// Remove a session. Safe to call from racing failure paths; removing an
    /// absent id is a no-op.
    pub async fn unregister(&self, id: Uuid) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id);
    }

    /// Point-in-time view of the membership. Registry mutation after the
    /// call never affects iteration over the returned handles.
    pub async fn snapshot(&self) -> Vec<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.values().cloned().collect()
    }

    /// Current number of connected sessions.
    pub async fn size(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: Uuid) -> SessionHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        SessionHandle::new(id, "127.0.0.1:9999".parse().unwrap(), tx)
    }

    #[tokio::test]
    async fn register_same_id_twice_keeps_one_entry() {
        let registry = ClientRegistry::new();
        let id = Uuid::new_v4();
        registry.register(handle(id)).await;
        registry.register(handle(id)).await;
        assert_eq!(registry.size().await, 1);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let registry = ClientRegistry::new();
        let id = Uuid::new_v4();
        registry.register(handle(id)).await;
        registry.unregister(id).await;
        registry.unregister(id).await;
        assert_eq!(registry.size().await, 0);
    }

    #[tokio::test]
    async fn snapshot_is_isolated_from_later_mutation() {
        let registry = ClientRegistry::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        registry.register(handle(first)).await;
        registry.register(handle(second)).await;

        let snapshot = registry.snapshot().await;
        registry.unregister(first).await;
        registry.unregister(second).await;

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.size().await, 0);
    }
}
