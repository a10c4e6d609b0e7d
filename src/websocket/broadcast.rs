use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::models::{Command, ServerMessage};
use crate::registry::ClientRegistry;

/// Deliver a command to every registered session.
///
/// The wire message is serialized once and shared by all recipients. One
/// dead session never blocks delivery to the others; sessions whose
/// outbound channel is closed are unregistered after the delivery pass.
pub async fn broadcast(registry: &ClientRegistry, command: &Command) {
    let json = match serde_json::to_string(&ServerMessage::command(command)) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize command '{}': {}", command.action, e);
            return;
        }
    };

    let snapshot = registry.snapshot().await;
    if snapshot.is_empty() {
        info!("No clients connected, dropping command '{}'", command.action);
        return;
    }

    debug!("Sending to {} clients: {}", snapshot.len(), json);

    let message = Message::Text(json.into());
    let mut stale = Vec::new();
    for session in &snapshot {
        if !session.send(message.clone()) {
            warn!(
                "Failed to deliver '{}' to client {} ({})",
                command.action, session.id, session.peer
            );
            stale.push(session.id);
        }
    }

    // Unregister only after the pass over the snapshot completes
    for id in stale {
        registry.unregister(id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SessionHandle;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn session() -> (SessionHandle, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle::new(Uuid::new_v4(), "127.0.0.1:9999".parse().unwrap(), tx);
        (handle, rx)
    }

    #[tokio::test]
    async fn delivers_once_to_each_live_session_and_prunes_the_dead() {
        let registry = ClientRegistry::new();
        let (alive_a, mut rx_a) = session();
        let (alive_b, mut rx_b) = session();
        let (dead, dead_rx) = session();
        registry.register(alive_a).await;
        registry.register(alive_b).await;
        registry.register(dead).await;
        drop(dead_rx);

        broadcast(
            &registry,
            &Command::new("attack", json!({ "target": "zombie" })),
        )
        .await;

        assert_eq!(registry.size().await, 2);
        for rx in [&mut rx_a, &mut rx_b] {
            let message = rx.try_recv().expect("live session should get the command");
            let Message::Text(text) = message else {
                panic!("expected a text frame");
            };
            let value: Value = serde_json::from_str(text.as_str()).unwrap();
            assert_eq!(value["type"], "command");
            assert_eq!(value["data"]["action"], "attack");
            assert_eq!(value["data"]["parameters"]["target"], "zombie");
            assert!(rx.try_recv().is_err(), "at most one delivery per session");
        }
    }

    #[tokio::test]
    async fn empty_registry_is_a_no_op() {
        let registry = ClientRegistry::new();
        broadcast(
            &registry,
            &Command::new("move", json!({ "x": 0.0, "y": 0.0, "z": 0.0 })),
        )
        .await;
        assert_eq!(registry.size().await, 0);
    }
}
