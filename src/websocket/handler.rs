use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::ServerMessage;
use crate::registry::{ClientRegistry, SessionHandle};

/// Handle one client connection from handshake to teardown.
///
/// The session registers itself, enqueues its one-time welcome, then reads
/// until the peer closes, an I/O error occurs, or the liveness probe gives
/// up. Whatever ends the session, it unregisters exactly once and never
/// propagates a failure into the accept loop or other sessions.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: ClientRegistry,
    config: Arc<Config>,
) {
    let socket = match tokio_tungstenite::accept_async(stream).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", peer, e);
            return;
        }
    };

    let session_id = Uuid::new_v4();
    info!("Client connected from {} (session {})", peer, session_id);

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Writer task: drains the outbound channel into the socket. The first
    // write error ends it; a broadcast then sees the closed channel.
    let mut writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    registry
        .register(SessionHandle::new(session_id, peer, tx.clone()))
        .await;

    // Enqueued with no await point after registration, so the welcome always
    // precedes any broadcast this session can observe.
    let welcome = ServerMessage::welcome(config.welcome_message.as_str());
    let welcome_sent = match serde_json::to_string(&welcome) {
        Ok(json) => {
            let sent = tx.send(Message::Text(json.into())).is_ok();
            if sent {
                debug!("Sent welcome message to {}", peer);
            }
            sent
        }
        Err(e) => {
            error!("Failed to serialize welcome message: {}", e);
            false
        }
    };

    if welcome_sent {
        read_loop(&mut receiver, &tx, &config, peer, session_id).await;
    }

    registry.unregister(session_id).await;
    drop(tx);

    // Give the writer a bounded window to flush and finish the close
    // handshake before abandoning it.
    if time::timeout(config.close_timeout(), &mut writer)
        .await
        .is_err()
    {
        warn!("Close handshake with {} timed out", peer);
        writer.abort();
    }
    info!("Session {} ({}) closed", session_id, peer);
}

/// Read inbound frames until the connection ends.
///
/// This server is a command sink: client payloads are observed and logged,
/// never acted on. A keep-alive ping goes out every `ping_interval`; a
/// session silent past the interval plus the ping timeout is dropped.
async fn read_loop<S>(
    receiver: &mut S,
    tx: &mpsc::UnboundedSender<Message>,
    config: &Config,
    peer: SocketAddr,
    session_id: Uuid,
) where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let ping_interval = config.ping_interval();
    let liveness_grace = ping_interval + config.ping_timeout();
    let mut ping_timer = time::interval_at(time::Instant::now() + ping_interval, ping_interval);
    ping_timer.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    // Pushed forward on every inbound frame; firing means the peer stayed
    // silent through a full ping interval plus the ping timeout.
    let mut deadline = time::Instant::now() + liveness_grace;

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Close(_))) | None => {
                    info!("Client {} disconnected", peer);
                    break;
                }
                Some(Ok(Message::Pong(_))) => {
                    deadline = time::Instant::now() + liveness_grace;
                    debug!("Received pong from {}", peer);
                }
                Some(Ok(message)) => {
                    deadline = time::Instant::now() + liveness_grace;
                    debug!("Received from {}: {:?}", peer, message);
                }
                Some(Err(e)) => {
                    warn!("Error on session {} ({}): {}", session_id, peer, e);
                    break;
                }
            },
            _ = ping_timer.tick() => {
                if tx.send(Message::Ping(Bytes::new())).is_err() {
                    break;
                }
            },
            _ = time::sleep_until(deadline) => {
                warn!(
                    "Client {} silent for {:?}, closing session {}",
                    peer, liveness_grace, session_id
                );
                break;
            }
        }
    }
}
