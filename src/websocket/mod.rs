pub mod broadcast;
pub mod handler;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::registry::ClientRegistry;

/// Accept connections until the task is aborted, spawning one isolated
/// handler task per session.
pub async fn serve(listener: TcpListener, registry: ClientRegistry, config: Arc<Config>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!("Connection attempt from {}", peer);
                let registry = registry.clone();
                let config = config.clone();
                tokio::spawn(async move {
                    handler::handle_connection(stream, peer, registry, config).await;
                });
            }
            Err(e) => warn!("Failed to accept connection: {}", e),
        }
    }
}
