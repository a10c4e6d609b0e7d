mod config;
mod control;
mod models;
mod registry;
mod websocket;

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use config::Config;
use registry::ClientRegistry;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "command_relay=debug,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    let config = Arc::new(config);

    let registry = ClientRegistry::new();

    // An unavailable endpoint is fatal: the control loop must not start
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", config.server_address(), e));

    info!("📡 WebSocket server started on ws://{}", config.server_address());
    info!("Waiting for connections...");

    let accept_task = tokio::spawn(websocket::serve(
        listener,
        registry.clone(),
        config.clone(),
    ));

    // An interrupt takes the same shutdown path as the quit directive
    tokio::select! {
        _ = control::run(registry.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
    }

    shutdown(accept_task, &registry, &config).await;
    info!("Server stopped");
}

/// Stop accepting, ask every session to close, and give in-flight teardowns
/// a bounded window to finish.
async fn shutdown(
    accept_task: tokio::task::JoinHandle<()>,
    registry: &ClientRegistry,
    config: &Config,
) {
    accept_task.abort();

    let snapshot = registry.snapshot().await;
    if snapshot.is_empty() {
        return;
    }

    info!("Closing {} client connections", snapshot.len());
    for session in &snapshot {
        session.send(Message::Close(None));
    }

    let drained = tokio::time::timeout(config.close_timeout(), async {
        while registry.size().await > 0 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await;

    if drained.is_err() {
        warn!(
            "Shutdown timed out with {} sessions still open",
            registry.size().await
        );
    }
}
