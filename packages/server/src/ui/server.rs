//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    AuthorizeConnectionUseCase, DisconnectConnectionUseCase, RelayMessageUseCase,
};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Default deadline for the first Authorize frame
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket relay server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     authorize_connection_usecase,
///     relay_message_usecase,
///     disconnect_connection_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8081).await?;
/// ```
pub struct Server {
    /// AuthorizeConnectionUseCase（接続認可のユースケース）
    authorize_connection_usecase: Arc<AuthorizeConnectionUseCase>,
    /// RelayMessageUseCase（メッセージ転送のユースケース）
    relay_message_usecase: Arc<RelayMessageUseCase>,
    /// DisconnectConnectionUseCase（接続切断のユースケース）
    disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    /// 認可期限
    auth_timeout: Duration,
}

impl Server {
    /// Create a new Server instance with the default authorization timeout
    pub fn new(
        authorize_connection_usecase: Arc<AuthorizeConnectionUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    ) -> Self {
        Self {
            authorize_connection_usecase,
            relay_message_usecase,
            disconnect_connection_usecase,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }

    /// Override the deadline for the first Authorize frame
    pub fn with_auth_timeout(mut self, auth_timeout: Duration) -> Self {
        self.auth_timeout = auth_timeout;
        self
    }

    /// Build the axum router with all endpoints
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            authorize_connection_usecase: self.authorize_connection_usecase,
            relay_message_usecase: self.relay_message_usecase,
            disconnect_connection_usecase: self.disconnect_connection_usecase,
            auth_timeout: self.auth_timeout,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8081)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until the process ends
    ///
    /// Used by tests that bind an ephemeral port.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router()).await
    }
}
