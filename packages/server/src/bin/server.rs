//! Yagura relay server.
//!
//! Pairs game-server agents with dashboards over WebSocket, one room per registered server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yagura-server -- --token tok-1=42
//! cargo run --bin yagura-server -- --host 0.0.0.0 --port 8081 --tokens tokens.json
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use yagura_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry,
        resolver::StaticTokenResolver,
    },
    ui::Server,
    usecase::{AuthorizeConnectionUseCase, DisconnectConnectionUseCase, RelayMessageUseCase},
};
use yagura_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "yagura-server")]
#[command(about = "WebSocket relay between game-server agents and dashboards", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8081")]
    port: u16,

    /// Seconds a new connection has to send its Authorize frame
    #[arg(long, default_value = "5")]
    auth_timeout_secs: u64,

    /// JSON token store: {"servers": [42], "tokens": {"tok-1": 42}}
    #[arg(long)]
    tokens: Option<String>,

    /// Inline token in TOKEN=SERVER_ID form (repeatable)
    #[arg(long = "token")]
    token: Vec<String>,
}

fn build_resolver(args: &Args) -> Result<StaticTokenResolver, Box<dyn std::error::Error>> {
    let mut resolver = match &args.tokens {
        Some(path) => StaticTokenResolver::from_file(path)?,
        None => StaticTokenResolver::default(),
    };
    for arg in &args.token {
        let (token, server_id) = StaticTokenResolver::parse_token_arg(arg)?;
        resolver.insert(token, server_id);
    }
    Ok(resolver)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. TokenResolver
    // 2. MessagePusher
    // 3. RoomRegistry
    // 4. UseCases
    // 5. Server

    // 1. Create TokenResolver (static token store)
    let resolver = match build_resolver(&args) {
        Ok(resolver) => Arc::new(resolver),
        Err(e) => {
            tracing::error!("Failed to load tokens: {}", e);
            std::process::exit(1);
        }
    };
    if resolver.token_count() == 0 {
        tracing::warn!("No tokens registered; every Authorize will be rejected");
    } else {
        tracing::info!("{} tokens registered", resolver.token_count());
    }

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create RoomRegistry (in-memory)
    let registry = Arc::new(InMemoryRoomRegistry::new(message_pusher.clone()));

    // 4. Create UseCases
    let authorize_connection_usecase = Arc::new(AuthorizeConnectionUseCase::new(
        resolver,
        registry.clone(),
        message_pusher.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(registry.clone()));
    let disconnect_connection_usecase = Arc::new(DisconnectConnectionUseCase::new(
        registry,
        message_pusher,
    ));

    // 5. Create and run the server
    let server = Server::new(
        authorize_connection_usecase,
        relay_message_usecase,
        disconnect_connection_usecase,
    )
    .with_auth_timeout(Duration::from_secs(args.auth_timeout_secs));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
