//! Yagura relay client.
//!
//! Connects to the relay either as a dashboard (prints telemetry, sends typed commands)
//! or as an agent simulator (streams telemetry between Start and Stop, echoes commands).
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//! Authorization failures are not retried.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yagura-client -- --token tok-1 --role agent
//! cargo run --bin yagura-client -- -t tok-1
//! ```

use std::time::Duration;

use clap::Parser;
use yagura_client::{ClientConfig, PeerRole, run_client};
use yagura_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "yagura-client")]
#[command(about = "Dashboard console and agent simulator for the Yagura relay", long_about = None)]
struct Args {
    /// Relay WebSocket URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8081/ws")]
    url: String,

    /// Token presented in the Authorize frame
    #[arg(short = 't', long)]
    token: String,

    /// Side of the room to join
    #[arg(long, value_enum, default_value_t = PeerRole::Dashboard)]
    role: PeerRole,

    /// Telemetry period in agent mode (milliseconds)
    #[arg(long, default_value = "1000")]
    interval_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = ClientConfig {
        url: args.url,
        token: args.token,
        role: args.role,
        interval: Duration::from_millis(args.interval_ms.max(1)),
    };

    // Run the client
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
