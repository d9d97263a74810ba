//! Client configuration.

use std::time::Duration;

use clap::ValueEnum;
use yagura_server::infrastructure::dto::websocket::Origin;

/// Which side of a room this client plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeerRole {
    /// Browser-side viewer that issues commands
    Dashboard,
    /// Game-server-side process that reports telemetry
    Agent,
}

impl PeerRole {
    /// The `from` value this role puts on its frames
    pub fn origin(&self) -> Origin {
        match self {
            PeerRole::Dashboard => Origin::Client,
            PeerRole::Agent => Origin::Server,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeerRole::Dashboard => "dashboard",
            PeerRole::Agent => "agent",
        }
    }
}

/// Settings for one client run
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay WebSocket URL
    pub url: String,
    /// Opaque token presented in the Authorize frame
    pub token: String,
    pub role: PeerRole,
    /// Telemetry period in agent mode
    pub interval: Duration,
}
