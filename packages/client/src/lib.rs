//! CLI peer for the Yagura relay.
//!
//! - Dashboard mode: prints telemetry and console output, sends typed lines as commands
//! - Agent mode: streams telemetry between Start and Stop, echoes commands back

pub mod agent;
pub mod config;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use config::{ClientConfig, PeerRole};
pub use runner::run_client;
