//! Shared utilities for the Yagura relay server and CLI peer.

pub mod logger;
pub mod time;
