//! Data Transfer Objects (DTOs) for the relay.
//!
//! - `websocket`: wire frames exchanged with agents and dashboards
//! - `conversion`: conversion between wire frames and domain types

pub mod conversion;
pub mod websocket;
