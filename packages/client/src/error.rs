//! Error types for the relay client.

use thiserror::Error;
use yagura_server::domain::close_reason::{CLOSE_CODE_AGENT_AUTH, CLOSE_CODE_DASHBOARD_AUTH};

/// Client-specific errors
#[derive(Debug, Error, PartialEq)]
pub enum ClientError {
    /// The relay closed the connection with a close frame
    #[error("Connection closed by relay ({code}): {reason}")]
    Closed { code: u16, reason: String },

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl ClientError {
    /// 認可失敗による切断は再接続しても結果が変わらない
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClientError::Closed {
                code: CLOSE_CODE_AGENT_AUTH | CLOSE_CODE_DASHBOARD_AUTH,
                ..
            }
        )
    }
}
