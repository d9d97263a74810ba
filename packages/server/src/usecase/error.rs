//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{CloseReason, ResolveError, Role, RoomId};

/// 接続認可のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizeError {
    /// Authorize にトークンが含まれていない
    #[error("no token provided")]
    MissingToken,

    /// トークンが登録されていない
    #[error("invalid token")]
    InvalidToken,

    /// トークンに紐づくサーバーが存在しない
    #[error("server {0} not found")]
    ServerNotFound(RoomId),

    /// トークン解決のバックエンド障害
    #[error("token lookup failed: {0}")]
    ResolverUnavailable(String),

    /// 認可期限が既に切れている（タイマー側が先に接続を閉じた）
    #[error("authorization deadline already elapsed")]
    DeadlineElapsed,
}

impl AuthorizeError {
    /// 接続を閉じる際の理由
    ///
    /// `DeadlineElapsed` はタイマー側が既にクローズ済みのため `None`。
    pub fn close_reason(&self, role: Role) -> Option<CloseReason> {
        match self {
            AuthorizeError::MissingToken => Some(CloseReason::MissingToken(role)),
            AuthorizeError::InvalidToken => Some(CloseReason::InvalidToken(role)),
            AuthorizeError::ServerNotFound(_) => Some(CloseReason::ServerNotFound(role)),
            AuthorizeError::ResolverUnavailable(_) => Some(CloseReason::ResolverUnavailable(role)),
            AuthorizeError::DeadlineElapsed => None,
        }
    }
}

impl From<ResolveError> for AuthorizeError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::UnknownToken => AuthorizeError::InvalidToken,
            ResolveError::ResourceNotFound(room_id) => AuthorizeError::ServerNotFound(room_id),
            ResolveError::Backend(message) => AuthorizeError::ResolverUnavailable(message),
        }
    }
}

/// メッセージ転送のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// このロールからは送信できない intent
    #[error("{role} may not send {intent}")]
    NotPermitted { role: Role, intent: &'static str },
}
