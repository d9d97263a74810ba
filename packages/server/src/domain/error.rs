//! ドメイン層のエラー型

use thiserror::Error;

use super::value_object::RoomId;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("token must not be empty")]
    EmptyToken,
}

/// トークン解決のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// トークンが登録されていない
    #[error("unknown token")]
    UnknownToken,

    /// トークンは有効だが、紐づくサーバーが存在しない
    #[error("server {0} not found")]
    ResourceNotFound(RoomId),

    /// データストアへの問い合わせに失敗
    #[error("token lookup failed: {0}")]
    Backend(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
