//! MessagePusher trait 定義
//!
//! 接続ごとの送信チャンネルへのメッセージ送信を抽象化します。
//! WebSocket への実際の書き込みは接続ごとの書き込みタスクだけが行い、
//! 他のコンポーネントはこのチャンネル経由でのみ送信を依頼します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{close_reason::CloseReason, error::MessagePushError, value_object::ConnectionId};

/// 書き込みタスクへの指示
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// テキストフレームを送信
    Frame(String),
    /// クローズフレームを送信して接続を閉じる
    Close(CloseReason),
    /// クローズハンドシェイクなしで接続を切断する（Agent の追い出し）
    Terminate,
}

/// 書き込みタスクへの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<Outbound>;

/// MessagePusher trait
///
/// UseCase 層と RoomRegistry 実装はこの trait に依存し、
/// 具体的な送信手段（WebSocket など）には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除（存在しなければ何もしない）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にメッセージを送信し、送信できた数を返す
    async fn broadcast(&self, targets: &[ConnectionId], content: &str) -> usize;

    /// 接続を強制的に切断し、登録を解除
    async fn terminate(&self, connection_id: &ConnectionId);
}
