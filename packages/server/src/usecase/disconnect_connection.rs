//! UseCase: 接続切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//! - ルームからの削除と送信チャンネルの登録解除
//!
//! ### なぜこのテストが必要か
//! - 切断処理が二重に走っても状態が壊れないことを保証
//! - 追い出された Agent の切断が新しい Agent に影響しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：Dashboard の切断で Agent に Stop が届く
//! - エッジケース：同じ接続の二重切断、追い出し済み Agent の切断

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomRegistry, Session};

/// 接続切断のユースケース
pub struct DisconnectConnectionUseCase {
    /// RoomRegistry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectConnectionUseCase {
    /// 新しい DisconnectConnectionUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 接続切断を実行
    ///
    /// # Returns
    ///
    /// ルームから実際に削除された場合は `true`。
    /// 既に削除済み（追い出し済みを含む）の場合は `false`。
    pub async fn execute(&self, session: &Session) -> bool {
        // 1. ルームから削除（Stop 通知やルーム削除はレジストリが行う）
        let removed = self
            .registry
            .leave(session.room_id, &session.connection_id)
            .await
            .is_some();

        // 2. 送信チャンネルを登録解除
        self.message_pusher
            .unregister_client(&session.connection_id)
            .await;

        removed
    }
}
