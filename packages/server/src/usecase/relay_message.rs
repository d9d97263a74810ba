//! UseCase: メッセージ転送処理
//!
//! 認可済み接続から届いたメッセージを、同じルームの反対側のロールへ転送します。

use std::sync::Arc;

use crate::domain::{RelayMessage, RoomRegistry, Session};

use super::error::RelayError;

/// メッセージ転送のユースケース
pub struct RelayMessageUseCase {
    /// RoomRegistry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl RelayMessageUseCase {
    /// 新しい RelayMessageUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// メッセージ転送を実行
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 届けた接続の数（転送先がなければ 0）
    /// * `Err(RelayError)` - 送信者のロールでは送れないメッセージ
    pub async fn execute(
        &self,
        session: &Session,
        message: RelayMessage,
    ) -> Result<usize, RelayError> {
        if message.sender_role() != session.role {
            return Err(RelayError::NotPermitted {
                role: session.role,
                intent: message.intent(),
            });
        }

        Ok(self.registry.route(session.room_id, &message).await)
    }
}
