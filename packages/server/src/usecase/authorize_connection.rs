//! UseCase: 接続認可処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthorizeConnectionUseCase::execute() メソッド
//! - トークン解決、認可ゲートの確定、ルームへの参加
//!
//! ### なぜこのテストが必要か
//! - 認可に失敗した接続がルームに入らないことを保証
//! - 認可期限を過ぎた接続が後から参加できないことを保証
//! - 成功時に Session が正しいロールとルーム ID を持つことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンでの Agent / Dashboard の認可
//! - 異常系：トークンなし、未登録トークン、サーバーなし、バックエンド障害
//! - エッジケース：タイマーが先に接続を閉じた後の認可

use std::sync::Arc;

use yagura_shared::time::get_unix_timestamp_millis;

use crate::domain::{
    AuthGate, AuthToken, ConnectionIdFactory, Member, MessagePusher, PusherChannel, Role,
    RoomRegistry, Session, Timestamp, TokenResolver,
};

use super::error::AuthorizeError;

/// 接続認可のユースケース
pub struct AuthorizeConnectionUseCase {
    /// TokenResolver（トークン解決の抽象化）
    resolver: Arc<dyn TokenResolver>,
    /// RoomRegistry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl AuthorizeConnectionUseCase {
    /// 新しい AuthorizeConnectionUseCase を作成
    pub fn new(
        resolver: Arc<dyn TokenResolver>,
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            resolver,
            registry,
            message_pusher,
        }
    }

    /// 接続認可を実行
    ///
    /// # Arguments
    ///
    /// * `role` - Authorize フレームの `from` から決まるロール
    /// * `token` - Authorize フレームに含まれるトークン
    /// * `gate` - 認可期限タイマーとの競合を解決するゲート
    /// * `sender` - 接続の書き込みタスクへの送信チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - 認可成功（ルームに参加済み）
    /// * `Err(AuthorizeError)` - 認可失敗（ルームには参加していない）
    pub async fn execute(
        &self,
        role: Role,
        token: Option<String>,
        gate: &AuthGate,
        sender: PusherChannel,
    ) -> Result<Session, AuthorizeError> {
        // 1. トークンの検証
        let token = token
            .and_then(|token| AuthToken::new(token).ok())
            .ok_or(AuthorizeError::MissingToken)?;

        // 2. トークンをルーム ID に解決
        let room_id = self.resolver.resolve(&token).await?;

        // 3. 認可を確定（タイマーが先に閉じていれば参加しない）
        if !gate.try_authorize() {
            return Err(AuthorizeError::DeadlineElapsed);
        }

        // 4. 接続 ID を生成して送信チャンネルを登録
        let connection_id = ConnectionIdFactory::generate();
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        // 5. ルームに参加
        let member = Member::new(
            connection_id.clone(),
            role,
            Timestamp::new(get_unix_timestamp_millis()),
        );
        self.registry.join(room_id, member).await;

        Ok(Session {
            connection_id,
            role,
            room_id,
        })
    }
}
