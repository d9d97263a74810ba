//! Server state shared by the handlers.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    AuthorizeConnectionUseCase, DisconnectConnectionUseCase, RelayMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// AuthorizeConnectionUseCase（接続認可のユースケース）
    pub authorize_connection_usecase: Arc<AuthorizeConnectionUseCase>,
    /// RelayMessageUseCase（メッセージ転送のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// DisconnectConnectionUseCase（接続切断のユースケース）
    pub disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    /// 接続してから Authorize を受け取るまでの期限
    pub auth_timeout: Duration,
}
