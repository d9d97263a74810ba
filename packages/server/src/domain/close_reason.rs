//! 接続を終了する理由とクローズコード
//!
//! 4000 番台のカスタムコードで、ピア側の再接続ロジックが
//! 「再試行可能な切断」と「致命的な認可失敗」を区別できるようにします。

use super::value_object::Role;

/// 認可タイムアウトおよび Agent 経路の認可失敗
pub const CLOSE_CODE_AGENT_AUTH: u16 = 4000;
/// Dashboard 経路の認可失敗
pub const CLOSE_CODE_DASHBOARD_AUTH: u16 = 4001;

/// リレーが接続を能動的に閉じる理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// 期限内に Authorize が届かなかった
    AuthTimeout,
    /// Authorize にトークンが含まれていなかった
    MissingToken(Role),
    /// トークンが登録されていない
    InvalidToken(Role),
    /// トークンに紐づくサーバーが存在しない
    ServerNotFound(Role),
    /// トークン解決のバックエンドが応答しない
    ResolverUnavailable(Role),
}

impl CloseReason {
    pub fn code(&self) -> u16 {
        match self {
            CloseReason::AuthTimeout => CLOSE_CODE_AGENT_AUTH,
            CloseReason::MissingToken(role)
            | CloseReason::InvalidToken(role)
            | CloseReason::ServerNotFound(role)
            | CloseReason::ResolverUnavailable(role) => auth_failure_code(*role),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CloseReason::AuthTimeout => "No Authorize message received in time",
            CloseReason::MissingToken(_) => "No token provided",
            CloseReason::InvalidToken(_) => "Invalid token",
            CloseReason::ServerNotFound(_) => "Server not found",
            CloseReason::ResolverUnavailable(_) => "Token lookup failed",
        }
    }
}

fn auth_failure_code(role: Role) -> u16 {
    match role {
        Role::Agent => CLOSE_CODE_AGENT_AUTH,
        Role::Dashboard => CLOSE_CODE_DASHBOARD_AUTH,
    }
}
