//! 値オブジェクト定義
//!
//! ルーム ID、接続 ID、認可トークン、ロール、タイムスタンプを表します。
//! 不正な値（空の ID やトークン）は生成時に拒否されます。

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::error::ValueObjectError;

/// ルーム ID
///
/// 監視対象サーバーのデータベース上の数値 ID をそのまま使用します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoomId(i64);

impl RoomId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RoomId {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 接続 ID
///
/// 認可成功時に生成され、プロセスの生存期間中は一意です。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続 ID の生成
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// ランダムな UUID v4 から接続 ID を生成
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().simple().to_string())
    }
}

/// 認可トークン
///
/// 中身は不透明な文字列で、TokenResolver によってのみ解釈されます。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyToken);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AuthToken {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// トークンはログに出さない
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// 接続のロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// リモートのゲームサーバー側プロセス
    Agent,
    /// ブラウザ側の閲覧者
    Dashboard,
}

impl Role {
    /// メッセージの転送先となるロール
    pub fn counterpart(&self) -> Role {
        match self {
            Role::Agent => Role::Dashboard,
            Role::Dashboard => Role::Agent,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Agent => f.write_str("agent"),
            Role::Dashboard => f.write_str("dashboard"),
        }
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_rejects_empty_string() {
        // テスト項目: 空文字列の接続 ID は生成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = ConnectionId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyConnectionId));
    }

    #[test]
    fn test_connection_id_factory_generates_unique_ids() {
        // テスト項目: 生成される接続 ID が互いに異なる
        // given (前提条件):

        // when (操作):
        let first = ConnectionIdFactory::generate();
        let second = ConnectionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
    }

    #[test]
    fn test_auth_token_rejects_empty_string() {
        // テスト項目: 空のトークンは「トークンなし」として拒否される
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = AuthToken::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyToken));
    }

    #[test]
    fn test_auth_token_debug_hides_value() {
        // テスト項目: Debug 出力にトークンの中身が含まれない
        // given (前提条件):
        let token = AuthToken::new("secret-token".to_string()).unwrap();

        // when (操作):
        let debug = format!("{:?}", token);

        // then (期待する結果):
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_role_counterpart() {
        // テスト項目: 各ロールの転送先ロールが反対側になる
        // given (前提条件):

        // when (操作):

        // then (期待する結果):
        assert_eq!(Role::Agent.counterpart(), Role::Dashboard);
        assert_eq!(Role::Dashboard.counterpart(), Role::Agent);
    }

    #[test]
    fn test_room_id_display() {
        // テスト項目: ルーム ID が数値として表示される
        // given (前提条件):
        let room_id = RoomId::new(42);

        // when (操作):
        let display = room_id.to_string();

        // then (期待する結果):
        assert_eq!(display, "42");
        assert_eq!(room_id.value(), 42);
    }
}
