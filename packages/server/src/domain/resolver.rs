//! TokenResolver trait 定義
//!
//! 不透明なトークンを、それを所有するサーバーの数値 ID（＝ルーム ID）に解決します。
//! 実体は外部のデータストアであり、具体的な実装は Infrastructure 層が提供します。

use async_trait::async_trait;

use super::{
    error::ResolveError,
    value_object::{AuthToken, RoomId},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// トークンをルーム ID に解決
    ///
    /// # Errors
    ///
    /// - `ResolveError::UnknownToken` - トークンが登録されていない
    /// - `ResolveError::ResourceNotFound` - 紐づくサーバーが存在しない
    /// - `ResolveError::Backend` - データストアへの問い合わせに失敗
    async fn resolve(&self, token: &AuthToken) -> Result<RoomId, ResolveError>;
}
