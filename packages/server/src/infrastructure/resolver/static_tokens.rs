//! 静的トークンストアによる TokenResolver 実装
//!
//! 起動時に JSON ファイルまたはコマンドライン引数から読み込んだ
//! 「トークン → サーバー ID」の対応表を使ってトークンを解決します。
//!
//! ```json
//! { "servers": [42], "tokens": { "tok-1": 42 } }
//! ```
//!
//! `tokens` にないトークンは `UnknownToken`、
//! 紐づくサーバー ID が `servers` にない場合は `ResourceNotFound` になります。

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AuthToken, ResolveError, RoomId, TokenResolver};

/// トークンストアの読み込みエラー
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to read token store: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse token store: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid token argument '{0}' (expected TOKEN=SERVER_ID)")]
    InvalidTokenArg(String),
}

/// トークンストアのファイル形式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStore {
    /// 存在するサーバー ID
    #[serde(default)]
    pub servers: HashSet<i64>,
    /// トークン → サーバー ID
    #[serde(default)]
    pub tokens: HashMap<String, i64>,
}

/// 静的トークンストアを使う TokenResolver
#[derive(Debug, Default)]
pub struct StaticTokenResolver {
    store: TokenStore,
}

impl StaticTokenResolver {
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }

    /// JSON 文字列からトークンストアを読み込む
    pub fn from_json_str(json: &str) -> Result<Self, TokenStoreError> {
        let store: TokenStore = serde_json::from_str(json)?;
        Ok(Self::new(store))
    }

    /// JSON ファイルからトークンストアを読み込む
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TokenStoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// トークンを登録し、サーバー ID を存在するサーバーとして登録する
    pub fn insert(&mut self, token: impl Into<String>, server_id: i64) {
        self.store.tokens.insert(token.into(), server_id);
        self.store.servers.insert(server_id);
    }

    /// `TOKEN=SERVER_ID` 形式の引数を解析
    pub fn parse_token_arg(arg: &str) -> Result<(String, i64), TokenStoreError> {
        let invalid = || TokenStoreError::InvalidTokenArg(arg.to_string());

        let (token, server_id) = arg.split_once('=').ok_or_else(invalid)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid());
        }
        let server_id = server_id.trim().parse::<i64>().map_err(|_| invalid())?;

        Ok((token.to_string(), server_id))
    }

    pub fn token_count(&self) -> usize {
        self.store.tokens.len()
    }
}

#[async_trait]
impl TokenResolver for StaticTokenResolver {
    async fn resolve(&self, token: &AuthToken) -> Result<RoomId, ResolveError> {
        let server_id = self
            .store
            .tokens
            .get(token.as_str())
            .copied()
            .ok_or(ResolveError::UnknownToken)?;

        if !self.store.servers.contains(&server_id) {
            return Err(ResolveError::ResourceNotFound(RoomId::new(server_id)));
        }

        Ok(RoomId::new(server_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> AuthToken {
        AuthToken::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_known_token() {
        // テスト項目: 登録済みトークンがサーバー ID に解決される
        // given (前提条件):
        let resolver =
            StaticTokenResolver::from_json_str(r#"{"servers":[42],"tokens":{"tok-1":42}}"#)
                .unwrap();

        // when (操作):
        let result = resolver.resolve(&token("tok-1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(RoomId::new(42)));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        // テスト項目: 未登録のトークンは UnknownToken になる
        // given (前提条件):
        let resolver =
            StaticTokenResolver::from_json_str(r#"{"servers":[42],"tokens":{"tok-1":42}}"#)
                .unwrap();

        // when (操作):
        let result = resolver.resolve(&token("bogus")).await;

        // then (期待する結果):
        assert_eq!(result, Err(ResolveError::UnknownToken));
    }

    #[tokio::test]
    async fn test_resolve_token_for_missing_server() {
        // テスト項目: サーバーが存在しないトークンは ResourceNotFound になる
        // given (前提条件):
        let resolver =
            StaticTokenResolver::from_json_str(r#"{"servers":[],"tokens":{"tok-9":9}}"#).unwrap();

        // when (操作):
        let result = resolver.resolve(&token("tok-9")).await;

        // then (期待する結果):
        assert_eq!(result, Err(ResolveError::ResourceNotFound(RoomId::new(9))));
    }

    #[tokio::test]
    async fn test_insert_registers_server() {
        // テスト項目: insert したトークンはサーバーも登録されるため解決できる
        // given (前提条件):
        let mut resolver = StaticTokenResolver::default();

        // when (操作):
        resolver.insert("tok-2", 7);

        // then (期待する結果):
        assert_eq!(resolver.token_count(), 1);
        assert_eq!(resolver.resolve(&token("tok-2")).await, Ok(RoomId::new(7)));
    }

    #[test]
    fn test_parse_token_arg() {
        // テスト項目: TOKEN=SERVER_ID 形式の引数を解析できる
        // given (前提条件):
        let arg = "tok-1=42";

        // when (操作):
        let result = StaticTokenResolver::parse_token_arg(arg).unwrap();

        // then (期待する結果):
        assert_eq!(result, ("tok-1".to_string(), 42));
    }

    #[test]
    fn test_parse_token_arg_rejects_malformed_input() {
        // テスト項目: 不正な形式の引数はエラーになる
        // given (前提条件):
        let inputs = ["tok-1", "=42", "tok-1=abc", ""];

        // when (操作):
        let results: Vec<_> = inputs
            .iter()
            .map(|arg| StaticTokenResolver::parse_token_arg(arg))
            .collect();

        // then (期待する結果):
        for result in results {
            assert!(matches!(result, Err(TokenStoreError::InvalidTokenArg(_))));
        }
    }

    #[test]
    fn test_from_json_str_rejects_invalid_json() {
        // テスト項目: JSON として不正な入力は Parse エラーになる
        // given (前提条件):
        let json = "{ not json";

        // when (操作):
        let result = StaticTokenResolver::from_json_str(json);

        // then (期待する結果):
        assert!(matches!(result, Err(TokenStoreError::Parse(_))));
    }

    #[test]
    fn test_from_file_missing_path() {
        // テスト項目: 存在しないファイルは Io エラーになる
        // given (前提条件):
        let path = std::env::temp_dir().join("yagura-missing-token-store.json");

        // when (操作):
        let result = StaticTokenResolver::from_file(&path);

        // then (期待する結果):
        assert!(matches!(result, Err(TokenStoreError::Io(_))));
    }

    #[test]
    fn test_from_file_reads_store() {
        // テスト項目: ファイルからトークンストアを読み込める
        // given (前提条件):
        let path = std::env::temp_dir().join(format!(
            "yagura-token-store-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"servers":[1,2],"tokens":{"a":1,"b":2}}"#).unwrap();

        // when (操作):
        let resolver = StaticTokenResolver::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // then (期待する結果):
        assert_eq!(resolver.token_count(), 2);
    }
}
