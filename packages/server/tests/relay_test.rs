//! Integration tests for the relay using an in-process server.
//!
//! ## テスト作業記録
//!
//! ### 何をテストしているか
//! - 実際の WebSocket 接続を通した認可・転送・切断の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - ハンドラ・ユースケース・レジストリの組み合わせで、クローズコードや
//!   Start / Stop の順序がワイヤー上で正しく観測できることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：Agent と Dashboard の接続からルーム削除まで
//! - 異常系：トークンなし、未登録トークン、サーバーなし、認可タイムアウト
//! - エッジケース：Agent の二重接続（追い出し）、不正なフレーム

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use yagura_server::{
    domain::{AuthToken, ResolveError, RoomId, RoomRegistry, TokenResolver},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry,
        resolver::StaticTokenResolver,
    },
    ui::Server,
    usecase::{AuthorizeConnectionUseCase, DisconnectConnectionUseCase, RelayMessageUseCase},
};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TOKEN_STORE: &str = r#"{"servers":[42],"tokens":{"tok-1":42,"tok-ghost":9}}"#;
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Helper struct to manage an in-process relay server
struct TestServer {
    url: String,
    registry: Arc<InMemoryRoomRegistry>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with_auth_timeout(Duration::from_secs(5)).await
    }

    async fn start_with_auth_timeout(auth_timeout: Duration) -> Self {
        let resolver = Arc::new(StaticTokenResolver::from_json_str(TOKEN_STORE).unwrap());
        Self::start_with(resolver, auth_timeout).await
    }

    async fn start_with(resolver: Arc<dyn TokenResolver>, auth_timeout: Duration) -> Self {
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let registry = Arc::new(InMemoryRoomRegistry::new(pusher.clone()));

        let server = Server::new(
            Arc::new(AuthorizeConnectionUseCase::new(
                resolver,
                registry.clone(),
                pusher.clone(),
            )),
            Arc::new(RelayMessageUseCase::new(registry.clone())),
            Arc::new(DisconnectConnectionUseCase::new(registry.clone(), pusher)),
        )
        .with_auth_timeout(auth_timeout);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            server.serve(listener).await.unwrap();
        });

        TestServer {
            url: format!("ws://{}/ws", addr),
            registry,
            handle,
        }
    }

    async fn connect(&self) -> Ws {
        let (ws, _response) = connect_async(&self.url).await.unwrap();
        ws
    }

    /// Wait until the member count of a room matches (0 means the room is gone)
    async fn wait_for_members(&self, room_id: i64, expected: usize) {
        let room_id = RoomId::new(room_id);
        for _ in 0..100 {
            let count = self
                .registry
                .snapshot(room_id)
                .await
                .map(|room| room.len())
                .unwrap_or(0);
            if count == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("room {} never reached {} members", room_id, expected);
    }
}

/// Token store whose backend is always down
struct UnavailableResolver;

#[async_trait]
impl TokenResolver for UnavailableResolver {
    async fn resolve(&self, _token: &AuthToken) -> Result<RoomId, ResolveError> {
        Err(ResolveError::Backend("db down".to_string()))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn send(ws: &mut Ws, json: &str) {
    ws.send(Message::Text(json.to_string().into())).await.unwrap();
}

async fn authorize(ws: &mut Ws, from: &str, token: &str) {
    send(
        ws,
        &format!(
            r#"{{"from":"{}","intent":"Authorize","data":{{"token":"{}"}}}}"#,
            from, token
        ),
    )
    .await;
}

/// Receive the next text frame as JSON
async fn recv_json(ws: &mut Ws) -> serde_json::Value {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Receive the close frame and return (code, reason)
async fn recv_close(ws: &mut Ws) -> (u16, String) {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for close")
            .expect("stream ended without a close frame")
            .expect("websocket error");
        if let Message::Close(Some(frame)) = message {
            return (u16::from(frame.code), frame.reason.as_str().to_string());
        }
    }
}

/// Assert that nothing arrives within a short window
async fn assert_silent(ws: &mut Ws) {
    let result = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}

#[tokio::test]
async fn test_end_to_end_relay_flow() {
    // テスト項目: Agent と Dashboard の接続・Start・Data 転送・Stop・ルーム削除の一連の流れ
    // given (前提条件):
    let server = TestServer::start().await;
    let mut agent = server.connect().await;
    authorize(&mut agent, "server", "tok-1").await;
    server.wait_for_members(42, 1).await;

    // when (操作): Dashboard が参加
    let mut dashboard = server.connect().await;
    authorize(&mut dashboard, "client", "tok-1").await;

    // then (期待する結果): Agent に Start が届く
    assert_eq!(recv_json(&mut agent).await, serde_json::json!({"intent": "Start"}));
    server.wait_for_members(42, 2).await;

    // when (操作): Agent が Data を送信
    send(
        &mut agent,
        r#"{"from":"server","intent":"Data","data":{"usage":{"cpu":10}}}"#,
    )
    .await;

    // then (期待する結果): Dashboard に Data が届き、Agent には何も返らない
    assert_eq!(
        recv_json(&mut dashboard).await,
        serde_json::json!({"intent": "Data", "data": {"usage": {"cpu": 10}}})
    );

    // when (操作): Dashboard が Command を送信
    send(
        &mut dashboard,
        r#"{"from":"client","intent":"Command","data":{"text":"say hello"}}"#,
    )
    .await;

    // then (期待する結果): Agent に Command が届く
    assert_eq!(
        recv_json(&mut agent).await,
        serde_json::json!({"intent": "Command", "data": {"text": "say hello"}})
    );

    // when (操作): Dashboard が切断
    dashboard.close(None).await.unwrap();

    // then (期待する結果): Agent に Stop が届き、ルームには Agent だけが残る
    assert_eq!(recv_json(&mut agent).await, serde_json::json!({"intent": "Stop"}));
    server.wait_for_members(42, 1).await;

    // when (操作): Agent が切断
    agent.close(None).await.unwrap();

    // then (期待する結果): ルームが削除される
    server.wait_for_members(42, 0).await;
    assert_eq!(server.registry.room_count().await, 0);
}

#[tokio::test]
async fn test_second_agent_evicts_first() {
    // テスト項目: 同じルームに 2 人目の Agent が認可されると 1 人目がクローズフレームなしで切断される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut first = server.connect().await;
    authorize(&mut first, "server", "tok-1").await;
    server.wait_for_members(42, 1).await;
    let mut dashboard = server.connect().await;
    authorize(&mut dashboard, "client", "tok-1").await;
    assert_eq!(recv_json(&mut first).await, serde_json::json!({"intent": "Start"}));

    // when (操作):
    let mut second = server.connect().await;
    authorize(&mut second, "server", "tok-1").await;

    // then (期待する結果): 1 人目の接続はクローズハンドシェイクなしで終了する
    let ended = tokio::time::timeout(RECV_TIMEOUT, first.next())
        .await
        .expect("evicted agent was not disconnected");
    assert!(
        !matches!(ended, Some(Ok(Message::Close(_)))),
        "evicted agent received a close frame: {:?}",
        ended
    );
    server.wait_for_members(42, 2).await;

    // then (期待する結果): Dashboard が待っているので新しい Agent に Start が届く
    assert_eq!(recv_json(&mut second).await, serde_json::json!({"intent": "Start"}));

    // then (期待する結果): Command は新しい Agent に届く
    send(
        &mut dashboard,
        r#"{"from":"client","intent":"Command","data":{"text":"status"}}"#,
    )
    .await;
    assert_eq!(
        recv_json(&mut second).await,
        serde_json::json!({"intent": "Command", "data": {"text": "status"}})
    );
}

#[tokio::test]
async fn test_authorization_timeout_closes_with_4000() {
    // テスト項目: 期限内に Authorize が届かない接続はタイムアウト理由で閉じられ、ルームに入らない
    // given (前提条件):
    let server = TestServer::start_with_auth_timeout(Duration::from_millis(200)).await;
    let mut ws = server.connect().await;

    // when (操作): 認可前の Data は無視される
    send(
        &mut ws,
        r#"{"from":"server","intent":"Data","data":{"usage":{"cpu":1}}}"#,
    )
    .await;

    // then (期待する結果):
    let (code, reason) = recv_close(&mut ws).await;
    assert_eq!(code, 4000);
    assert_eq!(reason, "No Authorize message received in time");
    assert_eq!(server.registry.room_count().await, 0);
}

#[tokio::test]
async fn test_missing_token_closes_agent_with_4000() {
    // テスト項目: トークンなしの Agent は 4000 "No token provided" で閉じられる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut ws = server.connect().await;

    // when (操作):
    send(&mut ws, r#"{"from":"server","intent":"Authorize","data":{}}"#).await;

    // then (期待する結果):
    assert_eq!(recv_close(&mut ws).await, (4000, "No token provided".to_string()));
}

#[tokio::test]
async fn test_invalid_token_closes_dashboard_with_4001() {
    // テスト項目: 未登録トークンの Dashboard は 4001 "Invalid token" で閉じられる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut ws = server.connect().await;

    // when (操作):
    authorize(&mut ws, "client", "bogus").await;

    // then (期待する結果):
    assert_eq!(recv_close(&mut ws).await, (4001, "Invalid token".to_string()));
    assert_eq!(server.registry.room_count().await, 0);
}

#[tokio::test]
async fn test_missing_server_closes_with_server_not_found() {
    // テスト項目: サーバーが存在しないトークンは "Server not found" で閉じられる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut ws = server.connect().await;

    // when (操作):
    authorize(&mut ws, "server", "tok-ghost").await;

    // then (期待する結果):
    assert_eq!(recv_close(&mut ws).await, (4000, "Server not found".to_string()));
}

#[tokio::test]
async fn test_resolver_failure_closes_with_role_code() {
    // テスト項目: トークン解決のバックエンド障害も 4000 番台のコードと専用の理由で閉じられる
    // given (前提条件):
    let server =
        TestServer::start_with(Arc::new(UnavailableResolver), Duration::from_secs(5)).await;
    let mut dashboard = server.connect().await;
    let mut agent = server.connect().await;

    // when (操作):
    authorize(&mut dashboard, "client", "tok-1").await;
    authorize(&mut agent, "server", "tok-1").await;

    // then (期待する結果):
    assert_eq!(
        recv_close(&mut dashboard).await,
        (4001, "Token lookup failed".to_string())
    );
    assert_eq!(
        recv_close(&mut agent).await,
        (4000, "Token lookup failed".to_string())
    );
    assert_eq!(server.registry.room_count().await, 0);
}

#[tokio::test]
async fn test_malformed_frames_are_dropped() {
    // テスト項目: 不正なフレームは破棄され、接続は開いたまま認可できる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut agent = server.connect().await;

    // when (操作):
    send(&mut agent, "not json at all").await;
    send(&mut agent, r#"{"from":"server","intent":"Dance","data":{}}"#).await;
    send(&mut agent, r#"{"from":"server","intent":"Command","data":{"text":"x"}}"#).await;
    authorize(&mut agent, "server", "tok-1").await;

    // then (期待する結果):
    server.wait_for_members(42, 1).await;
    assert_silent(&mut agent).await;
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let addr = server.url.trim_start_matches("ws://").trim_end_matches("/ws").to_string();
    let mut stream = TcpStream::connect(&addr).await.unwrap();

    // when (操作):
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream
        .write_all(
            format!(
                "GET /api/health HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
                addr
            )
            .as_bytes(),
        )
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    // then (期待する結果):
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains(r#"{"status":"ok"}"#));
}
