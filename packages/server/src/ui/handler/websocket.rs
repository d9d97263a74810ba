//! WebSocket connection handlers.
//!
//! 1 接続につき 1 つのハンドラが動き、次の状態を順に辿ります。
//!
//! 1. 未認可: Authorize 以外のフレームは無視。認可期限タイマーが動いている
//! 2. 認可済み: Data / ConsoleMessage / Command をルーム内の反対側へ転送
//! 3. 切断: 認可済みならルームから一度だけ削除
//!
//! WebSocket への書き込みは `pusher_loop` のタスクだけが行います。

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{AuthGate, CloseReason, Outbound, PusherChannel, Session},
    infrastructure::dto::{conversion::InboundAction, websocket::decode_inbound},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives outbound instructions from the rx channel and writes them to the WebSocket.
///
/// This is the only writer of the socket. Frames from the connection's own loop and from
/// fan-out triggered by other connections all arrive through this channel.
///
/// # Arguments
///
/// * `rx` - Channel receiver for outbound instructions
/// * `sender` - WebSocket sink of this connection
///
/// # Returns
///
/// A `JoinHandle` for the spawned task. The task ends after a close frame, a terminate
/// instruction, or a write failure.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Frame(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close(reason) => {
                    let frame = CloseFrame {
                        code: reason.code(),
                        reason: Utf8Bytes::from_static(reason.message()),
                    };
                    if let Err(e) = sender.send(Message::Close(Some(frame))).await {
                        tracing::debug!("Failed to send close frame: {}", e);
                    }
                    break;
                }
                // 追い出し: クローズハンドシェイクなしで切断
                Outbound::Terminate => break,
            }
        }
    })
}

/// 認可期限タイマーを起動
///
/// 期限までに認可が確定しなければ、タイムアウト理由で接続を閉じる。
fn spawn_auth_deadline(
    gate: Arc<AuthGate>,
    tx: PusherChannel,
    auth_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(auth_timeout).await;
        if gate.try_close() {
            tracing::info!(
                "No Authorize received within {:?}, closing connection",
                auth_timeout
            );
            let _ = tx.send(Outbound::Close(CloseReason::AuthTimeout));
        }
    })
}

/// Per-connection state owned by the socket loop
struct Connection {
    state: Arc<AppState>,
    gate: Arc<AuthGate>,
    tx: PusherChannel,
    deadline_task: JoinHandle<()>,
    session: Option<Session>,
}

impl Connection {
    async fn on_text(&mut self, text: &str) {
        let Some(inbound) = decode_inbound(text) else {
            tracing::warn!("Dropping malformed or unknown frame: {}", text);
            return;
        };

        match InboundAction::from(inbound) {
            InboundAction::Authorize { role, token } => {
                if self.session.is_some() || !self.gate.is_pending() {
                    tracing::debug!("Ignoring repeated Authorize");
                    return;
                }

                match self
                    .state
                    .authorize_connection_usecase
                    .execute(role, token, &self.gate, self.tx.clone())
                    .await
                {
                    Ok(session) => {
                        self.deadline_task.abort();
                        tracing::info!(
                            "Connection '{}' authorized as {} for room {}",
                            session.connection_id,
                            session.role,
                            session.room_id
                        );
                        self.session = Some(session);
                    }
                    Err(e) => {
                        tracing::warn!("Authorization failed ({}): {}", role, e);
                        if let Some(reason) = e.close_reason(role)
                            && self.gate.try_close()
                        {
                            self.deadline_task.abort();
                            let _ = self.tx.send(Outbound::Close(reason));
                        }
                    }
                }
            }
            InboundAction::Relay(message) => {
                let Some(session) = self.session.as_ref() else {
                    tracing::debug!("Ignoring {} before authorization", message.intent());
                    return;
                };

                match self
                    .state
                    .relay_message_usecase
                    .execute(session, message)
                    .await
                {
                    Ok(delivered) => {
                        tracing::debug!(
                            "Connection '{}' relayed to {} peers",
                            session.connection_id,
                            delivered
                        );
                    }
                    Err(e) => {
                        tracing::debug!("Ignoring frame from '{}': {}", session.connection_id, e);
                    }
                }
            }
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive outbound instructions
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    let gate = Arc::new(AuthGate::new());
    let deadline_task = spawn_auth_deadline(gate.clone(), tx.clone(), state.auth_timeout);

    let mut connection = Connection {
        state,
        gate,
        tx,
        deadline_task,
        session: None,
    };

    tracing::debug!("WebSocket connection accepted");

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let message = match incoming {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                };

                match message {
                    Message::Text(text) => connection.on_text(text.as_str()).await,
                    Message::Close(_) => {
                        tracing::debug!("Peer requested close");
                        break;
                    }
                    // Ping/pong is handled automatically by the WebSocket protocol
                    _ => {}
                }
            }
            _ = &mut send_task => {
                tracing::debug!("Writer finished, closing connection");
                break;
            }
        }
    }

    send_task.abort();
    connection.deadline_task.abort();

    if let Some(session) = connection.session.take() {
        let removed = connection
            .state
            .disconnect_connection_usecase
            .execute(&session)
            .await;
        tracing::info!(
            "Connection '{}' ({}) disconnected from room {}{}",
            session.connection_id,
            session.role,
            session.room_id,
            if removed { "" } else { " (already evicted)" }
        );
    } else {
        tracing::debug!("Unauthorized connection closed");
    }
}
