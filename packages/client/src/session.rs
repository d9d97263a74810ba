//! WebSocket client session management.

use std::time::Instant;

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::protocol::{CloseFrame, Message},
};
use yagura_server::infrastructure::dto::websocket::{InboundFrame, OutboundFrame};
use yagura_shared::time::get_unix_timestamp_millis;

use crate::{
    agent::run_agent_session,
    config::{ClientConfig, PeerRole},
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type WsWriter = SplitSink<WsStream, Message>;
pub type WsReader = SplitStream<WsStream>;

/// Convert a close frame from the relay into an error
pub fn close_error(frame: Option<CloseFrame>) -> ClientError {
    match frame {
        Some(frame) => ClientError::Closed {
            code: u16::from(frame.code),
            reason: frame.reason.as_str().to_string(),
        },
        None => ClientError::ConnectionError("Server closed the connection".to_string()),
    }
}

/// Run the WebSocket client session
///
/// Connects, sends the Authorize frame and then runs the role-specific loop.
pub async fn run_client_session(
    config: &ClientConfig,
    started_at: Instant,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(config.url.as_str())
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to relay as {}", config.role.label());

    let (mut write, read) = ws_stream.split();

    let authorize = InboundFrame::authorize(config.role.origin(), &config.token)
        .to_json()
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    write
        .send(Message::Text(authorize.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    match config.role {
        PeerRole::Dashboard => run_dashboard_session(write, read).await,
        PeerRole::Agent => run_agent_session(write, read, config.interval, started_at).await,
    }
}

/// Run the dashboard side of a session: print relayed frames, send typed lines as commands
async fn run_dashboard_session(mut write: WsWriter, mut read: WsReader) -> Result<(), ClientError> {
    let label = PeerRole::Dashboard.label();

    println!("\nType a command and press Enter to send it to the agent. Press Ctrl+C to exit.\n");

    // Spawn a task to handle incoming messages
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let now = get_unix_timestamp_millis();
                    let formatted = match serde_json::from_str::<OutboundFrame>(text.as_str()) {
                        Ok(OutboundFrame::Data(data)) => {
                            MessageFormatter::format_data(&data.usage, now)
                        }
                        Ok(OutboundFrame::ConsoleMessage(console)) => {
                            MessageFormatter::format_console_message(&console.text, now)
                        }
                        _ => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(label);
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!("Server closed the connection");
                    return Err(close_error(frame));
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
                _ => {}
            }
        }

        Err(ClientError::ConnectionError("Connection lost".to_string()))
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", label);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to handle stdin input and send to WebSocket
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let json = match InboundFrame::command(&line).to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize command: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send command: {}", e);
                return Err(ClientError::ConnectionError(e.to_string()));
            }

            let formatted =
                MessageFormatter::format_sent_confirmation(&line, get_unix_timestamp_millis());
            print!("{}", formatted);
            redisplay_prompt(label);
        }

        // Input closed by the user
        write.close().await.ok();
        Ok(())
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            read_result.unwrap_or_else(|e| Err(ClientError::ConnectionError(e.to_string())))
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result.unwrap_or_else(|e| Err(ClientError::ConnectionError(e.to_string())))
        }
    }
}
