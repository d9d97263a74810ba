//! Agent simulator.
//!
//! Start を受け取ってから Stop を受け取るまで、一定間隔でテレメトリを送信します。
//! Command を受け取ると、その内容を ConsoleMessage として送り返します。

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::protocol::Message;
use yagura_server::infrastructure::dto::websocket::{InboundFrame, OutboundFrame};

use crate::{
    error::ClientError,
    session::{WsReader, WsWriter, close_error},
};

/// Telemetry generator for agent mode
#[derive(Debug)]
pub struct Telemetry {
    started_at: Instant,
    ticks: u64,
}

impl Telemetry {
    pub fn new(started_at: Instant) -> Self {
        Self {
            started_at,
            ticks: 0,
        }
    }

    /// Produce the next usage payload
    pub fn sample(&mut self) -> Value {
        self.ticks += 1;
        json!({
            "uptime_secs": self.started_at.elapsed().as_secs(),
            "tick": self.ticks,
        })
    }
}

/// コマンドに対する応答テキスト
pub fn command_echo(command: &str) -> String {
    format!("> {}", command)
}

async fn send_frame(write: &mut WsWriter, frame: InboundFrame) -> Result<(), ClientError> {
    let json = frame
        .to_json()
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}

/// Run the agent side of an authorized session
pub async fn run_agent_session(
    mut write: WsWriter,
    mut read: WsReader,
    interval: Duration,
    started_at: Instant,
) -> Result<(), ClientError> {
    let mut telemetry = Telemetry::new(started_at);
    let mut ticker = tokio::time::interval(interval);
    let mut streaming = false;

    println!("\nAgent is connected. Waiting for a dashboard. Press Ctrl+C to exit.\n");

    loop {
        tokio::select! {
            message = read.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => return Err(close_error(frame)),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(ClientError::ConnectionError(e.to_string())),
                    None => {
                        return Err(ClientError::ConnectionError("Connection lost".to_string()));
                    }
                };

                match serde_json::from_str::<OutboundFrame>(text.as_str()) {
                    Ok(OutboundFrame::Start) => {
                        tracing::info!("Dashboard attached, streaming telemetry every {:?}", interval);
                        streaming = true;
                        ticker.reset();
                    }
                    Ok(OutboundFrame::Stop) => {
                        tracing::info!("No dashboards left, telemetry paused");
                        streaming = false;
                    }
                    Ok(OutboundFrame::Command(command)) => {
                        tracing::info!("Command received: {}", command.text);
                        send_frame(&mut write, InboundFrame::console_message(&command_echo(&command.text)))
                            .await?;
                    }
                    Ok(other) => tracing::debug!("Ignoring {:?}", other),
                    Err(e) => tracing::warn!("Failed to parse frame: {}", e),
                }
            }
            _ = ticker.tick(), if streaming => {
                send_frame(&mut write, InboundFrame::data(telemetry.sample())).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                write.close().await.ok();
                return Ok(());
            }
        }
    }
}
