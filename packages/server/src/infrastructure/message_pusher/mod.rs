//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: 接続ごとの書き込みタスクへのチャンネルを使った実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
