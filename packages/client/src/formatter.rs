//! Message formatting utilities for client display.

use serde_json::Value;
use yagura_shared::time::timestamp_to_local_clock;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a telemetry frame
    ///
    /// # Arguments
    ///
    /// * `usage` - The usage payload relayed from the agent
    /// * `received_at` - Unix timestamp when the frame arrived (milliseconds)
    pub fn format_data(usage: &Value, received_at: i64) -> String {
        let fields = match usage {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        };
        format!(
            "\n[{}] usage {}\n",
            timestamp_to_local_clock(received_at),
            fields
        )
    }

    /// Format console output relayed from the agent
    pub fn format_console_message(text: &str, received_at: i64) -> String {
        format!("\n[{}] console: {}\n", timestamp_to_local_clock(received_at), text)
    }

    /// Format a confirmation message after sending a command
    pub fn format_sent_confirmation(command: &str, sent_at: i64) -> String {
        format!("sent '{}' at {}\n", command, timestamp_to_local_clock(sent_at))
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
