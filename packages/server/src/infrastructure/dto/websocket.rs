//! WebSocket wire format.
//!
//! Inbound frames (peer → relay):
//!
//! ```json
//! { "from": "server" | "client", "intent": "<string>", "data": { ... } }
//! ```
//!
//! Outbound frames (relay → peer):
//!
//! ```json
//! { "intent": "<string>", "data": { ... } }
//! ```
//!
//! Inbound frames are decoded in two steps: the loose envelope first, then a
//! typed per-role message. Anything that does not match a known shape is
//! rejected with `None` and dropped by the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Sender side of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The game-server agent
    Server,
    /// The dashboard viewer
    Client,
}

/// Intent names used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Authorize,
    Data,
    ConsoleMessage,
    Command,
    Start,
    Stop,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Authorize => "Authorize",
            Intent::Data => "Data",
            Intent::ConsoleMessage => "ConsoleMessage",
            Intent::Command => "Command",
            Intent::Start => "Start",
            Intent::Stop => "Stop",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Authorize" => Some(Intent::Authorize),
            "Data" => Some(Intent::Data),
            "ConsoleMessage" => Some(Intent::ConsoleMessage),
            "Command" => Some(Intent::Command),
            "Start" => Some(Intent::Start),
            "Stop" => Some(Intent::Stop),
            _ => None,
        }
    }
}

/// Loose inbound envelope, as sent by peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub from: Origin,
    pub intent: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl InboundFrame {
    pub fn authorize(from: Origin, token: &str) -> Self {
        Self::new(from, Intent::Authorize, json!({ "token": token }))
    }

    pub fn data(usage: Value) -> Self {
        Self::new(Origin::Server, Intent::Data, json!({ "usage": usage }))
    }

    pub fn console_message(text: &str) -> Self {
        Self::new(Origin::Server, Intent::ConsoleMessage, json!({ "text": text }))
    }

    pub fn command(text: &str) -> Self {
        Self::new(Origin::Client, Intent::Command, json!({ "text": text }))
    }

    fn new(from: Origin, intent: Intent, data: Value) -> Self {
        Self {
            from,
            intent: intent.as_str().to_string(),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode the typed message carried by this envelope.
    ///
    /// Returns `None` for unknown intents, intents that the sender side never
    /// sends, and payloads missing their required field.
    pub fn decode(&self) -> Option<Inbound> {
        let intent = Intent::parse(&self.intent)?;
        match self.from {
            Origin::Server => {
                let message = match intent {
                    Intent::Authorize => AgentInbound::Authorize(self.authorize_data()),
                    Intent::Data => AgentInbound::Data(self.usage_data()?),
                    Intent::ConsoleMessage => AgentInbound::ConsoleMessage(self.text_data()?),
                    _ => return None,
                };
                Some(Inbound::Agent(message))
            }
            Origin::Client => {
                let message = match intent {
                    Intent::Authorize => DashboardInbound::Authorize(self.authorize_data()),
                    Intent::Command => DashboardInbound::Command(self.text_data()?),
                    _ => return None,
                };
                Some(Inbound::Dashboard(message))
            }
        }
    }

    fn authorize_data(&self) -> AuthorizeData {
        // A token that is missing or not a string counts as "no token".
        AuthorizeData {
            token: self
                .data
                .get("token")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }

    fn usage_data(&self) -> Option<UsageData> {
        match self.data.get("usage") {
            None | Some(Value::Null) => None,
            Some(usage) => Some(UsageData {
                usage: usage.clone(),
            }),
        }
    }

    fn text_data(&self) -> Option<TextData> {
        let text = self.data.get("text")?.as_str()?;
        Some(TextData {
            text: text.to_string(),
        })
    }
}

/// Parse a raw text frame into a typed inbound message.
pub fn decode_inbound(raw: &str) -> Option<Inbound> {
    serde_json::from_str::<InboundFrame>(raw).ok()?.decode()
}

/// Typed inbound message, split by sender role.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Agent(AgentInbound),
    Dashboard(DashboardInbound),
}

/// Messages an agent may send.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentInbound {
    Authorize(AuthorizeData),
    Data(UsageData),
    ConsoleMessage(TextData),
}

/// Messages a dashboard may send.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardInbound {
    Authorize(AuthorizeData),
    Command(TextData),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizeData {
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageData {
    pub usage: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

/// Frame sent by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "data")]
pub enum OutboundFrame {
    /// Ask the agent to begin emitting telemetry
    Start,
    /// Ask the agent to stop emitting telemetry
    Stop,
    /// Command relayed from a dashboard
    Command(TextData),
    /// Telemetry relayed from the agent
    Data(UsageData),
    /// Console output relayed from the agent
    ConsoleMessage(TextData),
}

impl OutboundFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
