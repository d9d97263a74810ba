//! Conversion logic between DTOs and domain types.

use crate::domain::{RelayMessage, Role};
use crate::infrastructure::dto::websocket as dto;

/// What a decoded inbound frame asks the relay to do.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundAction {
    /// Authorize the connection with the given role
    Authorize { role: Role, token: Option<String> },
    /// Forward a message to the counterpart peers
    Relay(RelayMessage),
}

// ========================================
// DTO → Domain
// ========================================

impl From<dto::Inbound> for InboundAction {
    fn from(inbound: dto::Inbound) -> Self {
        match inbound {
            dto::Inbound::Agent(dto::AgentInbound::Authorize(data)) => InboundAction::Authorize {
                role: Role::Agent,
                token: data.token,
            },
            dto::Inbound::Agent(dto::AgentInbound::Data(data)) => {
                InboundAction::Relay(RelayMessage::Data { usage: data.usage })
            }
            dto::Inbound::Agent(dto::AgentInbound::ConsoleMessage(data)) => {
                InboundAction::Relay(RelayMessage::ConsoleMessage { text: data.text })
            }
            dto::Inbound::Dashboard(dto::DashboardInbound::Authorize(data)) => {
                InboundAction::Authorize {
                    role: Role::Dashboard,
                    token: data.token,
                }
            }
            dto::Inbound::Dashboard(dto::DashboardInbound::Command(data)) => {
                InboundAction::Relay(RelayMessage::Command { text: data.text })
            }
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&RelayMessage> for dto::OutboundFrame {
    fn from(message: &RelayMessage) -> Self {
        match message {
            RelayMessage::Data { usage } => dto::OutboundFrame::Data(dto::UsageData {
                usage: usage.clone(),
            }),
            RelayMessage::ConsoleMessage { text } => {
                dto::OutboundFrame::ConsoleMessage(dto::TextData { text: text.clone() })
            }
            RelayMessage::Command { text } => {
                dto::OutboundFrame::Command(dto::TextData { text: text.clone() })
            }
        }
    }
}
