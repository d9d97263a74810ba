//! ドメイン層
//!
//! 値オブジェクト、エンティティ、ルーティング規則、および外部協調者
//! （トークン解決・メッセージ送信・ルームレジストリ）のインターフェースを定義します。

pub mod auth_gate;
pub mod close_reason;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod value_object;

pub use auth_gate::{AuthGate, GateState};
pub use close_reason::CloseReason;
pub use entity::{Admission, Departure, Member, RelayMessage, Room, Session};
pub use error::{MessagePushError, ResolveError, ValueObjectError};
pub use message_pusher::{MessagePusher, Outbound, PusherChannel};
pub use registry::RoomRegistry;
pub use resolver::TokenResolver;
pub use value_object::{AuthToken, ConnectionId, ConnectionIdFactory, Role, RoomId, Timestamp};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use resolver::MockTokenResolver;
