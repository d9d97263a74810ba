//! メッセージのルーティング規則
//!
//! 副作用を持たない関数で、メッセージを受け取るべきメンバーを決定します。
//!
//! - Agent からのメッセージ（Data / ConsoleMessage）は全ての Dashboard へ
//! - Dashboard からのメッセージ（Command）は Agent へ（いなければ破棄）
//!
//! 送信者と同じロールのメンバーには決して届きません。

use super::{
    entity::{RelayMessage, Room},
    value_object::{ConnectionId, Role},
};

/// 送信者のロールから転送先の接続 ID を決定
pub fn route_targets(room: &Room, from: Role) -> Vec<ConnectionId> {
    let to = from.counterpart();
    room.members
        .iter()
        .filter(|member| member.role == to)
        .map(|member| member.id.clone())
        .collect()
}

/// メッセージの転送先を決定
///
/// 送信ロールはメッセージの種類から決まります。
pub fn message_targets(room: &Room, message: &RelayMessage) -> Vec<ConnectionId> {
    route_targets(room, message.sender_role())
}
