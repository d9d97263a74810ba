//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! ルーム ID からルームへの HashMap を単一の Mutex で保護します。
//!
//! ## 排他制御
//!
//! join / leave / route はすべてこの Mutex を保持したまま、
//! ドメインモデルの状態遷移と通知（Start / Stop / 追い出し / 転送）を行います。
//! これにより、削除途中の接続へのルーティングやメンバー更新の消失が起きません。
//!
//! ロックの取得順序は常に「ルームマップ → MessagePusher」です。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, Member, MessagePusher, RelayMessage, Role, Room, RoomId, RoomRegistry,
        router,
    },
    infrastructure::dto::websocket::OutboundFrame,
};

/// インメモリ Room Registry 実装
pub struct InMemoryRoomRegistry {
    /// ルーム ID → ルーム
    rooms: Mutex<HashMap<RoomId, Room>>,
    /// 通知の送信先
    message_pusher: Arc<dyn MessagePusher>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            message_pusher,
        }
    }

    /// Agent に制御フレーム（Start / Stop）を送信
    async fn signal_agent(&self, agent_id: &ConnectionId, frame: OutboundFrame) {
        let json = match frame.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize {:?} frame: {}", frame, e);
                return;
            }
        };

        if let Err(e) = self.message_pusher.push_to(agent_id, &json).await {
            tracing::warn!("Failed to send {:?} to agent '{}': {}", frame, agent_id, e);
        } else {
            tracing::debug!("Sent {:?} to agent '{}'", frame, agent_id);
        }
    }
}

/// ルームマップの状態をログに出力
fn log_room_map(rooms: &HashMap<RoomId, Room>) {
    let mut summary: Vec<String> = rooms
        .values()
        .map(|room| {
            let agent = match room.agent() {
                Some(agent) => format!("{}@{}", agent.id, agent.joined_at.value()),
                None => "none".to_string(),
            };
            format!(
                "{}: agent={} dashboards={}",
                room.id,
                agent,
                room.dashboards().count()
            )
        })
        .collect();
    summary.sort();
    tracing::debug!("Room map ({} rooms): [{}]", rooms.len(), summary.join(", "));
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(&self, room_id: RoomId, member: Member) {
        let mut rooms = self.rooms.lock().await;
        let member_id = member.id.clone();
        let member_role = member.role;

        let admission = match rooms.get_mut(&room_id) {
            Some(room) => room.admit(member),
            None => {
                rooms.insert(room_id, Room::new(room_id, member));
                tracing::info!("Room {} created", room_id);
                Default::default()
            }
        };

        if let Some(evicted) = admission.evicted {
            tracing::info!(
                "Agent '{}' evicted from room {} by newer agent '{}'",
                evicted.id,
                room_id,
                member_id
            );
            self.message_pusher.terminate(&evicted.id).await;
        }

        if let Some(agent_id) = admission.start_for {
            self.signal_agent(&agent_id, OutboundFrame::Start).await;
        }

        tracing::info!(
            "Connection '{}' ({}) joined room {}",
            member_id,
            member_role,
            room_id
        );
        log_room_map(&rooms);
    }

    async fn leave(&self, room_id: RoomId, connection_id: &ConnectionId) -> Option<Member> {
        let mut rooms = self.rooms.lock().await;

        let room = rooms.get_mut(&room_id)?;
        let departure = room.remove(connection_id)?;

        if room.is_empty() {
            rooms.remove(&room_id);
            tracing::info!("Room {} deleted (no members left)", room_id);
        } else if let Some(agent_id) = &departure.stop_for {
            self.signal_agent(agent_id, OutboundFrame::Stop).await;
        }

        tracing::info!(
            "Connection '{}' ({}) left room {}",
            departure.member.id,
            departure.member.role,
            room_id
        );
        log_room_map(&rooms);

        Some(departure.member)
    }

    async fn route(&self, room_id: RoomId, message: &RelayMessage) -> usize {
        let rooms = self.rooms.lock().await;

        let Some(room) = rooms.get(&room_id) else {
            tracing::debug!("Room {} not found, dropping {}", room_id, message.intent());
            return 0;
        };

        let targets = router::message_targets(room, message);
        if targets.is_empty() {
            let missing = match message.sender_role() {
                Role::Agent => "no dashboard",
                Role::Dashboard => "no agent",
            };
            tracing::debug!(
                "Dropping {} in room {}: {} connected",
                message.intent(),
                room_id,
                missing
            );
            return 0;
        }

        let json = match OutboundFrame::from(message).to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize {} frame: {}", message.intent(), e);
                return 0;
            }
        };

        let delivered = self.message_pusher.broadcast(&targets, &json).await;
        tracing::debug!(
            "Routed {} in room {} to {}/{} connections",
            message.intent(),
            room_id,
            delivered,
            targets.len()
        );
        delivered
    }

    async fn snapshot(&self, room_id: RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(&room_id).cloned()
    }

    async fn room_count(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}
