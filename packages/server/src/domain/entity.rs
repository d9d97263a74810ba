//! エンティティ定義
//!
//! ルームとそのメンバー、認可済み接続（Session）、転送対象メッセージを表します。
//! ルームの状態遷移は副作用を持たず、必要な通知（Start / Stop / 退去）を
//! 戻り値として呼び出し側（RoomRegistry 実装）に返します。

use serde_json::Value;

use super::value_object::{ConnectionId, Role, RoomId, Timestamp};

/// ルームのメンバー
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: ConnectionId,
    pub role: Role,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(id: ConnectionId, role: Role, joined_at: Timestamp) -> Self {
        Self {
            id,
            role,
            joined_at,
        }
    }
}

/// 認可済みの接続
///
/// ロールとルーム ID は認可時に一度だけ決まり、以後変化しません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub role: Role,
    pub room_id: RoomId,
}

/// join の結果として発生する通知
#[derive(Debug, Default, PartialEq)]
pub struct Admission {
    /// 新しい Agent によって追い出された以前の Agent
    pub evicted: Option<Member>,
    /// Start を送るべき Agent
    pub start_for: Option<ConnectionId>,
}

/// leave の結果として発生する通知
#[derive(Debug, PartialEq)]
pub struct Departure {
    /// 削除されたメンバー
    pub member: Member,
    /// Stop を送るべき Agent
    pub stop_for: Option<ConnectionId>,
}

/// ルーム
///
/// ## 不変条件
///
/// - メンバーが 1 人以上いる（空になったルームはレジストリから削除される）
/// - Agent は高々 1 人
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    /// 到着順のメンバー
    pub members: Vec<Member>,
}

impl Room {
    /// 最初のメンバーを 1 人含むルームを作成
    pub fn new(id: RoomId, first_member: Member) -> Self {
        Self {
            id,
            members: vec![first_member],
        }
    }

    /// メンバーを追加
    ///
    /// - Agent が既にいる状態で Agent が来た場合、以前の Agent を取り除く（後勝ち）
    /// - Dashboard がいるルームに Agent が来た場合、その Agent に Start を送る
    /// - Dashboard がいない状態で Dashboard が来た場合、Agent に Start を送る
    pub fn admit(&mut self, member: Member) -> Admission {
        let mut admission = Admission::default();

        match member.role {
            Role::Agent => {
                if let Some(position) = self.members.iter().position(|m| m.role == Role::Agent) {
                    admission.evicted = Some(self.members.remove(position));
                }
                if self.has_dashboard() {
                    admission.start_for = Some(member.id.clone());
                }
            }
            Role::Dashboard => {
                if !self.has_dashboard() {
                    admission.start_for = self.agent().map(|agent| agent.id.clone());
                }
            }
        }

        self.members.push(member);
        admission
    }

    /// メンバーを削除
    ///
    /// 該当するメンバーがいない場合は `None`（同じ接続の二重削除は何もしない）。
    /// 最後の Dashboard が抜けた場合、残っている Agent に Stop を送る。
    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<Departure> {
        let position = self.members.iter().position(|m| &m.id == connection_id)?;
        let member = self.members.remove(position);

        let stop_for = if member.role == Role::Dashboard && !self.has_dashboard() {
            self.agent().map(|agent| agent.id.clone())
        } else {
            None
        };

        Some(Departure { member, stop_for })
    }

    pub fn agent(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.role == Role::Agent)
    }

    pub fn dashboards(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.role == Role::Dashboard)
    }

    pub fn has_dashboard(&self) -> bool {
        self.dashboards().next().is_some()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.iter().any(|m| &m.id == connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// ピア間で転送されるメッセージ
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    /// Agent → Dashboard: 使用率テレメトリ
    Data { usage: Value },
    /// Agent → Dashboard: コンソール出力
    ConsoleMessage { text: String },
    /// Dashboard → Agent: リモートコマンド
    Command { text: String },
}

impl RelayMessage {
    /// このメッセージを送信できるロール
    pub fn sender_role(&self) -> Role {
        match self {
            RelayMessage::Data { .. } | RelayMessage::ConsoleMessage { .. } => Role::Agent,
            RelayMessage::Command { .. } => Role::Dashboard,
        }
    }

    pub fn intent(&self) -> &'static str {
        match self {
            RelayMessage::Data { .. } => "Data",
            RelayMessage::ConsoleMessage { .. } => "ConsoleMessage",
            RelayMessage::Command { .. } => "Command",
        }
    }
}
