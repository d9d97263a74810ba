//! RoomRegistry trait 定義
//!
//! ルームのメンバー構成を変更できるのはこのレジストリだけです。
//! 同じルームに対する join / leave / route は互いに排他的に実行され、
//! Start / Stop / 追い出しの通知も同じクリティカルセクション内で送られます。

use async_trait::async_trait;

use super::{
    entity::{Member, RelayMessage, Room},
    value_object::{ConnectionId, RoomId},
};

#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// メンバーをルームに追加（ルームがなければ作成）
    async fn join(&self, room_id: RoomId, member: Member);

    /// メンバーをルームから削除し、削除されたメンバーを返す
    ///
    /// 既に削除済みの接続に対しては何もせず `None` を返す。
    async fn leave(&self, room_id: RoomId, connection_id: &ConnectionId) -> Option<Member>;

    /// メッセージを送信者の反対側のロールへ転送し、届けた数を返す
    async fn route(&self, room_id: RoomId, message: &RelayMessage) -> usize;

    /// ルームの現在の状態を取得
    async fn snapshot(&self, room_id: RoomId) -> Option<Room>;

    /// 存在するルームの数
    async fn room_count(&self) -> usize;
}
