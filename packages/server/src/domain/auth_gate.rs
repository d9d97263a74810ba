//! 認可期限と Authorize の競合を解決する一回限りのゲート
//!
//! タイマーと Authorize 処理のどちらか一方だけが勝ちます。
//! 認可処理は `try_authorize`、タイマーや認可失敗は `try_close` を呼び、
//! `true` が返った側だけが処理を続行できます。

use std::sync::atomic::{AtomicU8, Ordering};

const PENDING: u8 = 0;
const AUTHORIZED: u8 = 1;
const CLOSED: u8 = 2;

/// ゲートの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Authorized,
    Closed,
}

#[derive(Debug, Default)]
pub struct AuthGate {
    state: AtomicU8,
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
        }
    }

    /// 認可を確定する。既にタイムアウトまたは拒否済みなら `false`
    pub fn try_authorize(&self) -> bool {
        self.transition(AUTHORIZED)
    }

    /// 接続を閉じる側に確定する。既に認可済みまたは閉鎖済みなら `false`
    pub fn try_close(&self) -> bool {
        self.transition(CLOSED)
    }

    pub fn state(&self) -> GateState {
        match self.state.load(Ordering::Acquire) {
            PENDING => GateState::Pending,
            AUTHORIZED => GateState::Authorized,
            _ => GateState::Closed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == GateState::Pending
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
