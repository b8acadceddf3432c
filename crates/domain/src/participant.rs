use time::Duration;

use crate::value_objects::{ParticipantName, Timestamp};

/// 当前在线的参与者。
///
/// 生命周期：加入时创建，心跳刷新 `last_status`，超时后由清理任务删除。
/// 被清理后再次加入视为一个全新的参与者。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub name: ParticipantName,
    pub last_status: Timestamp,
}

impl Participant {
    pub fn join(name: ParticipantName, now: Timestamp) -> Self {
        Self {
            name,
            last_status: now,
        }
    }

    pub fn refresh(&mut self, now: Timestamp) {
        self.last_status = now;
    }

    /// 判定是否超时；恰好等于截止时刻时仍视为活跃。
    pub fn is_stale(&self, cutoff: Timestamp) -> bool {
        self.last_status < cutoff
    }
}

/// `last_status` 早于该时刻的参与者会被清理。
pub fn stale_cutoff(now: Timestamp, stale_after: Duration) -> Timestamp {
    now - stale_after
}
