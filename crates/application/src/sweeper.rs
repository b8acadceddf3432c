//! 在线状态定时清理任务
//!
//! 按固定周期调用 `PresenceService::sweep`，通过 `CancellationToken` 停止。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use domain::ParticipantName;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{clock::Clock, error::ApplicationError, services::PresenceService};

#[derive(Debug, Clone, Copy)]
pub struct SweeperConfig {
    /// 超过该时长没有心跳即清理
    pub stale_after: time::Duration,
    /// 执行周期
    pub period: StdDuration,
}

pub struct PresenceSweeper {
    presence: Arc<PresenceService>,
    clock: Arc<dyn Clock>,
    config: SweeperConfig,
}

impl PresenceSweeper {
    pub fn new(presence: Arc<PresenceService>, clock: Arc<dyn Clock>, config: SweeperConfig) -> Self {
        Self {
            presence,
            clock,
            config,
        }
    }

    /// 执行一轮清理
    pub async fn run_once(&self) -> Result<Vec<ParticipantName>, ApplicationError> {
        self.presence
            .sweep(self.clock.now(), self.config.stale_after)
            .await
    }

    /// 在后台启动周期任务
    pub fn spawn(self) -> SweeperHandle {
        let token = CancellationToken::new();
        let child = token.child_token();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                period_ms = self.config.period.as_millis() as u64,
                stale_after_secs = self.config.stale_after.whole_seconds(),
                "在线状态清理任务已启动"
            );

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        match self.run_once().await {
                            Ok(evicted) if !evicted.is_empty() => {
                                tracing::info!(
                                    count = evicted.len(),
                                    participants = ?evicted,
                                    "已清理超时参与者"
                                );
                            }
                            Ok(_) => {}
                            Err(err) => {
                                tracing::error!(error = %err, "在线状态清理失败");
                            }
                        }
                    }
                }
            }

            tracing::info!("在线状态清理任务已停止");
        });

        SweeperHandle { token, task }
    }
}

pub struct SweeperHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// 取消任务并等待其退出
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "清理任务异常退出");
        }
    }
}
