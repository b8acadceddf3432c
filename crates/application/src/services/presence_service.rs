use std::sync::Arc;

use config::WriteMode;
use domain::{
    stale_cutoff, DomainError, Message, MessageId, Participant, ParticipantName, RepositoryError,
    Timestamp,
};
use time::Duration;

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{MessageRepository, ParticipantRepository},
};

pub struct PresenceServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
    /// 进入/离开通知的写入方式，参与者本身的写入总是等待完成
    pub notice_write: WriteMode,
}

/// 在线状态管理：加入、心跳、超时清理，并在进入/离开时写入系统通知。
///
/// 状态只保存在存储中，服务本身不缓存任何查询结果。
pub struct PresenceService {
    deps: PresenceServiceDependencies,
}

impl PresenceService {
    pub fn new(deps: PresenceServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn join(&self, name: &str) -> Result<Participant, ApplicationError> {
        let name = ParticipantName::parse(name)?;

        if self
            .deps
            .participant_repository
            .find_by_name(&name)
            .await?
            .is_some()
        {
            return Err(DomainError::ParticipantAlreadyExists.into());
        }

        let now = self.deps.clock.now();
        // 并发加入时以存储的唯一约束为准
        let participant = self
            .deps
            .participant_repository
            .insert(Participant::join(name, now))
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationError::from(DomainError::ParticipantAlreadyExists)
                }
                other => ApplicationError::from(other),
            })?;

        // 参与者已写入，通知写入失败不回滚也不报错，否则重试只会得到冲突
        let notice = Message::entered(MessageId::generate(), participant.name.clone(), now);
        if let Err(err) = self.write_notice(notice).await {
            tracing::warn!(participant = %participant.name, error = %err, "写入进入通知失败");
        }

        tracing::info!(participant = %participant.name, "参与者加入");
        Ok(participant)
    }

    pub async fn heartbeat(&self, name: &str) -> Result<(), ApplicationError> {
        let name = ParticipantName::parse(name)?;
        let now = self.deps.clock.now();

        let refreshed = self
            .deps
            .participant_repository
            .touch(&name, now)
            .await?;
        if !refreshed {
            return Err(DomainError::ParticipantNotFound.into());
        }

        tracing::debug!(participant = %name, "心跳刷新");
        Ok(())
    }

    pub async fn list_active(&self) -> Result<Vec<Participant>, ApplicationError> {
        Ok(self.deps.participant_repository.list().await?)
    }

    /// 清理 `last_status < now - stale_after` 的参与者，返回被清理的名字。
    ///
    /// 每个参与者独立处理：单个删除或通知写入失败只记录日志，不影响其余参与者。
    pub async fn sweep(
        &self,
        now: Timestamp,
        stale_after: Duration,
    ) -> Result<Vec<ParticipantName>, ApplicationError> {
        let cutoff = stale_cutoff(now, stale_after);
        let stale = self
            .deps
            .participant_repository
            .list_stale(cutoff)
            .await?;

        let mut evicted = Vec::with_capacity(stale.len());
        for participant in stale {
            let name = participant.name;
            match self
                .deps
                .participant_repository
                .remove_stale(&name, cutoff)
                .await
            {
                Ok(true) => {}
                // 期间已刷新心跳或被其他清理者删除
                Ok(false) => continue,
                Err(err) => {
                    tracing::warn!(participant = %name, error = %err, "清理参与者失败");
                    continue;
                }
            }

            let notice = Message::left(MessageId::generate(), name.clone(), now);
            if let Err(err) = self.write_notice(notice).await {
                tracing::warn!(participant = %name, error = %err, "写入离开通知失败");
            }

            tracing::info!(participant = %name, "参与者超时离开");
            evicted.push(name);
        }

        Ok(evicted)
    }

    async fn write_notice(&self, notice: Message) -> Result<(), ApplicationError> {
        match self.deps.notice_write {
            WriteMode::Awaited => {
                self.deps.message_repository.insert(notice).await?;
            }
            WriteMode::Detached => {
                let repository = Arc::clone(&self.deps.message_repository);
                tokio::spawn(async move {
                    let from = notice.from.clone();
                    if let Err(err) = repository.insert(notice).await {
                        tracing::warn!(participant = %from, error = %err, "后台写入状态通知失败");
                    }
                });
            }
        }
        Ok(())
    }
}
