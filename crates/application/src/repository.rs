use async_trait::async_trait;
use domain::{Message, MessageId, Participant, ParticipantName, RepositoryError, Timestamp};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    // 名称已被占用时返回 RepositoryError::Conflict，由存储保证唯一性
    async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError>;

    async fn find_by_name(
        &self,
        name: &ParticipantName,
    ) -> Result<Option<Participant>, RepositoryError>;

    // 顺序由存储决定
    async fn list(&self) -> Result<Vec<Participant>, RepositoryError>;

    // 刷新心跳时间，返回是否命中记录
    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> Result<bool, RepositoryError>;

    // last_status 早于 cutoff 的参与者
    async fn list_stale(&self, cutoff: Timestamp) -> Result<Vec<Participant>, RepositoryError>;

    // 仅当记录仍然超时才删除，避免误删刚刚发送心跳的参与者；返回是否删除
    async fn remove_stale(
        &self,
        name: &ParticipantName,
        cutoff: Timestamp,
    ) -> Result<bool, RepositoryError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: Message) -> Result<Message, RepositoryError>;

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    // 按插入顺序返回全部消息（最旧在前）
    async fn list_all(&self) -> Result<Vec<Message>, RepositoryError>;

    // 返回是否删除了记录
    async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError>;
}

/// 内存实现的存储（用于测试和本地开发）
pub mod memory {
    use std::collections::BTreeMap;

    use tokio::sync::RwLock;

    use super::*;

    #[derive(Default)]
    pub struct MemoryParticipantRepository {
        participants: RwLock<BTreeMap<ParticipantName, Participant>>,
    }

    impl MemoryParticipantRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ParticipantRepository for MemoryParticipantRepository {
        async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError> {
            // 检查与插入在同一把写锁内完成
            let mut participants = self.participants.write().await;
            if participants.contains_key(&participant.name) {
                return Err(RepositoryError::Conflict);
            }
            participants.insert(participant.name.clone(), participant.clone());
            Ok(participant)
        }

        async fn find_by_name(
            &self,
            name: &ParticipantName,
        ) -> Result<Option<Participant>, RepositoryError> {
            let participants = self.participants.read().await;
            Ok(participants.get(name).cloned())
        }

        async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
            let participants = self.participants.read().await;
            Ok(participants.values().cloned().collect())
        }

        async fn touch(
            &self,
            name: &ParticipantName,
            at: Timestamp,
        ) -> Result<bool, RepositoryError> {
            let mut participants = self.participants.write().await;
            match participants.get_mut(name) {
                Some(participant) => {
                    participant.refresh(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn list_stale(&self, cutoff: Timestamp) -> Result<Vec<Participant>, RepositoryError> {
            let participants = self.participants.read().await;
            Ok(participants
                .values()
                .filter(|participant| participant.is_stale(cutoff))
                .cloned()
                .collect())
        }

        async fn remove_stale(
            &self,
            name: &ParticipantName,
            cutoff: Timestamp,
        ) -> Result<bool, RepositoryError> {
            let mut participants = self.participants.write().await;
            let still_stale = participants
                .get(name)
                .is_some_and(|participant| participant.is_stale(cutoff));
            if still_stale {
                participants.remove(name);
            }
            Ok(still_stale)
        }
    }

    #[derive(Default)]
    pub struct MemoryMessageRepository {
        messages: RwLock<Vec<Message>>,
    }

    impl MemoryMessageRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl MessageRepository for MemoryMessageRepository {
        async fn insert(&self, message: Message) -> Result<Message, RepositoryError> {
            let mut messages = self.messages.write().await;
            if messages.iter().any(|existing| existing.id == message.id) {
                return Err(RepositoryError::Conflict);
            }
            messages.push(message.clone());
            Ok(message)
        }

        async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
            let messages = self.messages.read().await;
            Ok(messages.iter().find(|message| message.id == id).cloned())
        }

        async fn list_all(&self) -> Result<Vec<Message>, RepositoryError> {
            let messages = self.messages.read().await;
            Ok(messages.clone())
        }

        async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError> {
            let mut messages = self.messages.write().await;
            let before = messages.len();
            messages.retain(|message| message.id != id);
            Ok(messages.len() != before)
        }
    }
}
