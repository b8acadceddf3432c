use std::sync::Arc;

use domain::{
    visible_messages, DomainError, Message, MessageId, MessageKind, MessageText, ParticipantName,
    Recipient,
};

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{MessageRepository, ParticipantRepository},
};

#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub from: String, // 来自 User 请求头
    pub to: String,
    pub text: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListMessagesRequest {
    pub requester: Option<String>, // 为空时按匿名读取
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DeleteMessageRequest {
    pub id: MessageId,
    pub requester: String,
}

pub struct MessageServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

/// 消息日志：发送、按请求者过滤读取、发送者本人删除。
pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn send(&self, request: SendMessageRequest) -> Result<Message, ApplicationError> {
        let from = ParticipantName::parse(&request.from)?;
        let to = Recipient::parse(&request.to)?;
        let text = MessageText::parse(&request.text)?;
        let kind = MessageKind::parse(&request.kind)?;

        let now = self.deps.clock.now();
        let message = Message::chat(MessageId::generate(), from, to, text, kind, now)?;

        self.deps
            .participant_repository
            .find_by_name(&message.from)
            .await?
            .ok_or(DomainError::SenderNotActive)?;

        let stored = self.deps.message_repository.insert(message).await?;
        tracing::debug!(
            message_id = %stored.id,
            from = %stored.from,
            to = %stored.to,
            kind = stored.kind.as_str(),
            "消息已发送"
        );
        Ok(stored)
    }

    pub async fn list(&self, request: ListMessagesRequest) -> Result<Vec<Message>, ApplicationError> {
        // 请求头无法解析成合法昵称时按匿名处理
        let requester = request
            .requester
            .as_deref()
            .and_then(|raw| ParticipantName::parse(raw).ok());

        let messages = self.deps.message_repository.list_all().await?;
        Ok(visible_messages(messages, requester.as_ref(), request.limit))
    }

    pub async fn delete(&self, request: DeleteMessageRequest) -> Result<(), ApplicationError> {
        let requester = ParticipantName::parse(&request.requester)?;

        let message = self
            .deps
            .message_repository
            .find_by_id(request.id)
            .await?
            .ok_or(DomainError::MessageNotFound)?;

        if !message.is_owned_by(&requester) {
            return Err(DomainError::NotMessageOwner.into());
        }

        let deleted = self.deps.message_repository.delete(request.id).await?;
        if !deleted {
            return Err(DomainError::MessageNotFound.into());
        }

        tracing::info!(message_id = %request.id, requester = %requester, "消息已删除");
        Ok(())
    }
}
