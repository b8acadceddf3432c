use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{
    clock_time, MessageId, MessageText, ParticipantName, Recipient, Timestamp,
};

/// 消息类型，序列化值与已有存储保持一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// 系统生成的进入/离开通知
    #[serde(rename = "status")]
    Status,
    /// 公开聊天
    #[serde(rename = "message", alias = "broadcast")]
    Broadcast,
    /// 私聊
    #[serde(rename = "private_message", alias = "direct")]
    Direct,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Broadcast => "message",
            Self::Direct => "private_message",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "status" => Ok(Self::Status),
            "message" | "broadcast" => Ok(Self::Broadcast),
            "private_message" | "direct" => Ok(Self::Direct),
            other => Err(DomainError::invalid_argument(
                "type",
                format!("unknown message type '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub from: ParticipantName,
    pub to: Recipient,
    pub text: MessageText,
    pub kind: MessageKind,
    /// 展示用时间 `HH:MM:SS`
    pub time: String,
    /// 写入时刻，存储按它维持插入顺序
    pub created_at: Timestamp,
}

impl Message {
    /// 用户发送的聊天消息，只允许公开或私聊两种类型。
    pub fn chat(
        id: MessageId,
        from: ParticipantName,
        to: Recipient,
        text: MessageText,
        kind: MessageKind,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if kind == MessageKind::Status {
            return Err(DomainError::invalid_argument(
                "type",
                "status messages are system generated",
            ));
        }
        Ok(Self {
            id,
            from,
            to,
            text,
            kind,
            time: clock_time(now),
            created_at: now,
        })
    }

    pub fn entered(id: MessageId, name: ParticipantName, now: Timestamp) -> Self {
        let text = MessageText::system(format!("{name} has entered"));
        Self::status(id, name, text, now)
    }

    pub fn left(id: MessageId, name: ParticipantName, now: Timestamp) -> Self {
        let text = MessageText::system(format!("{name} has left"));
        Self::status(id, name, text, now)
    }

    fn status(id: MessageId, from: ParticipantName, text: MessageText, now: Timestamp) -> Self {
        Self {
            id,
            from,
            to: Recipient::Everyone,
            text,
            kind: MessageKind::Status,
            time: clock_time(now),
            created_at: now,
        }
    }

    /// 单条消息对请求者是否可见；`requester` 为 `None` 表示匿名读取。
    pub fn is_visible_to(&self, requester: Option<&ParticipantName>) -> bool {
        if requester.is_some_and(|name| self.is_owned_by(name)) {
            return true;
        }
        match self.kind {
            MessageKind::Broadcast | MessageKind::Status => true,
            MessageKind::Direct => {
                self.to.is_everyone() || requester.is_some_and(|name| self.to.is(name))
            }
        }
    }

    pub fn is_owned_by(&self, requester: &ParticipantName) -> bool {
        &self.from == requester
    }
}
