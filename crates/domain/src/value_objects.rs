use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::DomainError;
use crate::sanitize::strip_markup;

/// 统一的时间戳类型。
pub type Timestamp = OffsetDateTime;

/// 广播接收者在存储与接口中的固定写法。
pub const BROADCAST_TOKEN: &str = "Todos";

const EVERYONE_ALIAS: &str = "everyone";
const MAX_NAME_LEN: usize = 50;
const MAX_TEXT_LEN: usize = 2000;

/// 格式化为展示用的 `HH:MM:SS`。
pub fn clock_time(at: Timestamp) -> String {
    format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second())
}

/// 消息唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<MessageId> for Uuid {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

/// 经过清洗的参与者昵称，同时也是参与者的主键。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantName(String);

impl ParticipantName {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let value = strip_markup(value.as_ref());
        if value.is_empty() {
            return Err(DomainError::invalid_argument("name", "cannot be empty"));
        }
        if value.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::invalid_argument("name", "too long"));
        }
        // 广播写法保留给 Recipient::Everyone，否则发给该参与者的私聊会对所有人可见
        if is_broadcast_alias(&value) {
            return Err(DomainError::invalid_argument("name", "reserved for broadcast"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_broadcast_alias(value: &str) -> bool {
    value == BROADCAST_TOKEN || value.eq_ignore_ascii_case(EVERYONE_ALIAS)
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 消息接收者：所有人，或某个具体参与者。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Recipient {
    Everyone,
    Participant(ParticipantName),
}

impl Recipient {
    /// `Todos` 与 `everyone`（不区分大小写）都视为广播。
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let value = strip_markup(value.as_ref());
        if value.is_empty() {
            return Err(DomainError::invalid_argument("to", "cannot be empty"));
        }
        if is_broadcast_alias(&value) {
            return Ok(Self::Everyone);
        }
        ParticipantName::parse(&value)
            .map(Self::Participant)
            .map_err(|_| DomainError::invalid_argument("to", "not a valid participant name"))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Everyone => BROADCAST_TOKEN,
            Self::Participant(name) => name.as_str(),
        }
    }

    pub fn is_everyone(&self) -> bool {
        matches!(self, Self::Everyone)
    }

    pub fn is(&self, name: &ParticipantName) -> bool {
        matches!(self, Self::Participant(target) if target == name)
    }
}

impl TryFrom<String> for Recipient {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Recipient> for String {
    fn from(value: Recipient) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 消息正文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageText(String);

impl MessageText {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let value = strip_markup(value.as_ref());
        if value.is_empty() {
            return Err(DomainError::invalid_argument("text", "cannot be empty"));
        }
        if value.chars().count() > MAX_TEXT_LEN {
            return Err(DomainError::invalid_argument("text", "too long"));
        }
        Ok(Self(value))
    }

    /// 系统生成的正文，不经过清洗。
    pub(crate) fn system(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
