//! 领域模型错误定义
//!
//! 区分业务规则错误（`DomainError`）与存储错误（`RepositoryError`）。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 输入校验失败（清洗后为空、超长、枚举值不合法等）
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 同名参与者仍处于活跃状态
    #[error("participant already exists")]
    ParticipantAlreadyExists,

    #[error("participant not found")]
    ParticipantNotFound,

    /// 发送者不在活跃参与者列表中
    #[error("sender is not an active participant")]
    SenderNotActive,

    #[error("message not found")]
    MessageNotFound,

    /// 只有消息发送者本人可以删除消息
    #[error("requester does not own the message")]
    NotMessageOwner,
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 存储层错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    /// 唯一约束冲突
    #[error("record already exists")]
    Conflict,
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
