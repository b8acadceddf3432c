//! 应用层实现。
//!
//! 围绕参与者与消息两个实体提供用例服务（在线状态、消息日志），
//! 以及对外部适配器（时钟、存储）的抽象和定时清理任务。

pub mod clock;
pub mod dto;
pub mod error;
pub mod repository;
pub mod services;
pub mod sweeper;

pub use clock::{Clock, SystemClock};
pub use dto::{MessageDto, ParticipantDto};
pub use error::ApplicationError;
pub use repository::{MessageRepository, ParticipantRepository};
pub use services::{
    MessageService, MessageServiceDependencies, PresenceService, PresenceServiceDependencies,
};
pub use sweeper::{PresenceSweeper, SweeperConfig, SweeperHandle};
