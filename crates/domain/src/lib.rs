//! 聊天大厅核心领域模型
//!
//! 包含参与者、消息两个实体，输入清洗规则，以及按请求者过滤消息的可见性策略。

pub mod errors;
pub mod message;
pub mod participant;
pub mod sanitize;
pub mod value_objects;
pub mod visibility;

// 重新导出常用类型
pub use errors::*;
pub use message::{Message, MessageKind};
pub use participant::{stale_cutoff, Participant};
pub use value_objects::*;
pub use visibility::visible_messages;
