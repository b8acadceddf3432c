//! 基础设施层实现。
//!
//! 提供 PostgreSQL 仓储与数据库迁移，实现应用层定义的存储接口。

pub mod builder;
pub mod migrations;
pub mod repository;

pub use builder::{Infrastructure, InfrastructureConfig, InfrastructureError};
pub use migrations::MIGRATOR;
pub use repository::{create_pg_pool, PgMessageRepository, PgParticipantRepository, PgStorage};
