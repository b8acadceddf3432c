//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的在线状态与消息服务。

mod error;
mod routes;
mod state;

pub use error::{ApiError, ErrorBody};
pub use routes::{router, USER_HEADER};
pub use state::AppState;
