//! 主应用程序入口
//!
//! 加载配置、连接存储、启动在线状态清理任务与 Axum Web 服务。

use std::{sync::Arc, time::Duration};

use application::{
    repository::memory::{MemoryMessageRepository, MemoryParticipantRepository},
    Clock, MessageRepository, MessageService, MessageServiceDependencies, ParticipantRepository,
    PresenceService, PresenceServiceDependencies, PresenceSweeper, SweeperConfig, SystemClock,
};
use config::{AppConfig, StorageBackend};
use infrastructure::{Infrastructure, InfrastructureConfig};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

type Repositories = (Arc<dyn ParticipantRepository>, Arc<dyn MessageRepository>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    tracing::info!(config = %config.sanitize(), "配置加载完成");

    let (participant_repository, message_repository) = connect_storage(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let presence_service = Arc::new(PresenceService::new(PresenceServiceDependencies {
        participant_repository: participant_repository.clone(),
        message_repository: message_repository.clone(),
        clock: clock.clone(),
        notice_write: config.presence.notice_write,
    }));
    let message_service = Arc::new(MessageService::new(MessageServiceDependencies {
        participant_repository,
        message_repository,
        clock: clock.clone(),
    }));

    // 存储就绪后才启动清理任务
    let sweeper = PresenceSweeper::new(
        presence_service.clone(),
        clock,
        SweeperConfig {
            stale_after: time::Duration::seconds(
                i64::try_from(config.presence.stale_after_secs).unwrap_or(i64::MAX),
            ),
            period: Duration::from_secs(config.presence.sweep_interval_secs),
        },
    )
    .spawn();

    let state = AppState::new(presence_service, message_service);
    let app = router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "聊天服务已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("聊天服务已停止");
    Ok(())
}

async fn connect_storage(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.storage {
        StorageBackend::Postgres => {
            let infra = Infrastructure::connect(InfrastructureConfig::from(&config.database)).await?;
            Ok((infra.participant_repository(), infra.message_repository()))
        }
        StorageBackend::Memory => {
            tracing::warn!("使用内存存储，重启后数据会丢失");
            let participants: Arc<dyn ParticipantRepository> =
                Arc::new(MemoryParticipantRepository::new());
            let messages: Arc<dyn MessageRepository> = Arc::new(MemoryMessageRepository::new());
            Ok((participants, messages))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "监听 Ctrl+C 信号失败");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig_term) => {
                sig_term.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "监听 SIGTERM 信号失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("接收到 Ctrl+C 信号，开始优雅停机...");
        }
        _ = terminate => {
            tracing::info!("接收到 SIGTERM 信号，开始优雅停机...");
        }
    }
}
