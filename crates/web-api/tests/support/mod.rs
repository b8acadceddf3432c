#![allow(dead_code)]

use std::sync::Arc;

use application::{
    clock::manual::ManualClock,
    repository::memory::{MemoryMessageRepository, MemoryParticipantRepository},
    services::{
        MessageService, MessageServiceDependencies, PresenceService, PresenceServiceDependencies,
    },
};
use axum::Router;
use config::WriteMode;
use time::macros::datetime;
use tokio::{net::TcpListener, sync::oneshot};
use web_api::{router, AppState};

pub struct TestApp {
    pub router: Router,
    pub presence: Arc<PresenceService>,
    pub clock: Arc<ManualClock>,
}

/// 使用内存存储和手动时钟构建路由
pub fn build_app() -> TestApp {
    let participants = Arc::new(MemoryParticipantRepository::new());
    let messages = Arc::new(MemoryMessageRepository::new());
    let clock = Arc::new(ManualClock::new(datetime!(2024-05-01 12:00:00 UTC)));

    let presence = Arc::new(PresenceService::new(PresenceServiceDependencies {
        participant_repository: participants.clone(),
        message_repository: messages.clone(),
        clock: clock.clone(),
        notice_write: WriteMode::Awaited,
    }));
    let message_service = Arc::new(MessageService::new(MessageServiceDependencies {
        participant_repository: participants,
        message_repository: messages,
        clock: clock.clone(),
    }));

    let state = AppState::new(presence.clone(), message_service);
    TestApp {
        router: router(state, &["*".to_string()]),
        presence,
        clock,
    }
}

pub struct RunningServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// 在随机端口上启动服务
pub async fn serve(router: Router) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    RunningServer {
        base_url: format!("http://{}", addr),
        shutdown: Some(shutdown_tx),
    }
}
