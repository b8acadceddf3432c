use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use domain::{DomainError, MessageId};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use application::services::{DeleteMessageRequest, ListMessagesRequest, SendMessageRequest};
use application::{ApplicationError, MessageDto, ParticipantDto};

use crate::{error::ApiError, state::AppState};

/// 请求者身份所在的请求头
pub const USER_HEADER: &str = "user";

#[derive(Debug, Deserialize)]
struct JoinPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SendMessagePayload {
    to: String,
    text: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ListMessagesQuery {
    limit: Option<String>,
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/participants", post(join).get(list_participants))
        .route("/messages", post(send_message).get(list_messages))
        .route("/messages/{id}", delete(delete_message))
        .route("/status", post(heartbeat))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// 来源列表为空或包含 `*` 时放行任意来源
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "忽略无效的 CORS 来源");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// 昵称可以包含非 ASCII 字符，按 UTF-8 解码请求头
fn requester(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .map(str::to_owned)
}

fn required_requester(headers: &HeaderMap) -> Result<String, ApiError> {
    requester(headers).ok_or_else(ApiError::missing_user_header)
}

fn parse_limit(raw: Option<String>) -> Result<Option<usize>, ApiError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<usize>()
            .map_err(|_| ApiError::invalid("limit: must be a non-negative integer"))
    })
    .transpose()
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn join(
    State(state): State<AppState>,
    payload: Result<Json<JoinPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ParticipantDto>), ApiError> {
    let Json(payload) = payload.map_err(|err| ApiError::invalid(err.body_text()))?;
    let participant = state.presence_service.join(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(ParticipantDto::from(&participant))))
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let participants = state.presence_service.list_active().await?;

    Ok(Json(participants.iter().map(ParticipantDto::from).collect()))
}

async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SendMessagePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let from = required_requester(&headers)?;
    let Json(payload) = payload.map_err(|err| ApiError::invalid(err.body_text()))?;

    let message = state
        .message_service
        .send(SendMessageRequest {
            from,
            to: payload.to,
            text: payload.text,
            kind: payload.kind,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MessageDto::from(&message))))
}

async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let limit = parse_limit(query.limit)?;
    let messages = state
        .message_service
        .list(ListMessagesRequest {
            requester: requester(&headers),
            limit,
        })
        .await?;

    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let name = required_requester(&headers)?;
    state.presence_service.heartbeat(&name).await?;

    Ok(StatusCode::OK)
}

async fn delete_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let requester = required_requester(&headers)?;
    // 无法解析的 id 不可能对应任何消息
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::from(ApplicationError::from(DomainError::MessageNotFound)))?;

    state
        .message_service
        .delete(DeleteMessageRequest {
            id: MessageId::from(id),
            requester,
        })
        .await?;

    Ok(StatusCode::OK)
}
