use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ARGUMENT", message)
    }

    pub fn missing_user_header() -> Self {
        Self::invalid("missing User header")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(err) => match err {
                DomainError::InvalidArgument { field, reason } => {
                    ApiError::invalid(format!("{}: {}", field, reason))
                }
                DomainError::ParticipantAlreadyExists => ApiError::new(
                    StatusCode::CONFLICT,
                    "PARTICIPANT_EXISTS",
                    "participant already exists",
                ),
                DomainError::SenderNotActive => ApiError::new(
                    StatusCode::CONFLICT,
                    "SENDER_NOT_ACTIVE",
                    "sender is not an active participant",
                ),
                DomainError::ParticipantNotFound => ApiError::new(
                    StatusCode::NOT_FOUND,
                    "PARTICIPANT_NOT_FOUND",
                    "participant not found",
                ),
                DomainError::MessageNotFound => ApiError::new(
                    StatusCode::NOT_FOUND,
                    "MESSAGE_NOT_FOUND",
                    "message not found",
                ),
                DomainError::NotMessageOwner => ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "NOT_MESSAGE_OWNER",
                    "only the sender can delete a message",
                ),
            },
            ApplicationError::Repository(repo_err) => match repo_err {
                RepositoryError::NotFound => ApiError::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "requested resource not found",
                ),
                RepositoryError::Conflict => {
                    ApiError::new(StatusCode::CONFLICT, "CONFLICT", "resource already exists")
                }
                RepositoryError::Storage { message } => {
                    tracing::error!(error = %message, "存储访问失败");
                    ApiError::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_ERROR",
                        "storage unavailable",
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
