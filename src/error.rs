use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::mapper::MapError;
use crate::records::RecordsError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Team with this invite code not found")]
    TeamNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Hackathon not found: {0}")]
    HackathonNotFound(String),

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Already a member of this team")]
    AlreadyMember,

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    AuthFailed,

    #[error("Records base error: {0}")]
    Records(#[from] RecordsError),

    #[error("Object storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Record mapping error: {0}")]
    Mapping(#[from] MapError),

    #[error("Session error: {0}")]
    Session(#[source] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::TeamNotFound
            | AppError::UserNotFound
            | AppError::HackathonNotFound(_)
            | AppError::CaseNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AlreadyMember | AppError::EmailTaken => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::AuthFailed => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Records(RecordsError::RecordNotFound(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Records(_) | AppError::Storage(_) | AppError::Session(_) => {
                tracing::error!("remote operation failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Mapping(_) => {
                tracing::error!("record mapping failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
