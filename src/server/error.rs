use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cards::CardError;
use crate::config::ConfigError;
use crate::database::DatabaseError;
use crate::users::AuthError;

/// Errors surfaced to HTTP clients as `{"error": message}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Card(err) => match err {
                CardError::InvalidOutcome(_)
                | CardError::InvalidDate(_)
                | CardError::MissingTitle => StatusCode::UNPROCESSABLE_ENTITY,
                CardError::CardNotFound(_) => StatusCode::NOT_FOUND,
                CardError::Conflict { .. } => StatusCode::CONFLICT,
                CardError::Sqlite(_) | CardError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Auth(err) => match err {
                AuthError::MissingCredentials
                | AuthError::InvalidEmail
                | AuthError::WeakPassword(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
                AuthError::Hash(_) | AuthError::Sqlite(_) | AuthError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            log::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Failures starting or running the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
