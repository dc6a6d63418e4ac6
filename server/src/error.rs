use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to connect to MongoDB: {0}")]
    Connection(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("failed to disconnect from MongoDB: {0}")]
    Disconnect(String),
}

impl AppError {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Driver details stay in the log
        let error_message = match &self {
            AppError::Persistence(_) => "Failed to store record".to_string(),
            other => other.to_string(),
        };
        tracing::error!("{}", self);

        let body = Json(json!({
            "error": error_message,
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
