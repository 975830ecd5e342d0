use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistent store corrupted: {0}")]
    Persistence(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Embedding inference failed: {0}")]
    Model(String),

    #[error("Service temporarily unavailable: {0}")]
    Resource(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => {
                tracing::warn!(error = %msg, "Lookup failed");
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Persistence(msg) => {
                tracing::error!(error = %msg, "Persistence error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Validation(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Model(e) => {
                tracing::error!(error = %e, "Embedding inference error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Resource(msg) => {
                tracing::warn!(error = %msg, "Resource error");
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<ort::Error> for AppError {
    fn from(err: ort::Error) -> Self {
        AppError::Model(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
