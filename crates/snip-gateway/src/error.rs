use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_shortener::{DecodeError, EncodeError};
use thiserror::Error;
use tracing::{error, warn};

use crate::model::{ErrorResponse, ErrorsResponse};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal server error")),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Encode(EncodeError::Invalid(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorsResponse {
                    errors: errors.messages(),
                }),
            )
                .into_response(),
            AppError::Encode(err @ EncodeError::GenerationExhausted { .. }) => {
                warn!(error = %err, "encode request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorResponse::new(err.to_string())),
                )
                    .into_response()
            }
            AppError::Encode(EncodeError::Storage(err)) => {
                error!(error = %err, "encode request failed");
                internal_error()
            }
            AppError::Decode(err @ DecodeError::NotFound) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(err.to_string())),
            )
                .into_response(),
            AppError::Decode(DecodeError::Storage(err)) => {
                error!(error = %err, "decode request failed");
                internal_error()
            }
        }
    }
}
