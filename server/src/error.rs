use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lists_api::ValidationErrors;
use serde_json::json;

use crate::db::StoreError;

/// Everything a request can fail with, mapped to an HTTP response
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid payload: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("no {0} matches the given query")]
    NotFound(&'static str),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
    #[error("unsupported media type")]
    UnsupportedMediaType,
    #[error("invalid query string: {0}")]
    BadQuery(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType,
            other => ApiError::MalformedBody(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::NotFound(name) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": format!("No {} matches the given query.", name) })),
            )
                .into_response(),
            ApiError::MalformedBody(reason) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": format!("JSON parse error - {}", reason) })),
            )
                .into_response(),
            ApiError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "detail": format!("Method \"{}\" not allowed.", method) })),
            )
                .into_response(),
            ApiError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(json!({
                    "detail": "Unsupported media type in request. Expected 'application/json'."
                })),
            )
                .into_response(),
            ApiError::BadQuery(reason) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": reason })),
            )
                .into_response(),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "A server error occurred." })),
                )
                    .into_response()
            }
        }
    }
}
