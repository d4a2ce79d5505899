//! Uniform JSON error responses.

use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use crate::error::AppError;

/// Map an `AppError` to its wire representation. Internal details are
/// logged server-side and never leaked to the client for 5xx responses.
pub fn into_response(error: AppError) -> (StatusCode, Json<serde_json::Value>) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let detail = if status.is_server_error() {
        tracing::error!(%error, "request failed");
        "internal server error".to_string()
    } else {
        error.to_string()
    };

    (status, Json(json!({ "error": detail })))
}
