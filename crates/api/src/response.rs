//! Error response shaping.
//!
//! Every handler funnels failures through [`AppError`] so status codes and
//! machine-readable error codes stay consistent across the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use docbox_shared::AppError;

/// Renders an [`AppError`] as a JSON error body with its canonical status.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_come_from_the_error() {
        let response = error_response(&AppError::NotFound("Document not found".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response(&AppError::RateLimited("slow down".into()));
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
