//! Per-client request rate limiting middleware.
//!
//! Clients are identified by their API key when present, falling back to
//! the forwarded client address. Requests over the window limit get 429.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::middleware::auth::API_KEY_HEADER;
use crate::{AppState, response::error_response};
use docbox_shared::AppError;

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_identity(&request);

    if state.rate_limiter.try_acquire(&client) {
        return next.run(request).await;
    }

    warn!(client = %client, "Rate limit exceeded");
    error_response(&AppError::RateLimited(
        "Too many requests, please retry later".into(),
    ))
}

fn client_identity(request: &Request) -> String {
    let headers = request.headers();

    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|h| h.to_str().ok()) {
        return format!("key:{key}");
    }

    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map_or_else(
            || "anonymous".to_string(),
            |ip| format!("ip:{}", ip.trim()),
        )
}
