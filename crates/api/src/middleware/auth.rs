//! API key authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{AppState, response::error_response};
use docbox_db::{BusinessRepository, entities::businesses};
use docbox_shared::AppError;

/// Header carrying the business API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication middleware that validates API keys.
///
/// This middleware:
/// 1. Extracts the `x-api-key` header
/// 2. Resolves it to a registered business
/// 3. Stores the business in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    let Some(api_key) = api_key else {
        return error_response(&AppError::Unauthorized(
            "x-api-key header is required".into(),
        ));
    };

    let repo = BusinessRepository::new((*state.db).clone());
    match repo.find_by_api_key(api_key).await {
        Ok(Some(business)) => {
            request.extensions_mut().insert(business);
            next.run(request).await
        }
        Ok(None) => error_response(&AppError::Unauthorized("API key is not recognized".into())),
        Err(e) => {
            error!(error = %e, "Failed to look up API key");
            error_response(&AppError::Database("API key lookup failed".into()))
        }
    }
}

/// Extractor for the authenticated business.
///
/// Use this in handlers behind the auth middleware:
///
/// ```ignore
/// async fn handler(business: AuthBusiness) -> impl IntoResponse {
///     let business_id = business.id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthBusiness(pub businesses::Model);

impl AuthBusiness {
    /// Returns the business id.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.0.id
    }

    /// Returns the business name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl<S> FromRequestParts<S> for AuthBusiness
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<businesses::Model>()
            .cloned()
            .map(AuthBusiness)
            .ok_or_else(|| {
                let err = AppError::Unauthorized("Authentication required".into());
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": err.error_code(),
                        "message": err.to_string()
                    })),
                )
            })
    }
}
