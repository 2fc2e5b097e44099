//! Business registration and listing routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, response::error_response};
use docbox_db::{BusinessRepository, repositories::BusinessError};
use docbox_shared::AppError;

/// Creates the business routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/business/register", post(register_business))
        .route("/businesses", get(list_businesses))
}

/// Request body for registering a business.
#[derive(Debug, Deserialize)]
pub struct RegisterBusinessRequest {
    /// Business name, unique across the service.
    pub name: String,
}

/// Response for a successful registration. This is the only place the
/// API key is ever returned.
#[derive(Debug, Serialize)]
pub struct RegisterBusinessResponse {
    /// Registered business name.
    pub business_name: String,
    /// API key to present in the `x-api-key` header.
    pub api_key: String,
}

/// Public view of a business. Deliberately excludes the API key.
#[derive(Debug, Serialize)]
pub struct BusinessResponse {
    /// Business id.
    pub id: i32,
    /// Business name.
    pub name: String,
}

/// POST `/business/register`
/// Registers a business and issues its API key.
async fn register_business(
    State(state): State<AppState>,
    Json(payload): Json<RegisterBusinessRequest>,
) -> impl IntoResponse {
    let name = payload.name.trim();
    if name.is_empty() {
        return error_response(&AppError::Validation(
            "Business name must not be empty".into(),
        ));
    }

    let repo = BusinessRepository::new((*state.db).clone());
    match repo.register(name).await {
        Ok(business) => {
            info!(business_id = business.id, "Business registered");
            (
                StatusCode::CREATED,
                Json(RegisterBusinessResponse {
                    business_name: business.name,
                    api_key: business.api_key,
                }),
            )
                .into_response()
        }
        Err(BusinessError::DuplicateName(_)) => error_response(&AppError::Conflict(
            "Business name is already registered".into(),
        )),
        Err(e) => {
            error!(error = %e, "Failed to register business");
            error_response(&AppError::Database("business registration failed".into()))
        }
    }
}

/// GET `/businesses`
/// Lists registered businesses by id and name.
async fn list_businesses(State(state): State<AppState>) -> impl IntoResponse {
    let repo = BusinessRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(businesses) => {
            let items: Vec<BusinessResponse> = businesses
                .into_iter()
                .map(|b| BusinessResponse {
                    id: b.id,
                    name: b.name,
                })
                .collect();

            (StatusCode::OK, Json(json!({ "businesses": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list businesses");
            error_response(&AppError::Database("business listing failed".into()))
        }
    }
}
