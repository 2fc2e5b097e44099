//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth::auth_middleware, rate_limit::rate_limit_middleware},
};

pub mod businesses;
pub mod documents;
pub mod health;

/// Creates the API router with all routes.
///
/// Document routes require a valid API key. Everything except the health
/// check is rate limited per client.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(documents::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let rate_limited = Router::new()
        .merge(businesses::routes())
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware));

    Router::new().merge(health::routes()).merge(rate_limited)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::AppState;
    use docbox_db::migration::{Migrator, MigratorTrait};
    use docbox_shared::{RateLimiter, StorageSettings};

    async fn state_with_limit(max_requests: u32) -> AppState {
        let db = docbox_db::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        Migrator::up(&db, None).await.expect("migrations");

        AppState {
            db: Arc::new(db),
            storage: Arc::new(StorageSettings::default()),
            rate_limiter: Arc::new(RateLimiter::new(max_requests, Duration::from_secs(60))),
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_not_rate_limited() {
        let app = crate::create_router(state_with_limit(0).await);

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn requests_over_the_limit_get_429() {
        let app = crate::create_router(state_with_limit(1).await);

        let first = app.clone().oneshot(get("/businesses")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(get("/businesses")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn document_routes_sit_behind_auth() {
        let app = crate::create_router(state_with_limit(10).await);

        let response = app.oneshot(get("/document/acct-1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
