use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::handlers::analytics;
use crate::system;

/// Application routes
pub fn configure_routes() -> Router {
    let analytics_routes = Router::new()
        .route("/laboratories", post(analytics::laboratories))
        .route("/products", post(analytics::products))
        .route("/pharmacies", post(analytics::pharmacies))
        .route("/suppliers", post(analytics::suppliers))
        .route("/generic-groups", post(analytics::generic_groups))
        .route("/categories", post(analytics::categories))
        .route("/regions", post(analytics::regions))
        .layer(middleware::from_fn(system::auth::middleware::require_auth));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/analytics", analytics_routes)
}
