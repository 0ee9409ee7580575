//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_entry_by_params_handler, get_entry_handler, health_handler, invalidate_all_handler,
    invalidate_type_handler, set_entry_by_params_handler, set_entry_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin, the surface is meant for local consumers
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/entries", delete(invalidate_all_handler))
        .route(
            "/entries/:type_tag",
            get(get_entry_by_params_handler)
                .put(set_entry_by_params_handler)
                .delete(invalidate_type_handler),
        )
        .route(
            "/entries/:type_tag/:id",
            get(get_entry_handler).put(set_entry_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
