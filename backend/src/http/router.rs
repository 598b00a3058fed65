//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing,
//! bearer auth), and creates the axum router ready for serving.

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth::require_auth;
use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Every route here requires a session token.
    let protected = Router::new()
        .route("/hotels", get(handlers::list_hotels))
        .route("/hotels/{hotel_id}", get(handlers::get_hotel))
        .route("/tickets/types", get(handlers::list_ticket_types))
        .route(
            "/tickets",
            get(handlers::get_ticket).post(handlers::create_ticket),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
