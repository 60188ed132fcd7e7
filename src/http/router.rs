//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Booking CRUD
        .route("/bookings", get(handlers::list_bookings))
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings/{id}", get(handlers::get_booking))
        .route("/bookings/{id}", put(handlers::update_booking))
        .route("/bookings/{id}", delete(handlers::delete_booking))
        // Building CRUD
        .route("/buildings", get(handlers::list_buildings))
        .route("/buildings", post(handlers::create_building))
        .route("/buildings/{id}", get(handlers::get_building))
        .route("/buildings/{id}", put(handlers::update_building))
        .route("/buildings/{id}", delete(handlers::delete_building))
        // Room CRUD plus the isolated status update
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms", post(handlers::create_room))
        .route("/rooms/{id}", get(handlers::get_room))
        .route("/rooms/{id}", put(handlers::update_room))
        .route("/rooms/{id}", delete(handlers::delete_room))
        .route("/rooms/{id}/status", patch(handlers::update_room_status));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
