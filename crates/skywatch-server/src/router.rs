//! Axum router construction for the relay server.
//!
//! Assembles all routes (pages, REST, `WebSocket`) into a single
//! [`Router`] with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the relay server.
///
/// The router includes:
/// - `GET /login`, `POST /login` -- login form and submission
/// - `GET /logout` -- end the session
/// - `GET /api/check_auth` -- session probe
/// - `GET /` -- status page (login required)
/// - `POST /api/aircraft` -- one-shot lookup (login required)
/// - `GET /api/tracking` -- active trackers (login required)
/// - `GET /ws` -- tracking `WebSocket` (login required)
/// - `GET /health` -- liveness probe
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Session gateway
        .route(
            "/login",
            get(handlers::login_form).post(handlers::login_submit),
        )
        .route("/logout", get(handlers::logout))
        .route("/api/check_auth", get(handlers::check_auth))
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // REST API
        .route("/api/aircraft", post(handlers::lookup_aircraft))
        .route("/api/tracking", get(handlers::tracking_status))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
