//! Axum router construction.
//!
//! Assembles all routes (REST + SSE) into a single [`Router`] with CORS
//! open to any origin so browser viewers served from elsewhere can
//! connect.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::events;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /api`, `GET /api/` -- query-string update
/// - `POST /api`, `POST /api/` -- JSON body update
/// - `GET /turtles` -- recency-filtered snapshot
/// - `GET /events` -- server-sent event stream
/// - anything else -- 404 with the help page
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Updates
        .route("/api", get(handlers::update_get).post(handlers::update_post))
        .route("/api/", get(handlers::update_get).post(handlers::update_post))
        // Snapshot
        .route("/turtles", get(handlers::list_turtles))
        // Push stream
        .route("/events", get(events::events))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
