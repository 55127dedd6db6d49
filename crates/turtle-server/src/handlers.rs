//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api` | Update via query string (help page when empty) |
//! | `POST` | `/api` | Update via JSON body (help page when empty) |
//! | `GET` | `/turtles` | Actors updated since `?since=<unix seconds>` |
//!
//! Anything else falls through to [`not_found`], which serves the help
//! page and never touches state.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};
use turtle_core::{IngressOutcome, TurtleUpdate};
use turtle_types::{ActorRecord, UpdateMethod};

use crate::error::ObserverError;
use crate::extract::ClientOrigin;
use crate::state::AppState;

/// Help document returned for empty updates and unknown routes.
pub const HELP_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Turtle Graphics API</title>
</head>
<body>
    <h1>Turtle Graphics API</h1>
    <p>Use the following parameters to control your turtle:</p>
    <ul>
        <li><b>x</b>: Set the x-coordinate of the turtle (e.g., ?x=100)</li>
        <li><b>y</b>: Set the y-coordinate of the turtle (e.g., ?y=200)</li>
        <li><b>r</b>: Set the red component of the line color (0-255) (e.g., ?r=255)</li>
        <li><b>g</b>: Set the green component of the line color (0-255) (e.g., ?g=100)</li>
        <li><b>b</b>: Set the blue component of the line color (0-255) (e.g., ?b=50)</li>
        <li><b>w</b>: Set the line weight (1-200) (e.g., ?w=5)</li>
        <li><b>name</b>: Set the name of the turtle (e.g., ?name=Speedy)</li>
        <li><b>c</b>: Clear all turtles (e.g., ?c=1)</li>
    </ul>
    <p>Example: <code>/api?x=100&amp;y=200&amp;r=255&amp;g=0&amp;b=0&amp;w=3&amp;name=Speedy</code></p>
    <p>The same fields may be sent as a JSON object with <code>POST /api</code>.</p>
    <p>Live updates: <code>GET /events</code> (server-sent events). Snapshot: <code>GET /turtles</code>.</p>
</body>
</html>"#;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /turtles` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct SnapshotQuery {
    /// Only return actors updated at or after this unix timestamp
    /// (seconds). Defaults to one recency window ago.
    pub since: Option<i64>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let actor_count = state.registry.len().await;
    let subscriber_count = state.hub.subscriber_count().await;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Turtle Sync</title>
    <style>
        body {{
            background: #000;
            color: #ddd;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        .metric {{
            display: inline-block;
            border: 1px solid #444;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
        }}
        .metric .label {{ color: #888; font-size: 0.85rem; }}
        .metric .value {{ font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #7ee787; }}
    </style>
</head>
<body>
    <h1>Turtle Sync</h1>
    <div>
        <div class="metric">
            <div class="label">Turtles</div>
            <div class="value">{actor_count}</div>
        </div>
        <div class="metric">
            <div class="label">Viewers</div>
            <div class="value">{subscriber_count}</div>
        </div>
    </div>
    <h2>Endpoints</h2>
    <ul>
        <li><a href="/api">/api</a> -- Move your turtle (help page when called without parameters)</li>
        <li><a href="/turtles">/turtles</a> -- Recently active turtles (?since=unix seconds)</li>
        <li><code>/events</code> -- Live update stream (server-sent events)</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET/POST /api -- update the caller's turtle
// ---------------------------------------------------------------------------

/// Apply a query-string update for the calling client's turtle.
pub async fn update_get(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    query: Result<Query<TurtleUpdate>, QueryRejection>,
) -> Result<Response, ObserverError> {
    let Query(update) = query.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;
    let outcome = state
        .ingress
        .submit(&origin, &update, UpdateMethod::Get)
        .await?;
    Ok(outcome_response(outcome))
}

/// Apply a JSON body update for the calling client's turtle.
///
/// An empty body is treated like an empty query string.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    body: Bytes,
) -> Result<Response, ObserverError> {
    let update: TurtleUpdate = if body.iter().all(u8::is_ascii_whitespace) {
        TurtleUpdate::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ObserverError::InvalidBody(e.to_string()))?
    };

    let outcome = state
        .ingress
        .submit(&origin, &update, UpdateMethod::Post)
        .await?;
    Ok(outcome_response(outcome))
}

/// Render an ingress outcome as an HTTP response.
fn outcome_response(outcome: IngressOutcome) -> Response {
    match outcome {
        IngressOutcome::Help => Html(HELP_HTML).into_response(),
        IngressOutcome::Updated { record, .. } => Json(serde_json::json!({
            "message": "Turtle updated",
            "turtle": record,
        }))
        .into_response(),
        IngressOutcome::Reset { cleared } => Json(serde_json::json!({
            "message": "All turtles cleared",
            "cleared": cleared,
        }))
        .into_response(),
    }
}

// ---------------------------------------------------------------------------
// GET /turtles -- recency-filtered snapshot
// ---------------------------------------------------------------------------

/// Return every actor updated at or after `since` as a JSON array.
pub async fn list_turtles(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SnapshotQuery>, QueryRejection>,
) -> Result<Json<Vec<ActorRecord>>, ObserverError> {
    let Query(params) = query.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;

    let since = match params.since {
        Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| ObserverError::InvalidQuery(format!("since out of range: {secs}")))?,
        None => state.registry.default_since(Utc::now()),
    };

    Ok(Json(state.registry.list_since(since).await))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Serve the help page for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(HELP_HTML))
}
