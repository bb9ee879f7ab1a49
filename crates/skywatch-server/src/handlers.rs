//! HTTP endpoint handlers for the relay server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/login` | Login form |
//! | `POST` | `/login` | Check the shared password and start a session |
//! | `GET` | `/logout` | End the session |
//! | `GET` | `/api/check_auth` | Whether the caller is logged in |
//! | `GET` | `/` | Status page |
//! | `POST` | `/api/aircraft` | One-shot aircraft lookup |
//! | `GET` | `/api/tracking` | Active trackers |
//! | `GET` | `/health` | Liveness probe |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::json;
use skywatch_types::{LookupRequest, LookupResponse, TrackingKey};
use tracing::{debug, info, warn};

use crate::auth::{self, Authenticated};
use crate::error::ApiError;
use crate::pages::IndexContext;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Query parameters accepted by the login routes.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Where to go after logging in.
    pub next: Option<String>,
}

/// Form body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// The submitted password.
    pub password: String,
    /// Redirect target carried through the form.
    pub next: Option<String>,
}

// ---------------------------------------------------------------------------
// Session gateway
// ---------------------------------------------------------------------------

/// Serve the login form.
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextQuery>,
) -> Result<Html<String>, ApiError> {
    let next = auth::safe_next(query.next.as_deref());
    Ok(Html(state.pages.login(None, next)?))
}

/// Check the submitted password.
///
/// On success a session cookie is set and the browser is redirected to
/// the requested local path. On failure the form is shown again with a
/// 401 status.
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let requested = form.next.as_deref().or(query.next.as_deref());
    let next = auth::safe_next(requested);

    if !state.auth.password.verify(&form.password) {
        warn!("rejected login attempt");
        let page = state.pages.login(Some("Invalid password"), next)?;
        return Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response());
    }

    let session = state.sessions.create().await;
    info!(%session, "login succeeded");
    let cookie = auth::session_cookie(session, state.auth.secure_cookie);
    Ok(([(SET_COOKIE, cookie)], Redirect::to(next)).into_response())
}

/// End the caller's session and send them back to the login form.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session) = auth::session_id(&headers) {
        if state.sessions.revoke(&session).await {
            info!(%session, "logged out");
        }
    }
    (
        [(SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

/// Report whether the caller holds a live session.
pub async fn check_auth(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let authenticated = state.is_authenticated(&headers).await;
    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(json!({ "authenticated": authenticated }))).into_response()
}

// ---------------------------------------------------------------------------
// GET / -- status page
// ---------------------------------------------------------------------------

/// Serve the status page, or send anonymous visitors to the login form.
pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !state.is_authenticated(&headers).await {
        return Ok(Redirect::to("/login?next=/").into_response());
    }

    let trackers = state.registry.status().await;
    let html = state.pages.index(&IndexContext {
        trackers: &trackers,
        subscribers: state.hub().subscriber_count(),
        poll_interval_ms: state.poll_interval.as_millis(),
    })?;
    Ok(Html(html).into_response())
}

// ---------------------------------------------------------------------------
// POST /api/aircraft -- one-shot lookup
// ---------------------------------------------------------------------------

/// Look an aircraft up once and return the provider's record.
///
/// A provider miss is a successful request: it answers 200 with
/// `success: false` and an explanatory message. Provider failures answer
/// 500 and malformed requests 400.
pub async fn lookup_aircraft(
    _auth: Authenticated,
    State(state): State<Arc<AppState>>,
    body: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<LookupResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let value = validate_search_value(&request.search_value)?;

    debug!(search_type = ?request.search_type, %value, "one-shot lookup");
    match state.lookup.lookup(request.search_type, value.as_str()).await {
        Ok(Some(aircraft)) => Ok(Json(LookupResponse::found(aircraft))),
        Ok(None) => Ok(Json(LookupResponse::not_found())),
        Err(e) => {
            warn!(search_type = ?request.search_type, %value, error = %e, "lookup failed");
            Err(ApiError::Lookup(e))
        }
    }
}

/// Reduce a search value to a single safe URL path segment.
fn validate_search_value(raw: &str) -> Result<TrackingKey, ApiError> {
    TrackingKey::parse(raw).map_err(|e| ApiError::BadRequest(format!("invalid searchValue: {e}")))
}

// ---------------------------------------------------------------------------
// GET /api/tracking -- registry status
// ---------------------------------------------------------------------------

/// List every active tracker and the number of connected clients.
pub async fn tracking_status(
    _auth: Authenticated,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let trackers = state.registry.status().await;
    Json(json!({
        "count": trackers.len(),
        "trackers": trackers,
        "subscribers": state.hub().subscriber_count(),
    }))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
