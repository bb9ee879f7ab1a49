//! Integration tests for the relay API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, backed by an in-memory lookup client. The
//! lifecycle tests bind a real listener to drive `WebSocket` clients and
//! graceful shutdown.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use futures::{FutureExt, SinkExt, StreamExt};
use serde_json::{Value, json};
use skywatch_server::auth::SharedPassword;
use skywatch_server::{AppState, AuthSettings, build_router, serve};
use skywatch_tracker::{AircraftLookup, LookupError, LookupFuture, TrackerConfig};
use skywatch_types::{AircraftState, NOT_FOUND_MESSAGE, SearchType, TrackingKey};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

const PASSWORD: &str = "hunter2";

/// Knows one airborne aircraft; `GROUNDED` is silent and `BROKEN` fails.
struct FakeProvider;

impl AircraftLookup for FakeProvider {
    fn lookup<'a>(&'a self, search_type: SearchType, value: &'a str) -> LookupFuture<'a> {
        let result = match value {
            "GROUNDED" => Ok(None),
            "BROKEN" => Err(LookupError::Status {
                status: 503,
                body: String::from("upstream unavailable"),
            }),
            _ => Ok(AircraftState::from_value(json!({
                "r": value,
                "t": "B738",
                "searched_by": search_type.path_segment(),
                "lat": 40.6413,
                "lon": -73.7781,
            }))),
        };
        async move { result }.boxed()
    }
}

fn make_state() -> Arc<AppState> {
    make_state_with(&TrackerConfig::default())
}

fn make_state_with(tracker: &TrackerConfig) -> Arc<AppState> {
    let state = AppState::new(
        Arc::new(FakeProvider),
        AuthSettings {
            password: SharedPassword::new(String::from(PASSWORD)),
            session_ttl: Duration::from_secs(3600),
            secure_cookie: false,
        },
        tracker,
    )
    .unwrap();
    Arc::new(state)
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> Response<Body> {
    build_router(Arc::clone(state)).oneshot(request).await.unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn login_request(password: &str, next: &str) -> Request<Body> {
    Request::post("/login")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("password={password}&next={next}")))
        .unwrap()
}

/// Log in and return the `name=value` part of the session cookie.
async fn login(state: &Arc<AppState>) -> String {
    let response = send(state, login_request(PASSWORD, "%2F")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

fn lookup_request(cookie: &str, body: &str) -> Request<Body> {
    Request::post("/api/aircraft")
        .header(COOKIE, cookie)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Session gateway
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_is_public() {
    let state = make_state();
    let response = send(&state, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_login_form_carries_next() {
    let state = make_state();
    let response = send(
        &state,
        Request::get("/login?next=/api/tracking").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("name=\"next\""));
    assert!(html.contains("api"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let state = make_state();
    let response = send(&state, login_request("wrong", "%2F")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("Invalid password"));
    assert!(state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_login_redirects_to_local_next_only() {
    let state = make_state();

    let response = send(&state, login_request(PASSWORD, "%2Fapi%2Ftracking")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/api/tracking");
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("skywatch_session="));
    assert!(cookie.contains("HttpOnly"));

    let response = send(&state, login_request(PASSWORD, "https%3A%2F%2Fevil.example")).await;
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_check_auth_reflects_session() {
    let state = make_state();

    let response = send(
        &state,
        Request::get("/api/check_auth").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({ "authenticated": false })
    );

    let cookie = login(&state).await;
    let response = send(
        &state,
        Request::get("/api/check_auth")
            .header(COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({ "authenticated": true })
    );
}

#[tokio::test]
async fn test_logout_ends_session() {
    let state = make_state();
    let cookie = login(&state).await;

    let response = send(
        &state,
        Request::get("/logout")
            .header(COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    let cleared = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let response = send(
        &state,
        Request::get("/api/tracking")
            .header(COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_index_requires_login() {
    let state = make_state();

    let response = send(&state, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/login?next=/");

    let cookie = login(&state).await;
    let response = send(
        &state,
        Request::get("/").header(COOKIE, &cookie).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("SkyWatch"));
}

#[tokio::test]
async fn test_api_routes_reject_anonymous_requests() {
    let state = make_state();
    let requests = [
        Request::post("/api/aircraft")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"searchType":"registration","searchValue":"N12345"}"#))
            .unwrap(),
        Request::get("/api/tracking").body(Body::empty()).unwrap(),
        Request::get("/ws").body(Body::empty()).unwrap(),
        Request::get("/api/tracking")
            .header(COOKIE, "skywatch_session=00000000-0000-0000-0000-000000000000")
            .body(Body::empty())
            .unwrap(),
    ];

    for request in requests {
        let path = request.uri().path().to_owned();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["success"], false, "{path}");
    }
    assert_eq!(state.registry.active_count().await, 0);
}

// ---------------------------------------------------------------------------
// POST /api/aircraft
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_lookup_found() {
    let state = make_state();
    let cookie = login(&state).await;

    let response = send(
        &state,
        lookup_request(&cookie, r#"{"searchType":"registration","searchValue":"N12345"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["r"], "N12345");
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn test_lookup_supports_every_search_type() {
    let state = make_state();
    let cookie = login(&state).await;

    for (search_type, segment) in [
        ("registration", "registration"),
        ("hex", "hex"),
        ("callsign", "callsign"),
        ("sqk", "sqk"),
        ("squawk", "sqk"),
        ("type", "type"),
    ] {
        let body = format!(r#"{{"searchType":"{search_type}","searchValue":"ABC1"}}"#);
        let response = send(&state, lookup_request(&cookie, &body)).await;
        assert_eq!(response.status(), StatusCode::OK, "{search_type}");
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["data"]["searched_by"], segment);
    }
}

#[tokio::test]
async fn test_lookup_not_found_is_200() {
    let state = make_state();
    let cookie = login(&state).await;

    let response = send(
        &state,
        lookup_request(&cookie, r#"{"searchType":"registration","searchValue":"GROUNDED"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json,
        json!({ "success": false, "message": NOT_FOUND_MESSAGE })
    );
}

#[tokio::test]
async fn test_lookup_provider_error_is_500() {
    let state = make_state();
    let cookie = login(&state).await;

    let response = send(
        &state,
        lookup_request(&cookie, r#"{"searchType":"hex","searchValue":"BROKEN"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_lookup_malformed_requests_are_400() {
    let state = make_state();
    let cookie = login(&state).await;

    for body in [
        "not json",
        r#"{"searchType":"registration"}"#,
        r#"{"searchType":"tailfin","searchValue":"N12345"}"#,
        r#"{"searchType":"registration","searchValue":""}"#,
        r#"{"searchType":"registration","searchValue":"N1/../admin"}"#,
    ] {
        let response = send(&state, lookup_request(&cookie, body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["success"], false, "{body}");
        assert!(json["message"].is_string(), "{body}");
    }
}

// ---------------------------------------------------------------------------
// GET /api/tracking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_tracking_status_lists_active_trackers() {
    let state = make_state();
    let cookie = login(&state).await;

    state
        .registry
        .start_tracking(TrackingKey::parse("N12345").unwrap())
        .await;
    state
        .registry
        .start_tracking(TrackingKey::parse("D-AIMA").unwrap())
        .await;

    let response = send(
        &state,
        Request::get("/api/tracking")
            .header(COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["subscribers"], 0);
    let registrations: Vec<&str> = json["trackers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["registration"].as_str().unwrap())
        .collect();
    assert_eq!(registrations, ["D-AIMA", "N12345"]);

    state.registry.shutdown().await;
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_shutdown_stops_every_tracker() {
    let state = make_state();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = tokio::spawn(serve(listener, Arc::clone(&state)));

    state
        .registry
        .start_tracking(TrackingKey::parse("N12345").unwrap())
        .await;
    assert_eq!(state.registry.active_count().await, 1);

    state.shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(state.registry.active_count().await, 0);
}

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, cookie: &str) -> Client {
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request.headers_mut().insert("cookie", cookie.parse().unwrap());
    let (client, _) = tokio_tungstenite::connect_async(request).await.unwrap();
    client
}

/// Next JSON text frame from the server.
async fn next_event(client: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if frame.is_text() {
            return serde_json::from_str(frame.to_text().unwrap()).unwrap();
        }
    }
}

/// Next frame that is not a broadcast aircraft update.
async fn next_reply(client: &mut Client) -> Value {
    loop {
        let event = next_event(client).await;
        if event["type"] != "aircraft_update" {
            return event;
        }
    }
}

async fn wait_for_subscribers(state: &AppState, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.hub().subscriber_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_websocket_updates_fan_out_and_acks_stay_private() {
    let state = make_state_with(&TrackerConfig {
        poll_interval: Duration::from_millis(100),
        broadcast_capacity: 64,
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, Arc::clone(&state)));
    let cookie = format!("skywatch_session={}", state.sessions.create().await);
    let n12345 = TrackingKey::parse("N12345").unwrap();

    let mut a = connect(addr, &cookie).await;
    let mut b = connect(addr, &cookie).await;
    wait_for_subscribers(&state, 2).await;

    a.send(WsMessage::text(r#"{"type":"start_tracking","registration":"N12345"}"#))
        .await
        .unwrap();

    let ack = next_reply(&mut a).await;
    assert_eq!(ack["type"], "tracking_started");
    assert_eq!(ack["registration"], "N12345");
    assert_eq!(ack["generation"], 1);
    assert_eq!(ack["replaced"], false);

    // The other client only ever sees the broadcast updates.
    for _ in 0..3 {
        let event = next_event(&mut b).await;
        assert_eq!(event["type"], "aircraft_update");
        assert_eq!(event["registration"], "N12345");
        assert_eq!(event["data"]["r"], "N12345");
    }

    // The commanding client leaves; the tracker keeps running.
    a.close(None).await.unwrap();
    drop(a);
    wait_for_subscribers(&state, 1).await;
    assert!(state.registry.is_tracking(&n12345).await);
    let event = next_event(&mut b).await;
    assert_eq!(event["type"], "aircraft_update");

    b.send(WsMessage::text(r#"{"type":"stop_tracking","registration":"N12345"}"#))
        .await
        .unwrap();
    let ack = next_reply(&mut b).await;
    assert_eq!(ack["type"], "tracking_stopped");
    assert_eq!(ack["was_active"], true);
    assert_eq!(state.registry.active_count().await, 0);

    state.shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
