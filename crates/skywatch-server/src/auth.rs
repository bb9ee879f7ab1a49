//! Session gateway: shared-password login and cookie sessions.
//!
//! A successful login mints a random session ID, remembers it in the
//! in-memory [`SessionStore`], and hands it to the browser in the
//! `skywatch_session` cookie. Every protected route extracts
//! [`Authenticated`], which rejects the request before the handler runs
//! unless the cookie names a live session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "skywatch_session";

/// The shared login password.
///
/// `Debug` output is redacted and comparison does not short-circuit on
/// the first differing byte.
#[derive(Clone)]
pub struct SharedPassword(String);

impl SharedPassword {
    /// Wrap the configured password.
    pub const fn new(password: String) -> Self {
        Self(password)
    }

    /// Check a submitted password.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let given = candidate.as_bytes();
        if expected.len() != given.len() {
            return false;
        }
        expected
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl core::fmt::Debug for SharedPassword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SharedPassword(<redacted>)")
    }
}

/// In-memory set of live sessions with their expiry times.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl SessionStore {
    /// Create an empty store whose sessions last `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Mint a new session, dropping any that have expired.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, expiry| *expiry > now);
        sessions.insert(id, expires_at);
        debug!(active = sessions.len(), "session created");
        id
    }

    /// Whether `id` names a live, unexpired session.
    pub async fn is_active(&self, id: &Uuid) -> bool {
        let sessions = self.sessions.read().await;
        sessions.get(id).is_some_and(|expiry| *expiry > Utc::now())
    }

    /// End a session. Returns whether it existed.
    pub async fn revoke(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Number of stored sessions, including not-yet-pruned expired ones.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Read the session ID from the request's `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie(id: Uuid, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax{secure}")
}

/// `Set-Cookie` value deleting the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Accept only same-site absolute paths as a post-login redirect target.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

/// Proof that the request carries a live session.
///
/// Use as the first extractor of any handler that must not run for
/// anonymous clients.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated {
    /// The session the request belongs to.
    pub session: Uuid,
}

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = session_id(&parts.headers).ok_or(ApiError::Unauthorized)?;
        if state.sessions.is_active(&session).await {
            Ok(Self { session })
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}
