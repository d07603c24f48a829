//! Authorization gate: resolves a request's session token before any
//! catalog or favorites work happens.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Duration;
use thiserror::Error;

use scout_types::User;

use crate::config;
use crate::credentials::DEFAULT_PASSWORD_COST;
use crate::db::repositories::UserRepository;
use crate::session::SessionIdentity;
use crate::state::AppState;

pub const DEFAULT_SESSION_HEADER: &str = "X-Session-Token";
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// How sessions are carried, how long they live and how hard passwords are hashed
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub session_header: String,
    pub session_ttl: Duration,
    pub password_cost: u32,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            session_header: DEFAULT_SESSION_HEADER.to_string(),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            password_cost: DEFAULT_PASSWORD_COST,
        }
    }
}

impl From<&config::Auth> for AuthPolicy {
    fn from(auth: &config::Auth) -> Self {
        Self {
            session_header: auth.session_header.clone(),
            session_ttl: Duration::days(auth.session_ttl_days),
            password_cost: auth.password_cost,
        }
    }
}

impl AuthPolicy {
    /// Token from the session header, falling back to `Authorization: Bearer`
    pub fn token_from_headers<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        let non_blank = |v: &'a str| Some(v.trim()).filter(|t| !t.is_empty());

        headers
            .get(self.session_header.as_str())
            .and_then(|v| v.to_str().ok())
            .and_then(non_blank)
            .or_else(|| {
                headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .and_then(non_blank)
            })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,
    #[error("Invalid or expired session")]
    InvalidSession,
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// A validated session and the token it was presented with
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub token: String,
    pub identity: SessionIdentity,
}

/// Cheap check: the request carries a live session
pub fn require_session(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedSession, AuthError> {
    let token = state
        .auth
        .token_from_headers(headers)
        .ok_or(AuthError::MissingToken)?;

    let identity = state
        .session_manager
        .validate_session(token)?
        .ok_or(AuthError::InvalidSession)?;

    Ok(AuthenticatedSession {
        token: token.to_string(),
        identity,
    })
}

/// Full check: the session resolves to the stored user it was issued for.
///
/// The lookup goes by the session's durable user id, so a session outliving
/// its user never binds to a later account registered under the same email.
pub fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, AuthError> {
    let session = require_session(state, headers)?;

    let user = UserRepository::new(state.db.pool.clone())
        .get_by_id(&session.identity.user_id)?
        .ok_or(AuthError::UserNotFound)?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_from_custom_header() {
        let policy = AuthPolicy::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-session-token", HeaderValue::from_static("abc"));
        assert_eq!(policy.token_from_headers(&headers), Some("abc"));
    }

    #[test]
    fn test_token_from_bearer_fallback() {
        let policy = AuthPolicy::default();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(policy.token_from_headers(&headers), Some("xyz"));
    }

    #[test]
    fn test_session_header_wins_over_bearer() {
        let policy = AuthPolicy::default();
        let mut headers = HeaderMap::new();
        headers.insert("X-Session-Token", HeaderValue::from_static("primary"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secondary"));
        assert_eq!(policy.token_from_headers(&headers), Some("primary"));
    }

    #[test]
    fn test_missing_or_blank_token() {
        let policy = AuthPolicy::default();
        let mut headers = HeaderMap::new();
        assert_eq!(policy.token_from_headers(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(policy.token_from_headers(&headers), None);
        headers.insert("X-Session-Token", HeaderValue::from_static(""));
        assert_eq!(policy.token_from_headers(&headers), None);
    }

    #[test]
    fn test_blank_session_header_falls_back_to_bearer() {
        let policy = AuthPolicy::default();
        let mut headers = HeaderMap::new();
        headers.insert("X-Session-Token", HeaderValue::from_static(" "));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(policy.token_from_headers(&headers), Some("xyz"));
    }
}
