use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::db::repositories::UserRepository;
use crate::state::AppState;
use crate::auth::{require_session, require_user};
use super::{ApiError, ApiResult};
use scout_types::{LoginRequest, LoginResponse, SessionResponse, SignupRequest, User};

const MIN_PASSWORD_LEN: usize = 8;

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn issue_session(state: &AppState, user: User) -> ApiResult<LoginResponse> {
    let session_token = state.session_manager.create_session(user.id, &user.email)?;
    Ok(LoginResponse {
        user,
        session_token,
    })
}

/// POST /auth/signup - Register a new account and start a session
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let payload = parse_body(payload)?;

    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let repo = UserRepository::new(state.db.pool.clone());
    let user = repo
        .create(email, &payload.name, &state.hasher.hash(&payload.password)?)?
        .ok_or_else(|| ApiError::Conflict("Email already registered".to_string()))?;

    tracing::info!("Registered user {}", user.email);
    Ok((StatusCode::CREATED, Json(issue_session(&state, user)?)))
}

/// POST /auth/login - Exchange email and password for a session token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let payload = parse_body(payload)?;
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    }

    let repo = UserRepository::new(state.db.pool.clone());
    let credentials = repo
        .get_credentials(&payload.email)?
        .filter(|c| state.hasher.verify(&payload.password, &c.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    Ok(Json(issue_session(&state, credentials.user)?))
}

/// POST /auth/logout - End the caller's session
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let session = require_session(&state, &headers)?;
    state.session_manager.delete_session(&session.token)?;

    Ok(Json(serde_json::json!({
        "message": "Logged out successfully"
    })))
}

/// GET /auth/session - Describe the user behind the caller's session
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let user = require_user(&state, &headers)?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        email: user.email,
        name: user.name,
    }))
}
