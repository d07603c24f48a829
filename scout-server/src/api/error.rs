use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scout_types::ErrorResponse;

use crate::auth::AuthError;
use crate::catalog::QueryError;
use crate::favorites::LedgerError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{:#}", err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidSession => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InfluencerNotFound | LedgerError::FavoriteNotFound => {
                ApiError::NotFound(err.to_string())
            }
            LedgerError::AlreadyFavorited => ApiError::Conflict(err.to_string()),
            LedgerError::Store(e) => e.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_domain_errors_map_to_status_codes() {
        let (status, body) = render(AuthError::MissingToken.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing session token");

        let (status, body) = render(AuthError::UserNotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");

        let (status, _) = render(LedgerError::AlreadyFavorited.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = render(QueryError::InvalidPage("x".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let err: ApiError = anyhow::anyhow!("disk I/O error at /var/db").into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }
}
