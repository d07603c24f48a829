use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    api::{ApiError, ApiResult},
    auth::require_user,
    db::repositories::FavoriteRepository,
    favorites::FavoritesLedger,
    state::AppState,
};
use scout_types::{AddFavoriteRequest, Favorite, Influencer};

/// Resolve the caller and open their ledger
fn ledger_for(state: &AppState, headers: &HeaderMap) -> Result<FavoritesLedger, ApiError> {
    let user = require_user(state, headers)?;
    Ok(FavoritesLedger::new(
        state.catalog.clone(),
        FavoriteRepository::new(state.db.pool.clone()),
        user.id,
    ))
}

/// GET /favorites - The caller's favorited influencers, most recent first
pub async fn list_favorites(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Influencer>>> {
    let ledger = ledger_for(&state, &headers)?;
    Ok(Json(ledger.list()?))
}

/// POST /favorites - Favorite an influencer
pub async fn add_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AddFavoriteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Favorite>)> {
    let ledger = ledger_for(&state, &headers)?;

    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let influencer_id = payload
        .influencer_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("influencerId is required".to_string()))?;

    let favorite = ledger.add(&influencer_id)?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

/// DELETE /favorites/:id - Remove a favorite by influencer id
pub async fn remove_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(influencer_id): Path<String>,
) -> ApiResult<Json<Favorite>> {
    let ledger = ledger_for(&state, &headers)?;
    Ok(Json(ledger.remove(&influencer_id)?))
}
