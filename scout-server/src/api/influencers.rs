use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{
    api::{ApiError, ApiResult},
    auth::require_session,
    catalog::{self, parse_page, FilterCriteria, LISTING_PAGE_SIZE},
    state::AppState,
};
use scout_types::{FilterOptions, Influencer, Page};

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    search: Option<String>,
    topic: Option<String>,
    platform: Option<String>,
    gender: Option<String>,
    page: Option<String>,
}

/// GET /influencers - Filtered, paginated catalog listing
pub async fn list_influencers(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Influencer>>> {
    require_session(&state, &headers)?;

    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let criteria = FilterCriteria::from_params(
        query.search.as_deref(),
        query.topic.as_deref(),
        query.platform.as_deref(),
        query.gender.as_deref(),
    )?;
    let page = parse_page(query.page.as_deref())?;

    let result = catalog::search(state.catalog.as_ref(), &criteria, page, LISTING_PAGE_SIZE)?;
    tracing::debug!(
        "Listing page {} of {} ({} matches)",
        result.page,
        result.total_pages,
        result.total
    );

    Ok(Json(result))
}

/// GET /influencers/:id - Single influencer with platforms and topics
pub async fn get_influencer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Influencer>> {
    require_session(&state, &headers)?;

    let influencer = state
        .catalog
        .find(&id)?
        .ok_or_else(|| ApiError::NotFound("Influencer not found".to_string()))?;

    Ok(Json(influencer))
}

/// GET /filter-options - Distinct topics, platforms and genders in the catalog
pub async fn get_filter_options(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<FilterOptions>> {
    require_session(&state, &headers)?;

    let snapshot = state.catalog.snapshot()?;
    Ok(Json(catalog::filter_options(&snapshot)))
}
