use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;

/// Build the application router with tracing and CORS layers
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication routes
        .route("/auth/signup", post(api::auth::signup))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/session", get(api::auth::current_session))
        // Catalog routes
        .route("/influencers", get(api::influencers::list_influencers))
        .route("/influencers/:id", get(api::influencers::get_influencer))
        .route("/filter-options", get(api::influencers::get_filter_options))
        // Favorites routes
        .route(
            "/favorites",
            get(api::favorites::list_favorites).post(api::favorites::add_favorite),
        )
        .route("/favorites/:id", delete(api::favorites::remove_favorite))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
