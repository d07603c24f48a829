// Library exports for scout-server
// The binary, the seeding tool and the integration tests all build on these modules

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod db;
pub mod favorites;
pub mod routes;
pub mod seed;
pub mod session;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
