mod user_repository;
mod influencer_repository;
mod favorite_repository;

pub use user_repository::{normalize_email, UserCredentials, UserRepository};
pub use influencer_repository::InfluencerRepository;
pub use favorite_repository::{FavoriteRepository, InsertOutcome};
