pub mod auth;
pub mod error;
pub mod favorites;
pub mod influencers;

pub use error::{ApiError, ApiResult};
