use std::sync::Arc;

use crate::auth::AuthPolicy;
use crate::catalog::CatalogSource;
use crate::credentials::{BcryptHasher, PasswordHasher};
use crate::db::repositories::InfluencerRepository;
use crate::db::Database;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    pub auth: AuthPolicy,
    pub catalog: Arc<dyn CatalogSource>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl AppState {
    /// State reading the catalog from the same store as users and favorites
    pub fn new(db: Database, auth: AuthPolicy) -> Self {
        let catalog = Arc::new(InfluencerRepository::new(db.pool.clone()));
        Self::with_catalog(db, auth, catalog)
    }

    pub fn with_catalog(db: Database, auth: AuthPolicy, catalog: Arc<dyn CatalogSource>) -> Self {
        let session_manager = SessionManager::new(db.clone(), auth.session_ttl);
        let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(auth.password_cost));
        Self {
            db,
            session_manager,
            auth,
            catalog,
            hasher,
        }
    }
}
