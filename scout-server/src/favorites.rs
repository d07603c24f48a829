//! Favorites ledger: per-user bookmarks of catalog entries.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use scout_types::{Favorite, Influencer};

use crate::catalog::CatalogSource;
use crate::db::repositories::{FavoriteRepository, InsertOutcome};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Influencer not found")]
    InfluencerNotFound,
    #[error("Already favorited")]
    AlreadyFavorited,
    #[error("Favorite not found")]
    FavoriteNotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Favorites of a single user
pub struct FavoritesLedger {
    catalog: Arc<dyn CatalogSource>,
    favorites: FavoriteRepository,
    user_id: Uuid,
}

impl FavoritesLedger {
    pub fn new(catalog: Arc<dyn CatalogSource>, favorites: FavoriteRepository, user_id: Uuid) -> Self {
        Self {
            catalog,
            favorites,
            user_id,
        }
    }

    /// Favorited influencers, most recent first. Favorites whose influencer
    /// is no longer in the catalog are skipped.
    pub fn list(&self) -> Result<Vec<Influencer>, LedgerError> {
        let favorites = self.favorites.list_for_user(&self.user_id)?;
        if favorites.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<String, Influencer> = self
            .catalog
            .snapshot()?
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();

        let influencers = favorites
            .iter()
            .filter_map(|f| by_id.remove(&f.influencer_id))
            .collect();

        Ok(influencers)
    }

    pub fn add(&self, influencer_id: &str) -> Result<Favorite, LedgerError> {
        if self.catalog.find(influencer_id)?.is_none() {
            return Err(LedgerError::InfluencerNotFound);
        }

        match self.favorites.insert(&self.user_id, influencer_id)? {
            InsertOutcome::Created(favorite) => {
                tracing::info!("User {} favorited influencer {}", self.user_id, influencer_id);
                Ok(favorite)
            }
            InsertOutcome::Duplicate => Err(LedgerError::AlreadyFavorited),
            // Influencer removed between lookup and insert
            InsertOutcome::MissingReference => Err(LedgerError::InfluencerNotFound),
        }
    }

    pub fn remove(&self, influencer_id: &str) -> Result<Favorite, LedgerError> {
        let removed = self
            .favorites
            .delete(&self.user_id, influencer_id)?
            .ok_or(LedgerError::FavoriteNotFound)?;

        tracing::info!("User {} unfavorited influencer {}", self.user_id, influencer_id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{InfluencerRepository, UserRepository};
    use crate::db::Database;

    fn influencer(id: &str, name: &str) -> Influencer {
        Influencer {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            location: None,
            age: None,
            gender: None,
            followers: None,
            engagement_rate: None,
            avg_likes: None,
            avg_comments: None,
            platforms: Vec::new(),
            topics: Vec::new(),
        }
    }

    fn setup() -> (Database, FavoritesLedger) {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let influencers = InfluencerRepository::new(db.pool.clone());
        for (id, name) in [("1", "Ana Torres"), ("2", "Beto"), ("3", "Carla")] {
            influencers
                .upsert_with_relations(&influencer(id, name), &[], &[])
                .unwrap();
        }

        let user = UserRepository::new(db.pool.clone())
            .create("ana@example.com", "Ana", "hash")
            .unwrap()
            .unwrap();

        let ledger = FavoritesLedger::new(
            Arc::new(InfluencerRepository::new(db.pool.clone())),
            FavoriteRepository::new(db.pool.clone()),
            user.id,
        );
        (db, ledger)
    }

    #[test]
    fn test_add_twice_conflicts_and_keeps_one_record() {
        let (_db, ledger) = setup();
        ledger.add("1").expect("first add succeeds");
        assert!(matches!(ledger.add("1"), Err(LedgerError::AlreadyFavorited)));
        assert_eq!(ledger.list().unwrap().len(), 1);
    }

    #[test]
    fn test_add_unknown_influencer() {
        let (_db, ledger) = setup();
        assert!(matches!(ledger.add("999"), Err(LedgerError::InfluencerNotFound)));
    }

    #[test]
    fn test_remove_twice() {
        let (_db, ledger) = setup();
        assert!(matches!(ledger.remove("1"), Err(LedgerError::FavoriteNotFound)));

        ledger.add("1").unwrap();
        let removed = ledger.remove("1").unwrap();
        assert_eq!(removed.influencer_id, "1");
        assert!(matches!(ledger.remove("1"), Err(LedgerError::FavoriteNotFound)));
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let (_db, ledger) = setup();
        ledger.add("2").unwrap();
        ledger.add("1").unwrap();
        ledger.add("3").unwrap();

        let names: Vec<String> = ledger.list().unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Carla", "Ana Torres", "Beto"]);
    }

    #[test]
    fn test_list_drops_favorites_missing_from_catalog() {
        let (db, ledger) = setup();
        ledger.add("1").unwrap();
        ledger.add("2").unwrap();

        // Orphan a favorite by bypassing the cascade
        let conn = db.connection().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = OFF; DELETE FROM influencers WHERE id = '2';")
            .unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        drop(conn);

        let ids: Vec<String> = ledger.list().unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["1"]);
    }
}
