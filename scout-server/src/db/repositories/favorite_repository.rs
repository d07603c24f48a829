use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{ffi, OptionalExtension, Row};
use uuid::Uuid;

use scout_types::Favorite;

use crate::db::{format_timestamp, parse_timestamp, parse_uuid, DbPool};

/// Result of attempting to store a favorite
#[derive(Debug)]
pub enum InsertOutcome {
    Created(Favorite),
    /// The (user, influencer) pair already exists
    Duplicate,
    /// The user or influencer row does not exist
    MissingReference,
}

pub struct FavoriteRepository {
    pool: DbPool,
}

impl FavoriteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a favorite. Uniqueness is left to the UNIQUE constraint so
    /// concurrent inserts of the same pair cannot both succeed.
    pub fn insert(&self, user_id: &Uuid, influencer_id: &str) -> Result<InsertOutcome> {
        let conn = self.pool.get()?;
        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id: *user_id,
            influencer_id: influencer_id.to_string(),
            created_at: Utc::now(),
        };

        let result = conn.execute(
            "INSERT INTO favorites (id, user_id, influencer_id, created_at) VALUES (?, ?, ?, ?)",
            (
                favorite.id.to_string(),
                favorite.user_id.to_string(),
                &favorite.influencer_id,
                format_timestamp(&favorite.created_at),
            ),
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Created(favorite)),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Ok(InsertOutcome::Duplicate)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Ok(InsertOutcome::MissingReference)
            }
            Err(e) => Err(e).context("Failed to insert favorite"),
        }
    }

    /// Delete a user's favorite, returning the removed row if there was one
    pub fn delete(&self, user_id: &Uuid, influencer_id: &str) -> Result<Option<Favorite>> {
        let conn = self.pool.get()?;
        let favorite = conn
            .query_row(
                "DELETE FROM favorites WHERE user_id = ? AND influencer_id = ?
                 RETURNING id, user_id, influencer_id, created_at",
                (user_id.to_string(), influencer_id),
                map_favorite,
            )
            .optional()
            .context("Failed to delete favorite")?;
        Ok(favorite)
    }

    /// A user's favorites, most recent first
    pub fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Favorite>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, influencer_id, created_at
             FROM favorites
             WHERE user_id = ?
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let favorites = stmt
            .query_map([user_id.to_string()], map_favorite)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list favorites")?;

        Ok(favorites)
    }
}

fn map_favorite(row: &Row<'_>) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        id: parse_uuid(0, &row.get::<_, String>(0)?)?,
        user_id: parse_uuid(1, &row.get::<_, String>(1)?)?,
        influencer_id: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}
