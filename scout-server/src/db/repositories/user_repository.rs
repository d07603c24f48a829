use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{ffi, OptionalExtension, Row};
use uuid::Uuid;

use scout_types::User;

use crate::db::{format_timestamp, parse_timestamp, parse_uuid, DbPool};

/// A user row together with its stored credential hash
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE id = ?",
                [user_id.to_string()],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.get_credentials(email)?.map(|c| c.user))
    }

    /// Get user and password hash by email, for login
    pub fn get_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let conn = self.pool.get()?;
        let credentials = conn
            .query_row(
                "SELECT id, email, name, created_at, password_hash FROM users WHERE email = ?",
                [normalize_email(email)],
                |row| {
                    Ok(UserCredentials {
                        user: map_user(row)?,
                        password_hash: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(credentials)
    }

    /// Create a new user. Returns `None` if the email is already taken.
    pub fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = User {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };

        let result = conn.execute(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.email,
                &user.name,
                password_hash,
                format_timestamp(&user.created_at),
            ),
        );

        match result {
            Ok(_) => Ok(Some(user)),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to create user"),
        }
    }

    /// Create or update a user keyed by email (used by seeding)
    pub fn upsert_by_email(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET name = excluded.name, password_hash = excluded.password_hash",
            (
                Uuid::new_v4().to_string(),
                normalize_email(email),
                name.trim(),
                password_hash,
                format_timestamp(&Utc::now()),
            ),
        )
        .context("Failed to upsert user")?;
        drop(conn);

        self.get_by_email(email)?
            .context("Upserted user not found")
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(0, &row.get::<_, String>(0)?)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> UserRepository {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        UserRepository::new(db.pool)
    }

    #[test]
    fn test_create_and_lookup() {
        let repo = setup();
        let user = repo
            .create(" Ana@Example.com ", "Ana", "hash")
            .unwrap()
            .expect("user should be created");
        assert_eq!(user.email, "ana@example.com");

        let by_id = repo.get_by_id(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "ana@example.com");

        let creds = repo.get_credentials("ANA@example.com").unwrap().unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "hash");
    }

    #[test]
    fn test_create_duplicate_email_returns_none() {
        let repo = setup();
        repo.create("ana@example.com", "Ana", "hash").unwrap();
        assert!(repo.create("ana@example.com", "Other", "hash").unwrap().is_none());
    }

    #[test]
    fn test_upsert_by_email_keeps_id() {
        let repo = setup();
        let first = repo.upsert_by_email("demo@example.com", "Demo", "h1").unwrap();
        let second = repo.upsert_by_email("demo@example.com", "Demo User", "h2").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Demo User");
        assert_eq!(repo.get_credentials("demo@example.com").unwrap().unwrap().password_hash, "h2");
    }
}
