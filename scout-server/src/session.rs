use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::{format_timestamp, Database};

/// Identity claimed by a live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub email: String,
}

/// Database-backed session manager for persistent authentication
///
/// Manages user sessions with token-based authentication, including:
/// - Session creation with UUID v4 tokens
/// - Session validation with expiry checking
/// - Session deletion (logout)
/// - Cleanup of expired sessions
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(db: Database, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Create a new session for a user and return its token
    pub fn create_session(&self, user_id: Uuid, email: &str) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + self.ttl;

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, email, created_at, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                token,
                user_id.to_string(),
                email,
                format_timestamp(&created_at),
                format_timestamp(&expires_at),
            ],
        )
        .context("Failed to create session")?;

        tracing::info!("Created session for user {}", user_id);
        Ok(token)
    }

    /// Resolve a token to its identity.
    ///
    /// Returns `None` for unknown or expired tokens; an expired session is
    /// deleted on sight.
    pub fn validate_session(&self, token: &str) -> Result<Option<SessionIdentity>> {
        let row: Option<(String, String, String)> = {
            let conn = self.db.connection()?;
            conn.query_row(
                "SELECT user_id, email, expires_at FROM sessions WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .context("Failed to look up session")?
        };

        let Some((user_id, email, expires_at)) = row else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .context("Failed to parse expiry time")?
            .with_timezone(&Utc);

        if Utc::now() > expires_at {
            self.delete_session(token)?;
            tracing::debug!("Rejected expired session for user {}", user_id);
            return Ok(None);
        }

        let user_id = Uuid::parse_str(&user_id).context("Failed to parse user ID")?;
        Ok(Some(SessionIdentity { user_id, email }))
    }

    /// Delete a session (logout). Returns whether a session was removed.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let conn = self.db.connection()?;
        let rows_affected = conn
            .execute("DELETE FROM sessions WHERE token = ?1", rusqlite::params![token])
            .context("Failed to delete session")?;

        if rows_affected > 0 {
            tracing::info!("Deleted session");
        }

        Ok(rows_affected > 0)
    }

    /// Remove all sessions past their expiry time
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let now = format_timestamp(&Utc::now());

        let rows_affected = conn
            .execute("DELETE FROM sessions WHERE expires_at < ?1", rusqlite::params![now])
            .context("Failed to cleanup expired sessions")?;

        if rows_affected > 0 {
            tracing::info!("Cleaned up {} expired sessions", rows_affected);
        }

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440099";

    fn setup() -> (Database, SessionManager, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let manager = SessionManager::new(db.clone(), Duration::days(30));
        (db, manager, Uuid::parse_str(USER_ID).unwrap())
    }

    fn expire(db: &Database, token: &str) {
        let conn = db.connection().expect("Failed to get connection");
        let expired_time = format_timestamp(&(Utc::now() - Duration::days(1)));
        conn.execute(
            "UPDATE sessions SET expires_at = ?1 WHERE token = ?2",
            rusqlite::params![expired_time, token],
        )
        .expect("Failed to expire session");
    }

    #[test]
    fn test_create_and_validate_session() {
        let (_db, manager, user_id) = setup();

        let token = manager
            .create_session(user_id, "ana@example.com")
            .expect("Failed to create session");
        assert!(Uuid::parse_str(&token).is_ok(), "Token should be a valid UUID");

        let identity = manager
            .validate_session(&token)
            .expect("Failed to validate session")
            .expect("session should be live");
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "ana@example.com");
    }

    #[test]
    fn test_validate_unknown_session() {
        let (_db, manager, _) = setup();
        assert!(manager.validate_session("invalid-token").unwrap().is_none());
    }

    #[test]
    fn test_delete_session() {
        let (_db, manager, user_id) = setup();
        let token = manager.create_session(user_id, "ana@example.com").unwrap();

        assert!(manager.delete_session(&token).unwrap());
        assert!(!manager.delete_session(&token).unwrap());
        assert!(manager.validate_session(&token).unwrap().is_none());
    }

    #[test]
    fn test_expired_session_is_rejected_and_removed() {
        let (db, manager, user_id) = setup();
        let token = manager.create_session(user_id, "ana@example.com").unwrap();
        expire(&db, &token);

        assert!(manager.validate_session(&token).unwrap().is_none());

        let conn = db.connection().unwrap();
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_cleanup_expired_sessions() {
        let (db, manager, user_id) = setup();
        let stale = manager.create_session(user_id, "ana@example.com").unwrap();
        let live = manager.create_session(user_id, "ana@example.com").unwrap();
        expire(&db, &stale);

        assert_eq!(manager.cleanup_expired_sessions().unwrap(), 1);
        assert!(manager.validate_session(&live).unwrap().is_some());
    }

    #[test]
    fn test_session_token_uniqueness() {
        let (_db, manager, user_id) = setup();
        let token1 = manager.create_session(user_id, "a@example.com").unwrap();
        let token2 = manager.create_session(user_id, "a@example.com").unwrap();
        assert_ne!(token1, token2);
    }
}
