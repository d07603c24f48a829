use anyhow::{Context, Result};
use rusqlite::{types::Type, Connection, OptionalExtension, Params, Row};
use std::collections::HashMap;
use uuid::Uuid;

use scout_types::{Gender, Influencer};

use crate::db::DbPool;

const INFLUENCER_COLUMNS: &str = "id, name, email, location, age, gender, followers, \
     engagement_rate, avg_likes, avg_comments";

const PLATFORM_NAMES: &str = "SELECT ip.influencer_id, p.name FROM influencer_platforms ip
     JOIN platforms p ON p.id = ip.platform_id";

const TOPIC_NAMES: &str = "SELECT it.influencer_id, t.name FROM influencer_topics it
     JOIN topics t ON t.id = it.topic_id";

pub struct InfluencerRepository {
    pool: DbPool,
}

impl InfluencerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Load the whole catalog with relations, ordered by id
    pub fn list_all(&self) -> Result<Vec<Influencer>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM influencers ORDER BY id",
            INFLUENCER_COLUMNS
        ))?;
        let mut influencers = stmt
            .query_map([], map_influencer)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load influencers")?;

        let mut platforms = load_names(&conn, &format!("{} ORDER BY p.name", PLATFORM_NAMES), [])?;
        let mut topics = load_names(&conn, &format!("{} ORDER BY t.name", TOPIC_NAMES), [])?;

        for influencer in &mut influencers {
            influencer.platforms = platforms.remove(&influencer.id).unwrap_or_default();
            influencer.topics = topics.remove(&influencer.id).unwrap_or_default();
        }

        Ok(influencers)
    }

    /// Get influencer by ID
    pub fn find_by_id(&self, id: &str) -> Result<Option<Influencer>> {
        let conn = self.pool.get()?;
        let influencer = conn
            .query_row(
                &format!("SELECT {} FROM influencers WHERE id = ?", INFLUENCER_COLUMNS),
                [id],
                map_influencer,
            )
            .optional()
            .context("Failed to load influencer")?;

        let Some(mut influencer) = influencer else {
            return Ok(None);
        };

        influencer.platforms = load_names(
            &conn,
            &format!("{} WHERE ip.influencer_id = ? ORDER BY p.name", PLATFORM_NAMES),
            [id],
        )?
        .remove(id)
        .unwrap_or_default();
        influencer.topics = load_names(
            &conn,
            &format!("{} WHERE it.influencer_id = ? ORDER BY t.name", TOPIC_NAMES),
            [id],
        )?
        .remove(id)
        .unwrap_or_default();

        Ok(Some(influencer))
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM influencers", [], |row| row.get(0))?;
        Ok(usize::try_from(count)?)
    }

    /// Create a platform if it doesn't exist and return its id
    pub fn upsert_platform(&self, name: &str) -> Result<String> {
        let conn = self.pool.get()?;
        upsert_named(&conn, "platforms", name)
    }

    /// Create a topic if it doesn't exist and return its id
    pub fn upsert_topic(&self, name: &str) -> Result<String> {
        let conn = self.pool.get()?;
        upsert_named(&conn, "topics", name)
    }

    /// Insert or overwrite an influencer by id and link it to the given
    /// platform and topic ids. Existing links are kept; linking is idempotent.
    pub fn upsert_with_relations(
        &self,
        influencer: &Influencer,
        platform_ids: &[String],
        topic_ids: &[String],
    ) -> Result<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO influencers ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    email = excluded.email,
                    location = excluded.location,
                    age = excluded.age,
                    gender = excluded.gender,
                    followers = excluded.followers,
                    engagement_rate = excluded.engagement_rate,
                    avg_likes = excluded.avg_likes,
                    avg_comments = excluded.avg_comments",
                INFLUENCER_COLUMNS
            ),
            rusqlite::params![
                influencer.id,
                influencer.name,
                influencer.email,
                influencer.location,
                influencer.age,
                influencer.gender.map(|g| g.as_str()),
                to_sql_int(influencer.followers)?,
                influencer.engagement_rate,
                to_sql_int(influencer.avg_likes)?,
                to_sql_int(influencer.avg_comments)?,
            ],
        )
        .with_context(|| format!("Failed to upsert influencer {}", influencer.id))?;

        for platform_id in platform_ids {
            tx.execute(
                "INSERT OR IGNORE INTO influencer_platforms (influencer_id, platform_id) VALUES (?, ?)",
                (&influencer.id, platform_id),
            )
            .context("Failed to link influencer to platform")?;
        }

        for topic_id in topic_ids {
            tx.execute(
                "INSERT OR IGNORE INTO influencer_topics (influencer_id, topic_id) VALUES (?, ?)",
                (&influencer.id, topic_id),
            )
            .context("Failed to link influencer to topic")?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn upsert_named(conn: &Connection, table: &str, name: &str) -> Result<String> {
    conn.execute(
        &format!("INSERT OR IGNORE INTO {} (id, name) VALUES (?, ?)", table),
        (Uuid::new_v4().to_string(), name),
    )
    .with_context(|| format!("Failed to upsert into {}", table))?;

    // Either just created or pre-existing
    let id = conn.query_row(
        &format!("SELECT id FROM {} WHERE name = ?", table),
        [name],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn load_names<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<HashMap<String, Vec<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut names: HashMap<String, Vec<String>> = HashMap::new();
    for (influencer_id, name) in rows {
        names.entry(influencer_id).or_default().push(name);
    }
    Ok(names)
}

fn map_influencer(row: &Row<'_>) -> rusqlite::Result<Influencer> {
    let gender = match row.get::<_, Option<String>>(5)? {
        Some(raw) => Some(Gender::parse(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                Type::Text,
                format!("unknown gender '{}'", raw).into(),
            )
        })?),
        None => None,
    };

    Ok(Influencer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        location: row.get(3)?,
        age: row.get(4)?,
        gender,
        followers: from_sql_int(row, 6)?,
        engagement_rate: row.get(7)?,
        avg_likes: from_sql_int(row, 8)?,
        avg_comments: from_sql_int(row, 9)?,
        platforms: Vec::new(),
        topics: Vec::new(),
    })
}

fn from_sql_int(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u64>> {
    row.get::<_, Option<i64>>(idx)?
        .map(u64::try_from)
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn to_sql_int(value: Option<u64>) -> Result<Option<i64>> {
    value
        .map(i64::try_from)
        .transpose()
        .context("Count too large to store")
}
