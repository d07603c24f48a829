//! Idempotent catalog seeding from a JSON document.
//!
//! Platforms and topics are upserted by name, influencers by id, and the
//! join rows by their composite key, so seeding the same document twice
//! leaves the store unchanged.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use scout_types::{Gender, Influencer, User};

use crate::credentials::PasswordHasher;
use crate::db::repositories::{InfluencerRepository, UserRepository};
use crate::db::Database;

/// Catalog bundled with the server for development and demos
pub const DEMO_CATALOG: &str = include_str!("../data/influencers.json");

pub const DEMO_USER_EMAIL: &str = "demo@example.com";
pub const DEMO_USER_NAME: &str = "Demo";
pub const DEMO_USER_PASSWORD: &str = "password123";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Influencer ids appear as strings or bare numbers in seed files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedId {
    Text(String),
    Number(u64),
}

/// One influencer as it appears in a seed document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedInfluencer {
    id: SeedId,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    followers: Option<i64>,
    #[serde(default)]
    engagement_rate: Option<f64>,
    #[serde(default)]
    avg_likes: Option<i64>,
    #[serde(default)]
    avg_comments: Option<i64>,
    #[serde(default, alias = "platforms")]
    platform: Vec<String>,
    #[serde(default)]
    topics: Vec<String>,
}

impl SeedInfluencer {
    /// Check the record and convert it into a catalog entry
    pub fn validate(self, index: usize) -> Result<Influencer, SeedError> {
        let invalid = |reason: String| SeedError::InvalidRecord { index, reason };

        let id = match self.id {
            SeedId::Text(id) => id.trim().to_string(),
            SeedId::Number(n) => n.to_string(),
        };
        if id.is_empty() {
            return Err(invalid("empty id".to_string()));
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(invalid(format!("influencer {} has an empty name", id)));
        }

        let gender = match blank_to_none(self.gender) {
            Some(raw) => Some(
                Gender::parse(&raw)
                    .ok_or_else(|| invalid(format!("influencer {} has unknown gender '{}'", id, raw)))?,
            ),
            None => None,
        };

        let count = |field: &str, value: Option<i64>| -> Result<Option<u64>, SeedError> {
            value
                .map(|v| {
                    u64::try_from(v)
                        .map_err(|_| invalid(format!("influencer {} has negative {}", id, field)))
                })
                .transpose()
        };

        let age = count("age", self.age)?
            .map(u32::try_from)
            .transpose()
            .map_err(|_| invalid(format!("influencer {} has an out-of-range age", id)))?;
        let followers = count("followers", self.followers)?;
        let avg_likes = count("avgLikes", self.avg_likes)?;
        let avg_comments = count("avgComments", self.avg_comments)?;

        if let Some(rate) = self.engagement_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(invalid(format!("influencer {} has invalid engagementRate", id)));
            }
        }

        Ok(Influencer {
            id,
            name,
            email: blank_to_none(self.email),
            location: blank_to_none(self.location),
            age,
            gender,
            followers,
            engagement_rate: self.engagement_rate,
            avg_likes,
            avg_comments,
            platforms: distinct_names(self.platform),
            topics: distinct_names(self.topics),
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn distinct_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse and validate a seed document (a JSON array of influencers)
pub fn parse_catalog(json: &str) -> Result<Vec<Influencer>> {
    let records: Vec<SeedInfluencer> =
        serde_json::from_str(json).context("Failed to parse seed document")?;

    let influencers = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(influencers)
}

/// Counts of what a seeding run touched
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub platforms: usize,
    pub topics: usize,
    pub influencers: usize,
}

/// Upsert platforms, topics and influencers with their relations
pub fn seed_catalog(db: &Database, influencers: &[Influencer]) -> Result<SeedReport> {
    let repo = InfluencerRepository::new(db.pool.clone());

    let platform_names: BTreeSet<&str> = influencers
        .iter()
        .flat_map(|i| i.platforms.iter().map(String::as_str))
        .collect();
    let topic_names: BTreeSet<&str> = influencers
        .iter()
        .flat_map(|i| i.topics.iter().map(String::as_str))
        .collect();

    let mut platform_ids = HashMap::new();
    for name in &platform_names {
        platform_ids.insert(*name, repo.upsert_platform(name)?);
    }
    tracing::debug!("Upserted {} platforms", platform_ids.len());

    let mut topic_ids = HashMap::new();
    for name in &topic_names {
        topic_ids.insert(*name, repo.upsert_topic(name)?);
    }
    tracing::debug!("Upserted {} topics", topic_ids.len());

    for influencer in influencers {
        let platforms: Vec<String> = influencer
            .platforms
            .iter()
            .filter_map(|p| platform_ids.get(p.as_str()).cloned())
            .collect();
        let topics: Vec<String> = influencer
            .topics
            .iter()
            .filter_map(|t| topic_ids.get(t.as_str()).cloned())
            .collect();

        repo.upsert_with_relations(influencer, &platforms, &topics)?;
    }

    tracing::info!(
        "Seeded {} influencers ({} platforms, {} topics)",
        influencers.len(),
        platform_ids.len(),
        topic_ids.len()
    );

    Ok(SeedReport {
        platforms: platform_ids.len(),
        topics: topic_ids.len(),
        influencers: influencers.len(),
    })
}

/// Create or refresh a user with the given credentials
pub fn seed_user(
    db: &Database,
    hasher: &dyn PasswordHasher,
    email: &str,
    name: &str,
    password: &str,
) -> Result<User> {
    let user = UserRepository::new(db.pool.clone())
        .upsert_by_email(email, name, &hasher.hash(password)?)?;
    tracing::info!("Seeded user {}", user.email);
    Ok(user)
}

/// Seed the bundled catalog and the demo user
pub fn seed_demo(db: &Database, hasher: &dyn PasswordHasher) -> Result<SeedReport> {
    let influencers = parse_catalog(DEMO_CATALOG)?;
    let report = seed_catalog(db, &influencers)?;
    seed_user(db, hasher, DEMO_USER_EMAIL, DEMO_USER_NAME, DEMO_USER_PASSWORD)?;
    Ok(report)
}
