/// SQL schema for the Scout database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Influencers table (populated by the seeder, read-only at request time)
CREATE TABLE IF NOT EXISTS influencers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    location TEXT,
    age INTEGER CHECK(age IS NULL OR age >= 0),
    gender TEXT CHECK(gender IS NULL OR gender IN ('male', 'female', 'non-binary')),
    followers INTEGER CHECK(followers IS NULL OR followers >= 0),
    engagement_rate REAL CHECK(engagement_rate IS NULL OR engagement_rate >= 0),
    avg_likes INTEGER CHECK(avg_likes IS NULL OR avg_likes >= 0),
    avg_comments INTEGER CHECK(avg_comments IS NULL OR avg_comments >= 0)
);

-- Platforms and topics (unique names)
CREATE TABLE IF NOT EXISTS platforms (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL
);

-- Influencer-platform junction table
CREATE TABLE IF NOT EXISTS influencer_platforms (
    influencer_id TEXT NOT NULL,
    platform_id TEXT NOT NULL,
    PRIMARY KEY (influencer_id, platform_id),
    FOREIGN KEY (influencer_id) REFERENCES influencers(id) ON DELETE CASCADE,
    FOREIGN KEY (platform_id) REFERENCES platforms(id) ON DELETE CASCADE
);

-- Influencer-topic junction table
CREATE TABLE IF NOT EXISTS influencer_topics (
    influencer_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    PRIMARY KEY (influencer_id, topic_id),
    FOREIGN KEY (influencer_id) REFERENCES influencers(id) ON DELETE CASCADE,
    FOREIGN KEY (topic_id) REFERENCES topics(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_influencer_platforms_platform ON influencer_platforms(platform_id);
CREATE INDEX IF NOT EXISTS idx_influencer_topics_topic ON influencer_topics(topic_id);

-- Favorites (one row per user/influencer pair)
CREATE TABLE IF NOT EXISTS favorites (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    influencer_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, influencer_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (influencer_id) REFERENCES influencers(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_favorites_user_created ON favorites(user_id, created_at DESC);

-- Sessions carry an email claim and are not tied to the users table,
-- so a session may outlive the user row it was issued for.
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
"#;
