use anyhow::{Context, Result};
use clap::Parser;
use scout_server::credentials::{BcryptHasher, DEFAULT_PASSWORD_COST};
use scout_server::db::Database;
use scout_server::seed::{self, SeedReport, DEMO_CATALOG};
use scout_types::Influencer;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Influencer Scout Catalog Seeder
///
/// Loads an influencer catalog (platforms, topics, influencers and their
/// relations) into the database, creating the schema if needed. Re-running
/// with the same input leaves the database unchanged.
#[derive(Parser, Debug)]
#[command(name = "scout-seed")]
#[command(about = "Seed the Influencer Scout catalog and login user", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "./scout.db")]
    database: String,

    /// JSON catalog to load (defaults to the bundled demo catalog)
    #[arg(short, long)]
    influencers: Option<PathBuf>,

    /// Email of the login user to create or refresh
    #[arg(long, default_value = seed::DEMO_USER_EMAIL)]
    user_email: String,

    /// Display name of the login user
    #[arg(long, default_value = seed::DEMO_USER_NAME)]
    user_name: String,

    /// Password of the login user
    #[arg(long, default_value = seed::DEMO_USER_PASSWORD)]
    user_password: String,

    /// bcrypt cost for the login user's password hash
    #[arg(long, default_value_t = DEFAULT_PASSWORD_COST)]
    password_cost: u32,

    /// Skip creating the login user
    #[arg(long)]
    no_user: bool,

    /// Validate the catalog without touching the database
    #[arg(short = 'n', long)]
    dry_run: bool,
}

/// Read and validate the catalog named on the command line
fn load_catalog(path: Option<&PathBuf>) -> Result<Vec<Influencer>> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?,
        None => DEMO_CATALOG.to_string(),
    };
    seed::parse_catalog(&json)
}

/// Open the database, creating the schema when missing
fn connect_database(path: &str) -> Result<Database> {
    println!("Connecting to database: {}", path);

    let db = Database::new(path).context("Failed to open database connection")?;
    db.initialize().context("Failed to initialize database schema")?;

    println!("Database ready - schema verified");
    Ok(db)
}

/// Display seeding statistics in a formatted way
fn display_report(report: &SeedReport, user: Option<&str>, dry_run: bool) {
    println!();
    println!("Seed Summary");
    println!("============");
    println!();
    println!("Platforms: {}", report.platforms);
    println!("Topics: {}", report.topics);
    println!("Influencers: {}", report.influencers);
    if let Some(email) = user {
        println!("Login user: {}", email);
    }

    println!();
    if dry_run {
        println!("This was a dry run - no changes were made to the database.");
    } else {
        println!("Seeding completed successfully!");
    }
}

/// Counts a seeding run would produce, without a database
fn preview(influencers: &[Influencer]) -> SeedReport {
    let platforms: BTreeSet<&str> = influencers
        .iter()
        .flat_map(|i| i.platforms.iter().map(String::as_str))
        .collect();
    let topics: BTreeSet<&str> = influencers
        .iter()
        .flat_map(|i| i.topics.iter().map(String::as_str))
        .collect();

    SeedReport {
        platforms: platforms.len(),
        topics: topics.len(),
        influencers: influencers.len(),
    }
}

fn run(args: &Args) -> Result<SeedReport> {
    let influencers = load_catalog(args.influencers.as_ref())?;
    println!("Loaded {} influencer records", influencers.len());

    if args.dry_run {
        return Ok(preview(&influencers));
    }

    let db = connect_database(&args.database)?;

    println!();
    println!("Seeding catalog...");
    let report = seed::seed_catalog(&db, &influencers)?;

    if !args.no_user {
        seed::seed_user(
            &db,
            &BcryptHasher::new(args.password_cost),
            &args.user_email,
            &args.user_name,
            &args.user_password,
        )?;
    }

    Ok(report)
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Influencer Scout Catalog Seeder");
    println!("===============================");
    println!();
    println!("Database: {}", args.database);
    match &args.influencers {
        Some(path) => println!("Catalog: {}", path.display()),
        None => println!("Catalog: bundled demo catalog"),
    }
    println!("Dry run: {}", args.dry_run);
    println!();

    let report = run(&args)?;
    let user = (!args.no_user).then_some(args.user_email.as_str());
    display_report(&report, user, args.dry_run);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(database: &std::path::Path) -> Args {
        Args::parse_from([
            "scout-seed",
            "--database",
            database.to_str().unwrap(),
            "--password-cost",
            "4",
        ])
    }

    fn count(db_path: &std::path::Path, table: &str) -> i64 {
        let db = Database::new(db_path).unwrap();
        let conn = db.connection().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_seeds_bundled_catalog_twice_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("scout.db");
        let args = args(&db_path);

        let first = run(&args).expect("first run");
        assert_eq!(first.influencers, count(&db_path, "influencers") as usize);
        assert_eq!(count(&db_path, "users"), 1);

        let links = count(&db_path, "influencer_topics");
        let second = run(&args).expect("second run");
        assert_eq!(first, second);
        assert_eq!(count(&db_path, "influencer_topics"), links);
        assert_eq!(count(&db_path, "users"), 1);
    }

    #[test]
    fn test_dry_run_does_not_create_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("scout.db");
        let args = Args::parse_from([
            "scout-seed",
            "--database",
            db_path.to_str().unwrap(),
            "--dry-run",
        ]);

        let report = run(&args).expect("dry run");
        assert!(report.influencers > 0);
        assert!(!db_path.exists());
    }

    #[test]
    fn test_custom_catalog_file_and_no_user() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("scout.db");
        let catalog_path = dir.path().join("catalog.json");
        let mut file = std::fs::File::create(&catalog_path).unwrap();
        write!(
            file,
            r#"[{{"id": 1, "name": "Ana", "platform": ["Instagram"], "topics": ["Food", "Travel"]}}]"#
        )
        .unwrap();

        let args = Args::parse_from([
            "scout-seed",
            "--database",
            db_path.to_str().unwrap(),
            "--influencers",
            catalog_path.to_str().unwrap(),
            "--no-user",
        ]);

        let report = run(&args).expect("seed custom catalog");
        assert_eq!(report, SeedReport { platforms: 1, topics: 2, influencers: 1 });
        assert_eq!(count(&db_path, "users"), 0);
    }

    #[test]
    fn test_invalid_catalog_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("bad.json");
        std::fs::write(&catalog_path, r#"[{"id": "1", "name": "X", "gender": "robot"}]"#).unwrap();

        assert!(load_catalog(Some(&catalog_path)).is_err());
        assert!(load_catalog(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_preview_matches_seeded_counts() {
        let influencers = load_catalog(None).unwrap();
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        assert_eq!(preview(&influencers), seed::seed_catalog(&db, &influencers).unwrap());
    }
}
