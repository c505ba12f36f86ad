use crate::store::ProfileStore;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::{Path, PathBuf};

pub type DbPool = SqlitePool;

/// Application state handed to the command layer: the injected dependency
/// bundle, never ambient globals.
pub struct AppState {
  pub profiles: ProfileStore,
}

impl AppState {
  pub fn new(pool: DbPool) -> Self {
    Self {
      profiles: ProfileStore::new(pool),
    }
  }
}

/// Get the path to the database file inside the host shell's data directory
fn get_db_path(data_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
  // Create directory if it doesn't exist
  fs::create_dir_all(data_dir)?;

  Ok(data_dir.join("her-companion.db"))
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(data_dir: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
  let db_path = get_db_path(data_dir)?;
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  println!("Initializing database at: {}", db_path.display());

  // Create connection pool
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  // Run migrations
  sqlx::migrate!("./migrations").run(&pool).await?;

  println!("Database initialized successfully");

  Ok(pool)
}
