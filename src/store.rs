//! Profile persistence and change notification
//!
//! A key-value store over SQLite: one fixed key holds the whole profile
//! record as JSON, and every write replaces it wholesale. Observers get a
//! revision bump through a watch channel and re-read the full record, so no
//! partial-update race is possible.

use crate::db::DbPool;
use crate::models::Profile;
use thiserror::Error;
use tokio::sync::watch;

/// The single store key under which the profile record lives.
const PROFILE_KEY: &str = "her_profile";

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Serialization failed: {0}")]
  Serialize(String),

  #[error("Database error: {0}")]
  Database(String),
}

/// Handle to the persisted profile record. Cheap to clone; clones share the
/// same notification channel.
#[derive(Clone)]
pub struct ProfileStore {
  db: DbPool,
  changes: watch::Sender<u64>,
}

impl ProfileStore {
  pub fn new(db: DbPool) -> Self {
    let (changes, _) = watch::channel(0);
    Self { db, changes }
  }

  /// Read the persisted profile, or `None` if none exists.
  ///
  /// Storage failures and unparsable JSON also degrade to `None`: a broken
  /// record means "no profile yet", never an error the UI has to handle.
  pub async fn read(&self) -> Option<Profile> {
    let row: Option<(String,)> =
      sqlx::query_as("SELECT value FROM profile_store WHERE key = ?1")
        .bind(PROFILE_KEY)
        .fetch_optional(&self.db)
        .await
        .ok()?;

    row.and_then(|(value,)| serde_json::from_str(&value).ok())
  }

  /// Persist a full profile record, replacing any prior value, then notify
  /// subscribers.
  pub async fn write(&self, profile: &Profile) -> Result<(), StoreError> {
    let value =
      serde_json::to_string(profile).map_err(|e| StoreError::Serialize(e.to_string()))?;

    sqlx::query(
      r#"
      INSERT INTO profile_store (key, value, updated_at)
      VALUES (?1, ?2, CURRENT_TIMESTAMP)
      ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(PROFILE_KEY)
    .bind(value)
    .execute(&self.db)
    .await
    .map_err(|e| StoreError::Database(e.to_string()))?;

    // Fire-and-forget: subscribers re-read the full record on wake
    self.changes.send_modify(|rev| *rev += 1);

    Ok(())
  }

  /// Subscribe to change notifications. The carried value is a revision
  /// counter; the record itself is re-read through `read`.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.changes.subscribe()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
