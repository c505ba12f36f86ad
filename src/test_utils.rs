//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Date helpers

use crate::models::{ActivityPreferences, MealPreferences, Profile};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A fully onboarded profile: cycle data, preferences, and location set.
/// Cycle starts 2024-01-01 with a 28-day length.
pub fn mock_profile() -> Profile {
  Profile {
    name: Some("Jane Doe".to_string()),
    email: Some("janedoe@gmail.com".to_string()),
    provider: Some("google".to_string()),
    date_of_birth: Some(date(1996, 4, 12)),
    location: Some("Bangalore".to_string()),
    last_cycle_start: Some("2024-01-01".to_string()),
    cycle_length: Some(28),
    smartwatch_connected: false,
    calendar_connected: true,
    activity_preferences: Some(mock_activity_preferences()),
    meal_preferences: Some(mock_meal_preferences()),
  }
}

/// A minimal profile carrying only cycle data, for calculator tests.
pub fn profile_with_cycle(last_cycle_start: &str, cycle_length: i64) -> Profile {
  Profile {
    last_cycle_start: Some(last_cycle_start.to_string()),
    cycle_length: Some(cycle_length),
    ..Profile::default()
  }
}

pub fn mock_activity_preferences() -> ActivityPreferences {
  ActivityPreferences {
    unwind: vec!["Meditate".to_string(), "Read a book".to_string()],
    exercise: vec!["Yoga".to_string(), "Walking".to_string()],
    frequency: Some("3-4 times/week".to_string()),
  }
}

pub fn mock_meal_preferences() -> MealPreferences {
  MealPreferences {
    demographic: vec!["Young Adult".to_string()],
    cuisine: vec!["Indian".to_string(), "Mediterranean".to_string()],
    dietary: vec!["Vegetarian".to_string()],
    allergies: vec!["Peanuts".to_string()],
    diet_type: Some("None".to_string()),
  }
}

/// ---------------------------------------------------------------------------
/// Date Helpers
/// ---------------------------------------------------------------------------

/// Shorthand for a calendar date in tests
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name='profile_store'",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let profile = mock_profile();
    assert_eq!(profile.cycle_length, Some(28));
    assert!(profile.activity_preferences.is_some());
    assert!(profile.meal_preferences.is_some());

    let minimal = profile_with_cycle("2024-01-01", 28);
    assert!(minimal.name.is_none());
    assert_eq!(minimal.last_cycle_start.as_deref(), Some("2024-01-01"));
  }
}
