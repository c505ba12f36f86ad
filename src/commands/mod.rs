//! UI-facing command layer
//!
//! Thin async facade the embedding shell calls. Commands take the injected
//! `AppState`, return `Result<T, String>`, and keep "phase unknown" as data
//! rather than an error.

pub mod phase;
pub mod suggestions;

use crate::db::AppState;
use crate::location::GeocodeClient;
use crate::models::{Profile, UserIdentity};

pub async fn get_profile(state: &AppState) -> Result<Option<Profile>, String> {
  Ok(state.profiles.read().await)
}

/// Persist the full profile record; subscribers of the store are notified.
pub async fn save_profile(state: &AppState, profile: Profile) -> Result<(), String> {
  state
    .profiles
    .write(&profile)
    .await
    .map_err(|e| format!("Failed to save profile: {}", e))
}

/// Stubbed sign-in: returns a fixed identity per provider. Real auth is a
/// non-goal.
pub async fn sign_in(provider: String) -> Result<UserIdentity, String> {
  Ok(UserIdentity::for_provider(&provider))
}

/// Resolve device coordinates to a coarse place name for the location field.
pub async fn detect_location(lat: f64, lon: f64) -> Result<Option<String>, String> {
  let client = GeocodeClient::new().map_err(|e| format!("Geocoder unavailable: {}", e))?;
  client
    .reverse_geocode(lat, lon)
    .await
    .map_err(|e| format!("Failed to detect location: {}", e))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
