//! Suggestion commands
//!
//! Resolve the stored profile and computed phase, then delegate to a
//! `SuggestionProvider`. Production commands build an `OllamaClient` from
//! the environment; the `_with` helpers take the provider as a parameter so
//! tests inject the stub instead.

use crate::cycle;
use crate::db::AppState;
use crate::models::Profile;
use crate::suggestions::{
  ActivitySuggestion, MealPlanRequest, MealSuggestion, OllamaClient, SuggestionProvider,
};
use chrono::{Local, NaiveDate};

/// Fallback when onboarding never captured a location.
const DEFAULT_LOCATION: &str = "New York";

pub async fn get_activity_suggestions(
  state: &AppState,
  date: Option<NaiveDate>,
) -> Result<Vec<ActivitySuggestion>, String> {
  let provider = OllamaClient::from_env();
  activity_suggestions_with(&provider, state, date).await
}

pub async fn get_meal_suggestions(
  state: &AppState,
  date: Option<NaiveDate>,
) -> Result<Vec<MealSuggestion>, String> {
  let provider = OllamaClient::from_env();
  meal_suggestions_with(&provider, state, date).await
}

pub async fn generate_meal_plan(
  state: &AppState,
  request: MealPlanRequest,
) -> Result<String, String> {
  let provider = OllamaClient::from_env();
  meal_plan_with(&provider, state, request).await
}

pub(crate) async fn activity_suggestions_with<P: SuggestionProvider>(
  provider: &P,
  state: &AppState,
  date: Option<NaiveDate>,
) -> Result<Vec<ActivitySuggestion>, String> {
  let profile = require_profile(state).await?;
  let phase = require_phase(&profile, date)?;

  let prefs = profile
    .activity_preferences
    .as_ref()
    .ok_or_else(|| "Activity preferences not set yet".to_string())?;

  provider
    .activity_suggestions(phase, prefs, location_of(&profile))
    .await
    .map_err(|e| format!("Failed to fetch suggestions: {}", e))
}

pub(crate) async fn meal_suggestions_with<P: SuggestionProvider>(
  provider: &P,
  state: &AppState,
  date: Option<NaiveDate>,
) -> Result<Vec<MealSuggestion>, String> {
  let profile = require_profile(state).await?;
  let phase = require_phase(&profile, date)?;

  let prefs = profile
    .meal_preferences
    .as_ref()
    .ok_or_else(|| "Meal preferences not set yet".to_string())?;

  provider
    .meal_suggestions(phase, prefs, profile.demographic(), location_of(&profile))
    .await
    .map_err(|e| format!("Failed to fetch suggestions: {}", e))
}

pub(crate) async fn meal_plan_with<P: SuggestionProvider>(
  provider: &P,
  state: &AppState,
  request: MealPlanRequest,
) -> Result<String, String> {
  let profile = require_profile(state).await?;

  provider
    .meal_plan(&profile, &request)
    .await
    .map_err(|e| format!("Failed to generate meal plan: {}", e))
}

async fn require_profile(state: &AppState) -> Result<Profile, String> {
  state
    .profiles
    .read()
    .await
    .ok_or_else(|| "No profile saved yet".to_string())
}

fn require_phase(profile: &Profile, date: Option<NaiveDate>) -> Result<cycle::Phase, String> {
  let reference = date.unwrap_or_else(|| Local::now().date_naive());
  cycle::phase_for_date(profile, reference)
    .ok_or_else(|| "Cycle phase unknown - add your cycle info first".to_string())
}

fn location_of(profile: &Profile) -> &str {
  profile.location.as_deref().unwrap_or(DEFAULT_LOCATION)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
