//! Suggestion service backed by a local Ollama instance
//!
//! This module handles communication with the text-generation backend for
//! phase-appropriate activity and meal suggestions. The model's free-text
//! output is parsed best-effort: structure that can't be extracted is simply
//! absent, never an error.

use crate::cycle::Phase;
use crate::models::{ActivityPreferences, MealPreferences, Profile};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "mistral";

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SuggestionError {
  #[error("Request failed: {0}")]
  Request(String),

  #[error("Backend error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Ollama API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OllamaRequest {
  model: String,
  prompt: String,
  stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
  response: String,
}

/// ---------------------------------------------------------------------------
/// Suggestion Types
/// ---------------------------------------------------------------------------

/// A single activity/self-care suggestion. The link and the nearby hint are
/// extracted from the model's prose when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySuggestion {
  pub text: String,
  pub video_link: Option<String>,
  pub nearby_activity: Option<String>,
}

/// A single meal suggestion, parsed from the model's JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSuggestion {
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub recipe_link: Option<String>,
  #[serde(default)]
  pub nearby: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MealSuggestionList {
  #[serde(default)]
  suggestions: Vec<MealSuggestion>,
}

/// Parameters for multi-day meal plan generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
  pub period_days: u32,
  #[serde(default)]
  pub cuisine: Option<String>,
  #[serde(default)]
  pub diet: Option<String>,
  #[serde(default)]
  pub notes: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Provider Interface
/// ---------------------------------------------------------------------------

/// The single suggestion interface. Production code uses [`OllamaClient`];
/// tests and offline runs inject [`StubSuggestions`].
#[allow(async_fn_in_trait)]
pub trait SuggestionProvider {
  async fn activity_suggestions(
    &self,
    phase: Phase,
    prefs: &ActivityPreferences,
    location: &str,
  ) -> Result<Vec<ActivitySuggestion>, SuggestionError>;

  async fn meal_suggestions(
    &self,
    phase: Phase,
    prefs: &MealPreferences,
    demographic: &str,
    location: &str,
  ) -> Result<Vec<MealSuggestion>, SuggestionError>;

  async fn meal_plan(
    &self,
    profile: &Profile,
    request: &MealPlanRequest,
  ) -> Result<String, SuggestionError>;
}

/// ---------------------------------------------------------------------------
/// Ollama Client
/// ---------------------------------------------------------------------------

pub struct OllamaClient {
  client: Client,
  base_url: String,
  model: String,
}

impl OllamaClient {
  pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      base_url: base_url.into(),
      model: model.into(),
    }
  }

  /// Build a client from `OLLAMA_URL` / `OLLAMA_MODEL`, falling back to the
  /// local defaults. A `.env` file is honored when present.
  pub fn from_env() -> Self {
    dotenvy::dotenv().ok();

    let base_url =
      std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
    let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    Self::new(base_url, model)
  }

  /// Send a prompt to the generate endpoint and return the raw completion.
  pub async fn generate(&self, prompt: &str) -> Result<String, SuggestionError> {
    let request = OllamaRequest {
      model: self.model.clone(),
      prompt: prompt.to_string(),
      stream: false,
    };

    let response = self
      .client
      .post(format!("{}/api/generate", self.base_url))
      .json(&request)
      .send()
      .await
      .map_err(|e| SuggestionError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| SuggestionError::Request(e.to_string()))?;

    if !status.is_success() {
      return Err(SuggestionError::Api(format!("HTTP {}: {}", status, body)));
    }

    let parsed: OllamaResponse =
      serde_json::from_str(&body).map_err(|e| SuggestionError::Parse(e.to_string()))?;

    Ok(parsed.response)
  }
}

impl SuggestionProvider for OllamaClient {
  async fn activity_suggestions(
    &self,
    phase: Phase,
    prefs: &ActivityPreferences,
    location: &str,
  ) -> Result<Vec<ActivitySuggestion>, SuggestionError> {
    let prompt = activity_prompt(phase, prefs, location);
    let response = self.generate(&prompt).await?;
    Ok(parse_activity_suggestions(&response))
  }

  async fn meal_suggestions(
    &self,
    phase: Phase,
    prefs: &MealPreferences,
    demographic: &str,
    location: &str,
  ) -> Result<Vec<MealSuggestion>, SuggestionError> {
    let prompt = meal_prompt(phase, prefs, demographic, location);
    let response = self.generate(&prompt).await?;
    parse_meal_suggestions(&response)
  }

  async fn meal_plan(
    &self,
    profile: &Profile,
    request: &MealPlanRequest,
  ) -> Result<String, SuggestionError> {
    let prompt = meal_plan_prompt(profile, request);
    let response = self.generate(&prompt).await?;
    Ok(response.trim().to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Prompts
/// ---------------------------------------------------------------------------

fn activity_prompt(phase: Phase, prefs: &ActivityPreferences, location: &str) -> String {
  format!(
    r#"Given the following information about a person's menstrual cycle phase, preferences, and location, provide 4 personalized suggestions for activities and self-care. Include specific YouTube video links for guided activities and suggestions for nearby activities based on their location.

Phase: {phase}
Location: {location}
Preferred ways to unwind: {unwind}
Preferred exercises: {exercise}
Exercise frequency: {frequency}

Please provide 4 specific suggestions that combine their preferences with what's beneficial during their {phase} phase. For each suggestion:
1. Include a specific YouTube video link for guided activities (like yoga, meditation, or workouts)
2. Suggest nearby activities based on their location
3. Make the suggestions specific to their preferences and current phase
4. Format each suggestion as a complete sentence with the YouTube link and location-based activity

IMPORTANT: Format YouTube links exactly like this: [https://www.youtube.com/watch?v=VIDEO_ID]

Example format for each suggestion:
"During your {phase} phase, try this gentle yoga session [https://www.youtube.com/watch?v=dQw4w9WgXcQ] and consider visiting [nearby activity] in {location} to unwind. This combination aligns well with your preference for [specific preference]."

Please ensure the suggestions are practical, safe, and appropriate for their current phase."#,
    phase = phase,
    location = location,
    unwind = prefs.unwind_summary(),
    exercise = prefs.exercise_summary(),
    frequency = prefs.frequency.as_deref().unwrap_or("unspecified"),
  )
}

fn meal_prompt(phase: Phase, prefs: &MealPreferences, demographic: &str, location: &str) -> String {
  format!(
    r#"Suggest 4 meals for a person in the {phase} phase of their menstrual cycle.

Demographic: {demographic}
Location: {location}
Preferred cuisines: {cuisine}
Dietary restrictions: {dietary}
Allergies: {allergies}
Diet plan: {diet_type}

Each meal should support what's beneficial during the {phase} phase and must respect every restriction and allergy listed above.

Respond with valid JSON in this exact format:
{{
  "suggestions": [
    {{
      "title": "Meal name",
      "description": "Why this meal suits the {phase} phase (1-2 sentences)",
      "recipeLink": "https://... or null",
      "nearby": "A place in {location} serving something similar, or null"
    }}
  ]
}}"#,
    phase = phase,
    demographic = demographic,
    location = location,
    cuisine = prefs.cuisine_summary(),
    dietary = prefs.dietary_summary(),
    allergies = prefs.allergy_summary(),
    diet_type = prefs.diet_type.as_deref().unwrap_or("None"),
  )
}

fn meal_plan_prompt(profile: &Profile, request: &MealPlanRequest) -> String {
  format!(
    r#"Create a meal plan for {days} day(s) with sections for Breakfast, Lunch, Snacks, and Dinner on each day.

Cuisine: {cuisine}
Diet: {diet}
Notes: {notes}
Demographic: {demographic}
Location: {location}

Keep portions realistic and ingredients easy to find locally."#,
    days = request.period_days,
    cuisine = request.cuisine.as_deref().unwrap_or("any"),
    diet = request.diet.as_deref().unwrap_or("none"),
    notes = request.notes.as_deref().unwrap_or("none"),
    demographic = profile.demographic(),
    location = profile.location.as_deref().unwrap_or("unspecified"),
  )
}

/// ---------------------------------------------------------------------------
/// Response Parsing
/// ---------------------------------------------------------------------------

/// Split the model's prose into one suggestion per non-empty line, pulling
/// out a bracketed YouTube link and a "visiting X in ..." hint where present.
pub fn parse_activity_suggestions(text: &str) -> Vec<ActivitySuggestion> {
  text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(|line| ActivitySuggestion {
      text: line.to_string(),
      video_link: extract_video_link(line),
      nearby_activity: extract_nearby_activity(line),
    })
    .collect()
}

/// Extract a `[https://www.youtube.com/watch?v=...]` link from a line.
fn extract_video_link(line: &str) -> Option<String> {
  const MARKER: &str = "[https://www.youtube.com/watch?v=";

  let start = line.find(MARKER)? + 1;
  let end = line[start..].find(']')? + start;
  let link = &line[start..end];

  // The video id is the part after the marker; reject empty or spaced ids
  let id = &link[MARKER.len() - 1..];
  if id.is_empty() || id.contains(char::is_whitespace) {
    return None;
  }

  Some(link.to_string())
}

/// Extract the nearby-activity hint from "... visiting <activity> in <place>".
fn extract_nearby_activity(line: &str) -> Option<String> {
  let start = line.find("visiting ")? + "visiting ".len();
  let rest = &line[start..];
  let end = rest.find(" in ")?;
  let activity = rest[..end].trim().trim_end_matches('.');

  if activity.is_empty() {
    None
  } else {
    Some(activity.to_string())
  }
}

/// Parse the meal response. The model is asked for JSON but wraps it in
/// markdown fences often enough that extraction has to be tolerant.
pub fn parse_meal_suggestions(text: &str) -> Result<Vec<MealSuggestion>, SuggestionError> {
  let json_str = extract_json(text)?;

  let list: MealSuggestionList = serde_json::from_str(&json_str)
    .map_err(|e| SuggestionError::Parse(format!("{}: {}", e, json_str)))?;

  Ok(list.suggestions)
}

/// Extract JSON from a model response (handles markdown code blocks)
fn extract_json(text: &str) -> Result<String, SuggestionError> {
  // Try direct parse first
  if text.trim().starts_with('{') {
    return Ok(text.trim().to_string());
  }

  // Look for JSON in code blocks
  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  // Look for plain code blocks
  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  // Last resort: find first { to last }
  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    return Ok(text[start..=end].to_string());
  }

  Err(SuggestionError::Parse(
    "Could not extract JSON from response".to_string(),
  ))
}

/// ---------------------------------------------------------------------------
/// Stub Provider
/// ---------------------------------------------------------------------------

/// Deterministic provider for tests and offline runs. Output echoes the
/// phase and preferences so callers can assert the wiring without a backend.
pub struct StubSuggestions;

impl SuggestionProvider for StubSuggestions {
  async fn activity_suggestions(
    &self,
    phase: Phase,
    prefs: &ActivityPreferences,
    location: &str,
  ) -> Result<Vec<ActivitySuggestion>, SuggestionError> {
    let unwind = prefs
      .unwind
      .first()
      .map(|s| s.to_lowercase())
      .unwrap_or_else(|| "self-care".to_string());
    let exercise = prefs
      .exercise
      .first()
      .map(|s| s.to_lowercase())
      .unwrap_or_else(|| "movement".to_string());

    Ok(vec![
      ActivitySuggestion {
        text: format!("Try a relaxing {} session during your {} phase.", unwind, phase),
        video_link: None,
        nearby_activity: None,
      },
      ActivitySuggestion {
        text: format!("Incorporate {} exercises, as you enjoy them!", exercise),
        video_link: None,
        nearby_activity: None,
      },
      ActivitySuggestion {
        text: format!("Balance activity with rest near {}.", location),
        video_link: None,
        nearby_activity: None,
      },
      ActivitySuggestion {
        text: "Remember to listen to your body and uplift your mood with self-care!".to_string(),
        video_link: None,
        nearby_activity: None,
      },
    ])
  }

  async fn meal_suggestions(
    &self,
    phase: Phase,
    prefs: &MealPreferences,
    demographic: &str,
    _location: &str,
  ) -> Result<Vec<MealSuggestion>, SuggestionError> {
    let cuisine = prefs
      .cuisine
      .first()
      .cloned()
      .unwrap_or_else(|| "home-style".to_string());

    Ok(vec![
      MealSuggestion {
        title: format!("{} grain bowl", cuisine),
        description: format!("A balanced bowl suited to the {} phase ({}).", phase, demographic),
        recipe_link: None,
        nearby: None,
      },
      MealSuggestion {
        title: "Lentil soup".to_string(),
        description: format!("Iron-friendly comfort food for the {} phase.", phase),
        recipe_link: None,
        nearby: None,
      },
    ])
  }

  async fn meal_plan(
    &self,
    profile: &Profile,
    request: &MealPlanRequest,
  ) -> Result<String, SuggestionError> {
    Ok(format!(
      "Meal Plan for {} day(s)\n\nBreakfast: Oats with berries\nLunch: Grilled veggies with quinoa\nSnacks: Mixed nuts and fruit\nDinner: Lentil soup with whole grain bread\n\n(Cuisine: {}, Diet: {}, Location: {})",
      request.period_days,
      request.cuisine.as_deref().unwrap_or("any"),
      request.diet.as_deref().unwrap_or("none"),
      profile.location.as_deref().unwrap_or("unspecified"),
    ))
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_activity_preferences, mock_meal_preferences, mock_profile};
  use serial_test::serial;

  /// Exercise a provider through the trait, the way the command layer does.
  async fn fetch_via_trait<P: SuggestionProvider>(
    provider: &P,
  ) -> Result<Vec<ActivitySuggestion>, SuggestionError> {
    provider
      .activity_suggestions(Phase::Follicular, &mock_activity_preferences(), "Bangalore")
      .await
  }

  #[test]
  fn test_extract_json_direct() {
    let input = r#"{"suggestions": []}"#;
    let result = extract_json(input).unwrap();
    assert!(result.contains("suggestions"));
  }

  #[test]
  fn test_extract_json_code_block() {
    let input = r#"Here are your meals:

```json
{"suggestions": [{"title": "Oats"}]}
```

Enjoy!"#;
    let result = extract_json(input).unwrap();
    assert!(result.contains("Oats"));
  }

  #[test]
  fn test_extract_json_fallback() {
    let input = r#"The meals are {"suggestions": []} as requested."#;
    let result = extract_json(input).unwrap();
    assert!(result.contains("suggestions"));
  }

  #[test]
  fn test_parse_activity_suggestions_extracts_structure() {
    let response = "During your Luteal phase, try this gentle yoga session [https://www.youtube.com/watch?v=dQw4w9WgXcQ] and consider visiting Cubbon Park in Bangalore to unwind.\n\nJournal for ten minutes before bed.";

    let suggestions = parse_activity_suggestions(response);
    assert_eq!(suggestions.len(), 2);

    assert_eq!(
      suggestions[0].video_link.as_deref(),
      Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
    assert_eq!(suggestions[0].nearby_activity.as_deref(), Some("Cubbon Park"));

    // Plain prose keeps its text with no extracted structure
    assert!(suggestions[1].video_link.is_none());
    assert!(suggestions[1].nearby_activity.is_none());
  }

  #[test]
  fn test_parse_activity_suggestions_tolerates_malformed_links() {
    let response = "Watch [https://www.youtube.com/watch?v=] for more.\nVisit [not a link] today.";
    let suggestions = parse_activity_suggestions(response);

    assert_eq!(suggestions.len(), 2);
    assert!(suggestions.iter().all(|s| s.video_link.is_none()));
  }

  #[test]
  fn test_parse_meal_suggestions_full_and_partial() {
    let response = r#"```json
{"suggestions": [
  {"title": "Spinach dal", "description": "Iron rich.", "recipeLink": "https://example.com/dal", "nearby": "MTR"},
  {"title": "Fruit bowl"}
]}
```"#;

    let meals = parse_meal_suggestions(response).unwrap();
    assert_eq!(meals.len(), 2);
    assert_eq!(meals[0].recipe_link.as_deref(), Some("https://example.com/dal"));

    // Missing substructure defaults instead of failing
    assert_eq!(meals[1].title, "Fruit bowl");
    assert!(meals[1].description.is_empty());
    assert!(meals[1].recipe_link.is_none());
  }

  #[test]
  fn test_parse_meal_suggestions_malformed_is_parse_error() {
    let result = parse_meal_suggestions("no json here at all");
    assert!(matches!(result, Err(SuggestionError::Parse(_))));
  }

  #[test]
  fn test_prompts_carry_phase_and_preferences() {
    let prefs = mock_activity_preferences();
    let prompt = activity_prompt(Phase::Ovulatory, &prefs, "Bangalore");
    assert!(prompt.contains("Phase: Ovulatory"));
    assert!(prompt.contains("Bangalore"));
    assert!(prompt.contains(&prefs.unwind_summary()));

    let meal_prefs = mock_meal_preferences();
    let meal = meal_prompt(Phase::Menstrual, &meal_prefs, "young adult", "Bangalore");
    assert!(meal.contains("Menstrual"));
    assert!(meal.contains("young adult"));
    assert!(meal.contains(&meal_prefs.allergy_summary()));
  }

  #[tokio::test]
  async fn test_stub_provider_is_deterministic() {
    let stub = StubSuggestions;
    let first = fetch_via_trait(&stub).await.unwrap();
    let second = fetch_via_trait(&stub).await.unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first[0].text, second[0].text);
    assert!(first[0].text.contains("Follicular"));
  }

  #[tokio::test]
  async fn test_ollama_activity_suggestions_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/api/generate")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        r#"{"response": "During your Follicular phase, try this yoga session [https://www.youtube.com/watch?v=abc123] and consider visiting Lalbagh in Bangalore to unwind."}"#,
      )
      .create_async()
      .await;

    let client = OllamaClient::new(server.url(), "mistral");
    let suggestions = fetch_via_trait(&client).await.unwrap();

    mock.assert_async().await;
    assert_eq!(suggestions.len(), 1);
    assert_eq!(
      suggestions[0].video_link.as_deref(),
      Some("https://www.youtube.com/watch?v=abc123")
    );
    assert_eq!(suggestions[0].nearby_activity.as_deref(), Some("Lalbagh"));
  }

  #[tokio::test]
  async fn test_ollama_backend_failure_surfaces_as_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/api/generate")
      .with_status(500)
      .with_body("model not loaded")
      .create_async()
      .await;

    let client = OllamaClient::new(server.url(), "mistral");
    let result = client.generate("hello").await;

    match result {
      Err(SuggestionError::Api(msg)) => assert!(msg.contains("500")),
      other => panic!("expected Api error, got {:?}", other.map(|_| ())),
    }
  }

  #[tokio::test]
  async fn test_ollama_meal_plan_returns_trimmed_text() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/api/generate")
      .with_status(200)
      .with_body(r#"{"response": "\nMeal Plan for 3 day(s)\nBreakfast: Oats\n"}"#)
      .create_async()
      .await;

    let client = OllamaClient::new(server.url(), "mistral");
    let plan = client
      .meal_plan(
        &mock_profile(),
        &MealPlanRequest {
          period_days: 3,
          cuisine: Some("Indian".to_string()),
          diet: None,
          notes: None,
        },
      )
      .await
      .unwrap();

    assert!(plan.starts_with("Meal Plan for 3 day(s)"));
  }

  #[test]
  #[serial]
  fn test_from_env_honors_overrides() {
    temp_env::with_vars(
      [
        ("OLLAMA_URL", Some("http://ollama.local:9999")),
        ("OLLAMA_MODEL", Some("llama3")),
      ],
      || {
        let client = OllamaClient::from_env();
        assert_eq!(client.base_url, "http://ollama.local:9999");
        assert_eq!(client.model, "llama3");
      },
    );
  }
}
