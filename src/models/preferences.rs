//! Structured preference blocks
//!
//! Preferences used to live in the profile record as loosely-typed blobs
//! (strings that might or might not be arrays). Here every multi-select is
//! a `Vec<String>` and single-selects are `Option<String>`; the calculator
//! treats all of this as opaque.

use serde::{Deserialize, Serialize};

/// "What to do" preferences collected by the activity dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPreferences {
  /// Preferred ways to unwind (multi-select).
  #[serde(default)]
  pub unwind: Vec<String>,

  /// Preferred exercises (multi-select).
  #[serde(default)]
  pub exercise: Vec<String>,

  /// Exercise frequency, one of the dialog's fixed options.
  #[serde(default)]
  pub frequency: Option<String>,
}

/// "What to eat" preferences collected by the meal dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPreferences {
  #[serde(default)]
  pub demographic: Vec<String>,

  #[serde(default)]
  pub cuisine: Vec<String>,

  #[serde(default)]
  pub dietary: Vec<String>,

  #[serde(default)]
  pub allergies: Vec<String>,

  /// Named diet plan, if any (Keto, Paleo, ...).
  #[serde(default)]
  pub diet_type: Option<String>,
}

impl ActivityPreferences {
  /// Comma-joined summary lines for prompt building.
  pub fn unwind_summary(&self) -> String {
    self.unwind.join(", ")
  }

  pub fn exercise_summary(&self) -> String {
    self.exercise.join(", ")
  }
}

impl MealPreferences {
  pub fn cuisine_summary(&self) -> String {
    self.cuisine.join(", ")
  }

  pub fn dietary_summary(&self) -> String {
    self.dietary.join(", ")
  }

  pub fn allergy_summary(&self) -> String {
    self.allergies.join(", ")
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_multi_selects_deserialize_as_sets() {
    let prefs: ActivityPreferences = serde_json::from_str(
      r#"{"unwind":["Meditate","Journal"],"exercise":["Yoga"],"frequency":"3-4 times/week"}"#,
    )
    .unwrap();

    assert_eq!(prefs.unwind.len(), 2);
    assert_eq!(prefs.exercise, vec!["Yoga"]);
    assert_eq!(prefs.frequency.as_deref(), Some("3-4 times/week"));
  }

  #[test]
  fn test_missing_fields_default_to_empty() {
    let prefs: MealPreferences = serde_json::from_str(r#"{"cuisine":["Indian"]}"#).unwrap();
    assert_eq!(prefs.cuisine, vec!["Indian"]);
    assert!(prefs.dietary.is_empty());
    assert!(prefs.allergies.is_empty());
    assert_eq!(prefs.diet_type, None);
  }

  #[test]
  fn test_prompt_summaries_join_selections() {
    let prefs = ActivityPreferences {
      unwind: vec!["Read a book".to_string(), "Take a walk".to_string()],
      exercise: vec!["Yoga".to_string(), "Pilates".to_string()],
      frequency: Some("Rarely".to_string()),
    };

    assert_eq!(prefs.unwind_summary(), "Read a book, Take a walk");
    assert_eq!(prefs.exercise_summary(), "Yoga, Pilates");
  }
}
