//! The persisted profile record and identity stub
//!
//! One JSON record holds everything the user entered during onboarding:
//! identity fields, cycle data, and nested preference blocks. The whole
//! record is read-modify-written wholesale through the profile store.

use crate::models::preferences::{ActivityPreferences, MealPreferences};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// The full profile record, serialized as JSON under a single store key.
///
/// `last_cycle_start` is kept as the raw stored string (semantically a
/// calendar date, though legacy values may carry a time component) and
/// `cycle_length` tolerates numeric strings; the cycle calculator owns the
/// validation of both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub provider: Option<String>,

  #[serde(default)]
  pub date_of_birth: Option<NaiveDate>,
  #[serde(default)]
  pub location: Option<String>,

  /// First day of the most recently recorded cycle, as an ISO date string.
  #[serde(default)]
  pub last_cycle_start: Option<String>,

  /// User-reported total cycle length in days. Input forms constrain entry
  /// to [15, 45], but stored values are accepted permissively.
  #[serde(default, deserialize_with = "deserialize_cycle_length")]
  pub cycle_length: Option<i64>,

  #[serde(default)]
  pub smartwatch_connected: bool,
  #[serde(default)]
  pub calendar_connected: bool,

  #[serde(default)]
  pub activity_preferences: Option<ActivityPreferences>,
  #[serde(default)]
  pub meal_preferences: Option<MealPreferences>,
}

impl Profile {
  /// Age-band label for meal suggestions, derived from date of birth.
  /// Missing or future birth dates fall back to "adult".
  pub fn demographic(&self) -> &'static str {
    self.demographic_on(Local::now().date_naive())
  }

  pub fn demographic_on(&self, today: NaiveDate) -> &'static str {
    let dob = match self.date_of_birth {
      Some(d) => d,
      None => return "adult",
    };

    // years_since already accounts for a birthday later in the year
    let age = match today.years_since(dob) {
      Some(a) => a,
      None => return "adult",
    };

    match age {
      0..=12 => "child",
      13..=19 => "teen",
      20..=29 => "young adult",
      30..=49 => "adult",
      50..=64 => "middle aged",
      _ => "senior",
    }
  }

  /// Birthday-aware age in whole years, when a birth date is recorded.
  pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
    self.date_of_birth.and_then(|dob| today.years_since(dob))
  }
}

/// Coerce a stored cycle length to an integer day count.
///
/// Accepts JSON numbers and numeric strings (the original store held form
/// input verbatim, so both shapes exist in the wild). Anything else maps to
/// `None` instead of failing the whole profile read.
fn deserialize_cycle_length<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(raw.as_ref().and_then(coerce_cycle_length))
}

fn coerce_cycle_length(value: &serde_json::Value) -> Option<i64> {
  match value {
    serde_json::Value::Number(n) => {
      if let Some(i) = n.as_i64() {
        Some(i)
      } else {
        // Fractional lengths are not meaningful day counts
        n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64)
      }
    }
    serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
    _ => None,
  }
}

/// ---------------------------------------------------------------------------
/// Sign-In Stub
/// ---------------------------------------------------------------------------

/// Identity returned by the stubbed sign-in flow. Real authentication is an
/// explicit non-goal; each provider hands back a fixed identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
  pub name: String,
  pub email: String,
  pub provider: String,
}

impl UserIdentity {
  pub fn for_provider(provider: &str) -> Self {
    match provider {
      "google" => Self {
        name: "Jane Doe".to_string(),
        email: "janedoe@gmail.com".to_string(),
        provider: "google".to_string(),
      },
      "apple" => Self {
        name: "Jane Doe".to_string(),
        email: "janedoe@icloud.com".to_string(),
        provider: "apple".to_string(),
      },
      _ => Self {
        name: String::new(),
        email: String::new(),
        provider: "email".to_string(),
      },
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
