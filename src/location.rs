//! Reverse geocoding for the onboarding location field
//!
//! Turns device coordinates into a city-level label via Nominatim. Only a
//! coarse place name is needed for suggestion prompts, so the address is
//! reduced to city, falling back to town, then state.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("her-companion/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum LocationError {
  #[error("Invalid URL: {0}")]
  Url(String),

  #[error("Request failed: {0}")]
  Request(String),

  #[error("Geocoder error: {0}")]
  Api(String),
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
  #[serde(default)]
  address: Option<Address>,
}

#[derive(Debug, Deserialize, Default)]
struct Address {
  #[serde(default)]
  city: Option<String>,
  #[serde(default)]
  town: Option<String>,
  #[serde(default)]
  state: Option<String>,
}

pub struct GeocodeClient {
  client: Client,
  base_url: String,
}

impl GeocodeClient {
  pub fn new() -> Result<Self, LocationError> {
    Self::with_base_url(NOMINATIM_BASE)
  }

  /// Injectable base URL, used by tests to point at a mock server.
  pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LocationError> {
    // Nominatim rejects requests without an identifying user agent
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| LocationError::Request(e.to_string()))?;

    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  /// Resolve coordinates to a coarse place name, or `None` when the geocoder
  /// has no usable address for them.
  pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Option<String>, LocationError> {
    let url = Url::parse_with_params(
      &format!("{}/reverse", self.base_url),
      &[
        ("format", "json".to_string()),
        ("lat", lat.to_string()),
        ("lon", lon.to_string()),
      ],
    )
    .map_err(|e| LocationError::Url(e.to_string()))?;

    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| LocationError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LocationError::Request(e.to_string()))?;

    if !status.is_success() {
      return Err(LocationError::Api(format!("HTTP {}: {}", status, body)));
    }

    let parsed: ReverseResponse =
      serde_json::from_str(&body).map_err(|e| LocationError::Api(e.to_string()))?;

    Ok(parsed.address.and_then(|a| a.city.or(a.town).or(a.state)))
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
