//! HER companion core
//!
//! Cycle-aware wellness companion: stores one onboarded profile record,
//! derives the current cycle phase from it on demand, and produces
//! phase-appropriate meal and activity suggestions through a generative
//! text backend. A UI shell embeds this crate and drives it through the
//! `commands` module.

pub mod commands;
pub mod cycle;
pub mod db;
pub mod location;
pub mod models;
pub mod store;
pub mod suggestions;

#[cfg(test)]
pub mod test_utils;

pub use cycle::{Phase, PhaseSnapshot};
pub use db::{initialize_db, AppState};
pub use models::{ActivityPreferences, MealPreferences, Profile};
pub use store::ProfileStore;
pub use suggestions::{OllamaClient, StubSuggestions, SuggestionProvider};
